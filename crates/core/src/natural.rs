//! Natural ordering: numeric-aware, case- and accent-insensitive comparison.
//!
//! Digit runs compare as unsigned magnitudes, so `PN2` sorts before `PN10`.
//! Letters compare case-folded with common Latin diacritics folded to their
//! base letter. Ties at that level fall back first to leading-zero counts
//! (fewer zeros first), then to the raw strings, keeping the order total.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();
    let mut tiebreak = Ordering::Equal;

    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let run_a = take_digits(&mut ca);
                let run_b = take_digits(&mut cb);
                match compare_magnitude(&run_a, &run_b) {
                    Ordering::Equal => {
                        if tiebreak == Ordering::Equal {
                            // "1" before "01": shorter raw run wins the tie.
                            tiebreak = run_a.len().cmp(&run_b.len());
                        }
                    }
                    ord => return ord,
                }
            }
            (Some(x), Some(y)) => {
                let ord = fold_char(x).cmp(&fold_char(y));
                if ord != Ordering::Equal {
                    return ord;
                }
                ca.next();
                cb.next();
            }
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => {
                return if tiebreak != Ordering::Equal {
                    tiebreak
                } else {
                    a.cmp(b)
                };
            }
        }
    }
}

fn take_digits(iter: &mut Peekable<Chars>) -> String {
    let mut run = String::new();
    while let Some(&c) = iter.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        iter.next();
    }
    run
}

/// Compare two digit runs as magnitudes: ignore leading zeros, then longer
/// is greater, then lexicographic on the significant digits.
fn compare_magnitude(a: &str, b: &str) -> Ordering {
    let sa = a.trim_start_matches('0');
    let sb = b.trim_start_matches('0');
    sa.len().cmp(&sb.len()).then_with(|| sa.cmp(sb))
}

/// Lowercase plus base-letter folding for Latin-1 diacritics. Part numbers
/// are overwhelmingly ASCII; this covers the stragglers from European
/// supplier exports.
fn fold_char(c: char) -> char {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match lower {
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut items: Vec<&str>) -> Vec<&str> {
        items.sort_by(|a, b| natural_cmp(a, b));
        items
    }

    #[test]
    fn numeric_runs_compare_by_magnitude() {
        assert_eq!(sorted(vec!["PN10", "PN2", "PN1"]), vec!["PN1", "PN2", "PN10"]);
        assert_eq!(natural_cmp("a2", "a10"), Ordering::Less);
        assert_eq!(natural_cmp("a10b3", "a10b20"), Ordering::Less);
    }

    #[test]
    fn case_insensitive_with_deterministic_tiebreak() {
        assert_eq!(natural_cmp("pn1", "PN2"), Ordering::Less);
        // Equal after folding, raw comparison keeps the order total.
        assert_ne!(natural_cmp("PN1", "pn1"), natural_cmp("pn1", "PN1"));
    }

    #[test]
    fn accents_fold_to_base_letters() {
        // é folds to e, so the digit runs decide.
        assert_eq!(natural_cmp("résistor2", "resistor10"), Ordering::Less);
        // Folded-equal strings stay adjacent under sort.
        assert_eq!(sorted(vec!["cafz", "café", "cafa"]), vec!["cafa", "café", "cafz"]);
    }

    #[test]
    fn leading_zeros_break_ties_only() {
        assert_eq!(natural_cmp("01", "1"), Ordering::Greater);
        assert_eq!(natural_cmp("1", "01"), Ordering::Less);
        // Magnitude difference dominates the zero count.
        assert_eq!(natural_cmp("09", "10"), Ordering::Less);
        // A later magnitude difference outranks an earlier zero tie.
        assert_eq!(natural_cmp("a01-2", "a1-1"), Ordering::Greater);
    }

    #[test]
    fn dashed_part_numbers_sort_segmentwise() {
        assert_eq!(
            sorted(vec!["A-1-10", "A-1-9", "A-1-2"]),
            vec!["A-1-2", "A-1-9", "A-1-10"]
        );
    }

    #[test]
    fn prefix_sorts_before_extension() {
        assert_eq!(natural_cmp("A-1", "A-1-1"), Ordering::Less);
        assert_eq!(natural_cmp("", "A"), Ordering::Less);
        assert_eq!(natural_cmp("", ""), Ordering::Equal);
    }
}
