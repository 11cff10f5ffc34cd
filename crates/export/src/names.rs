//! Sheet and output-file naming.

use std::collections::HashSet;

/// Characters Excel forbids in sheet names.
const ILLEGAL: [char; 7] = ['\\', '/', ':', '*', '?', '[', ']'];
const MAX_SHEET_NAME: usize = 31;

/// Replace forbidden characters with `_` and cap the length.
pub fn sheet_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|ch| if ILLEGAL.contains(&ch) { '_' } else { ch })
        .collect();
    let trimmed = cleaned.trim();
    let base = if trimmed.is_empty() { "Sheet" } else { trimmed };
    base.chars().take(MAX_SHEET_NAME).collect()
}

/// Assigns workbook-unique sheet names; collisions get `_1`, `_2`, …
/// suffixes that still fit the length cap.
#[derive(Default)]
pub struct SheetNamer {
    used: HashSet<String>,
}

impl SheetNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, raw: &str) -> String {
        let base = sheet_name(raw);
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 1usize;
        loop {
            let suffix = format!("_{n}");
            let keep = MAX_SHEET_NAME.saturating_sub(suffix.chars().count());
            let mut candidate: String = base.chars().take(keep).collect();
            candidate.push_str(&suffix);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Default output name: source names joined with `_`, extensions stripped,
/// every run of characters outside letters/digits/`_`/`-` replaced with `_`,
/// `.xlsx` appended.
pub fn output_file_name(sources: &[&str]) -> String {
    let joined = sources.iter().map(|name| stem(name)).collect::<Vec<_>>().join("_");
    let mut out = String::with_capacity(joined.len() + 5);
    let mut pending = false;
    for ch in joined.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == '-' {
            if pending {
                out.push('_');
                pending = false;
            }
            out.push(ch);
        } else {
            pending = true;
        }
    }
    if pending {
        out.push('_');
    }
    out.push_str(".xlsx");
    out
}

fn stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_characters_become_underscores() {
        assert_eq!(sheet_name("a/b:c*d?e[f]"), "a_b_c_d_e_f_");
        assert_eq!(sheet_name("left.csv"), "left.csv");
    }

    #[test]
    fn long_names_are_capped() {
        let name = sheet_name(&"x".repeat(40));
        assert_eq!(name.chars().count(), 31);
    }

    #[test]
    fn blank_names_get_a_placeholder() {
        assert_eq!(sheet_name("   "), "Sheet");
    }

    #[test]
    fn collisions_get_numeric_suffixes() {
        let mut namer = SheetNamer::new();
        assert_eq!(namer.assign("data"), "data");
        assert_eq!(namer.assign("data"), "data_1");
        assert_eq!(namer.assign("data"), "data_2");
    }

    #[test]
    fn suffix_fits_within_the_cap() {
        let long = "y".repeat(31);
        let mut namer = SheetNamer::new();
        assert_eq!(namer.assign(&long).chars().count(), 31);
        let second = namer.assign(&long);
        assert_eq!(second.chars().count(), 31);
        assert!(second.ends_with("_1"));
    }

    #[test]
    fn output_name_joins_stems() {
        assert_eq!(
            output_file_name(&["左表.html", "right (2).xlsx"]),
            "左表_right_2_.xlsx"
        );
        assert_eq!(output_file_name(&["bom.csv"]), "bom.xlsx");
    }
}
