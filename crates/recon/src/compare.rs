//! Two-pass reconciliation.
//!
//! Pass 1 classifies every cleaned row against the other side's part-number
//! index: absent key, matching quantity, or differing quantity. Pass 2
//! upgrades still-unmatched rows whose supplier part number appears among the
//! other side's unmatched rows, the same part under different primary
//! numbering.
//!
//! Pure functions: two documents in, classified copies out. No IO, no
//! presentation constants.

use std::collections::{HashMap, HashSet};

use bomdiff_core::normalize::to_number;
use bomdiff_core::{BomDocument, BomRow, CellValue, Classification, ColumnProfile};

/// Classify both sides against each other. Inputs are untouched; the
/// returned copies have `classification` set on every cleaned row (raw rows
/// keep whatever marks cleaning left on them).
pub fn reconcile(
    left: &BomDocument,
    right: &BomDocument,
    profile: &ColumnProfile,
) -> (BomDocument, BomDocument) {
    let mut l = left.clone();
    let mut r = right.clone();

    let left_qty = index_quantities(&l.cleaned.rows, profile);
    let right_qty = index_quantities(&r.cleaned.rows, profile);

    for row in l.cleaned.rows.iter_mut() {
        row.classification = classify_against(row, &right_qty, profile);
    }
    for row in r.cleaned.rows.iter_mut() {
        row.classification = classify_against(row, &left_qty, profile);
    }

    // Both unmatched sets are collected before either side upgrades, so an
    // upgrade on one side cannot hide a supplier key from the other.
    let left_spns = unmatched_supplier_keys(&l.cleaned.rows, profile);
    let right_spns = unmatched_supplier_keys(&r.cleaned.rows, profile);
    upgrade_cross_matches(&mut l.cleaned.rows, &right_spns, profile);
    upgrade_cross_matches(&mut r.cleaned.rows, &left_spns, profile);

    (l, r)
}

/// Trimmed part number → coerced quantity. Blank keys are never indexed, so
/// they can never be found from the other side. Later duplicates win, which
/// cannot happen on cleaned input.
fn index_quantities(rows: &[BomRow], profile: &ColumnProfile) -> HashMap<String, f64> {
    let mut index = HashMap::new();
    for row in rows {
        let pn = row.key(&profile.part_number);
        if pn.is_empty() {
            continue;
        }
        let qty = to_number(row.get(&profile.quantity).unwrap_or(&CellValue::Empty));
        index.insert(pn, qty);
    }
    index
}

fn classify_against(
    row: &BomRow,
    other: &HashMap<String, f64>,
    profile: &ColumnProfile,
) -> Classification {
    let pn = row.key(&profile.part_number);
    let matched = if pn.is_empty() { None } else { other.get(&pn) };
    match matched {
        None => Classification::NotFound,
        Some(&other_qty) => {
            let own = to_number(row.get(&profile.quantity).unwrap_or(&CellValue::Empty));
            if own == other_qty {
                Classification::QuantityMatch
            } else {
                Classification::QuantityMismatch
            }
        }
    }
}

fn unmatched_supplier_keys(rows: &[BomRow], profile: &ColumnProfile) -> HashSet<String> {
    let mut keys = HashSet::new();
    for row in rows {
        if row.classification == Classification::NotFound {
            let spn = row.key(&profile.supplier_part_number);
            if !spn.is_empty() {
                keys.insert(spn);
            }
        }
    }
    keys
}

fn upgrade_cross_matches(
    rows: &mut [BomRow],
    other_spns: &HashSet<String>,
    profile: &ColumnProfile,
) {
    for row in rows.iter_mut() {
        if row.classification != Classification::NotFound {
            continue;
        }
        let spn = row.key(&profile.supplier_part_number);
        if !spn.is_empty() && other_spns.contains(&spn) {
            row.classification = Classification::CrossMatched;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bomdiff_core::BomTable;

    const PN: &str = "零件号";
    const SPN: &str = "供应商零件号";
    const QTY: &str = "数量";

    fn doc(name: &str, rows: &[(&str, &str, &str)]) -> BomDocument {
        let headers: Vec<String> = vec![PN.into(), SPN.into(), QTY.into()];
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, (pn, spn, qty))| {
                let data = [
                    (PN.to_string(), CellValue::from(*pn)),
                    (SPN.to_string(), CellValue::from(*spn)),
                    (QTY.to_string(), CellValue::from(*qty)),
                ]
                .into_iter()
                .collect();
                BomRow::new(data, i)
            })
            .collect();
        BomDocument::success(name, BomTable::new(headers, rows))
    }

    fn classes(doc: &BomDocument) -> Vec<Classification> {
        doc.cleaned.rows.iter().map(|r| r.classification).collect()
    }

    #[test]
    fn quantity_match_and_mismatch() {
        let (l, r) = reconcile(
            &doc("l", &[("X", "", "2")]),
            &doc("r", &[("X", "", "2")]),
            &ColumnProfile::default(),
        );
        assert_eq!(classes(&l), vec![Classification::QuantityMatch]);
        assert_eq!(classes(&r), vec![Classification::QuantityMatch]);

        let (l, r) = reconcile(
            &doc("l", &[("X", "", "2")]),
            &doc("r", &[("X", "", "5")]),
            &ColumnProfile::default(),
        );
        assert_eq!(classes(&l), vec![Classification::QuantityMismatch]);
        assert_eq!(classes(&r), vec![Classification::QuantityMismatch]);
    }

    #[test]
    fn absent_key_is_not_found() {
        let (l, r) = reconcile(
            &doc("l", &[("X", "", "2")]),
            &doc("r", &[]),
            &ColumnProfile::default(),
        );
        assert_eq!(classes(&l), vec![Classification::NotFound]);
        assert!(classes(&r).is_empty());
    }

    #[test]
    fn quantities_coerce_before_comparison() {
        let (l, _r) = reconcile(
            &doc("l", &[("X", "", "1,000")]),
            &doc("r", &[("X", "", " 1000 ")]),
            &ColumnProfile::default(),
        );
        assert_eq!(classes(&l), vec![Classification::QuantityMatch]);
    }

    #[test]
    fn supplier_overlap_upgrades_both_sides() {
        let (l, r) = reconcile(
            &doc("l", &[("L-100", "S9", "1")]),
            &doc("r", &[("R-200", "S9", "4")]),
            &ColumnProfile::default(),
        );
        assert_eq!(classes(&l), vec![Classification::CrossMatched]);
        assert_eq!(classes(&r), vec![Classification::CrossMatched]);
    }

    #[test]
    fn supplier_overlap_requires_both_unmatched() {
        // S9 exists on the right, but on a row that found its primary key,
        // so the left row stays not-found.
        let (l, r) = reconcile(
            &doc("l", &[("L-100", "S9", "1"), ("R-200", "", "4")]),
            &doc("r", &[("R-200", "S9", "4")]),
            &ColumnProfile::default(),
        );
        assert_eq!(
            classes(&l),
            vec![Classification::NotFound, Classification::QuantityMatch]
        );
        assert_eq!(classes(&r), vec![Classification::QuantityMatch]);
    }

    #[test]
    fn blank_keys_are_never_found() {
        let (l, r) = reconcile(
            &doc("l", &[("", "S1", "1")]),
            &doc("r", &[("", "S1", "1")]),
            &ColumnProfile::default(),
        );
        // Blank primary keys miss in pass 1, then the shared supplier key
        // cross-matches them.
        assert_eq!(classes(&l), vec![Classification::CrossMatched]);
        assert_eq!(classes(&r), vec![Classification::CrossMatched]);
    }

    #[test]
    fn inputs_are_not_mutated() {
        let left = doc("l", &[("X", "", "2")]);
        let right = doc("r", &[("Y", "", "2")]);
        let _ = reconcile(&left, &right, &ColumnProfile::default());
        assert_eq!(classes(&left), vec![Classification::Unclassified]);
        assert_eq!(classes(&right), vec![Classification::Unclassified]);
    }

    #[test]
    fn sides_classify_independently() {
        // Left has a duplicate-free view of X; right lists X twice (uncleaned
        // input). Each right row still classifies on its own.
        let (l, r) = reconcile(
            &doc("l", &[("X", "", "3")]),
            &doc("r", &[("X", "", "3"), ("X", "", "9")]),
            &ColumnProfile::default(),
        );
        // The right index keeps the later duplicate, so the left row sees 9.
        assert_eq!(classes(&l), vec![Classification::QuantityMismatch]);
        assert_eq!(
            classes(&r),
            vec![Classification::QuantityMatch, Classification::QuantityMismatch]
        );
    }
}
