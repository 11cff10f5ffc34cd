//! Aggregation pass (the "cleaner").
//!
//! Per raw row: back-fill a missing part number from the supplier part
//! number, normalize both keys, coerce the quantity, fold wire-family keys,
//! then collapse rows sharing the resulting aggregation key while summing
//! quantities. Raw rows are never altered in content; merged-away rows are
//! only flagged for the audit view.

use std::collections::HashMap;

use bomdiff_core::normalize::{normalize_key, to_number};
use bomdiff_core::{natural_cmp, BomDocument, BomRow, BomTable, CellValue, ColumnProfile};

struct Group {
    data: HashMap<String, CellValue>,
    qty: f64,
}

/// Aggregate `doc.raw` into a fresh `cleaned` table. The input document is
/// untouched; the returned copy carries `merged_away` marks on its raw rows
/// and dense, naturally-ordered indices on its cleaned rows.
pub fn clean(doc: &BomDocument, profile: &ColumnProfile) -> BomDocument {
    let mut out = doc.clone();
    let headers = out.raw.headers.clone();

    if headers.is_empty() || out.raw.rows.is_empty() {
        out.cleaned = BomTable::new(headers, Vec::new());
        return out;
    }

    let pn_col = profile.part_number.as_str();
    let spn_col = profile.supplier_part_number.as_str();
    let qty_col = profile.quantity.as_str();
    let kind_col = profile.kind.as_str();
    let has_pn = headers.iter().any(|h| h == pn_col);
    let has_spn = headers.iter().any(|h| h == spn_col);
    let has_qty = headers.iter().any(|h| h == qty_col);

    // Aggregation keys in first-seen order; the final sort is stable, so
    // groups with equal sort keys keep this order.
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Group> = HashMap::new();

    for src in out.raw.rows.iter_mut() {
        // Working record, keyed by the table's headers only.
        let mut record: HashMap<String, CellValue> = headers
            .iter()
            .map(|h| (h.clone(), src.data.get(h).cloned().unwrap_or_default()))
            .collect();

        // Step 1: part-number back-fill from the supplier part number.
        let mut pn = text_of(&record, pn_col);
        let spn = text_of(&record, spn_col);
        if pn.is_empty() && !spn.is_empty() {
            pn = format!("[{spn}]");
        }

        // Step 2: key normalization + quantity coercion.
        pn = normalize_key(&pn);
        if has_pn {
            record.insert(pn_col.to_string(), CellValue::Text(pn.clone()));
        }
        if has_spn {
            record.insert(spn_col.to_string(), CellValue::Text(normalize_key(&spn)));
        }
        let qty = if has_qty {
            to_number(record.get(qty_col).unwrap_or(&CellValue::Empty))
        } else {
            0.0
        };
        if has_qty {
            record.insert(qty_col.to_string(), CellValue::Number(qty));
        }

        // Step 3: wire-family key folding. Exact type match, 3+ dash
        // segments collapse to the first two.
        let kind = text_of(&record, kind_col);
        if !pn.is_empty() && profile.is_wire_type(&kind) {
            let segments: Vec<&str> = pn.split('-').collect();
            if segments.len() >= 3 {
                pn = format!("{}-{}", segments[0], segments[1]);
            }
        }
        if has_pn {
            record.insert(pn_col.to_string(), CellValue::Text(pn.clone()));
        }

        match groups.get_mut(&pn) {
            None => {
                order.push(pn.clone());
                groups.insert(pn, Group { data: record, qty });
                src.merged_away = false;
            }
            Some(group) => {
                group.qty += qty;
                if has_qty {
                    group
                        .data
                        .insert(qty_col.to_string(), CellValue::Number(group.qty));
                }
                src.merged_away = true;
            }
        }
    }

    let mut rows: Vec<BomRow> = order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .map(|g| BomRow::new(g.data, 0))
        .collect();

    rows.sort_by(|a, b| natural_cmp(&a.text(pn_col), &b.text(pn_col)));
    for (i, row) in rows.iter_mut().enumerate() {
        row.index = i;
    }

    out.cleaned = BomTable::new(headers, rows);
    out
}

fn text_of(record: &HashMap<String, CellValue>, header: &str) -> String {
    record
        .get(header)
        .map(|v| v.text().into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bomdiff_core::normalize::to_number;

    const PN: &str = "零件号";
    const SPN: &str = "供应商零件号";
    const QTY: &str = "数量";
    const KIND: &str = "类型";

    fn table(headers: &[&str], rows: Vec<Vec<&str>>) -> BomTable {
        let header_vec: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, cells)| {
                let data = headers
                    .iter()
                    .zip(cells)
                    .map(|(h, v)| (h.to_string(), CellValue::from(v)))
                    .collect();
                BomRow::new(data, i)
            })
            .collect();
        BomTable::new(header_vec, rows)
    }

    fn doc(headers: &[&str], rows: Vec<Vec<&str>>) -> BomDocument {
        BomDocument::success("test.xlsx", table(headers, rows))
    }

    fn cleaned_keys(doc: &BomDocument) -> Vec<String> {
        doc.cleaned.rows.iter().map(|r| r.text(PN)).collect()
    }

    #[test]
    fn empty_table_cleans_to_empty() {
        let d = doc(&[], Vec::new());
        let out = clean(&d, &ColumnProfile::default());
        assert_eq!(out.row_count(), 0);
        assert!(!out.is_error());
    }

    #[test]
    fn backfill_fold_and_aggregate() {
        let d = doc(
            &[PN, SPN, QTY, KIND],
            vec![
                vec!["", "S1", "5", ""],
                vec!["A-1-1", "", "3", "WIRE"],
                vec!["A-1-2", "", "4", "WIRE"],
            ],
        );
        let out = clean(&d, &ColumnProfile::default());

        // Punctuation sorts before letters, so the bracketed key leads.
        assert_eq!(cleaned_keys(&out), vec!["[S1]", "A-1"]);
        let backfilled = &out.cleaned.rows[0];
        assert_eq!(to_number(backfilled.get(QTY).unwrap_or(&CellValue::Empty)), 5.0);
        let wire = &out.cleaned.rows[1];
        assert_eq!(to_number(wire.get(QTY).unwrap_or(&CellValue::Empty)), 7.0);

        // Raw provenance: first occurrence per key stays, the folded
        // duplicate is marked merged away.
        let marks: Vec<bool> = out.raw.rows.iter().map(|r| r.merged_away).collect();
        assert_eq!(marks, vec![false, false, true]);
        // Raw content is untouched.
        assert_eq!(out.raw.rows[2].text(PN), "A-1-2");
    }

    #[test]
    fn keys_normalize_before_grouping() {
        let d = doc(
            &[PN, QTY],
            vec![
                vec!["A 1\u{00A0}", "1"],
                vec!["\u{FEFF}A1", "2"],
            ],
        );
        let out = clean(&d, &ColumnProfile::default());
        assert_eq!(cleaned_keys(&out), vec!["A1"]);
        assert_eq!(
            to_number(out.cleaned.rows[0].get(QTY).unwrap_or(&CellValue::Empty)),
            3.0
        );
    }

    #[test]
    fn fold_requires_wire_type_and_three_segments() {
        let d = doc(
            &[PN, QTY, KIND],
            vec![
                vec!["B-2-7", "1", "BRACKET"],
                vec!["B-2", "1", "WIRE"],
                vec!["C-3-1-4", "2", "线束"],
            ],
        );
        let out = clean(&d, &ColumnProfile::default());
        // Non-wire keeps all segments; two-segment wire keeps both; the
        // four-segment harness folds to two.
        assert_eq!(cleaned_keys(&out), vec!["B-2", "B-2-7", "C-3"]);
    }

    #[test]
    fn quantities_conserve_per_group() {
        let d = doc(
            &[PN, QTY],
            vec![
                vec!["X", "1,000"],
                vec!["X", " 2 "],
                vec!["Y", "bad"],
            ],
        );
        let out = clean(&d, &ColumnProfile::default());
        let by_key: HashMap<String, f64> = out
            .cleaned
            .rows
            .iter()
            .map(|r| (r.text(PN), to_number(r.get(QTY).unwrap_or(&CellValue::Empty))))
            .collect();
        assert_eq!(by_key["X"], 1002.0);
        assert_eq!(by_key["Y"], 0.0);
    }

    #[test]
    fn empty_keys_collapse_into_one_group() {
        let d = doc(
            &[PN, QTY],
            vec![vec!["", "1"], vec!["  ", "2"], vec!["Z", "3"]],
        );
        let out = clean(&d, &ColumnProfile::default());
        assert_eq!(out.row_count(), 2);
        // Natural order puts the empty key first.
        assert_eq!(cleaned_keys(&out), vec!["", "Z"]);
        assert_eq!(
            to_number(out.cleaned.rows[0].get(QTY).unwrap_or(&CellValue::Empty)),
            3.0
        );
    }

    #[test]
    fn cleaning_is_idempotent_on_unique_keys() {
        let d = doc(
            &[PN, QTY],
            vec![vec!["PN10", "1"], vec!["PN2", "2"], vec!["PN1", "3"]],
        );
        let once = clean(&d, &ColumnProfile::default());
        let again = clean(
            &BomDocument::success("again", once.cleaned.clone()),
            &ColumnProfile::default(),
        );
        assert_eq!(cleaned_keys(&again), cleaned_keys(&once));
        assert_eq!(cleaned_keys(&once), vec!["PN1", "PN2", "PN10"]);
        for (a, b) in once.cleaned.rows.iter().zip(again.cleaned.rows.iter()) {
            assert_eq!(a.data, b.data);
            assert_eq!(a.index, b.index);
        }
    }

    #[test]
    fn sequence_indices_are_dense_and_sorted() {
        let d = doc(&[PN], vec![vec!["B"], vec!["A"], vec!["C"]]);
        let out = clean(&d, &ColumnProfile::default());
        let indices: Vec<usize> = out.cleaned.rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(cleaned_keys(&out), vec!["A", "B", "C"]);
    }
}
