//! Grid-to-document assembly shared by every source format.
//!
//! Each format parser produces one [`Grid`] per sheet or table; this module
//! turns those grids into a single canonical [`BomDocument`]: header row
//! detection, column merging across grids, blank-row filtering, banner-row
//! filtering and column reordering.

use std::collections::HashMap;

use bomdiff_core::{BomDocument, BomRow, BomTable, CellValue, ColumnProfile};

/// Rows of cells exactly as they appear in the source, absolute geometry
/// preserved (leading empty rows and columns are padded, not skipped).
pub type Grid = Vec<Vec<CellValue>>;

/// Vendor tools emit a repeated banner between sections: a literal
/// `Design` marker or a copy of the header row itself.
const BANNER_MARKER: &str = "Design";

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Assemble per-sheet grids into one canonical document.
///
/// Grids without a recognizable header row are skipped. Headers are unioned
/// across grids in first-seen order, rows are indexed densely in source
/// order. `drop_banner_rows` enables the repeated-banner filter used by the
/// spreadsheet formats.
pub fn build_document(
    name: &str,
    grids: Vec<Grid>,
    drop_banner_rows: bool,
    profile: &ColumnProfile,
) -> BomDocument {
    let mut merged_headers: Vec<String> = Vec::new();
    let mut merged_rows: Vec<BomRow> = Vec::new();

    for (grid_idx, grid) in grids.iter().enumerate() {
        let Some(header_idx) = find_header_row(grid, profile) else {
            log::debug!("{name}: grid {grid_idx} has no header row, skipped");
            continue;
        };

        // Header names keep their surrounding whitespace; only fully blank
        // header cells are dropped. Values then bind by position within the
        // surviving headers.
        let headers: Vec<String> = grid[header_idx]
            .iter()
            .map(|cell| cell.text().into_owned())
            .filter(|header| !header.trim().is_empty())
            .collect();

        for header in &headers {
            if !merged_headers.contains(header) {
                merged_headers.push(header.clone());
            }
        }

        for row in &grid[header_idx + 1..] {
            // A row survives only if some recognized column holds a value.
            // Cells beyond the recognized columns never keep a row alive.
            let has_value = (0..headers.len())
                .any(|col| row.get(col).is_some_and(|cell| !cell.is_blank()));
            if !has_value {
                continue;
            }
            let data: HashMap<String, CellValue> = headers
                .iter()
                .enumerate()
                .map(|(col, header)| {
                    (header.clone(), row.get(col).cloned().unwrap_or_default())
                })
                .collect();
            merged_rows.push(BomRow::new(data, merged_rows.len()));
        }
    }

    if drop_banner_rows {
        if let Some(first_header) = merged_headers.first().cloned() {
            let before = merged_rows.len();
            merged_rows.retain(|row| {
                let value = row.key(&first_header);
                value != BANNER_MARKER && value != first_header
            });
            let dropped = before - merged_rows.len();
            if dropped > 0 {
                log::debug!("{name}: dropped {dropped} banner rows under '{first_header}'");
            }
        }
    }

    let headers = reorder_headers(merged_headers, profile.priority_columns());
    BomDocument::success(name, BomTable::new(headers, merged_rows))
}

/// First row whose first cell contains a header keyword, after trimming.
fn find_header_row(grid: &[Vec<CellValue>], profile: &ColumnProfile) -> Option<usize> {
    grid.iter().position(|row| {
        row.first()
            .map(|cell| profile.matches_header_keyword(cell.text().trim()))
            .unwrap_or(false)
    })
}

/// Float the key columns to the front, in priority order, keeping the rest
/// in their first-seen order.
fn reorder_headers(headers: Vec<String>, priority: [&str; 4]) -> Vec<String> {
    let mut reordered: Vec<String> = priority
        .into_iter()
        .filter(|wanted| headers.iter().any(|h| h == wanted))
        .map(str::to_string)
        .collect();
    let rest: Vec<String> = headers
        .into_iter()
        .filter(|header| !reordered.contains(header))
        .collect();
    reordered.extend(rest);
    reordered
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const PN: &str = "零件号";
    const QTY: &str = "数量";
    const KIND: &str = "类型";

    fn profile() -> ColumnProfile {
        ColumnProfile::default()
    }

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|row| row.iter().map(|cell| CellValue::from(*cell)).collect())
            .collect()
    }

    #[test]
    fn header_row_found_below_preamble() {
        let g = grid(&[
            &["Quarterly BOM export"],
            &[],
            &[PN, QTY],
            &["A-1", "2"],
        ]);
        let doc = build_document("left.csv", vec![g], true, &profile());
        let table = &doc.raw;
        assert_eq!(table.headers, vec![PN.to_string(), QTY.to_string()]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].key(PN), "A-1");
    }

    #[test]
    fn values_bind_by_recognized_column_position() {
        // The blank header cell is dropped, so the third physical column
        // has no header and its values are ignored.
        let g = grid(&[&[PN, QTY, ""], &["A-1", "5", "junk"]]);
        let doc = build_document("left.csv", vec![g], true, &profile());
        let row = &doc.raw.rows[0];
        assert_eq!(row.key(QTY), "5");
        assert_eq!(row.data.len(), 2);
    }

    #[test]
    fn rows_blank_under_recognized_columns_are_dropped() {
        let g = grid(&[
            &[PN, QTY],
            &["", "  ", "stray note"],
            &["A-1", "1"],
        ]);
        let doc = build_document("left.csv", vec![g], true, &profile());
        assert_eq!(doc.raw.rows.len(), 1);
        assert_eq!(doc.raw.rows[0].index, 0);
        assert_eq!(doc.raw.rows[0].key(PN), "A-1");
    }

    #[test]
    fn headers_union_across_grids_and_reorder() {
        let first = grid(&[&[PN, QTY], &["A-1", "2"]]);
        let second = grid(&[&[PN, KIND], &["B-7", "WIRE"]]);
        let doc = build_document("book.xlsx", vec![first, second], true, &profile());
        // Priority columns float to the front; the union keeps both sheets'
        // columns.
        assert_eq!(
            doc.raw.headers,
            vec![PN.to_string(), KIND.to_string(), QTY.to_string()]
        );
        assert_eq!(doc.raw.rows.len(), 2);
        assert_eq!(doc.raw.rows[1].index, 1);
        assert_eq!(doc.raw.rows[1].key(KIND), "WIRE");
        assert_eq!(doc.raw.rows[1].key(QTY), "");
    }

    #[test]
    fn grid_without_header_contributes_nothing() {
        let headerless = grid(&[&["no keywords here"], &["x", "y"]]);
        let real = grid(&[&[PN], &["A-1"]]);
        let doc = build_document("book.xlsx", vec![headerless, real], true, &profile());
        assert_eq!(doc.raw.rows.len(), 1);
    }

    #[test]
    fn no_header_anywhere_yields_empty_success() {
        let g = grid(&[&["just", "data"], &["more", "data"]]);
        let doc = build_document("odd.csv", vec![g], true, &profile());
        assert!(!doc.is_error());
        assert!(doc.raw.is_empty());
    }

    #[test]
    fn banner_rows_dropped_when_enabled() {
        let g = grid(&[
            &[PN, QTY],
            &["A-1", "1"],
            &["Design", ""],
            &[PN, QTY],
            &["B-2", "3"],
        ]);
        let doc = build_document("export.xlsx", vec![g], true, &profile());
        let keys: Vec<String> = doc.raw.rows.iter().map(|r| r.key(PN)).collect();
        assert_eq!(keys, vec!["A-1", "B-2"]);
        // Indexes keep their pre-filter numbering.
        assert_eq!(doc.raw.rows[1].index, 3);
    }

    #[test]
    fn banner_rows_kept_when_disabled() {
        let g = grid(&[&[PN, QTY], &["Design", ""], &["A-1", "1"]]);
        let doc = build_document("page.html", vec![g], false, &profile());
        assert_eq!(doc.raw.rows.len(), 2);
    }

    #[test]
    fn untrimmed_header_names_are_preserved() {
        let padded = format!(" {PN} ");
        let g = grid(&[&[padded.as_str(), QTY], &["A-1", "2"]]);
        let doc = build_document("left.csv", vec![g], true, &profile());
        // The padded name is kept verbatim and therefore does not reorder.
        assert_eq!(doc.raw.headers, vec![padded.clone(), QTY.to_string()]);
        assert_eq!(doc.raw.rows[0].key(&padded), "A-1");
    }
}
