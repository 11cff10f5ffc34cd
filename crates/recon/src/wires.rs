//! Wire-length differencing.
//!
//! Read-only report over two cleaned tables: rows whose type is in the
//! wire-type set, listed per side with the part's own quantity and the other
//! side's quantity (0 when absent). Feeds the export summary and the CLI
//! report, never classification.

use std::collections::HashMap;

use bomdiff_core::normalize::to_number;
use bomdiff_core::{natural_cmp, BomDocument, BomRow, CellValue, ColumnProfile};
use serde::Serialize;

/// One wire part as seen from its own side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireRow {
    pub part_number: String,
    pub kind: String,
    pub own_qty: f64,
    pub other_qty: f64,
}

impl WireRow {
    pub fn difference(&self) -> f64 {
        self.own_qty - self.other_qty
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WireReport {
    pub left: Vec<WireRow>,
    pub right: Vec<WireRow>,
}

/// Build both per-side wire listings, naturally sorted by part number.
pub fn wire_differences(
    left: &BomDocument,
    right: &BomDocument,
    profile: &ColumnProfile,
) -> WireReport {
    let left_qty = wire_quantities(&left.cleaned.rows, profile);
    let right_qty = wire_quantities(&right.cleaned.rows, profile);

    WireReport {
        left: side_listing(&left.cleaned.rows, &right_qty, profile),
        right: side_listing(&right.cleaned.rows, &left_qty, profile),
    }
}

/// Type value for the wire filter: the configured type column, else a
/// literal `TYPE` column some exports use. Trimmed, exact-match against the
/// wire-type set.
fn wire_kind(row: &BomRow, profile: &ColumnProfile) -> Option<String> {
    let raw = match row.get(&profile.kind) {
        Some(v) => v.text().into_owned(),
        None => row.text("TYPE"),
    };
    let kind = raw.trim().to_string();
    if profile.is_wire_type(&kind) {
        Some(kind)
    } else {
        None
    }
}

fn wire_quantities(rows: &[BomRow], profile: &ColumnProfile) -> HashMap<String, f64> {
    let mut map = HashMap::new();
    for row in rows {
        if wire_kind(row, profile).is_none() {
            continue;
        }
        let pn = row.key(&profile.part_number);
        if pn.is_empty() {
            continue;
        }
        let qty = to_number(row.get(&profile.quantity).unwrap_or(&CellValue::Empty));
        map.insert(pn, qty);
    }
    map
}

fn side_listing(
    rows: &[BomRow],
    other: &HashMap<String, f64>,
    profile: &ColumnProfile,
) -> Vec<WireRow> {
    let mut listing: Vec<WireRow> = rows
        .iter()
        .filter_map(|row| {
            let kind = wire_kind(row, profile)?;
            let pn = row.key(&profile.part_number);
            if pn.is_empty() {
                return None;
            }
            let own_qty = to_number(row.get(&profile.quantity).unwrap_or(&CellValue::Empty));
            let other_qty = other.get(&pn).copied().unwrap_or(0.0);
            Some(WireRow {
                part_number: pn,
                kind,
                own_qty,
                other_qty,
            })
        })
        .collect();
    listing.sort_by(|a, b| natural_cmp(&a.part_number, &b.part_number));
    listing
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
