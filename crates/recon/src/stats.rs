//! Classification tallies for a reconciled table.

use bomdiff_core::{BomTable, Classification};
use serde::Serialize;

/// Row counts per classification over one cleaned, reconciled table.
/// `total` counts every row, including unclassified ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonStats {
    pub not_found: usize,
    pub cross_matched: usize,
    pub quantity_mismatch: usize,
    pub quantity_match: usize,
    pub total: usize,
}

pub fn comparison_stats(table: &BomTable) -> ComparisonStats {
    let mut stats = ComparisonStats {
        total: table.rows.len(),
        ..ComparisonStats::default()
    };
    for row in &table.rows {
        match row.classification {
            Classification::NotFound => stats.not_found += 1,
            Classification::CrossMatched => stats.cross_matched += 1,
            Classification::QuantityMismatch => stats.quantity_mismatch += 1,
            Classification::QuantityMatch => stats.quantity_match += 1,
            Classification::Unclassified => {}
        }
    }
    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bomdiff_core::BomRow;
    use std::collections::HashMap;

    fn classified_row(index: usize, classification: Classification) -> BomRow {
        let mut row = BomRow::new(HashMap::new(), index);
        row.classification = classification;
        row
    }

    #[test]
    fn tallies_every_classification() {
        let rows = vec![
            classified_row(0, Classification::QuantityMatch),
            classified_row(1, Classification::QuantityMatch),
            classified_row(2, Classification::QuantityMismatch),
            classified_row(3, Classification::CrossMatched),
            classified_row(4, Classification::NotFound),
            classified_row(5, Classification::Unclassified),
        ];
        let stats = comparison_stats(&BomTable::new(Vec::new(), rows));
        assert_eq!(
            stats,
            ComparisonStats {
                not_found: 1,
                cross_matched: 1,
                quantity_mismatch: 1,
                quantity_match: 2,
                total: 6,
            }
        );
    }

    #[test]
    fn empty_table_is_all_zeroes() {
        let stats = comparison_stats(&BomTable::empty());
        assert_eq!(stats, ComparisonStats::default());
    }
}
