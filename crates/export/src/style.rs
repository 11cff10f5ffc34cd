//! Palette, tags and legend texts.
//!
//! The only module where a [`Classification`] maps to presentation: cell
//! fills, the per-row tag strings and the summary-sheet legend. The engine
//! crates never see these constants.

use bomdiff_core::Classification;
use rust_xlsxwriter::{Color, Format, FormatBorder};

pub const NOT_FOUND_FILL: Color = Color::RGB(0xFEF2F2);
pub const CROSS_MATCHED_FILL: Color = Color::RGB(0xFFF7ED);
pub const QUANTITY_MISMATCH_FILL: Color = Color::RGB(0xEFF6FF);
pub const QUANTITY_MATCH_FILL: Color = Color::RGB(0xF0FDF4);
/// Raw-table audit sheet: rows folded into another row by aggregation.
pub const MERGED_AWAY_FILL: Color = Color::RGB(0xF5F3FF);
pub const HEADER_GRAY: Color = Color::RGB(0xF5F5F5);
pub const LEGEND_TITLE_GRAY: Color = Color::RGB(0xF9FAFB);

pub const LEGEND_TITLE: &str = "图例";

/// Legend rows on the summary sheet, in display order.
pub const LEGEND_ENTRIES: [(&str, Classification); 4] = [
    ("零件号不存在", Classification::NotFound),
    ("虽无零件号，但供应商零件号匹配", Classification::CrossMatched),
    ("数量不同", Classification::QuantityMismatch),
    ("完全一致", Classification::QuantityMatch),
];

pub const SUMMARY_SHEET_NAME: &str = "对比结果";
pub const WIRE_TITLE_LEFT: &str = "导线长度差值（左表）";
pub const WIRE_TITLE_RIGHT: &str = "导线长度差值（右表）";
pub const WIRE_HEADERS: [&str; 5] = ["零件号", "类型", "本表数量", "对表数量", "差值"];

/// Fill for a classified row; unclassified rows stay unfilled.
pub fn classification_fill(classification: Classification) -> Option<Color> {
    match classification {
        Classification::NotFound => Some(NOT_FOUND_FILL),
        Classification::CrossMatched => Some(CROSS_MATCHED_FILL),
        Classification::QuantityMismatch => Some(QUANTITY_MISMATCH_FILL),
        Classification::QuantityMatch => Some(QUANTITY_MATCH_FILL),
        Classification::Unclassified => None,
    }
}

/// Tag text carried in the appended compare column.
pub fn classification_tag(classification: Classification) -> &'static str {
    match classification {
        Classification::NotFound => "未找到",
        Classification::CrossMatched => "供应商匹配",
        Classification::QuantityMismatch => "数量不同",
        Classification::QuantityMatch => "数量相同",
        Classification::Unclassified => "",
    }
}

/// Thin borders, the base for every written cell.
pub fn bordered() -> Format {
    Format::new().set_border(FormatBorder::Thin)
}

pub fn filled(color: Color) -> Format {
    bordered().set_background_color(color)
}
