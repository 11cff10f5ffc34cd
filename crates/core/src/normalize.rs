//! Key and quantity normalization shared by the whole pipeline.

use crate::model::CellValue;

/// Invisible characters that leak out of spreadsheet exports: zero-width
/// space/joiners, BOM marker, soft hyphen.
fn is_invisible(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}' | '\u{00AD}')
}

/// Key-column form: strip invisible characters, then every whitespace
/// character including non-breaking space. `" A B\u{00A0}C "` becomes `"ABC"`.
pub fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|&c| !is_invisible(c) && !c.is_whitespace())
        .collect()
}

/// Quantity parse: thousands separators and whitespace stripped, anything
/// unparsable or non-finite coerces to 0.
pub fn parse_quantity(s: &str) -> f64 {
    let compact: String = s.chars().filter(|&c| c != ',' && !c.is_whitespace()).collect();
    if compact.is_empty() {
        return 0.0;
    }
    match compact.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Numeric coercion for any cell value.
pub fn to_number(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) if n.is_finite() => *n,
        CellValue::Number(_) => 0.0,
        CellValue::Text(s) => parse_quantity(s),
        CellValue::Empty => 0.0,
    }
}

/// Number display: integral values print without a decimal point.
/// Beyond 1e15, f64 can't hold exact integers anyway, so fall back to the
/// default float formatting.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_strips_invisibles_and_whitespace() {
        assert_eq!(normalize_key("\u{FEFF}A\u{200B}B"), "AB");
        assert_eq!(normalize_key(" A 1\u{00A0}X\t"), "A1X");
        assert_eq!(normalize_key("soft\u{00AD}hyphen"), "softhyphen");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn parse_quantity_handles_separators() {
        assert_eq!(parse_quantity("1,234.5"), 1234.5);
        assert_eq!(parse_quantity(" 12 "), 12.0);
        assert_eq!(parse_quantity("1 000"), 1000.0);
        assert_eq!(parse_quantity(""), 0.0);
        assert_eq!(parse_quantity("abc"), 0.0);
        assert_eq!(parse_quantity("inf"), 0.0);
    }

    #[test]
    fn to_number_coerces_cells() {
        assert_eq!(to_number(&CellValue::Number(4.0)), 4.0);
        assert_eq!(to_number(&CellValue::Number(f64::NAN)), 0.0);
        assert_eq!(to_number(&CellValue::Text("2,000".into())), 2000.0);
        assert_eq!(to_number(&CellValue::Empty), 0.0);
    }

    #[test]
    fn format_number_drops_integral_fraction() {
        assert_eq!(format_number(7.0), "7");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.25), "2.25");
    }
}
