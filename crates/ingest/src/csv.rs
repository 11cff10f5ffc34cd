//! CSV ingestion and the shared text decoding chain.

use bomdiff_core::CellValue;

use crate::dispatch::SourceFormat;
use crate::error::IngestError;
use crate::grid::Grid;

/// Decode raw bytes as text: strict UTF-8 first, then Windows-1252
/// (common for Excel-exported CSVs). A leading UTF-8 BOM is stripped so the
/// first header name stays clean; UTF-16 inputs carry a BOM that the
/// fallback decoder recognizes.
pub fn decode_text(bytes: &[u8]) -> String {
    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes.to_vec()) {
        Ok(text) => match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        },
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, encoding, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            log::warn!("source is not UTF-8, decoded as {}", encoding.name());
            decoded.into_owned()
        }
    }
}

/// Detect the most likely field delimiter by checking consistency across the
/// first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line.
/// The delimiter that produces the most consistent field count (>1 field)
/// wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count.
        // Higher field count breaks ties between equally consistent delimiters.
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Parse decoded CSV text into a single grid. Rows may be ragged; the
/// reader is flexible and every field lands as a text cell.
pub fn read_grid(content: &str) -> Result<Grid, IngestError> {
    let delimiter = sniff_delimiter(content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Grid::new();
    for result in reader.records() {
        let record = result.map_err(|e| IngestError::decode(SourceFormat::Csv, e.to_string()))?;
        grid.push(record.iter().map(CellValue::from).collect());
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_semicolon_delimiter() {
        let content = "零件号;数量\nA-1;2\nB-2;3\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn sniffs_tab_over_comma() {
        let content = "a\tb\tc\n1\t2\t3\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn single_column_defaults_to_comma() {
        let content = "零件号\nA-1\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn quoted_fields_keep_embedded_delimiters() {
        let grid = read_grid("零件号,备注\n\"A-1\",\"left, right\"\n").unwrap();
        assert_eq!(grid[1][1], CellValue::from("left, right"));
    }

    #[test]
    fn ragged_rows_are_kept() {
        let grid = read_grid("a,b,c\n1,2\n").unwrap();
        assert_eq!(grid[0].len(), 3);
        assert_eq!(grid[1].len(), 2);
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let bytes = b"\xef\xbb\xbf\xe9\x9b\xb6\xe4\xbb\xb6\xe5\x8f\xb7,1";
        let text = decode_text(bytes);
        assert!(text.starts_with("零件号"));
    }

    #[test]
    fn windows_1252_falls_back() {
        // "café" with a Latin-1 e-acute, not valid UTF-8
        let bytes = b"caf\xe9,1";
        assert_eq!(decode_text(bytes), "café,1");
    }

    #[test]
    fn utf16le_bom_is_recognized() {
        // "a,b" as UTF-16LE with BOM
        let bytes = b"\xff\xfea\x00,\x00b\x00";
        assert_eq!(decode_text(bytes), "a,b");
    }
}
