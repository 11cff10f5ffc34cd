//! XLSX/XLS ingestion via calamine, from in-memory bytes.

use std::io::{Cursor, Read, Seek};

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets, Xls, Xlsx};

use bomdiff_core::CellValue;

use crate::dispatch::SourceFormat;
use crate::error::IngestError;
use crate::grid::Grid;

pub fn read_xlsx_grids(bytes: &[u8]) -> Result<Vec<Grid>, IngestError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| IngestError::decode(SourceFormat::Xlsx, e.to_string()))?;
    read_sheet_grids(&mut workbook, SourceFormat::Xlsx)
}

pub fn read_xls_grids(bytes: &[u8]) -> Result<Vec<Grid>, IngestError> {
    let mut workbook: Xls<_> = Xls::new(Cursor::new(bytes))
        .map_err(|e| IngestError::decode(SourceFormat::Xls, e.to_string()))?;
    read_sheet_grids(&mut workbook, SourceFormat::Xls)
}

/// Container-agnostic reader for sniffed sources, so a mislabeled workbook
/// (XLS bytes behind a ZIP signature check and the reverse) still opens.
pub fn read_auto_grids(bytes: &[u8], format: SourceFormat) -> Result<Vec<Grid>, IngestError> {
    let mut workbook: Sheets<_> = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| IngestError::decode(format, e.to_string()))?;
    read_sheet_grids(&mut workbook, format)
}

/// One grid per worksheet, in workbook order.
fn read_sheet_grids<RS, R>(workbook: &mut R, format: SourceFormat) -> Result<Vec<Grid>, IngestError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut grids = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| IngestError::decode(format, format!("sheet '{sheet_name}': {e}")))?;
        grids.push(range_to_grid(&range));
    }
    Ok(grids)
}

/// Re-pad the used range back to absolute coordinates. Header detection
/// looks at the first column, so a sheet whose data starts at B3 must still
/// present empty leading rows and columns.
fn range_to_grid(range: &Range<Data>) -> Grid {
    let Some((start_row, start_col)) = range.start() else {
        return Grid::new();
    };
    let mut grid: Grid = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells: Vec<CellValue> = Vec::with_capacity(start_col as usize + row.len());
        cells.resize(start_col as usize, CellValue::Empty);
        cells.extend(row.iter().map(cell_value));
        grid.push(cells);
    }
    grid
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        // Booleans keep their display text.
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // Formula errors, dates and durations carry no comparable value.
        Data::Error(_) | Data::DateTime(_) | Data::DateTimeIso(_) | Data::DurationIso(_) => {
            CellValue::Empty
        }
    }
}
