//! Workbook rendering: plain sheets, classification-coloured sheets, the
//! comparison summary sheet and the raw-table audit sheet.

use bomdiff_core::{natural_cmp, BomDocument, BomRow, BomTable, CellValue, ColumnProfile};
use bomdiff_recon::{comparison_stats, wire_differences, WireReport, WireRow};
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};

use crate::error::ExportError;
use crate::names::SheetNamer;
use crate::style;

// Summary sheet anchors (0-based columns C, H, M).
const LEFT_BLOCK_COL: u16 = 2;
const RIGHT_BLOCK_COL: u16 = 7;
const WIRE_BLOCK_COL: u16 = 12;

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// One plain sheet: the document's cleaned table, no fills.
pub fn export_single(doc: &BomDocument) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let mut namer = SheetNamer::new();
    add_plain_sheet(&mut workbook, &mut namer, doc)?;
    save(workbook)
}

/// Cleaned sheet plus the raw table, merged-away rows highlighted. Shows
/// where aggregation folded duplicate keys together.
pub fn export_audit(doc: &BomDocument) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let mut namer = SheetNamer::new();
    add_plain_sheet(&mut workbook, &mut namer, doc)?;
    let sheet = named_sheet(&mut workbook, &mut namer, &format!("{} (raw)", doc.name))?;
    write_raw_audit(sheet, &doc.raw)?;
    save(workbook)
}

/// Two documents side by side. Reconciled input (any row classified on
/// either side) gets coloured sheets plus the summary; otherwise two plain
/// sheets.
pub fn export_pair(
    left: &BomDocument,
    right: &BomDocument,
    profile: &ColumnProfile,
) -> Result<Vec<u8>, ExportError> {
    let reconciled = is_reconciled(left) || is_reconciled(right);
    let mut workbook = Workbook::new();
    let mut namer = SheetNamer::new();

    if reconciled {
        let wires = wire_differences(left, right, profile);
        for doc in [left, right] {
            let sheet = named_sheet(&mut workbook, &mut namer, &doc.name)?;
            write_coloured_sheet(sheet, &doc.cleaned, profile)?;
        }
        let sheet = named_sheet(&mut workbook, &mut namer, style::SUMMARY_SHEET_NAME)?;
        write_summary_sheet(sheet, left, right, &wires, profile)?;
    } else {
        log::debug!("no classifications present, writing plain sheets");
        add_plain_sheet(&mut workbook, &mut namer, left)?;
        add_plain_sheet(&mut workbook, &mut namer, right)?;
    }
    save(workbook)
}

fn is_reconciled(doc: &BomDocument) -> bool {
    doc.cleaned.rows.iter().any(|r| r.classification.is_set())
}

fn save(mut workbook: Workbook) -> Result<Vec<u8>, ExportError> {
    Ok(workbook.save_to_buffer()?)
}

fn named_sheet<'a>(
    workbook: &'a mut Workbook,
    namer: &mut SheetNamer,
    raw_name: &str,
) -> Result<&'a mut Worksheet, ExportError> {
    let name = namer.assign(raw_name);
    let sheet = workbook.add_worksheet();
    sheet.set_name(&name)?;
    Ok(sheet)
}

fn add_plain_sheet(
    workbook: &mut Workbook,
    namer: &mut SheetNamer,
    doc: &BomDocument,
) -> Result<(), ExportError> {
    let sheet = named_sheet(workbook, namer, &doc.name)?;
    write_plain_sheet(sheet, &doc.cleaned)
}

// ---------------------------------------------------------------------------
// Table sheets
// ---------------------------------------------------------------------------

fn write_plain_sheet(sheet: &mut Worksheet, table: &BomTable) -> Result<(), ExportError> {
    let border = style::bordered();
    let mut fit = ColumnFit::default();

    write_header_row(sheet, &table.headers, &border, &mut fit)?;
    for (r, row) in table.rows.iter().enumerate() {
        write_data_row(sheet, (r + 1) as u32, row, &table.headers, &border, &mut fit)?;
    }
    finish_table(sheet, table.rows.len(), table.headers.len(), fit)
}

fn write_raw_audit(sheet: &mut Worksheet, table: &BomTable) -> Result<(), ExportError> {
    let border = style::bordered();
    let merged = style::filled(style::MERGED_AWAY_FILL);
    let mut fit = ColumnFit::default();

    write_header_row(sheet, &table.headers, &border, &mut fit)?;
    for (r, row) in table.rows.iter().enumerate() {
        let format = if row.merged_away { &merged } else { &border };
        write_data_row(sheet, (r + 1) as u32, row, &table.headers, format, &mut fit)?;
    }
    finish_table(sheet, table.rows.len(), table.headers.len(), fit)
}

/// Headers plus the appended compare-tag column; rows sorted by
/// classification priority then natural key, each row striped with its
/// classification colour.
fn write_coloured_sheet(
    sheet: &mut Worksheet,
    table: &BomTable,
    profile: &ColumnProfile,
) -> Result<(), ExportError> {
    let border = style::bordered();
    let mut fit = ColumnFit::default();

    write_header_row(sheet, &table.headers, &border, &mut fit)?;
    let tag_col = table.headers.len() as u16;
    fit.note(tag_col, &profile.compare_tag);
    sheet.write_string_with_format(0, tag_col, &profile.compare_tag, &border)?;

    for (r, row) in sorted_rows(table, profile).into_iter().enumerate() {
        let format = row_format(row, &border);
        let excel_row = (r + 1) as u32;
        write_data_row(sheet, excel_row, row, &table.headers, &format, &mut fit)?;

        let tag = style::classification_tag(row.classification);
        if tag.is_empty() {
            sheet.write_blank(excel_row, tag_col, &format)?;
        } else {
            fit.note(tag_col, tag);
            sheet.write_string_with_format(excel_row, tag_col, tag, &format)?;
        }
    }
    finish_table(sheet, table.rows.len(), table.headers.len() + 1, fit)
}

fn write_header_row(
    sheet: &mut Worksheet,
    headers: &[String],
    format: &Format,
    fit: &mut ColumnFit,
) -> Result<(), ExportError> {
    for (col, header) in headers.iter().enumerate() {
        fit.note(col as u16, header);
        sheet.write_string_with_format(0, col as u16, header, format)?;
    }
    Ok(())
}

fn write_data_row(
    sheet: &mut Worksheet,
    excel_row: u32,
    row: &BomRow,
    headers: &[String],
    format: &Format,
    fit: &mut ColumnFit,
) -> Result<(), ExportError> {
    for (col, header) in headers.iter().enumerate() {
        let value = row.get(header).unwrap_or(&CellValue::Empty);
        write_cell(sheet, excel_row, col as u16, value, format, fit)?;
    }
    Ok(())
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    format: &Format,
    fit: &mut ColumnFit,
) -> Result<(), ExportError> {
    match value {
        CellValue::Number(n) => {
            fit.note(col, &value.text());
            sheet.write_number_with_format(row, col, *n, format)?;
        }
        CellValue::Text(s) if !s.is_empty() => {
            fit.note(col, s);
            sheet.write_string_with_format(row, col, s, format)?;
        }
        // Blank cells still get the row's border and fill.
        _ => {
            sheet.write_blank(row, col, format)?;
        }
    }
    Ok(())
}

fn finish_table(
    sheet: &mut Worksheet,
    rows: usize,
    cols: usize,
    fit: ColumnFit,
) -> Result<(), ExportError> {
    if cols > 0 {
        sheet.autofilter(0, 0, rows as u32, (cols - 1) as u16)?;
    }
    fit.apply(sheet)
}

fn row_format(row: &BomRow, border: &Format) -> Format {
    match style::classification_fill(row.classification) {
        Some(color) => style::filled(color),
        None => border.clone(),
    }
}

/// Classification priority, then natural part-number order. Stable, so
/// equal rows keep their cleaned-table order.
fn sorted_rows<'a>(table: &'a BomTable, profile: &ColumnProfile) -> Vec<&'a BomRow> {
    let mut rows: Vec<&BomRow> = table.rows.iter().collect();
    rows.sort_by(|a, b| {
        a.classification
            .priority()
            .cmp(&b.classification.priority())
            .then_with(|| natural_cmp(&a.key(&profile.part_number), &b.key(&profile.part_number)))
    });
    rows
}

// ---------------------------------------------------------------------------
// Summary sheet
// ---------------------------------------------------------------------------

fn write_summary_sheet(
    sheet: &mut Worksheet,
    left: &BomDocument,
    right: &BomDocument,
    wires: &WireReport,
    profile: &ColumnProfile,
) -> Result<(), ExportError> {
    let mut fit = ColumnFit::default();

    write_legend(sheet, &mut fit)?;
    write_side_block(sheet, left, LEFT_BLOCK_COL, profile, &mut fit)?;
    write_side_block(sheet, right, RIGHT_BLOCK_COL, profile, &mut fit)?;

    let left_end = write_wire_block(sheet, 0, style::WIRE_TITLE_LEFT, &wires.left, &mut fit)?;
    write_wire_block(sheet, left_end + 2, style::WIRE_TITLE_RIGHT, &wires.right, &mut fit)?;

    fit.apply(sheet)
}

fn write_legend(sheet: &mut Worksheet, fit: &mut ColumnFit) -> Result<(), ExportError> {
    fit.note(0, style::LEGEND_TITLE);
    sheet.write_string_with_format(
        0,
        0,
        style::LEGEND_TITLE,
        &style::filled(style::LEGEND_TITLE_GRAY),
    )?;
    for (i, (text, classification)) in style::LEGEND_ENTRIES.iter().enumerate() {
        let format = match style::classification_fill(*classification) {
            Some(color) => style::filled(color),
            None => style::bordered(),
        };
        fit.note(0, text);
        sheet.write_string_with_format((i + 2) as u32, 0, *text, &format)?;
    }
    Ok(())
}

/// One side of the comparison: document name, classification counts, then
/// the key columns of every row, striped by classification.
fn write_side_block(
    sheet: &mut Worksheet,
    doc: &BomDocument,
    anchor: u16,
    profile: &ColumnProfile,
    fit: &mut ColumnFit,
) -> Result<(), ExportError> {
    let border = style::bordered();

    fit.note(anchor, &doc.name);
    sheet.write_string_with_format(0, anchor, &doc.name, &style::filled(style::HEADER_GRAY))?;

    let stats = comparison_stats(&doc.cleaned);
    let counts: [(usize, Color); 4] = [
        (stats.not_found, style::NOT_FOUND_FILL),
        (stats.quantity_mismatch, style::QUANTITY_MISMATCH_FILL),
        (stats.cross_matched, style::CROSS_MATCHED_FILL),
        (stats.quantity_match, style::QUANTITY_MATCH_FILL),
    ];
    for (i, (count, color)) in counts.into_iter().enumerate() {
        sheet.write_number_with_format(1, anchor + i as u16, count as f64, &style::filled(color))?;
    }

    let view = profile.priority_columns();
    for (i, header) in view.iter().enumerate() {
        fit.note(anchor + i as u16, header);
        sheet.write_string_with_format(2, anchor + i as u16, *header, &border)?;
    }

    for (r, row) in sorted_rows(&doc.cleaned, profile).into_iter().enumerate() {
        let format = row_format(row, &border);
        for (i, header) in view.iter().enumerate() {
            let value = row.get(header).unwrap_or(&CellValue::Empty);
            write_cell(sheet, (r + 3) as u32, anchor + i as u16, value, &format, fit)?;
        }
    }
    Ok(())
}

/// One wire-difference block; returns the row of its last written cell so
/// the next block can be placed beneath it.
fn write_wire_block(
    sheet: &mut Worksheet,
    title_row: u32,
    title: &str,
    rows: &[WireRow],
    fit: &mut ColumnFit,
) -> Result<u32, ExportError> {
    let border = style::bordered();

    fit.note(WIRE_BLOCK_COL, title);
    sheet.write_string_with_format(title_row, WIRE_BLOCK_COL, title, &border)?;

    let header_row = title_row + 2;
    for (i, header) in style::WIRE_HEADERS.iter().enumerate() {
        fit.note(WIRE_BLOCK_COL + i as u16, header);
        sheet.write_string_with_format(header_row, WIRE_BLOCK_COL + i as u16, *header, &border)?;
    }

    let mut last = header_row;
    for (r, wire) in rows.iter().enumerate() {
        let excel_row = header_row + 1 + r as u32;
        fit.note(WIRE_BLOCK_COL, &wire.part_number);
        sheet.write_string_with_format(excel_row, WIRE_BLOCK_COL, &wire.part_number, &border)?;
        fit.note(WIRE_BLOCK_COL + 1, &wire.kind);
        sheet.write_string_with_format(excel_row, WIRE_BLOCK_COL + 1, &wire.kind, &border)?;
        sheet.write_number_with_format(excel_row, WIRE_BLOCK_COL + 2, wire.own_qty, &border)?;
        sheet.write_number_with_format(excel_row, WIRE_BLOCK_COL + 3, wire.other_qty, &border)?;

        // Longer than the other side fills green, shorter fills red.
        let diff = wire.difference();
        let diff_format = if diff > 0.0 {
            style::filled(style::QUANTITY_MATCH_FILL)
        } else if diff < 0.0 {
            style::filled(style::NOT_FOUND_FILL)
        } else {
            border.clone()
        };
        sheet.write_number_with_format(excel_row, WIRE_BLOCK_COL + 4, diff, &diff_format)?;
        last = excel_row;
    }
    Ok(last)
}

// ---------------------------------------------------------------------------
// Column widths
// ---------------------------------------------------------------------------

/// Tracks the widest display text per column, applied as clamped widths.
#[derive(Default)]
struct ColumnFit {
    widths: Vec<usize>,
}

impl ColumnFit {
    fn note(&mut self, col: u16, text: &str) {
        let col = col as usize;
        if self.widths.len() <= col {
            self.widths.resize(col + 1, 0);
        }
        self.widths[col] = self.widths[col].max(text.chars().count());
    }

    fn apply(self, sheet: &mut Worksheet) -> Result<(), ExportError> {
        for (col, width) in self.widths.into_iter().enumerate() {
            if width == 0 {
                continue;
            }
            let clamped = (width + 2).clamp(10, 40);
            sheet.set_column_width(col as u16, clamped as f64)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
