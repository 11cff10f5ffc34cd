//! Format detection and the public ingestion operations.
//!
//! Every operation returns a [`BomDocument`]; decode failures are folded
//! into an error-status document so a bad source never aborts a comparison
//! run.

use std::path::Path;

use bomdiff_core::{BomDocument, ColumnProfile};

use crate::error::IngestError;
use crate::grid::Grid;
use crate::{csv, excel, grid, html};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1];

/// Supported source container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Html,
    Xlsx,
    Xls,
    Csv,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SourceFormat::Html => "HTML",
            SourceFormat::Xlsx => "XLSX",
            SourceFormat::Xls => "XLS",
            SourceFormat::Csv => "CSV",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Read and ingest a file, detecting its format from the name and content.
pub fn ingest_path(path: &Path, profile: &ColumnProfile) -> BomDocument {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    match std::fs::read(path) {
        Ok(bytes) => ingest_auto(&name, &bytes, profile),
        Err(e) => {
            let err = IngestError::Io {
                message: format!("{}: {e}", path.display()),
            };
            log::warn!("{name}: {err}");
            BomDocument::failed(name, err.to_string())
        }
    }
}

/// Ingest in-memory bytes, detecting the format from the file extension
/// (`html`/`htm`, `xlsx`, `xls`, `csv`, case-insensitive) and falling back
/// to content sniffing.
pub fn ingest_auto(name: &str, bytes: &[u8], profile: &ColumnProfile) -> BomDocument {
    match extension_format(name) {
        Some(SourceFormat::Html) => ingest_html(name, bytes, profile),
        Some(SourceFormat::Xlsx) => ingest_xlsx(name, bytes, profile),
        Some(SourceFormat::Xls) => ingest_xls(name, bytes, profile),
        Some(SourceFormat::Csv) => ingest_csv(name, bytes, profile),
        None => {
            let format = sniff_format(bytes);
            log::debug!("{name}: no recognized extension, sniffed {format}");
            match format {
                SourceFormat::Html => ingest_html(name, bytes, profile),
                SourceFormat::Csv => ingest_csv(name, bytes, profile),
                // A sniffed workbook opens through the container-agnostic
                // reader in case the magic check mislabeled it.
                workbook => {
                    document_or_error(name, excel::read_auto_grids(bytes, workbook), true, profile)
                }
            }
        }
    }
}

pub fn ingest_html(name: &str, bytes: &[u8], profile: &ColumnProfile) -> BomDocument {
    let text = csv::decode_text(bytes);
    let grids = html::read_table_grids(&text);
    grid::build_document(name, grids, false, profile)
}

pub fn ingest_xlsx(name: &str, bytes: &[u8], profile: &ColumnProfile) -> BomDocument {
    document_or_error(name, excel::read_xlsx_grids(bytes), true, profile)
}

pub fn ingest_xls(name: &str, bytes: &[u8], profile: &ColumnProfile) -> BomDocument {
    document_or_error(name, excel::read_xls_grids(bytes), true, profile)
}

pub fn ingest_csv(name: &str, bytes: &[u8], profile: &ColumnProfile) -> BomDocument {
    let text = csv::decode_text(bytes);
    document_or_error(name, csv::read_grid(&text).map(|g| vec![g]), true, profile)
}

fn document_or_error(
    name: &str,
    grids: Result<Vec<Grid>, IngestError>,
    drop_banner_rows: bool,
    profile: &ColumnProfile,
) -> BomDocument {
    match grids {
        Ok(grids) => grid::build_document(name, grids, drop_banner_rows, profile),
        Err(e) => {
            log::warn!("{name}: {e}");
            BomDocument::failed(name, e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

fn extension_format(name: &str) -> Option<SourceFormat> {
    let (_, ext) = name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => Some(SourceFormat::Html),
        "xlsx" => Some(SourceFormat::Xlsx),
        "xls" => Some(SourceFormat::Xls),
        "csv" => Some(SourceFormat::Csv),
        _ => None,
    }
}

/// Content sniff: HTML markers in the leading text, then container magic,
/// then CSV as the catch-all.
fn sniff_format(bytes: &[u8]) -> SourceFormat {
    if looks_like_html(bytes) {
        return SourceFormat::Html;
    }
    if bytes.starts_with(ZIP_MAGIC) {
        return SourceFormat::Xlsx;
    }
    if bytes.starts_with(OLE_MAGIC) {
        return SourceFormat::Xls;
    }
    SourceFormat::Csv
}

fn looks_like_html(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };
    let head = text
        .trim()
        .chars()
        .take(200)
        .collect::<String>()
        .to_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html") || head.contains("<table")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
