//! bomdiff-ingest: BOM source ingestion.
//!
//! Decodes heterogeneous spreadsheet exports (HTML tables, XLSX, legacy XLS,
//! CSV) into canonical `BomDocument`s. Every public ingest operation returns a
//! document: decode failures become `status = error` documents, never `Err` or
//! panics past this boundary.

pub mod csv;
pub mod dispatch;
pub mod error;
pub mod excel;
pub mod grid;
pub mod html;

pub use dispatch::{
    ingest_auto, ingest_csv, ingest_html, ingest_path, ingest_xls, ingest_xlsx, SourceFormat,
};
pub use error::IngestError;
