//! bomdiff-export: styled XLSX workbook rendering.
//!
//! Turns ingested and reconciled documents into workbooks: plain table
//! sheets, classification-coloured sheets with an appended tag column, the
//! comparison summary sheet (legend, per-side counts and listings, wire
//! length differences) and the raw-table audit sheet. All colour mapping
//! lives here; the engine crates only ever see [`Classification`] values.
//!
//! [`Classification`]: bomdiff_core::Classification

pub mod error;
pub mod names;
pub mod style;
pub mod workbook;

pub use error::ExportError;
pub use names::output_file_name;
pub use workbook::{export_audit, export_pair, export_single};
