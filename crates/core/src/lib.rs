//! `bomdiff-core`: canonical BOM table model.
//!
//! Pure data crate: tables, rows, documents, the classification enum, key and
//! quantity normalization, natural ordering, and the column profile.
//! No IO dependencies.

pub mod error;
pub mod model;
pub mod natural;
pub mod normalize;
pub mod profile;

pub use error::ProfileError;
pub use model::{BomDocument, BomRow, BomTable, CellValue, Classification, DocStatus, TableMeta};
pub use natural::natural_cmp;
pub use profile::ColumnProfile;
