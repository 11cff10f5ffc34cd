use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::normalize::format_number;

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A single table cell. Sources hand us text or a number; anything rich
/// (dates, formula error cells, embedded objects) has already been dropped to
/// `Empty` at the ingest boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    #[default]
    Empty,
}

impl CellValue {
    /// Display form: numbers print without a trailing `.0` when integral,
    /// `Empty` is the empty string.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::Number(n) => Cow::Owned(format_number(*n)),
            Self::Empty => Cow::Borrowed(""),
        }
    }

    /// True when the cell carries nothing visible (empty or whitespace-only).
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
            Self::Empty => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Per-row outcome of comparing one table against the other side.
///
/// The ordering priority is part of the data contract (export sorts by it);
/// colours and legend texts are not, those live in the export crate only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    #[default]
    Unclassified,
    /// Primary key absent from the other side.
    NotFound,
    /// No primary-key hit, but the supplier part number matches an
    /// also-not-found row on the other side.
    CrossMatched,
    /// Primary key found, quantities differ.
    QuantityMismatch,
    /// Primary key found, quantities equal.
    QuantityMatch,
}

impl Classification {
    /// Sort rank: most severe first, unclassified last.
    pub fn priority(self) -> u8 {
        match self {
            Self::NotFound => 0,
            Self::CrossMatched => 1,
            Self::QuantityMismatch => 2,
            Self::QuantityMatch => 3,
            Self::Unclassified => 4,
        }
    }

    pub fn is_set(self) -> bool {
        self != Self::Unclassified
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unclassified => write!(f, "unclassified"),
            Self::NotFound => write!(f, "not_found"),
            Self::CrossMatched => write!(f, "cross_matched"),
            Self::QuantityMismatch => write!(f, "quantity_mismatch"),
            Self::QuantityMatch => write!(f, "quantity_match"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rows + tables
// ---------------------------------------------------------------------------

/// One data row. `data` keys are always a subset of the owning table's
/// headers. `merged_away` is meaningful only on pre-aggregation (raw) tables.
#[derive(Debug, Clone, Serialize)]
pub struct BomRow {
    pub data: HashMap<String, CellValue>,
    pub classification: Classification,
    pub index: usize,
    pub merged_away: bool,
}

impl BomRow {
    pub fn new(data: HashMap<String, CellValue>, index: usize) -> Self {
        Self {
            data,
            classification: Classification::Unclassified,
            index,
            merged_away: false,
        }
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.data.get(header)
    }

    /// Display text of a cell, empty string for absent columns.
    pub fn text(&self, header: &str) -> String {
        self.data
            .get(header)
            .map(|v| v.text().into_owned())
            .unwrap_or_default()
    }

    /// Trimmed display text, the form used for key lookups.
    pub fn key(&self, header: &str) -> String {
        self.text(header).trim().to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableMeta {
    pub row_count: usize,
    pub column_count: usize,
    pub imported_at: DateTime<Utc>,
}

/// Canonical table: ordered unique headers plus rows keyed by header name.
/// Header order is significant, it drives export column order.
#[derive(Debug, Clone, Serialize)]
pub struct BomTable {
    pub headers: Vec<String>,
    pub rows: Vec<BomRow>,
    pub meta: TableMeta,
}

impl BomTable {
    pub fn new(headers: Vec<String>, rows: Vec<BomRow>) -> Self {
        let meta = TableMeta {
            row_count: rows.len(),
            column_count: headers.len(),
            imported_at: Utc::now(),
        };
        Self { headers, rows, meta }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocStatus {
    Success,
    Error,
}

/// One imported BOM source. `raw` is the as-ingested table (annotated with
/// `merged_away` marks after cleaning, content never altered); `cleaned`
/// starts out identical to `raw` and is replaced by the aggregator's output.
#[derive(Debug, Clone, Serialize)]
pub struct BomDocument {
    pub name: String,
    pub status: DocStatus,
    pub error: String,
    pub raw: BomTable,
    pub cleaned: BomTable,
}

impl BomDocument {
    /// Freshly ingested document: cleaning has not run, both tables match.
    pub fn success(name: impl Into<String>, table: BomTable) -> Self {
        Self {
            name: name.into(),
            status: DocStatus::Success,
            error: String::new(),
            raw: table.clone(),
            cleaned: table,
        }
    }

    /// Decode failure captured as a value; ingestion never raises past its
    /// boundary.
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DocStatus::Error,
            error: message.into(),
            raw: BomTable::empty(),
            cleaned: BomTable::empty(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == DocStatus::Error
    }

    pub fn row_count(&self) -> usize {
        self.cleaned.rows.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
