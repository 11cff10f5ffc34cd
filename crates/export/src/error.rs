use std::fmt;

#[derive(Debug)]
pub enum ExportError {
    /// Workbook construction or serialization failure.
    Workbook(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workbook(msg) => write!(f, "workbook export error: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        Self::Workbook(e.to_string())
    }
}
