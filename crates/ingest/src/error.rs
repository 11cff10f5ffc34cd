use crate::dispatch::SourceFormat;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Internal decode failures. Public ingest operations convert these into
/// error-status documents; the type itself only crosses crate boundaries
/// through the document's error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    Decode { format: SourceFormat, message: String },
    Io { message: String },
}

impl IngestError {
    pub fn decode(format: SourceFormat, message: impl Into<String>) -> Self {
        Self::Decode {
            format,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode { format, message } => {
                write!(f, "cannot decode {format} source: {message}")
            }
            Self::Io { message } => write!(f, "cannot read source: {message}"),
        }
    }
}

impl std::error::Error for IngestError {}
