use std::fmt;

#[derive(Debug)]
pub enum ProfileError {
    /// TOML parse / deserialization error.
    Parse(String),
    /// Semantic validation error (empty column name, empty token set).
    Validation(String),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "profile parse error: {msg}"),
            Self::Validation(msg) => write!(f, "profile validation error: {msg}"),
        }
    }
}

impl std::error::Error for ProfileError {}
