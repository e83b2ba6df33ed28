//! Error types for dorina.

use std::io;
use thiserror::Error;

/// Kinds of named things a catalog lookup can fail to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Genome,
    Regulator,
    RegionFile,
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LookupKind::Genome => "genome",
            LookupKind::Regulator => "regulator",
            LookupKind::RegionFile => "region file",
        };
        write!(f, "{}", s)
    }
}

/// Error type for every fallible dorina operation.
#[derive(Error, Debug)]
pub enum DorinaError {
    /// The query itself is malformed (unknown region class, missing set B, ...).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A record or attribute text is missing a delimiter or holds a bad value.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Structurally valid text whose parts disagree (e.g. sublist lengths).
    #[error("Format error: {0}")]
    Format(String),

    /// A genome, regulator or region file name did not resolve.
    #[error("{kind} not found: {name}")]
    NotFound { kind: LookupKind, name: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Invalid description file: {0}")]
    Json(#[from] serde_json::Error),
}

impl DorinaError {
    pub fn not_found(kind: LookupKind, name: impl Into<String>) -> Self {
        DorinaError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// True for the configuration class of errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, DorinaError::Configuration(_))
    }
}

/// Result type alias for dorina operations.
pub type Result<T> = std::result::Result<T, DorinaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DorinaError::not_found(LookupKind::Genome, "hg00");
        assert_eq!(err.to_string(), "genome not found: hg00");
    }

    #[test]
    fn test_is_configuration() {
        assert!(DorinaError::Configuration("x".into()).is_configuration());
        assert!(!DorinaError::Parse("x".into()).is_configuration());
    }
}
