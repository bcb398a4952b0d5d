//! Error types for oca-core.
//!
//! Every fallible operation in the crate returns [`OcaResult`]. Securing is
//! all-or-nothing: any error aborts the whole call and no partially secured
//! bundle is returned.

use thiserror::Error;

/// Crate-wide result alias.
pub type OcaResult<T> = Result<T, OcaError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OcaError {
    /// The value cannot be rendered as canonical JSON.
    #[error("canonicalization error: {0}")]
    Canonicalization(String),

    /// A reserved field (`overlays`, `type`, `digest`, ...) is missing or has the wrong shape.
    #[error("structural error: {0}")]
    Structural(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl OcaError {
    pub fn canonicalization(msg: impl Into<String>) -> Self {
        Self::Canonicalization(msg.into())
    }

    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Stable short code, suitable for CLI output and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Canonicalization(_) => "canonicalization",
            Self::Structural(_) => "structural",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Serialization(_) => "serialization",
            Self::Invariant(_) => "invariant",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let e = OcaError::structural("missing overlays");
        assert_eq!(e.to_string(), "structural error: missing overlays");
        assert_eq!(e.code(), "structural");
    }
}
