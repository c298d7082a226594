//! Error taxonomy shared by every layer of the crate.

use thiserror::Error;

/// Errors raised while parsing paths, deriving specs or rewriting them.
#[derive(Debug, Error)]
pub enum Error {
    /// A path string could not be parsed.
    #[error("malformed path {path:?}: {reason}")]
    MalformedPath {
        /// The offending path string (or segment).
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A visited node is not a record, sequence or scalar the deriver understands.
    #[error("unsupported value at {path}: {reason}")]
    UnsupportedValue { path: String, reason: String },

    /// An attribute name not in the enumerated attribute set, or an
    /// attribute that the requested operation cannot use.
    #[error("invalid selector {name:?}: {reason}")]
    InvalidSelector { name: String, reason: &'static str },

    /// A path pattern failed to compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Two specs derived in one pass share an id.
    #[error("duplicate spec id {0}")]
    DuplicatePath(String),

    /// A directive owner's value cannot be written into the target attribute.
    #[error("cannot write {found} into attribute `{attr}` of {path}: expected {expected}")]
    IncompatibleValue {
        path: String,
        attr: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(path: impl Into<String>, reason: &'static str) -> Self {
        Error::MalformedPath {
            path: path.into(),
            reason,
        }
    }

    pub(crate) fn unsupported(path: impl ToString, reason: impl Into<String>) -> Self {
        Error::UnsupportedValue {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
