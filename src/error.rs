//! Error types for the BLAS to AI Engine code generator

use thiserror::Error;

/// Result type for generation operations
pub type CodegenResult<T> = Result<T, CodegenError>;

/// Generation errors. All are fatal: the run aborts with a single
/// diagnostic and no partial-success mode.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("kernel {index}: {message}")]
    Schema { index: usize, message: String },

    #[error("{message}")]
    TopLevel { message: String },

    #[error("{what} '{value}' is unknown in kernel {index}")]
    UnknownEnum {
        what: &'static str,
        value: String,
        index: usize,
    },

    #[error("already defined a connection for {kernel}.{parameter}")]
    DuplicateConnection { kernel: String, parameter: String },

    #[error("unknown kernel '{name}' referenced by {referrer}")]
    UnresolvedPeer { name: String, referrer: String },

    #[error("unsupported json type for option '{field}' in kernel {index}")]
    UnsupportedOptionType { field: String, index: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodegenError {
    pub fn schema(index: usize, message: impl Into<String>) -> Self {
        CodegenError::Schema {
            index,
            message: message.into(),
        }
    }

    pub fn top_level(message: impl Into<String>) -> Self {
        CodegenError::TopLevel {
            message: message.into(),
        }
    }

    pub fn unknown_enum(what: &'static str, value: impl Into<String>, index: usize) -> Self {
        CodegenError::UnknownEnum {
            what,
            value: value.into(),
            index,
        }
    }
}
