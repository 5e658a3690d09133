use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that can occur while compiling authored markup.
///
/// A compile error means nothing may be persisted for the attempted save:
/// `source` and `compiled` are only ever written together.
#[derive(Debug, Error)]
pub enum CompileError {
    /// markdown-rs rejected the source outright.
    #[error("parse error at {location}: {message}")]
    Parse {
        /// Error message from the parser.
        message: String,
        /// Source location of the failure.
        location: SourceLocation,
    },
    /// The render program could not be serialized to a payload.
    #[error("payload serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors at the storage/transport byte boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Stored bytes are not valid UTF-8 and cannot cross the transport boundary.
    #[error("content is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 {
        /// Index of the first invalid byte.
        valid_up_to: usize,
    },
}
