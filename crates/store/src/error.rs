//! Storage error types.

use courseflow_core::{CodecError, CompileError};
use thiserror::Error;

/// Errors from content storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row matched the requested content.
    #[error("Content not found")]
    NotFound,

    /// The database contradicts an invariant (e.g. an id matched zero or
    /// multiple content rows during a two-phase update).
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// The caller's role does not permit the operation.
    #[error("Not authorized to modify content")]
    Unauthorized,

    /// Compilation of authored markup failed; nothing was persisted.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Stored bytes failed the transport codec.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}

impl StoreError {
    /// Message suitable for showing to an end user.
    ///
    /// Authorization failures pass through as-is so the UI can say why the
    /// action was refused; everything else collapses to a generic message
    /// that leaks no internals.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unauthorized => "You are not allowed to edit this content.",
            Self::Compile(_) => "Your content could not be compiled. Check the markup and try again.",
            _ => "Something went wrong while handling your content. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_keeps_its_own_message() {
        let msg = StoreError::Unauthorized.user_message();
        assert!(msg.contains("not allowed"));
    }

    #[test]
    fn internal_errors_collapse_to_generic_message() {
        let generic = StoreError::Integrity("id matched 2 rows".into()).user_message();
        assert_eq!(
            generic,
            StoreError::Migration("001".into()).user_message()
        );
        assert!(!generic.contains("Integrity"));
    }
}
