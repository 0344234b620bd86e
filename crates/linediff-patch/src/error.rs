//! Error types for patch construction and application.

use crate::chunk::VerifyChunk;

/// Errors that can occur while building or applying a patch.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// A delta did not fit the sequence it was applied to.
    #[error("delta at position {position} does not apply: {verify}")]
    Conflict { verify: VerifyChunk, position: usize },

    /// Conflict markers cannot be placed past the end of the sequence.
    #[error("conflict at position {position} lies past the end of the result ({len} elements)")]
    ConflictOutOfRange { position: usize, len: usize },

    /// A delta or change does not satisfy the invariants of its kind.
    #[error("invalid delta: {0}")]
    InvalidDelta(String),
}

/// Convenience alias for patch results.
pub type PatchResult<T> = Result<T, PatchError>;
