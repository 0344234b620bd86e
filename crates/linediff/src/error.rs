//! Error types for the linediff facade.

use linediff_algo::DiffError;
use linediff_patch::PatchError;
use linediff_unified::UnifiedDiffError;

/// Errors returned by the facade functions.
#[derive(Debug, thiserror::Error)]
pub enum LinediffError {
    #[error("diff error: {0}")]
    Diff(#[from] DiffError),

    #[error("patch error: {0}")]
    Patch(#[from] PatchError),

    #[error("unified diff error: {0}")]
    Unified(#[from] UnifiedDiffError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias for facade results.
pub type LinediffResult<T> = Result<T, LinediffError>;
