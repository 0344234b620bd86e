//! Error types for the edit-script engines.

/// Errors raised by a [`DiffAlgorithm`](crate::DiffAlgorithm).
///
/// Both variants signal a defect in the engine rather than a property of the
/// input: every pair of finite sequences has an edit script.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The path search terminated without reaching the bottom-right corner
    /// of the edit graph.
    #[error("could not find a diff path")]
    PathNotFound,

    /// The recorded path could not be turned into an edit script.
    #[error("bad diff path: {0}")]
    InvalidPath(String),
}

/// Convenience alias for engine results.
pub type DiffResult<T> = Result<T, DiffError>;
