//! Error types for unified diff reading and writing.

use linediff_patch::PatchError;

/// Errors that can occur while reading or writing unified diffs.
#[derive(Debug, thiserror::Error)]
pub enum UnifiedDiffError {
    /// A line inside a file header or hunk body matched no rule.
    #[error("line {line_number}: {reason}: {line:?}")]
    Parse {
        line_number: usize,
        line: String,
        reason: String,
    },

    /// The input ended before a hunk had all the lines its header declared.
    #[error("input ends inside the hunk starting at line {line_number}")]
    UnexpectedEof { line_number: usize },

    #[error("patch error: {0}")]
    Patch(#[from] PatchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for unified diff results.
pub type UnifiedDiffResult<T> = Result<T, UnifiedDiffError>;
