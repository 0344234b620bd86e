//! Line-oriented diffing and patching.
//!
//! Computes minimal edit scripts between sequences, turns them into patches
//! that can be applied (exactly or fuzzily) and undone, and reads and writes
//! them in the unified diff format. This crate is the entry point; the
//! engines, the patch model and the unified diff support live in
//! `linediff-algo`, `linediff-patch` and `linediff-unified`.
//!
//! # Key Types
//!
//! - [`DiffOptions`] / [`Algorithm`] -- Engine selection and diff settings
//! - [`Patch`] -- The result of a diff, applicable to sequences
//! - [`UnifiedDiff`] -- A parsed unified diff document
//! - [`LinediffError`] -- Error type of the facade functions

pub mod error;
pub mod fs;
pub mod ops;
pub mod options;

pub use error::{LinediffError, LinediffResult};
pub use fs::{read_lines, write_lines};
pub use ops::{
    diff, diff_inline, diff_text, diff_with, diff_with_algorithm, patch, patch_fuzzy, unpatch,
};
pub use options::{Algorithm, DiffOptions};

pub use linediff_algo::{
    Change, DeltaType, DiffAlgorithm, DiffProgress, MyersDiff, MyersDiffWithLinearSpace,
    SimilarDiff,
};
pub use linediff_patch::{
    Chunk, ConflictMarkers, ConflictPolicy, Delta, FailOnConflict, Patch, VerifyChunk,
};
pub use linediff_unified::{
    generate_unified_diff, parse_unified_diff, UnifiedDiff, UnifiedDiffFile, UnifiedDiffReader,
    UnifiedDiffWriter, WriterConfig,
};
