//! Unified diff support for linediff.
//!
//! Reads and writes the unified diff format as produced by `diff -u` and
//! `git diff`/`git format-patch`, including git extended headers, binary
//! markers and multi-file documents.
//!
//! # Key Types
//!
//! - [`UnifiedDiff`] / [`UnifiedDiffFile`] -- A parsed document and its file entries
//! - [`UnifiedDiffReader`] -- Parses text into a [`UnifiedDiff`]
//! - [`UnifiedDiffWriter`] / [`WriterConfig`] -- Renders a [`UnifiedDiff`] back to text
//! - [`generate_unified_diff`] / [`parse_unified_diff`] -- Single-file helpers working on lines

pub mod document;
pub mod error;
pub mod reader;
pub mod utils;
pub mod writer;

pub use document::{BinaryChange, UnifiedDiff, UnifiedDiffFile};
pub use error::{UnifiedDiffError, UnifiedDiffResult};
pub use reader::{HunkHeader, UnifiedDiffReader, DEV_NULL, NO_NEWLINE_MARKER};
pub use utils::{generate_unified_diff, parse_unified_diff};
pub use writer::{UnifiedDiffWriter, WriterConfig};
