//! Edit-script engines for linediff.
//!
//! An engine compares two sequences and returns the ordered list of
//! [`Change`]s that turns the first into the second. Elements are compared
//! through an equalizer, `PartialEq` by default.
//!
//! # Key Types
//!
//! - [`DiffAlgorithm`] / [`DiffProgress`] -- Engine interface and progress sink
//! - [`MyersDiff`] -- Greedy Myers search, memory proportional to the edit distance
//! - [`MyersDiffWithLinearSpace`] -- Middle-snake divide and conquer, O(N + M) memory
//! - [`SimilarDiff`] -- Engines from the `similar` crate (Myers, patience)
//! - [`Change`] / [`DeltaType`] -- One step of an edit script
//!
//! The `diff_step` values reported by the two Myers variants are not
//! comparable: the quadratic engine reports the current edit distance, the
//! linear engine an approximate size of the sub-problem being solved.

pub mod algorithm;
pub mod change;
pub mod error;
pub mod myers;
pub mod myers_linear;
pub mod sequence;
pub mod similar_diff;

pub use algorithm::{DiffAlgorithm, DiffProgress};
pub use change::{script_cost, Change, DeltaType};
pub use error::{DiffError, DiffResult};
pub use myers::MyersDiff;
pub use myers_linear::MyersDiffWithLinearSpace;
pub use sequence::{default_equals, ignore_whitespace, Sequences};
pub use similar_diff::SimilarDiff;
