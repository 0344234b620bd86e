//! Patch model for linediff.
//!
//! Turns an engine's edit script into a [`Patch`] of typed [`Delta`]s that can
//! be applied to a sequence, undone, verified and serialized.
//!
//! # Key Types
//!
//! - [`Patch`] -- Sorted deltas plus the conflict policy used when applying
//! - [`Delta`] / [`Chunk`] -- One typed difference and the elements on each side
//! - [`VerifyChunk`] -- Outcome of checking a chunk against a sequence
//! - [`ConflictPolicy`] / [`FailOnConflict`] / [`ConflictMarkers`] -- Handling of deltas that do not fit

pub mod chunk;
pub mod conflict;
pub mod delta;
pub mod error;
pub mod patch;

pub use chunk::{Chunk, VerifyChunk};
pub use conflict::{
    ConflictMarkers, ConflictPolicy, FailOnConflict, CONFLICT_HEAD, CONFLICT_PATCH,
    CONFLICT_SEPARATOR,
};
pub use delta::Delta;
pub use error::{PatchError, PatchResult};
pub use patch::Patch;

#[cfg(test)]
mod tests {
    use super::*;
    use linediff_algo::{DiffAlgorithm, MyersDiff, MyersDiffWithLinearSpace};
    use proptest::prelude::*;

    fn words() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d"]), 0..20)
            .prop_map(|v| v.into_iter().map(String::from).collect())
    }

    proptest! {
        #[test]
        fn apply_then_restore_round_trips(a in words(), b in words()) {
            let changes = MyersDiff::new().compute_diff(&a, &b, None).unwrap();
            let patch = Patch::generate(&a, &b, &changes, false).unwrap();
            prop_assert_eq!(patch.apply_to(&a).unwrap(), b.clone());
            prop_assert_eq!(patch.restore(&b).unwrap(), a);
        }

        #[test]
        fn equal_parts_do_not_change_the_result(a in words(), b in words()) {
            let changes = MyersDiffWithLinearSpace::new().compute_diff(&a, &b, None).unwrap();
            let patch = Patch::generate(&a, &b, &changes, true).unwrap();
            let covered: usize = patch.deltas().iter().map(|d| d.source().size()).sum();
            prop_assert_eq!(covered, a.len());
            prop_assert_eq!(patch.apply_to(&a).unwrap(), b.clone());
            prop_assert_eq!(patch.restore(&b).unwrap(), a);
        }

        #[test]
        fn exact_patch_applies_fuzzily(a in words(), b in words()) {
            let changes = MyersDiff::new().compute_diff(&a, &b, None).unwrap();
            let patch = Patch::generate(&a, &b, &changes, false).unwrap();
            prop_assert_eq!(patch.apply_fuzzy(&a, 0).unwrap(), b);
        }
    }
}
