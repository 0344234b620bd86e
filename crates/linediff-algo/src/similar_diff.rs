//! Adapter running the `similar` crate's engines behind [`DiffAlgorithm`].
//!
//! `similar` compares elements by `Eq + Hash + Ord`, so custom equalizers
//! are not available here. Its Myers mode is minimal; its patience mode
//! favours readable output over minimality and may return a longer script.
//!
//! The ops `similar` returns are checked against both inputs before they are
//! turned into [`Change`]s. Ops that do not walk both sequences in order are
//! discarded and the input is diffed again with [`MyersDiff`].

use std::hash::Hash;

use similar::{Algorithm, DiffOp, DiffTag};
use tracing::{debug, warn};

use crate::algorithm::{DiffAlgorithm, DiffProgress};
use crate::change::{Change, DeltaType};
use crate::error::DiffResult;
use crate::myers::MyersDiff;

#[derive(Clone, Copy, Debug)]
pub struct SimilarDiff {
    algorithm: Algorithm,
}

impl SimilarDiff {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }

    pub fn myers() -> Self {
        Self::new(Algorithm::Myers)
    }

    pub fn patience() -> Self {
        Self::new(Algorithm::Patience)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl Default for SimilarDiff {
    fn default() -> Self {
        Self::myers()
    }
}

impl<T: Eq + Hash + Ord> DiffAlgorithm<T> for SimilarDiff {
    fn compute_diff(
        &self,
        source: &[T],
        target: &[T],
        mut progress: Option<&mut dyn DiffProgress>,
    ) -> DiffResult<Vec<Change>> {
        let max = source.len() + target.len();
        if let Some(p) = progress.as_mut() {
            p.diff_start();
            p.diff_step(0, max);
        }

        let ops = similar::capture_diff_slices(self.algorithm, source, target);
        let changes: Vec<Change> = if tiles(&ops, source, target) {
            ops.iter().filter_map(to_change).collect()
        } else {
            warn!(
                algorithm = ?self.algorithm,
                ops = ops.len(),
                "similar ops out of order, falling back to myers"
            );
            MyersDiff::<T>::new().compute_diff(source, target, None)?
        };

        debug!(
            algorithm = ?self.algorithm,
            ops = ops.len(),
            changes = changes.len(),
            "similar diff computed"
        );
        if let Some(p) = progress.as_mut() {
            p.diff_step(max, max);
            p.diff_end();
        }
        Ok(changes)
    }
}

fn to_change(op: &DiffOp) -> Option<Change> {
    let (tag, old, new) = op.as_tag_tuple();
    let delta_type = match (tag, old.is_empty(), new.is_empty()) {
        (DiffTag::Equal, _, _) | (_, true, true) => return None,
        (_, false, true) => DeltaType::Delete,
        (_, true, false) => DeltaType::Insert,
        (_, false, false) => DeltaType::Change,
    };
    Some(Change::new(delta_type, old.start, old.end, new.start, new.end))
}

/// Whether `ops` cover both sequences front to back without gaps, with equal
/// ranges that really are equal.
fn tiles<T: PartialEq>(ops: &[DiffOp], source: &[T], target: &[T]) -> bool {
    let (mut i, mut j) = (0, 0);
    for op in ops {
        let (tag, old, new) = op.as_tag_tuple();
        if old.start != i || new.start != j || old.end < old.start || new.end < new.start {
            return false;
        }
        if old.end > source.len() || new.end > target.len() {
            return false;
        }
        let shaped = match tag {
            DiffTag::Equal => source[old.clone()] == target[new.clone()],
            DiffTag::Delete => new.is_empty(),
            DiffTag::Insert => old.is_empty(),
            DiffTag::Replace => true,
        };
        if !shaped {
            return false;
        }
        i = old.end;
        j = new.end;
    }
    i == source.len() && j == target.len()
}
