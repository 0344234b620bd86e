//! The patch aggregate: an ordered list of deltas plus a conflict policy.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use linediff_algo::{Change, DeltaType};

use crate::chunk::{Chunk, VerifyChunk};
use crate::conflict::{ConflictPolicy, FailOnConflict};
use crate::delta::Delta;
use crate::error::{PatchError, PatchResult};

/// Deltas describing how to turn one sequence into another.
///
/// Deltas are kept sorted by source position; deltas at the same position
/// keep their insertion order. They must describe disjoint source ranges,
/// which is not checked.
#[derive(Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct Patch<T> {
    deltas: Vec<Delta<T>>,
    #[serde(skip, default = "default_policy")]
    conflict_policy: Arc<dyn ConflictPolicy<T>>,
}

fn default_policy<T>() -> Arc<dyn ConflictPolicy<T>> {
    Arc::new(FailOnConflict)
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self {
            deltas: Vec::new(),
            conflict_policy: default_policy(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Patch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patch")
            .field("deltas", &self.deltas)
            .finish_non_exhaustive()
    }
}

/// Patches compare by their deltas; the conflict policy is ignored.
impl<T: PartialEq> PartialEq for Patch<T> {
    fn eq(&self, other: &Self) -> bool {
        self.deltas == other.deltas
    }
}

impl<T> Patch<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the conflict policy used by [`apply_to`](Self::apply_to) and
    /// [`apply_fuzzy`](Self::apply_fuzzy).
    pub fn with_conflict_policy(mut self, policy: impl ConflictPolicy<T> + 'static) -> Self {
        self.conflict_policy = Arc::new(policy);
        self
    }

    pub fn set_conflict_policy(&mut self, policy: Arc<dyn ConflictPolicy<T>>) {
        self.conflict_policy = policy;
    }

    /// Insert a delta, keeping the list sorted by source position.
    pub fn add_delta(&mut self, delta: Delta<T>) {
        let position = delta.source().position();
        let at = self
            .deltas
            .partition_point(|d| d.source().position() <= position);
        self.deltas.insert(at, delta);
    }

    pub fn deltas(&self) -> &[Delta<T>] {
        &self.deltas
    }

    pub fn into_deltas(self) -> Vec<Delta<T>> {
        self.deltas
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// Number of deltas of the given kind.
    pub fn count(&self, delta_type: DeltaType) -> usize {
        self.deltas
            .iter()
            .filter(|d| d.delta_type() == delta_type)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

impl<T: Clone> Patch<T> {
    /// Build a patch from an engine's edit script.
    ///
    /// With `include_equal_parts`, the unchanged runs between (and after) the
    /// changes are added as [`Delta::Equal`], so the deltas cover both
    /// sequences completely.
    pub fn generate(
        original: &[T],
        revised: &[T],
        changes: &[Change],
        include_equal_parts: bool,
    ) -> PatchResult<Self> {
        let mut patch = Self::new();
        let mut start_original = 0;
        let mut start_revised = 0;

        let mut ordered = changes.to_vec();
        if include_equal_parts {
            ordered.sort_by_key(|c| c.start_original);
        }

        for change in &ordered {
            if include_equal_parts && start_original < change.start_original {
                patch.add_delta(Delta::equal(
                    chunk_of(original, start_original, change.start_original)?,
                    chunk_of(revised, start_revised, change.start_revised)?,
                )?);
            }

            let source = chunk_of(original, change.start_original, change.end_original)?;
            let target = chunk_of(revised, change.start_revised, change.end_revised)?;
            patch.add_delta(Delta::new(change.delta_type, source, target)?);

            start_original = change.end_original;
            start_revised = change.end_revised;
        }

        if include_equal_parts && start_original < original.len() {
            patch.add_delta(Delta::equal(
                chunk_of(original, start_original, original.len())?,
                chunk_of(revised, start_revised, revised.len())?,
            )?);
        }

        debug!(
            changes = changes.len(),
            deltas = patch.len(),
            include_equal_parts,
            "patch generated"
        );
        Ok(patch)
    }
}

fn chunk_of<T: Clone>(items: &[T], start: usize, end: usize) -> PatchResult<Chunk<T>> {
    let lines = items.get(start..end).ok_or_else(|| {
        PatchError::InvalidDelta(format!(
            "range {start}..{end} outside a sequence of {} elements",
            items.len()
        ))
    })?;
    Ok(Chunk::new(start, lines.to_vec()))
}

impl<T: Clone + PartialEq> Patch<T> {
    /// Apply the patch to a copy of `target`.
    ///
    /// Deltas are applied from the last to the first so that positions of
    /// the remaining deltas stay valid. A delta that does not verify is
    /// handed to the conflict policy.
    pub fn apply_to(&self, target: &[T]) -> PatchResult<Vec<T>> {
        let mut result = target.to_vec();
        for delta in self.deltas.iter().rev() {
            let verify = delta.verify_and_apply(&mut result);
            if verify != VerifyChunk::Ok {
                self.conflict_policy
                    .process_conflict(verify, delta, &mut result)?;
            }
        }
        debug!(
            deltas = self.deltas.len(),
            before = target.len(),
            after = result.len(),
            "patch applied"
        );
        Ok(result)
    }

    /// Turn a patched sequence back into the original one.
    pub fn restore(&self, target: &[T]) -> PatchResult<Vec<T>> {
        let mut result = target.to_vec();
        for delta in self.deltas.iter().rev() {
            delta.restore(&mut result)?;
        }
        debug!(
            deltas = self.deltas.len(),
            before = target.len(),
            after = result.len(),
            "patch restored"
        );
        Ok(result)
    }

    /// Apply the patch to a sequence that has drifted from the original.
    ///
    /// Deltas are placed front to back. Each one is first tried where the
    /// placement and size change of the previous delta predict it, then at
    /// increasing distances before and after that position, never overlapping
    /// the previously applied delta and never running past the end. If no
    /// placement fits exactly, the search repeats ignoring up to `max_fuzz`
    /// elements at each end of the delta; those ends are left as found.
    pub fn apply_fuzzy(&self, target: &[T], max_fuzz: usize) -> PatchResult<Vec<T>> {
        let mut result = target.to_vec();
        // Offset from original positions to positions in `result`.
        let mut shift: isize = 0;
        let mut previous_end: isize = 0;

        for delta in &self.deltas {
            let expected = delta.source().position() as isize + shift;
            let found = (0..=max_fuzz).find_map(|fuzz| {
                find_position(delta, &result, expected, previous_end, fuzz).map(|pos| (pos, fuzz))
            });

            match found {
                Some((position, fuzz)) => {
                    trace!(expected, position, fuzz, "fuzzy delta placed");
                    let growth = delta.apply_fuzzy_at(&mut result, fuzz, position);
                    shift = position - delta.source().position() as isize + growth;
                    previous_end = delta.source().end() as isize + shift;
                }
                None => {
                    self.conflict_policy.process_conflict(
                        VerifyChunk::ContentDoesNotMatchTarget,
                        delta,
                        &mut result,
                    )?;
                }
            }
        }
        debug!(
            deltas = self.deltas.len(),
            max_fuzz,
            after = result.len(),
            "patch applied with fuzz"
        );
        Ok(result)
    }
}

/// Nearest position around `expected` where the delta's source chunk
/// matches with the given fuzz. Positions may be negative when the fuzzed
/// leading elements hang over the start.
fn find_position<T: PartialEq>(
    delta: &Delta<T>,
    target: &[T],
    expected: isize,
    previous_end: isize,
    fuzz: usize,
) -> Option<isize> {
    let source = delta.source();
    let fits = |position: isize| {
        let offset = position - source.position() as isize;
        source.verify_fuzzy(target, fuzz, offset) == VerifyChunk::Ok
    };
    if fits(expected) {
        return Some(expected);
    }

    let fuzz = fuzz as isize;
    let size = source.size() as isize;
    let len = target.len() as isize;
    let mut before_blocked = false;
    let mut after_blocked = false;
    let mut distance = 0isize;
    while !(before_blocked && after_blocked) {
        if !before_blocked && expected - distance + fuzz < previous_end {
            before_blocked = true;
        }
        if !after_blocked && expected + distance + size - fuzz > len {
            after_blocked = true;
        }
        if !before_blocked && fits(expected - distance) {
            return Some(expected - distance);
        }
        if !after_blocked && fits(expected + distance) {
            return Some(expected + distance);
        }
        distance += 1;
    }
    None
}

impl<T> From<Vec<Delta<T>>> for Patch<T> {
    fn from(deltas: Vec<Delta<T>>) -> Self {
        let mut patch = Self::new();
        for delta in deltas {
            patch.add_delta(delta);
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictMarkers;
    use linediff_algo::{DiffAlgorithm, MyersDiff};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn diff(a: &[String], b: &[String]) -> Patch<String> {
        let changes = MyersDiff::new().compute_diff(a, b, None).unwrap();
        Patch::generate(a, b, &changes, false).unwrap()
    }

    fn int_range(n: usize) -> Vec<String> {
        (0..n).map(|i| i.to_string()).collect()
    }

    fn join(parts: &[&Vec<String>]) -> Vec<String> {
        parts.iter().flat_map(|p| p.iter().cloned()).collect()
    }

    #[test]
    fn apply_and_restore_round_trip() {
        let from = strings(&["aaa", "bbb", "ccc", "ddd"]);
        let to = strings(&["aaa", "bxb", "cxc", "ddd", "eee"]);
        let patch = diff(&from, &to);
        assert_eq!(patch.apply_to(&from).unwrap(), to);
        assert_eq!(patch.restore(&to).unwrap(), from);
    }

    #[test]
    fn conflict_fails_by_default() {
        let from = strings(&["aaa", "bbb", "ccc", "ddd"]);
        let to = strings(&["aaa", "bxb", "cxc", "ddd"]);
        let patch = diff(&from, &to);
        let drifted = strings(&["aaa", "bbb", "CDC", "ddd"]);
        assert!(matches!(
            patch.apply_to(&drifted),
            Err(PatchError::Conflict {
                verify: VerifyChunk::ContentDoesNotMatchTarget,
                position: 1
            })
        ));
    }

    #[test]
    fn conflict_markers_scenario() {
        let from = strings(&["aaa", "bbb", "ccc", "ddd"]);
        let to = strings(&["aaa", "bxb", "cxc", "ddd"]);
        let patch = diff(&from, &to).with_conflict_policy(ConflictMarkers);
        let mut drifted = from.clone();
        drifted[2] = "CDC".to_string();

        let result = patch.apply_to(&drifted).unwrap();
        assert_eq!(
            result,
            strings(&[
                "aaa",
                "<<<<<< HEAD",
                "bbb",
                "CDC",
                "======",
                "bbb",
                "ccc",
                ">>>>>>> PATCH",
                "ddd",
            ])
        );
    }

    #[test]
    fn generate_with_equal_parts_covers_everything() {
        let from = strings(&["a", "b", "c", "d", "e"]);
        let to = strings(&["a", "x", "c", "d", "y", "e"]);
        let changes = MyersDiff::new().compute_diff(&from, &to, None).unwrap();
        let patch = Patch::generate(&from, &to, &changes, true).unwrap();

        let covered: usize = patch.deltas().iter().map(|d| d.source().size()).sum();
        assert_eq!(covered, from.len());
        let covered: usize = patch.deltas().iter().map(|d| d.target().size()).sum();
        assert_eq!(covered, to.len());
        assert_eq!(patch.count(DeltaType::Equal), 3);
        assert_eq!(patch.apply_to(&from).unwrap(), to);
    }

    #[test]
    fn generate_rejects_out_of_range_changes() {
        let from = strings(&["a"]);
        let bogus = [Change::new(DeltaType::Delete, 0, 3, 0, 0)];
        assert!(matches!(
            Patch::generate(&from, &from, &bogus, false),
            Err(PatchError::InvalidDelta(_))
        ));
    }

    #[test]
    fn deltas_stay_sorted_and_stable() {
        let mut patch = Patch::new();
        let delete = |pos: usize| {
            Delta::delete(Chunk::new(pos, vec![pos as i32]), Chunk::new(pos, vec![])).unwrap()
        };
        let insert = Delta::insert(Chunk::new(2, vec![]), Chunk::new(2, vec![9])).unwrap();
        patch.add_delta(delete(5));
        patch.add_delta(insert.clone());
        patch.add_delta(delete(2));
        patch.add_delta(delete(0));
        let positions: Vec<usize> = patch.deltas().iter().map(|d| d.source().position()).collect();
        assert_eq!(positions, vec![0, 2, 2, 5]);
        assert_eq!(patch.deltas()[1], insert);

        let result = patch.apply_to(&[0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(result, vec![1, 9, 3, 4]);
    }

    #[test]
    fn restore_rejects_short_target() {
        let from = strings(&["a", "b"]);
        let to = strings(&["a", "b", "c", "d"]);
        let patch = diff(&from, &to);
        assert!(patch.restore(&strings(&["a"])).is_err());
    }

    struct FuzzyPair {
        from: [&'static str; 6],
        to: [&'static str; 6],
        required_fuzz: usize,
    }

    const FUZZY_PAIRS: &[FuzzyPair] = &[
        FuzzyPair {
            from: ["aaa", "bbb", "ccc", "ddd", "eee", "fff"],
            to: ["aaa", "bbb", "cxc", "dxd", "eee", "fff"],
            required_fuzz: 0,
        },
        FuzzyPair {
            from: ["axa", "bbb", "ccc", "ddd", "eee", "fff"],
            to: ["axa", "bbb", "cxc", "dxd", "eee", "fff"],
            required_fuzz: 1,
        },
        FuzzyPair {
            from: ["aaa", "bbb", "ccc", "ddd", "eee", "fxf"],
            to: ["aaa", "bbb", "cxc", "dxd", "eee", "fxf"],
            required_fuzz: 1,
        },
        FuzzyPair {
            from: ["axa", "bbb", "ccc", "ddd", "eee", "fxf"],
            to: ["axa", "bbb", "cxc", "dxd", "eee", "fxf"],
            required_fuzz: 1,
        },
        FuzzyPair {
            from: ["aaa", "bxb", "ccc", "ddd", "eee", "fff"],
            to: ["aaa", "bxb", "cxc", "dxd", "eee", "fff"],
            required_fuzz: 2,
        },
        FuzzyPair {
            from: ["axa", "bxb", "ccc", "ddd", "exe", "fxf"],
            to: ["axa", "bxb", "cxc", "dxd", "exe", "fxf"],
            required_fuzz: 2,
        },
        FuzzyPair {
            from: ["aaa", "bbb", "czc", "dzd", "eee", "fff"],
            to: ["aaa", "bbb", "czc", "dzd", "eee", "fff"],
            required_fuzz: 3,
        },
        FuzzyPair {
            from: ["axa", "bxb", "czc", "dzd", "exe", "fxf"],
            to: ["axa", "bxb", "czc", "dzd", "exe", "fxf"],
            required_fuzz: 3,
        },
    ];

    #[test]
    fn fuzzy_apply_finds_moved_and_drifted_hunks() {
        let delta_from = strings(&["aaa", "bbb", "ccc", "ddd", "eee", "fff"]);
        let delta_to = strings(&["aaa", "bbb", "cxc", "dxd", "eee", "fff"]);
        let mut patch = Patch::new();
        patch.add_delta(
            Delta::change(Chunk::new(6, delta_from), Chunk::new(6, delta_to)).unwrap(),
        );

        // No move, moved forward, moved backward, moved to the start.
        let moves = [int_range(6), int_range(3), int_range(9), int_range(0)];
        for pair in FUZZY_PAIRS {
            let pair_from = strings(&pair.from);
            let pair_to = strings(&pair.to);
            for prefix in &moves {
                let from = join(&[prefix, &pair_from]);
                let to = join(&[prefix, &pair_to]);
                for max_fuzz in 0..pair.required_fuzz {
                    assert!(
                        patch.apply_fuzzy(&from, max_fuzz).is_err(),
                        "{from:?} should not apply with fuzz {max_fuzz}"
                    );
                }
                for max_fuzz in pair.required_fuzz..4 {
                    assert_eq!(patch.apply_fuzzy(&from, max_fuzz).unwrap(), to);
                }
            }
        }
    }

    #[test]
    fn fuzzy_apply_two_side_by_side_deltas() {
        let delta_from = strings(&["aaa", "bbb", "ccc", "ddd", "eee", "fff"]);
        let delta_to = strings(&["aaa", "bbb", "cxc", "dxd", "eee", "fff"]);
        let mut patch = Patch::new();
        for pos in [0, 6] {
            patch.add_delta(
                Delta::change(
                    Chunk::new(pos, delta_from.clone()),
                    Chunk::new(pos, delta_to.clone()),
                )
                .unwrap(),
            );
        }
        assert_eq!(
            patch
                .apply_fuzzy(&join(&[&delta_from, &delta_from]), 0)
                .unwrap(),
            join(&[&delta_to, &delta_to])
        );
    }

    #[test]
    fn fuzzy_apply_prefers_the_nearest_match() {
        let delta_from = strings(&["aaa", "bbb", "ccc", "ddd", "eee", "fff"]);
        let delta_to = strings(&["aaa", "bbb", "cxc", "dxd", "eee", "fff"]);
        let mut patch = Patch::new();
        for pos in [0, 10] {
            patch.add_delta(
                Delta::change(
                    Chunk::new(pos, delta_from.clone()),
                    Chunk::new(pos, delta_to.clone()),
                )
                .unwrap(),
            );
        }

        let three = join(&[&delta_from, &delta_from, &delta_from]);
        assert_eq!(
            patch.apply_fuzzy(&three, 0).unwrap(),
            join(&[&delta_to, &delta_from, &delta_to])
        );

        let one = int_range(1);
        let shifted = join(&[&one, &delta_from, &delta_from, &delta_from]);
        assert_eq!(
            patch.apply_fuzzy(&shifted, 0).unwrap(),
            join(&[&one, &delta_to, &delta_from, &delta_to])
        );
    }

    #[test]
    fn serde_round_trip_resets_policy() {
        let from = strings(&["aaa", "bbb", "ccc", "ddd"]);
        let to = strings(&["aaa", "bxb", "cxc", "ddd"]);
        let patch = diff(&from, &to).with_conflict_policy(ConflictMarkers);

        let json = serde_json::to_string(&patch).unwrap();
        let back: Patch<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, patch);
        assert_eq!(back.apply_to(&from).unwrap(), to);

        let drifted = strings(&["aaa", "bbb", "CDC", "ddd"]);
        assert!(back.apply_to(&drifted).is_err());
    }

    #[test]
    fn patch_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Patch<String>>();
    }
}
