//! Typed deltas: one source and one target chunk tagged with their kind.

use serde::{Deserialize, Serialize};

use linediff_algo::DeltaType;

use crate::chunk::{trimmed, Chunk, VerifyChunk};
use crate::error::{PatchError, PatchResult};

/// One difference between two sequences.
///
/// The source chunk describes the original elements, the target chunk the
/// revised ones. Constructors check the invariant of each kind: an insert has
/// an empty source, a delete an empty target, an equal delta matching sizes
/// and a change at least one non-empty side. Deserialization goes through
/// the same checks.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "lowercase",
    try_from = "RawDelta<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub enum Delta<T> {
    Change { source: Chunk<T>, target: Chunk<T> },
    Delete { source: Chunk<T>, target: Chunk<T> },
    Insert { source: Chunk<T>, target: Chunk<T> },
    Equal { source: Chunk<T>, target: Chunk<T> },
}

/// Wire form of [`Delta`], before the kind invariants are checked.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawDelta<T> {
    Change { source: Chunk<T>, target: Chunk<T> },
    Delete { source: Chunk<T>, target: Chunk<T> },
    Insert { source: Chunk<T>, target: Chunk<T> },
    Equal { source: Chunk<T>, target: Chunk<T> },
}

impl<T> TryFrom<RawDelta<T>> for Delta<T> {
    type Error = PatchError;

    fn try_from(raw: RawDelta<T>) -> PatchResult<Self> {
        match raw {
            RawDelta::Change { source, target } => Self::change(source, target),
            RawDelta::Delete { source, target } => Self::delete(source, target),
            RawDelta::Insert { source, target } => Self::insert(source, target),
            RawDelta::Equal { source, target } => Self::equal(source, target),
        }
    }
}

impl<T> Delta<T> {
    pub fn new(delta_type: DeltaType, source: Chunk<T>, target: Chunk<T>) -> PatchResult<Self> {
        let invalid = |reason: &str| {
            Err(PatchError::InvalidDelta(format!(
                "{delta_type} at source position {}: {reason}",
                source.position()
            )))
        };
        match delta_type {
            DeltaType::Insert if !source.is_empty() => invalid("source chunk must be empty"),
            DeltaType::Delete if !target.is_empty() => invalid("target chunk must be empty"),
            DeltaType::Change if source.is_empty() && target.is_empty() => {
                invalid("both chunks are empty")
            }
            DeltaType::Equal if source.size() != target.size() => {
                invalid("chunks differ in size")
            }
            DeltaType::Change => Ok(Self::Change { source, target }),
            DeltaType::Delete => Ok(Self::Delete { source, target }),
            DeltaType::Insert => Ok(Self::Insert { source, target }),
            DeltaType::Equal => Ok(Self::Equal { source, target }),
        }
    }

    pub fn change(source: Chunk<T>, target: Chunk<T>) -> PatchResult<Self> {
        Self::new(DeltaType::Change, source, target)
    }

    pub fn delete(source: Chunk<T>, target: Chunk<T>) -> PatchResult<Self> {
        Self::new(DeltaType::Delete, source, target)
    }

    pub fn insert(source: Chunk<T>, target: Chunk<T>) -> PatchResult<Self> {
        Self::new(DeltaType::Insert, source, target)
    }

    /// Equal deltas only require matching sizes: engines may consider
    /// elements equal that `PartialEq` does not (e.g. whitespace-insensitive
    /// comparison).
    pub fn equal(source: Chunk<T>, target: Chunk<T>) -> PatchResult<Self> {
        Self::new(DeltaType::Equal, source, target)
    }

    pub fn delta_type(&self) -> DeltaType {
        match self {
            Self::Change { .. } => DeltaType::Change,
            Self::Delete { .. } => DeltaType::Delete,
            Self::Insert { .. } => DeltaType::Insert,
            Self::Equal { .. } => DeltaType::Equal,
        }
    }

    pub fn source(&self) -> &Chunk<T> {
        match self {
            Self::Change { source, .. }
            | Self::Delete { source, .. }
            | Self::Insert { source, .. }
            | Self::Equal { source, .. } => source,
        }
    }

    pub fn target(&self) -> &Chunk<T> {
        match self {
            Self::Change { target, .. }
            | Self::Delete { target, .. }
            | Self::Insert { target, .. }
            | Self::Equal { target, .. } => target,
        }
    }

    /// A delta of the same kind with different chunks.
    pub fn with_chunks(&self, source: Chunk<T>, target: Chunk<T>) -> PatchResult<Self> {
        Self::new(self.delta_type(), source, target)
    }

    pub fn into_chunks(self) -> (Chunk<T>, Chunk<T>) {
        match self {
            Self::Change { source, target }
            | Self::Delete { source, target }
            | Self::Insert { source, target }
            | Self::Equal { source, target } => (source, target),
        }
    }
}

impl<T: Clone + PartialEq> Delta<T> {
    /// Check the source chunk against `target` and apply the delta if it
    /// fits. `target` is left untouched otherwise.
    pub fn verify_and_apply(&self, target: &mut Vec<T>) -> VerifyChunk {
        let verify = self.source().verify(target);
        if verify == VerifyChunk::Ok {
            let (source, revised) = (self.source(), self.target());
            match self {
                Self::Insert { .. } => {
                    let at = source.position();
                    target.splice(at..at, revised.lines().iter().cloned());
                }
                Self::Delete { .. } => {
                    target.drain(source.position()..source.end());
                }
                Self::Change { .. } => {
                    let range = source.position()..source.end();
                    target.splice(range, revised.lines().iter().cloned());
                }
                Self::Equal { .. } => {}
            }
        }
        verify
    }

    /// Undo the delta on a sequence the delta was applied to.
    ///
    /// The target chunk's content is not compared, only its position.
    pub fn restore(&self, target: &mut Vec<T>) -> PatchResult<()> {
        let (original, revised) = (self.source(), self.target());
        if revised.end() > target.len() {
            return Err(PatchError::Conflict {
                verify: VerifyChunk::PositionOutOfTarget,
                position: revised.position(),
            });
        }
        match self {
            Self::Insert { .. } => {
                target.drain(revised.position()..revised.end());
            }
            Self::Delete { .. } => {
                let at = revised.position();
                target.splice(at..at, original.lines().iter().cloned());
            }
            Self::Change { .. } => {
                let range = revised.position()..revised.end();
                target.splice(range, original.lines().iter().cloned());
            }
            Self::Equal { .. } => {}
        }
        Ok(())
    }

    /// Replace the middle of the source chunk, with `fuzz` elements dropped
    /// from each end, by the middle of the target chunk. `start` is where the
    /// source chunk begins in `target`, so the replaced run begins at
    /// `start + fuzz`; `start` itself may be negative when the fuzzed ends
    /// hang over the front. The caller must have verified the placement.
    ///
    /// Returns how many elements `target` grew by.
    pub(crate) fn apply_fuzzy_at(&self, target: &mut Vec<T>, fuzz: usize, start: isize) -> isize {
        if let Self::Equal { .. } = self {
            return 0;
        }
        let removed = trimmed(self.source().size(), fuzz);
        let inserted = trimmed(self.target().size(), fuzz);
        let at = (start + removed.start as isize) as usize;
        target.splice(
            at..at + removed.len(),
            self.target().lines()[inserted.clone()].iter().cloned(),
        );
        inserted.len() as isize - removed.len() as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn constructors_enforce_kind_invariants() {
        let some = Chunk::new(0, strings(&["a"]));
        let none = Chunk::<String>::new(0, vec![]);

        assert!(Delta::insert(none.clone(), some.clone()).is_ok());
        assert!(matches!(
            Delta::insert(some.clone(), some.clone()),
            Err(PatchError::InvalidDelta(_))
        ));
        assert!(Delta::delete(some.clone(), none.clone()).is_ok());
        assert!(Delta::delete(some.clone(), some.clone()).is_err());
        assert!(Delta::change(none.clone(), none.clone()).is_err());
        assert!(Delta::change(some.clone(), none.clone()).is_ok());
        assert!(Delta::equal(some.clone(), none).is_err());
        assert!(Delta::equal(some.clone(), some).is_ok());
    }

    #[test]
    fn apply_and_restore_each_kind() {
        let original = strings(&["a", "b", "c"]);

        let insert = Delta::insert(
            Chunk::new(1, vec![]),
            Chunk::new(1, strings(&["x", "y"])),
        )
        .unwrap();
        let mut seq = original.clone();
        assert_eq!(insert.verify_and_apply(&mut seq), VerifyChunk::Ok);
        assert_eq!(seq, strings(&["a", "x", "y", "b", "c"]));
        insert.restore(&mut seq).unwrap();
        assert_eq!(seq, original);

        let delete =
            Delta::delete(Chunk::new(0, strings(&["a", "b"])), Chunk::new(0, vec![])).unwrap();
        let mut seq = original.clone();
        delete.verify_and_apply(&mut seq);
        assert_eq!(seq, strings(&["c"]));
        delete.restore(&mut seq).unwrap();
        assert_eq!(seq, original);

        let change = Delta::change(
            Chunk::new(2, strings(&["c"])),
            Chunk::new(2, strings(&["C", "D"])),
        )
        .unwrap();
        let mut seq = original.clone();
        change.verify_and_apply(&mut seq);
        assert_eq!(seq, strings(&["a", "b", "C", "D"]));
        change.restore(&mut seq).unwrap();
        assert_eq!(seq, original);
    }

    #[test]
    fn mismatch_leaves_target_untouched() {
        let delta = Delta::change(
            Chunk::new(1, strings(&["b"])),
            Chunk::new(1, strings(&["B"])),
        )
        .unwrap();
        let mut seq = strings(&["a", "x", "c"]);
        assert_eq!(
            delta.verify_and_apply(&mut seq),
            VerifyChunk::ContentDoesNotMatchTarget
        );
        assert_eq!(seq, strings(&["a", "x", "c"]));
    }

    #[test]
    fn restore_checks_target_range() {
        let delta =
            Delta::insert(Chunk::new(3, vec![]), Chunk::new(3, strings(&["z"]))).unwrap();
        let mut seq = strings(&["a", "b"]);
        assert!(matches!(
            delta.restore(&mut seq),
            Err(PatchError::Conflict {
                verify: VerifyChunk::PositionOutOfTarget,
                ..
            })
        ));
    }

    #[test]
    fn fuzzy_application_keeps_fuzzed_ends() {
        let delta = Delta::change(
            Chunk::new(0, strings(&["a", "b", "c", "d"])),
            Chunk::new(0, strings(&["a", "B", "C", "d"])),
        )
        .unwrap();
        let mut seq = strings(&["q", "A", "b", "c", "D"]);
        delta.apply_fuzzy_at(&mut seq, 1, 1);
        assert_eq!(seq, strings(&["q", "A", "B", "C", "D"]));
    }

    #[test]
    fn serde_uses_type_tag() {
        let delta = Delta::insert(Chunk::new(0, vec![]), Chunk::new(0, vec![1, 2])).unwrap();
        let json = serde_json::to_value(&delta).unwrap();
        assert_eq!(json["type"], "insert");
        let back: Delta<i32> = serde_json::from_value(json).unwrap();
        assert_eq!(back, delta);
        assert_eq!(back.delta_type(), DeltaType::Insert);
    }

    #[test]
    fn deserialize_checks_kind_invariants() {
        let bad_insert = serde_json::json!({
            "type": "insert",
            "source": { "position": 0, "lines": [7] },
            "target": { "position": 0, "lines": [1, 2] },
        });
        let err = serde_json::from_value::<Delta<i32>>(bad_insert).unwrap_err();
        assert!(err.to_string().contains("source chunk must be empty"));

        let bad_equal = serde_json::json!({
            "type": "equal",
            "source": { "position": 0, "lines": [1] },
            "target": { "position": 0, "lines": [1, 2] },
        });
        assert!(serde_json::from_value::<Delta<i32>>(bad_equal).is_err());
    }
}
