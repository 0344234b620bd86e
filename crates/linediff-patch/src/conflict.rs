//! What to do when a delta does not fit the sequence it is applied to.

use tracing::warn;

use crate::chunk::VerifyChunk;
use crate::delta::Delta;
use crate::error::{PatchError, PatchResult};

/// Marker opening a conflict block; the lines that follow are the ones
/// actually found in the sequence.
pub const CONFLICT_HEAD: &str = "<<<<<< HEAD";
/// Separates the actual lines from the lines the patch expected.
pub const CONFLICT_SEPARATOR: &str = "======";
/// Marker closing a conflict block.
pub const CONFLICT_PATCH: &str = ">>>>>>> PATCH";

/// Decides how a failed verification is handled during application.
///
/// `result` is the partially patched sequence. A policy either repairs it in
/// place and returns `Ok(())`, so application continues with the next delta,
/// or returns an error that aborts the whole application.
pub trait ConflictPolicy<T>: Send + Sync {
    fn process_conflict(
        &self,
        verify: VerifyChunk,
        delta: &Delta<T>,
        result: &mut Vec<T>,
    ) -> PatchResult<()>;
}

/// Fails on the first conflict. The default policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailOnConflict;

impl<T> ConflictPolicy<T> for FailOnConflict {
    fn process_conflict(
        &self,
        verify: VerifyChunk,
        delta: &Delta<T>,
        _result: &mut Vec<T>,
    ) -> PatchResult<()> {
        Err(PatchError::Conflict {
            verify,
            position: delta.source().position(),
        })
    }
}

/// Replaces a conflicting region with a block for manual resolution:
///
/// ```text
/// <<<<<< HEAD
/// (lines found in the sequence)
/// ======
/// (lines the patch expected)
/// >>>>>>> PATCH
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ConflictMarkers;

impl<T> ConflictPolicy<T> for ConflictMarkers
where
    T: Clone + From<&'static str>,
{
    fn process_conflict(
        &self,
        verify: VerifyChunk,
        delta: &Delta<T>,
        result: &mut Vec<T>,
    ) -> PatchResult<()> {
        let source = delta.source();
        let position = source.position();
        if position >= result.len() {
            return Err(PatchError::ConflictOutOfRange {
                position,
                len: result.len(),
            });
        }

        let end = source.end().min(result.len());
        let actual: Vec<T> = result.drain(position..end).collect();
        warn!(
            position,
            actual = actual.len(),
            expected = source.size(),
            %verify,
            "inserting conflict markers"
        );

        let mut block = Vec::with_capacity(actual.len() + source.size() + 3);
        block.push(T::from(CONFLICT_HEAD));
        block.extend(actual);
        block.push(T::from(CONFLICT_SEPARATOR));
        block.extend(source.lines().iter().cloned());
        block.push(T::from(CONFLICT_PATCH));
        result.splice(position..position, block);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn change_at_one() -> Delta<String> {
        Delta::change(
            Chunk::new(1, strings(&["bbb", "ccc"])),
            Chunk::new(1, strings(&["bxb", "cxc"])),
        )
        .unwrap()
    }

    #[test]
    fn fail_on_conflict_reports_position() {
        let mut result = strings(&["aaa"]);
        let err = FailOnConflict
            .process_conflict(
                VerifyChunk::ContentDoesNotMatchTarget,
                &change_at_one(),
                &mut result,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            PatchError::Conflict {
                verify: VerifyChunk::ContentDoesNotMatchTarget,
                position: 1
            }
        ));
    }

    #[test]
    fn markers_wrap_actual_and_expected_lines() {
        let mut result = strings(&["aaa", "bbb", "CDC", "ddd"]);
        ConflictMarkers
            .process_conflict(
                VerifyChunk::ContentDoesNotMatchTarget,
                &change_at_one(),
                &mut result,
            )
            .unwrap();
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
    fn markers_clamp_to_the_end() {
        let mut result = strings(&["aaa", "bbb"]);
        ConflictMarkers
            .process_conflict(
                VerifyChunk::PositionOutOfTarget,
                &change_at_one(),
                &mut result,
            )
            .unwrap();
        assert_eq!(
            result,
            strings(&["aaa", "<<<<<< HEAD", "bbb", "======", "bbb", "ccc", ">>>>>>> PATCH"])
        );
    }

    #[test]
    fn markers_past_the_end_fail() {
        let mut result = strings(&["aaa"]);
        let err = ConflictMarkers
            .process_conflict(
                VerifyChunk::PositionOutOfTarget,
                &change_at_one(),
                &mut result,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            PatchError::ConflictOutOfRange { position: 1, len: 1 }
        ));
    }
}
