//! The engine interface shared by every edit-script implementation.

use crate::change::Change;
use crate::error::DiffResult;

/// Receives progress notifications from a running engine.
///
/// Calls happen synchronously on the calling thread. `diff_start` and
/// `diff_end` are called exactly once per computation, including for empty
/// inputs. The meaning of `diff_step` values differs between engines and is
/// not guaranteed to increase monotonically or to reach `max`.
pub trait DiffProgress {
    fn diff_start(&mut self) {}

    fn diff_step(&mut self, value: usize, max: usize);

    fn diff_end(&mut self) {}
}

/// An edit-script engine.
///
/// Implementations must not mutate their inputs, must return an empty script
/// iff the sequences are equal under their equalizer, and must return
/// [`Change`]s in ascending order whose ranges, together with the equal gaps
/// between them, exactly tile both sequences.
pub trait DiffAlgorithm<T> {
    fn compute_diff(
        &self,
        source: &[T],
        target: &[T],
        progress: Option<&mut dyn DiffProgress>,
    ) -> DiffResult<Vec<Change>>;
}

impl<T, A> DiffAlgorithm<T> for &A
where
    A: DiffAlgorithm<T> + ?Sized,
{
    fn compute_diff(
        &self,
        source: &[T],
        target: &[T],
        progress: Option<&mut dyn DiffProgress>,
    ) -> DiffResult<Vec<Change>> {
        (**self).compute_diff(source, target, progress)
    }
}

impl<T, A> DiffAlgorithm<T> for Box<A>
where
    A: DiffAlgorithm<T> + ?Sized,
{
    fn compute_diff(
        &self,
        source: &[T],
        target: &[T],
        progress: Option<&mut dyn DiffProgress>,
    ) -> DiffResult<Vec<Change>> {
        (**self).compute_diff(source, target, progress)
    }
}
