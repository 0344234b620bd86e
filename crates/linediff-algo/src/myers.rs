//! Myers' greedy shortest-edit-script search, quadratic-space variant.
//!
//! For every edit distance `d = 0, 1, ...` the search keeps, per diagonal
//! `k = i - j`, the furthest point reachable with `d` edits, extending each
//! point through the longest run of matching elements (a "snake"). The first
//! point to reach `(N, M)` ends the search; its path is minimal.
//!
//! Path nodes live in an arena and refer to their predecessor by index.
//! Memory grows with the edit distance, so very dissimilar large inputs
//! should use [`MyersDiffWithLinearSpace`](crate::MyersDiffWithLinearSpace).

use std::marker::PhantomData;

use tracing::debug;

use crate::algorithm::{DiffAlgorithm, DiffProgress};
use crate::change::{Change, DeltaType};
use crate::error::{DiffError, DiffResult};
use crate::sequence::{default_equals, Sequences};

/// Quadratic-space Myers engine.
pub struct MyersDiff<T, E = fn(&T, &T) -> bool> {
    equalizer: E,
    _marker: PhantomData<fn(&T)>,
}

impl<T: PartialEq> MyersDiff<T> {
    /// Engine comparing elements with `PartialEq`.
    pub fn new() -> Self {
        Self::with_equalizer(default_equals::<T> as fn(&T, &T) -> bool)
    }
}

impl<T: PartialEq> Default for MyersDiff<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> MyersDiff<T, E>
where
    E: Fn(&T, &T) -> bool,
{
    /// Engine comparing elements with a custom equalizer.
    pub fn with_equalizer(equalizer: E) -> Self {
        Self {
            equalizer,
            _marker: PhantomData,
        }
    }
}

impl<T, E> std::fmt::Debug for MyersDiff<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MyersDiff").finish_non_exhaustive()
    }
}

impl<T, E> DiffAlgorithm<T> for MyersDiff<T, E>
where
    E: Fn(&T, &T) -> bool,
{
    fn compute_diff(
        &self,
        source: &[T],
        target: &[T],
        mut progress: Option<&mut dyn DiffProgress>,
    ) -> DiffResult<Vec<Change>> {
        if let Some(p) = progress.as_mut() {
            p.diff_start();
        }
        let seq = Sequences::new(source, target, &self.equalizer);
        let (arena, end) = build_path(&seq, &mut progress)?;
        let changes = build_revision(&arena, end)?;
        debug!(
            source_len = source.len(),
            target_len = target.len(),
            changes = changes.len(),
            nodes = arena.nodes.len(),
            "myers diff computed"
        );
        if let Some(p) = progress.as_mut() {
            p.diff_end();
        }
        Ok(changes)
    }
}

/// A point on a diff path.
#[derive(Clone, Copy, Debug)]
struct PathNode {
    /// Position in the original sequence.
    i: usize,
    /// Position in the revised sequence.
    j: usize,
    /// Whether the node ends a run of matching elements.
    snake: bool,
    /// The virtual start node just above `(0, 0)`.
    bootstrap: bool,
    prev: Option<usize>,
}

#[derive(Debug, Default)]
struct PathArena {
    nodes: Vec<PathNode>,
}

impl PathArena {
    /// Append a node. Diff (non-snake) nodes link straight to the closest
    /// preceding snake, which collapses consecutive edits into one step.
    fn push(
        &mut self,
        i: usize,
        j: usize,
        snake: bool,
        bootstrap: bool,
        prev: Option<usize>,
    ) -> usize {
        let prev = if snake {
            prev
        } else {
            prev.and_then(|p| self.previous_snake(p))
        };
        self.nodes.push(PathNode {
            i,
            j,
            snake,
            bootstrap,
            prev,
        });
        self.nodes.len() - 1
    }

    /// First snake node at or before `idx`, or the first node of the path.
    /// Returns `None` once the bootstrap node is reached.
    fn previous_snake(&self, mut idx: usize) -> Option<usize> {
        loop {
            let node = &self.nodes[idx];
            if node.bootstrap {
                return None;
            }
            match node.prev {
                Some(prev) if !node.snake => idx = prev,
                _ => return Some(idx),
            }
        }
    }

    fn get(&self, idx: usize) -> &PathNode {
        &self.nodes[idx]
    }
}

fn frontier(diagonal: &[Option<usize>], slot: usize) -> DiffResult<usize> {
    diagonal[slot].ok_or(DiffError::PathNotFound)
}

fn build_path<T, E>(
    seq: &Sequences<'_, T, E>,
    progress: &mut Option<&mut dyn DiffProgress>,
) -> DiffResult<(PathArena, usize)>
where
    E: Fn(&T, &T) -> bool,
{
    let n = seq.source_len();
    let m = seq.target_len();
    let max = n + m + 1;
    let size = 1 + 2 * max;
    let middle = size / 2;

    let mut arena = PathArena::default();
    let mut diagonal: Vec<Option<usize>> = vec![None; size];
    diagonal[middle + 1] = Some(arena.push(0, 0, true, true, None));

    for d in 0..max {
        if let Some(p) = progress.as_mut() {
            p.diff_step(d, n + m);
        }
        let d_signed = d as isize;
        let mut k = -d_signed;
        while k <= d_signed {
            let kmiddle = (middle as isize + k) as usize;
            let kplus = kmiddle + 1;
            let kminus = kmiddle - 1;

            let (mut i, prev) = if k == -d_signed
                || (k != d_signed
                    && arena.get(frontier(&diagonal, kminus)?).i
                        < arena.get(frontier(&diagonal, kplus)?).i)
            {
                let prev = frontier(&diagonal, kplus)?;
                (arena.get(prev).i, prev)
            } else {
                let prev = frontier(&diagonal, kminus)?;
                (arena.get(prev).i + 1, prev)
            };

            let mut j = (i as isize - k) as usize;
            let mut node = arena.push(i, j, false, false, Some(prev));
            let start_i = i;
            (i, j) = seq.follow_snake(i, j, n, m);
            if i != start_i {
                node = arena.push(i, j, true, false, Some(node));
            }
            diagonal[kmiddle] = Some(node);

            if i >= n && j >= m {
                return Ok((arena, node));
            }
            k += 2;
        }
    }
    Err(DiffError::PathNotFound)
}

/// Walk the path back from its end, turning every diff step into a change.
fn build_revision(arena: &PathArena, end: usize) -> DiffResult<Vec<Change>> {
    let mut changes = Vec::new();
    let mut path = Some(end);
    if arena.get(end).snake {
        path = arena.get(end).prev;
    }

    while let Some(idx) = path {
        let node = arena.get(idx);
        let Some(anchor_idx) = node.prev else {
            break;
        };
        if node.snake {
            return Err(DiffError::InvalidPath(
                "found snake when looking for diff".into(),
            ));
        }
        let anchor = arena.get(anchor_idx);
        let delta_type = if anchor.i == node.i && anchor.j != node.j {
            DeltaType::Insert
        } else if anchor.i != node.i && anchor.j == node.j {
            DeltaType::Delete
        } else {
            DeltaType::Change
        };
        changes.push(Change::new(delta_type, anchor.i, node.i, anchor.j, node.j));

        path = if anchor.snake {
            anchor.prev
        } else {
            Some(anchor_idx)
        };
    }

    changes.reverse();
    Ok(changes)
}
