//! Myers' divide-and-conquer search in linear space.
//!
//! The forward and backward searches run simultaneously until they overlap
//! on a "middle snake"; the two halves on either side of it are then solved
//! independently. Memory stays O(N + M) regardless of the edit distance.
//!
//! Sub-problems are kept on an explicit work stack, so deep recursion on
//! large inputs cannot overflow the call stack.

use std::marker::PhantomData;

use tracing::debug;

use crate::algorithm::{DiffAlgorithm, DiffProgress};
use crate::change::{Change, DeltaType};
use crate::error::{DiffError, DiffResult};
use crate::sequence::{default_equals, Sequences};

/// Linear-space Myers engine.
pub struct MyersDiffWithLinearSpace<T, E = fn(&T, &T) -> bool> {
    equalizer: E,
    _marker: PhantomData<fn(&T)>,
}

impl<T: PartialEq> MyersDiffWithLinearSpace<T> {
    pub fn new() -> Self {
        Self::with_equalizer(default_equals::<T> as fn(&T, &T) -> bool)
    }
}

impl<T: PartialEq> Default for MyersDiffWithLinearSpace<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> MyersDiffWithLinearSpace<T, E>
where
    E: Fn(&T, &T) -> bool,
{
    pub fn with_equalizer(equalizer: E) -> Self {
        Self {
            equalizer,
            _marker: PhantomData,
        }
    }
}

impl<T, E> std::fmt::Debug for MyersDiffWithLinearSpace<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MyersDiffWithLinearSpace")
            .finish_non_exhaustive()
    }
}

impl<T, E> DiffAlgorithm<T> for MyersDiffWithLinearSpace<T, E>
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
        let max = source.len() + target.len();
        let mut search = LinearSearch::new(&seq);

        let mut work = vec![Region {
            start1: 0,
            end1: source.len(),
            start2: 0,
            end2: target.len(),
        }];
        let mut regions = 0usize;
        while let Some(region) = work.pop() {
            regions += 1;
            if let Some(p) = progress.as_mut() {
                p.diff_step(region.progress_value(), max);
            }
            let middle = search.middle_snake(&region)?;
            match middle {
                Some(snake) if !snake.touches_corner(&region) => {
                    // Right half is pushed first so the left half is solved first.
                    work.push(Region {
                        start1: snake.end,
                        end1: region.end1,
                        start2: offset_by(snake.end, -snake.diag),
                        end2: region.end2,
                    });
                    work.push(Region {
                        start1: region.start1,
                        end1: snake.start,
                        start2: region.start2,
                        end2: offset_by(snake.start, -snake.diag),
                    });
                }
                _ => search.scan(&region),
            }
        }

        debug!(
            source_len = source.len(),
            target_len = target.len(),
            changes = search.script.len(),
            regions,
            "linear-space myers diff computed"
        );
        if let Some(p) = progress.as_mut() {
            p.diff_end();
        }
        Ok(search.script)
    }
}

/// A rectangular sub-problem: `source[start1..end1]` against `target[start2..end2]`.
#[derive(Clone, Copy, Debug)]
struct Region {
    start1: usize,
    end1: usize,
    start2: usize,
    end2: usize,
}

impl Region {
    fn progress_value(&self) -> usize {
        (self.end1 - self.start1) / 2 + (self.end2 - self.start2) / 2
    }
}

/// A diagonal run of matches `start..end` in source coordinates on the
/// diagonal `diag = x - y`.
#[derive(Clone, Copy, Debug)]
struct Snake {
    start: usize,
    end: usize,
    diag: isize,
}

impl Snake {
    /// A snake glued to the bottom-right or top-left corner of its region
    /// does not split the region; it is solved by a direct scan instead.
    fn touches_corner(&self, r: &Region) -> bool {
        (self.start == r.end1 && self.diag == r.end1 as isize - r.end2 as isize)
            || (self.end == r.start1 && self.diag == r.start1 as isize - r.start2 as isize)
    }
}

fn offset_by(x: usize, by: isize) -> usize {
    (x as isize + by) as usize
}

struct LinearSearch<'s, 'a, T, E> {
    seq: &'s Sequences<'a, T, E>,
    v_down: Vec<isize>,
    v_up: Vec<isize>,
    script: Vec<Change>,
}

impl<'s, 'a, T, E> LinearSearch<'s, 'a, T, E>
where
    E: Fn(&T, &T) -> bool,
{
    fn new(seq: &'s Sequences<'a, T, E>) -> Self {
        let size = seq.source_len() + seq.target_len() + 3;
        Self {
            seq,
            v_down: vec![0; size],
            v_up: vec![0; size],
            script: Vec::new(),
        }
    }

    #[inline]
    fn equal(&self, x: isize, y: isize) -> bool {
        self.seq.equal(x as usize, y as usize)
    }

    /// Find the snake where the forward and backward searches first overlap.
    /// `None` when either side of the region is empty.
    fn middle_snake(&mut self, r: &Region) -> DiffResult<Option<Snake>> {
        let m = r.end1 - r.start1;
        let n = r.end2 - r.start2;
        if m == 0 || n == 0 {
            return Ok(None);
        }

        let (start1, end1) = (r.start1 as isize, r.end1 as isize);
        let (start2, end2) = (r.start2 as isize, r.end2 as isize);
        let delta = m as isize - n as isize;
        let offset = (m + n).div_ceil(2) as isize;
        let odd = delta % 2 != 0;

        self.v_down[(1 + offset) as usize] = start1;
        self.v_up[(1 + offset) as usize] = end1 + 1;

        for d in 0..=offset {
            let mut k = -d;
            while k <= d {
                let i = (k + offset) as usize;
                self.v_down[i] = if k == -d
                    || (k != d && self.v_down[i - 1] < self.v_down[i + 1])
                {
                    self.v_down[i + 1]
                } else {
                    self.v_down[i - 1] + 1
                };

                let mut x = self.v_down[i];
                let mut y = x - start1 + start2 - k;
                while x < end1 && y >= start2 && y < end2 && self.equal(x, y) {
                    x += 1;
                    y += 1;
                }
                self.v_down[i] = x;

                if odd && delta - d <= k && k <= delta + d {
                    let up = self.v_up[(i as isize - delta) as usize];
                    if up <= self.v_down[i] {
                        return Ok(Some(self.build_snake(up, k + start1 - start2, r)));
                    }
                }
                k += 2;
            }

            let mut k = delta - d;
            while k <= delta + d {
                let i = (k + offset - delta) as usize;
                self.v_up[i] = if k == delta - d
                    || (k != delta + d && self.v_up[i + 1] <= self.v_up[i - 1])
                {
                    self.v_up[i + 1] - 1
                } else {
                    self.v_up[i - 1]
                };

                let mut x = self.v_up[i] - 1;
                let mut y = x - start1 + start2 - k;
                while x >= start1 && y >= start2 && y < end2 && self.equal(x, y) {
                    x -= 1;
                    y -= 1;
                }
                self.v_up[i] = x + 1;

                if !odd && -d <= k && k <= d {
                    let up = self.v_up[i];
                    if up <= self.v_down[(i as isize + delta) as usize] {
                        return Ok(Some(self.build_snake(up, k + start1 - start2, r)));
                    }
                }
                k += 2;
            }
        }

        Err(DiffError::PathNotFound)
    }

    fn build_snake(&self, start: isize, diag: isize, r: &Region) -> Snake {
        let (end1, end2) = (r.end1 as isize, r.end2 as isize);
        let mut end = start;
        while end - diag < end2 && end < end1 && self.equal(end, end - diag) {
            end += 1;
        }
        Snake {
            start: start as usize,
            end: end as usize,
            diag,
        }
    }

    /// Solve a region without a splitting snake by walking it directly,
    /// merging adjacent edits of the same kind.
    fn scan(&mut self, r: &Region) {
        let prefer_delete = r.end1 - r.start1 > r.end2 - r.start2;
        let (mut i, mut j) = (r.start1, r.start2);
        while i < r.end1 || j < r.end2 {
            if i < r.end1 && j < r.end2 && self.seq.equal(i, j) {
                i += 1;
                j += 1;
            } else if i < r.end1 && (prefer_delete || j >= r.end2) {
                let merged = match self.script.last_mut() {
                    Some(last)
                        if last.delta_type == DeltaType::Delete && last.end_original == i =>
                    {
                        *last = last.with_end_original(i + 1);
                        true
                    }
                    _ => false,
                };
                if !merged {
                    self.script
                        .push(Change::new(DeltaType::Delete, i, i + 1, j, j));
                }
                i += 1;
            } else {
                let merged = match self.script.last_mut() {
                    Some(last) if last.delta_type == DeltaType::Insert && last.end_revised == j => {
                        *last = last.with_end_revised(j + 1);
                        true
                    }
                    _ => false,
                };
                if !merged {
                    self.script
                        .push(Change::new(DeltaType::Insert, i, i, j, j + 1));
                }
                j += 1;
            }
        }
    }
}
