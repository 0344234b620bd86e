//! A positioned run of elements and its verification against a sequence.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of checking a [`Chunk`] against a concrete sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyChunk {
    Ok,
    /// The chunk reaches past the end of the sequence.
    PositionOutOfTarget,
    /// The chunk fits, but at least one element differs.
    ContentDoesNotMatchTarget,
}

impl fmt::Display for VerifyChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::PositionOutOfTarget => "position out of target",
            Self::ContentDoesNotMatchTarget => "content does not match target",
        };
        f.write_str(s)
    }
}

/// Elements of one side of a delta, starting at `position`.
///
/// The chunk owns a copy of its elements. `change_positions` lists the
/// absolute indices of lines that were literally added or removed, and is
/// only filled in for chunks read from a unified diff.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chunk<T> {
    position: usize,
    lines: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    change_positions: Option<Vec<usize>>,
}

impl<T> Chunk<T> {
    pub fn new(position: usize, lines: Vec<T>) -> Self {
        Self {
            position,
            lines,
            change_positions: None,
        }
    }

    pub fn with_change_positions(
        position: usize,
        lines: Vec<T>,
        change_positions: Vec<usize>,
    ) -> Self {
        Self {
            position,
            lines,
            change_positions: Some(change_positions),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn lines(&self) -> &[T] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<T> {
        self.lines
    }

    pub fn change_positions(&self) -> Option<&[usize]> {
        self.change_positions.as_deref()
    }

    pub fn size(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the last element, `position + size - 1`. For an empty chunk
    /// this is `position - 1`, clamped at zero.
    pub fn last(&self) -> usize {
        (self.position + self.size()).saturating_sub(1)
    }

    /// One past the last element.
    pub fn end(&self) -> usize {
        self.position + self.size()
    }
}

impl<T: PartialEq> Chunk<T> {
    /// Compare the chunk with `target[position..position + size]`.
    pub fn verify(&self, target: &[T]) -> VerifyChunk {
        self.verify_fuzzy(target, 0, 0)
    }

    /// Compare the chunk, shifted by `offset`, with `target`, ignoring `fuzz`
    /// elements at each end of the chunk.
    ///
    /// Only the compared middle part has to lie inside `target`; the ignored
    /// ends may hang over either edge.
    pub fn verify_fuzzy(&self, target: &[T], fuzz: usize, offset: isize) -> VerifyChunk {
        let range = trimmed(self.size(), fuzz);
        let start = self.position as isize + offset;
        let begin = start + range.start as isize;
        let end = start + range.end as isize;
        if begin < 0 || end > target.len() as isize {
            return VerifyChunk::PositionOutOfTarget;
        }

        let window = &target[begin as usize..end as usize];
        if window == &self.lines[range] {
            VerifyChunk::Ok
        } else {
            VerifyChunk::ContentDoesNotMatchTarget
        }
    }
}

/// The index range left after dropping `fuzz` elements from each end of a
/// run of `len` elements. Empty, not inverted, when `2 * fuzz > len`.
pub(crate) fn trimmed(len: usize, fuzz: usize) -> std::ops::Range<usize> {
    let start = fuzz.min(len);
    let end = len.saturating_sub(fuzz).max(start);
    start..end
}
