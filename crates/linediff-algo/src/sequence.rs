//! The two sequences under comparison and the equality used between them.
//!
//! Engines never compare elements with `==` directly; they go through a
//! caller-supplied equalizer so that, for example, lines differing only in
//! whitespace can be treated as equal.

/// Structural equality, the default equalizer.
pub fn default_equals<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

/// Equality that ignores leading/trailing whitespace and treats any run of
/// inner whitespace as a single separator.
pub fn ignore_whitespace<S: AsRef<str>>(a: &S, b: &S) -> bool {
    a.as_ref().split_whitespace().eq(b.as_ref().split_whitespace())
}

/// A borrowed pair of sequences together with their equalizer.
#[derive(Debug)]
pub struct Sequences<'a, T, E> {
    source: &'a [T],
    target: &'a [T],
    equalizer: &'a E,
}

impl<'a, T, E> Sequences<'a, T, E>
where
    E: Fn(&T, &T) -> bool,
{
    pub fn new(source: &'a [T], target: &'a [T], equalizer: &'a E) -> Self {
        Self {
            source,
            target,
            equalizer,
        }
    }

    pub fn source(&self) -> &'a [T] {
        self.source
    }

    pub fn target(&self) -> &'a [T] {
        self.target
    }

    /// Length of the source sequence (`N`).
    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    /// Length of the target sequence (`M`).
    pub fn target_len(&self) -> usize {
        self.target.len()
    }

    /// Whether `source[i]` and `target[j]` are equal under the equalizer.
    #[inline]
    pub fn equal(&self, i: usize, j: usize) -> bool {
        (self.equalizer)(&self.source[i], &self.target[j])
    }

    /// Follow a snake from `(i, j)`: advance both indices while the elements
    /// match and both stay below their bounds. Returns the end point.
    pub fn follow_snake(
        &self,
        mut i: usize,
        mut j: usize,
        end_i: usize,
        end_j: usize,
    ) -> (usize, usize) {
        while i < end_i && j < end_j && self.equal(i, j) {
            i += 1;
            j += 1;
        }
        (i, j)
    }
}
