//! Edit operations produced by the engines.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of an edit operation, and of the delta built from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaType {
    /// Elements of the original were replaced by elements of the revised sequence.
    Change,
    /// Elements of the original were removed.
    Delete,
    /// Elements of the revised sequence were added.
    Insert,
    /// Both sequences agree on this range.
    Equal,
}

impl fmt::Display for DeltaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Change => "CHANGE",
            Self::Delete => "DELETE",
            Self::Insert => "INSERT",
            Self::Equal => "EQUAL",
        };
        f.write_str(s)
    }
}

/// One step of an edit script.
///
/// Ranges are half-open indices into the original (`start_original..end_original`)
/// and revised (`start_revised..end_revised`) sequences. Engines return these
/// in ascending order, and ranges never overlap on either side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Change {
    pub delta_type: DeltaType,
    pub start_original: usize,
    pub end_original: usize,
    pub start_revised: usize,
    pub end_revised: usize,
}

impl Change {
    pub fn new(
        delta_type: DeltaType,
        start_original: usize,
        end_original: usize,
        start_revised: usize,
        end_revised: usize,
    ) -> Self {
        Self {
            delta_type,
            start_original,
            end_original,
            start_revised,
            end_revised,
        }
    }

    /// Copy of this change with a different end in the original sequence.
    pub fn with_end_original(self, end_original: usize) -> Self {
        Self {
            end_original,
            ..self
        }
    }

    /// Copy of this change with a different end in the revised sequence.
    pub fn with_end_revised(self, end_revised: usize) -> Self {
        Self {
            end_revised,
            ..self
        }
    }

    /// Number of original elements covered.
    pub fn original_len(&self) -> usize {
        self.end_original - self.start_original
    }

    /// Number of revised elements covered.
    pub fn revised_len(&self) -> usize {
        self.end_revised - self.start_revised
    }

    /// Deleted plus inserted elements; zero for [`DeltaType::Equal`].
    pub fn cost(&self) -> usize {
        match self.delta_type {
            DeltaType::Equal => 0,
            _ => self.original_len() + self.revised_len(),
        }
    }
}

/// Total number of deleted plus inserted elements in a script.
pub fn script_cost(changes: &[Change]) -> usize {
    changes.iter().map(Change::cost).sum()
}
