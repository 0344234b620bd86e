//! Engine selection and diff options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LinediffError;

/// The engine used to compute an edit script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Myers' search keeping every path node; fastest for similar inputs.
    #[default]
    Myers,
    /// Myers' divide-and-conquer variant in linear space.
    MyersLinear,
    /// Patience diff via `similar`. Not minimal, and ignores custom equality.
    Patience,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Myers => "myers",
            Self::MyersLinear => "myers-linear",
            Self::Patience => "patience",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = LinediffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "myers" => Ok(Self::Myers),
            "myers-linear" => Ok(Self::MyersLinear),
            "patience" => Ok(Self::Patience),
            other => Err(LinediffError::InvalidArgument(format!(
                "unknown algorithm {other:?}, expected myers, myers-linear or patience"
            ))),
        }
    }
}

/// Options for diffing lines and writing or applying the result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    pub algorithm: Algorithm,
    /// Add [`Delta::Equal`](linediff_patch::Delta::Equal) entries for the
    /// unchanged runs.
    pub include_equal_parts: bool,
    /// Compare lines ignoring leading, trailing and repeated whitespace.
    pub ignore_whitespace: bool,
    pub context_size: usize,
    /// Elements each delta may ignore at either end when applied.
    pub max_fuzz: usize,
    /// Resolve conflicts with conflict markers instead of failing.
    pub conflict_markers: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Myers,
            include_equal_parts: false,
            ignore_whitespace: false,
            context_size: 3,
            max_fuzz: 0,
            conflict_markers: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_names() {
        for algorithm in [Algorithm::Myers, Algorithm::MyersLinear, Algorithm::Patience] {
            assert_eq!(algorithm.to_string().parse::<Algorithm>().unwrap(), algorithm);
        }
        assert!(matches!(
            "histogram".parse::<Algorithm>(),
            Err(LinediffError::InvalidArgument(_))
        ));
    }

    #[test]
    fn options_from_partial_toml() {
        let options: DiffOptions =
            toml::from_str("algorithm = \"myers-linear\"\ncontext_size = 5\n").unwrap();
        assert_eq!(options.algorithm, Algorithm::MyersLinear);
        assert_eq!(options.context_size, 5);
        assert_eq!(options.max_fuzz, 0);
        assert!(!options.conflict_markers);
    }

    #[test]
    fn options_json_round_trip() {
        let options = DiffOptions {
            algorithm: Algorithm::Patience,
            ignore_whitespace: true,
            ..DiffOptions::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"patience\""));
        let back: DiffOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}
