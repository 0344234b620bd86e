//! Diff, patch and unpatch entry points.

use tracing::debug;

use linediff_algo::{
    ignore_whitespace, DiffAlgorithm, DiffProgress, MyersDiff, MyersDiffWithLinearSpace,
    SimilarDiff,
};
use linediff_patch::{Chunk, ConflictMarkers, Patch};

use crate::error::{LinediffError, LinediffResult};
use crate::options::{Algorithm, DiffOptions};

/// Diff two sequences with the default Myers engine.
pub fn diff<T: Clone + PartialEq>(original: &[T], revised: &[T]) -> LinediffResult<Patch<T>> {
    diff_with_algorithm(original, revised, &MyersDiff::new(), None, false)
}

/// Diff two sequences with any engine, optionally reporting progress.
pub fn diff_with_algorithm<T, A>(
    original: &[T],
    revised: &[T],
    algorithm: &A,
    progress: Option<&mut dyn DiffProgress>,
    include_equal_parts: bool,
) -> LinediffResult<Patch<T>>
where
    T: Clone,
    A: DiffAlgorithm<T> + ?Sized,
{
    let changes = algorithm.compute_diff(original, revised, progress)?;
    Ok(Patch::generate(original, revised, &changes, include_equal_parts)?)
}

/// Diff lines as configured by `options`. The returned patch carries the
/// conflict policy the options ask for.
pub fn diff_with(
    original: &[String],
    revised: &[String],
    options: &DiffOptions,
) -> LinediffResult<Patch<String>> {
    let engine = engine(options)?;
    let patch = diff_with_algorithm(
        original,
        revised,
        engine.as_ref(),
        None,
        options.include_equal_parts,
    )?;
    debug!(
        algorithm = %options.algorithm,
        ignore_whitespace = options.ignore_whitespace,
        deltas = patch.len(),
        "lines diffed"
    );
    Ok(if options.conflict_markers {
        patch.with_conflict_policy(ConflictMarkers)
    } else {
        patch
    })
}

fn engine(options: &DiffOptions) -> LinediffResult<Box<dyn DiffAlgorithm<String>>> {
    let whitespace = ignore_whitespace::<String> as fn(&String, &String) -> bool;
    let engine: Box<dyn DiffAlgorithm<String>> = match (options.algorithm, options.ignore_whitespace) {
        (Algorithm::Myers, false) => Box::new(MyersDiff::<String>::new()),
        (Algorithm::Myers, true) => Box::new(MyersDiff::<String>::with_equalizer(whitespace)),
        (Algorithm::MyersLinear, false) => Box::new(MyersDiffWithLinearSpace::<String>::new()),
        (Algorithm::MyersLinear, true) => {
            Box::new(MyersDiffWithLinearSpace::<String>::with_equalizer(whitespace))
        }
        (Algorithm::Patience, false) => Box::new(SimilarDiff::patience()),
        (Algorithm::Patience, true) => {
            return Err(LinediffError::InvalidArgument(
                "the patience engine cannot ignore whitespace".into(),
            ));
        }
    };
    Ok(engine)
}

/// Diff two texts line by line.
pub fn diff_text(original: &str, revised: &str) -> LinediffResult<Patch<String>> {
    let original: Vec<String> = original.lines().map(str::to_string).collect();
    let revised: Vec<String> = revised.lines().map(str::to_string).collect();
    diff(&original, &revised)
}

/// Diff two strings character by character.
///
/// Each delta's chunks are joined into a single string, so a chunk holds at
/// most one element; positions stay character offsets.
pub fn diff_inline(original: &str, revised: &str) -> LinediffResult<Patch<String>> {
    let original: Vec<String> = original.chars().map(String::from).collect();
    let revised: Vec<String> = revised.chars().map(String::from).collect();
    let by_char = diff(&original, &revised)?;

    let mut patch = Patch::new();
    for delta in by_char.deltas() {
        let source = joined(delta.source());
        let target = joined(delta.target());
        patch.add_delta(delta.with_chunks(source, target)?);
    }
    Ok(patch)
}

fn joined(chunk: &Chunk<String>) -> Chunk<String> {
    let lines = if chunk.is_empty() {
        Vec::new()
    } else {
        vec![chunk.lines().concat()]
    };
    Chunk::new(chunk.position(), lines)
}

/// Apply `patch` to `original`.
pub fn patch<T: Clone + PartialEq>(original: &[T], patch: &Patch<T>) -> LinediffResult<Vec<T>> {
    Ok(patch.apply_to(original)?)
}

/// Apply `patch` to a sequence that may have drifted from the one it was
/// made for, ignoring up to `max_fuzz` elements at each end of a delta.
pub fn patch_fuzzy<T: Clone + PartialEq>(
    original: &[T],
    patch: &Patch<T>,
    max_fuzz: usize,
) -> LinediffResult<Vec<T>> {
    Ok(patch.apply_fuzzy(original, max_fuzz)?)
}

/// Undo `patch` on a sequence it was applied to.
pub fn unpatch<T: Clone + PartialEq>(revised: &[T], patch: &Patch<T>) -> LinediffResult<Vec<T>> {
    Ok(patch.restore(revised)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use linediff_algo::DeltaType;
    use linediff_patch::{Delta, PatchError, CONFLICT_HEAD};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn diff_patch_unpatch() {
        let original = strings(&["a", "b", "c", "d"]);
        let revised = strings(&["a", "x", "c", "d", "e"]);
        let p = diff(&original, &revised).unwrap();
        assert_eq!(p.count(DeltaType::Change), 1);
        assert_eq!(p.count(DeltaType::Insert), 1);
        assert_eq!(patch(&original, &p).unwrap(), revised);
        assert_eq!(unpatch(&revised, &p).unwrap(), original);
    }

    #[test]
    fn every_algorithm_round_trips() {
        let original = strings(&["fn main() {", "    foo();", "}", "", "fn foo() {}"]);
        let revised = strings(&["fn main() {", "    foo();", "    bar();", "}", "", "fn bar() {}"]);
        for algorithm in [Algorithm::Myers, Algorithm::MyersLinear, Algorithm::Patience] {
            let options = DiffOptions {
                algorithm,
                ..DiffOptions::default()
            };
            let p = diff_with(&original, &revised, &options).unwrap();
            assert_eq!(patch(&original, &p).unwrap(), revised, "{algorithm}");
        }
    }

    #[test]
    fn whitespace_insensitive_diff() {
        let original = strings(&["a  b", "c"]);
        let revised = strings(&[" a b ", "C"]);
        let options = DiffOptions {
            ignore_whitespace: true,
            ..DiffOptions::default()
        };
        let p = diff_with(&original, &revised, &options).unwrap();
        assert_eq!(p.len(), 1);
        assert_eq!(p.deltas()[0].source().position(), 1);

        let patience = DiffOptions {
            algorithm: Algorithm::Patience,
            ..options
        };
        assert!(matches!(
            diff_with(&original, &revised, &patience),
            Err(LinediffError::InvalidArgument(_))
        ));
    }

    #[test]
    fn equal_parts_option() {
        let original = strings(&["a", "b", "c"]);
        let revised = strings(&["a", "B", "c"]);
        let options = DiffOptions {
            include_equal_parts: true,
            ..DiffOptions::default()
        };
        let p = diff_with(&original, &revised, &options).unwrap();
        assert_eq!(p.count(DeltaType::Equal), 2);
        assert_eq!(p.count(DeltaType::Change), 1);
    }

    #[test]
    fn conflict_policy_follows_options() {
        let original = strings(&["a", "b", "c"]);
        let revised = strings(&["a", "B", "c"]);
        let drifted = strings(&["a", "z", "c"]);

        let failing = diff_with(&original, &revised, &DiffOptions::default()).unwrap();
        assert!(matches!(
            patch(&drifted, &failing),
            Err(LinediffError::Patch(PatchError::Conflict { position: 1, .. }))
        ));

        let options = DiffOptions {
            conflict_markers: true,
            ..DiffOptions::default()
        };
        let marking = diff_with(&original, &revised, &options).unwrap();
        let merged = patch(&drifted, &marking).unwrap();
        assert_eq!(merged[1], CONFLICT_HEAD);
    }

    #[test]
    fn fuzzy_patch_through_facade() {
        let original = strings(&["a", "b", "c", "d", "e"]);
        let revised = strings(&["a", "b", "X", "d", "e"]);
        let p = diff(&original, &revised).unwrap();
        let drifted = strings(&["new", "a", "b", "c", "d", "e"]);
        assert_eq!(
            patch_fuzzy(&drifted, &p, 0).unwrap(),
            strings(&["new", "a", "b", "X", "d", "e"])
        );
    }

    #[test]
    fn text_diff_splits_lines() {
        let p = diff_text("one\ntwo\nthree\n", "one\n2\nthree\n").unwrap();
        assert_eq!(p.len(), 1);
        let delta = &p.deltas()[0];
        assert_eq!(delta.source().lines(), strings(&["two"]));
        assert_eq!(delta.target().lines(), strings(&["2"]));
    }

    #[test]
    fn inline_diff_joins_characters() {
        let p = diff_inline("abcdef", "abXYef").unwrap();
        assert_eq!(p.len(), 1);
        let delta = &p.deltas()[0];
        assert_eq!(delta.delta_type(), DeltaType::Change);
        assert_eq!(delta.source().position(), 2);
        assert_eq!(delta.source().lines(), strings(&["cd"]));
        assert_eq!(delta.target().lines(), strings(&["XY"]));

        let insert = diff_inline("ac", "abc").unwrap();
        assert!(matches!(
            &insert.deltas()[0],
            Delta::Insert { source, target } if source.is_empty() && target.lines() == ["b"]
        ));
    }

    #[test]
    fn progress_reaches_custom_sinks() {
        struct Count(usize);
        impl DiffProgress for Count {
            fn diff_step(&mut self, _value: usize, _max: usize) {
                self.0 += 1;
            }
        }
        let mut count = Count(0);
        let a = strings(&["a", "b"]);
        let b = strings(&["b", "c"]);
        diff_with_algorithm(&a, &b, &MyersDiff::new(), Some(&mut count), false).unwrap();
        assert!(count.0 > 0);
    }
}
