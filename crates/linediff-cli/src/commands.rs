use std::fs;
use std::io::IsTerminal;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use tracing::debug;

use linediff::{
    diff_with, generate_unified_diff, patch, patch_fuzzy, read_lines, write_lines,
    ConflictMarkers, DiffOptions, UnifiedDiff, UnifiedDiffReader,
};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let options = load_options(cli.config.as_deref())?;
    match cli.command {
        Command::Diff(args) => cmd_diff(args, options),
        Command::Patch(args) => cmd_patch(args, options),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn load_options(path: Option<&Path>) -> anyhow::Result<DiffOptions> {
    let Some(path) = path else {
        return Ok(DiffOptions::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    let options: DiffOptions = toml::from_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!(path = %path.display(), ?options, "loaded options");
    Ok(options)
}

fn diff_options(args: &DiffArgs, mut options: DiffOptions) -> anyhow::Result<DiffOptions> {
    if let Some(context) = args.context {
        options.context_size = context;
    }
    if let Some(algorithm) = &args.algorithm {
        options.algorithm = algorithm.parse()?;
    }
    options.ignore_whitespace |= args.ignore_whitespace;
    Ok(options)
}

fn unified_lines(args: &DiffArgs, options: &DiffOptions) -> anyhow::Result<Vec<String>> {
    let original = read_lines(&args.old)
        .with_context(|| format!("cannot read {}", args.old.display()))?;
    let revised = read_lines(&args.new)
        .with_context(|| format!("cannot read {}", args.new.display()))?;
    let patch = diff_with(&original, &revised, options)?;
    let from = args.old.display().to_string();
    let to = args.new.display().to_string();
    Ok(generate_unified_diff(
        Some(from.as_str()),
        Some(to.as_str()),
        &original,
        &patch,
        options.context_size,
    ))
}

fn cmd_diff(args: DiffArgs, options: DiffOptions) -> anyhow::Result<()> {
    let options = diff_options(&args, options)?;
    let lines = unified_lines(&args, &options)?;
    if lines.is_empty() {
        debug!("files are identical");
        return Ok(());
    }
    let color = args.color && std::io::stdout().is_terminal();
    for line in &lines {
        if color {
            println!("{}", paint(line));
        } else {
            println!("{line}");
        }
    }
    Ok(())
}

fn paint(line: &str) -> colored::ColoredString {
    if line.starts_with("---") || line.starts_with("+++") {
        line.bold()
    } else if line.starts_with("@@") {
        line.cyan()
    } else if line.starts_with('+') {
        line.green()
    } else if line.starts_with('-') {
        line.red()
    } else {
        line.normal()
    }
}

fn apply_diff(args: &PatchArgs, options: &DiffOptions) -> anyhow::Result<Vec<String>> {
    let original = read_lines(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    let text = fs::read_to_string(&args.diff)
        .with_context(|| format!("cannot read {}", args.diff.display()))?;
    let document = UnifiedDiffReader::parse(&text)
        .with_context(|| format!("cannot parse {}", args.diff.display()))?;
    let Some(entry) = document.files.into_iter().next() else {
        bail!("{} contains no file entries", args.diff.display());
    };

    let mut file_patch = entry.patch;
    if args.conflict_markers || options.conflict_markers {
        file_patch = file_patch.with_conflict_policy(ConflictMarkers);
    }
    let fuzz = args.fuzz.unwrap_or(options.max_fuzz);
    let result = if fuzz > 0 {
        patch_fuzzy(&original, &file_patch, fuzz)?
    } else {
        patch(&original, &file_patch)?
    };
    eprintln!(
        "{} applied {} hunk(s) to {}",
        "✓".green().bold(),
        file_patch.len(),
        args.file.display().to_string().bold()
    );
    Ok(result)
}

fn cmd_patch(args: PatchArgs, options: DiffOptions) -> anyhow::Result<()> {
    let result = apply_diff(&args, &options)?;
    match &args.output {
        Some(path) => write_lines(path, &result)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => {
            for line in &result {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn inspect(path: &Path, compact: bool) -> anyhow::Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let document: UnifiedDiff = UnifiedDiffReader::parse(&text)
        .with_context(|| format!("cannot parse {}", path.display()))?;
    let json = if compact {
        serde_json::to_string(&document)?
    } else {
        serde_json::to_string_pretty(&document)?
    };
    Ok(json)
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    println!("{}", inspect(&args.diff, args.compact)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn diff_args(old: PathBuf, new: PathBuf) -> DiffArgs {
        DiffArgs {
            old,
            new,
            context: None,
            algorithm: None,
            ignore_whitespace: false,
            color: false,
        }
    }

    #[test]
    fn config_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("linediff.toml");
        fs::write(&config, "algorithm = \"myers-linear\"\ncontext_size = 1\nmax_fuzz = 2\n").unwrap();

        let options = load_options(Some(&config)).unwrap();
        assert_eq!(options.context_size, 1);
        assert_eq!(options.max_fuzz, 2);

        let mut args = diff_args("a".into(), "b".into());
        args.context = Some(4);
        args.algorithm = Some("patience".into());
        let options = diff_options(&args, options).unwrap();
        assert_eq!(options.context_size, 4);
        assert_eq!(options.algorithm, linediff::Algorithm::Patience);

        args.algorithm = Some("bogus".into());
        assert!(diff_options(&args, DiffOptions::default()).is_err());
    }

    #[test]
    fn bad_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("bad.toml");
        fs::write(&config, "context_size = \"many\"\n").unwrap();
        assert!(load_options(Some(&config)).is_err());
        assert!(load_options(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn diff_then_patch_then_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.txt");
        let new = dir.path().join("new.txt");
        fs::write(&old, "one\ntwo\nthree\n").unwrap();
        fs::write(&new, "one\n2\nthree\nfour\n").unwrap();

        let lines = unified_lines(&diff_args(old.clone(), new.clone()), &DiffOptions::default()).unwrap();
        assert!(lines[0].starts_with("--- "));
        assert!(lines.iter().any(|l| l == "-two"));
        assert!(lines.iter().any(|l| l == "+four"));

        let diff_file = dir.path().join("change.diff");
        write_lines(&diff_file, &lines).unwrap();
        let args = PatchArgs {
            file: old.clone(),
            diff: diff_file.clone(),
            fuzz: None,
            conflict_markers: false,
            output: Some(dir.path().join("out.txt")),
        };
        cmd_patch(args, DiffOptions::default()).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "one\n2\nthree\nfour\n");

        let json = inspect(&diff_file, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["files"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn patch_without_file_entries_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("t.txt");
        let diff_file = dir.path().join("empty.diff");
        fs::write(&target, "x\n").unwrap();
        fs::write(&diff_file, "just some prose\n").unwrap();
        let args = PatchArgs {
            file: target,
            diff: diff_file,
            fuzz: None,
            conflict_markers: false,
            output: None,
        };
        let err = apply_diff(&args, &DiffOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no file entries"));
    }

    #[test]
    fn conflicting_patch_with_markers() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("t.txt");
        let diff_file = dir.path().join("c.diff");
        fs::write(&target, "a\nz\nc\n").unwrap();
        fs::write(&diff_file, "--- t.txt\n+++ t.txt\n@@ -1,3 +1,3 @@\n a\n-b\n+B\n c\n").unwrap();

        let mut args = PatchArgs {
            file: target,
            diff: diff_file,
            fuzz: None,
            conflict_markers: false,
            output: None,
        };
        assert!(apply_diff(&args, &DiffOptions::default()).is_err());

        args.conflict_markers = true;
        let merged = apply_diff(&args, &DiffOptions::default()).unwrap();
        assert_eq!(merged[0], "<<<<<< HEAD");
    }
}
