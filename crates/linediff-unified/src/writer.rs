//! Renders [`UnifiedDiff`] documents as unified diff text.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use linediff_algo::DeltaType;
use linediff_patch::Delta;

use crate::document::{BinaryChange, UnifiedDiff, UnifiedDiffFile};
use crate::error::UnifiedDiffResult;
use crate::reader::{DEV_NULL, NO_NEWLINE_MARKER};

/// Output settings for unified diffs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Unchanged lines shown around each change.
    pub context_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self { context_size: 3 }
    }
}

/// Writes unified diff documents.
///
/// Context lines are not stored in a patch, so the writer asks
/// `original_lines` for the full original content of each file, keyed by the
/// file's source path. A file without a source path is a new file: it is
/// written against an empty original, without context and with `-0,0` as
/// the old side, and `original_lines` is not consulted for it.
#[derive(Clone, Debug, Default)]
pub struct UnifiedDiffWriter {
    config: WriterConfig,
}

impl UnifiedDiffWriter {
    pub fn new(config: WriterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    pub fn write<W, F>(&self, diff: &UnifiedDiff, original_lines: F, out: &mut W) -> UnifiedDiffResult<()>
    where
        W: Write,
        F: FnMut(Option<&str>) -> io::Result<Vec<String>>,
    {
        for line in self.render(diff, original_lines)? {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    pub fn to_string<F>(&self, diff: &UnifiedDiff, original_lines: F) -> UnifiedDiffResult<String>
    where
        F: FnMut(Option<&str>) -> io::Result<Vec<String>>,
    {
        let mut text = String::new();
        for line in self.render(diff, original_lines)? {
            text.push_str(&line);
            text.push('\n');
        }
        Ok(text)
    }

    fn render<F>(&self, diff: &UnifiedDiff, mut original_lines: F) -> UnifiedDiffResult<Vec<String>>
    where
        F: FnMut(Option<&str>) -> io::Result<Vec<String>>,
    {
        let mut out = Vec::new();
        if let Some(header) = &diff.header {
            out.extend(header.lines().map(str::to_string));
        }
        for file in &diff.files {
            write_file_header(file, &mut out);
            if has_changes(file.patch.deltas()) {
                let original = match file.from_file.as_deref() {
                    Some(path) => original_lines(Some(path))?,
                    None => Vec::new(),
                };
                let context = self.config.context_size;
                out.push(format!("--- {}", side_label(&file.from_file, &file.from_timestamp)));
                out.push(format!("+++ {}", side_label(&file.to_file, &file.to_timestamp)));
                let hunks = write_hunks(&original, file.patch.deltas(), context, &mut out);
                debug!(from = ?file.from_file, hunks, "file written");
                if file.no_newline_at_eof && reaches_end(&original, file.patch.deltas(), context) {
                    out.push(NO_NEWLINE_MARKER.to_string());
                }
            }
        }
        if let Some(tail) = &diff.tail {
            out.push("--".to_string());
            out.extend(tail.lines().map(str::to_string));
        }
        debug!(files = diff.files.len(), lines = out.len(), "rendered unified diff");
        Ok(out)
    }
}

fn has_changes<T>(deltas: &[Delta<T>]) -> bool {
    deltas.iter().any(|d| d.delta_type() != DeltaType::Equal)
}

/// Whether the last hunk ends on the last line of the file.
fn reaches_end<T>(original: &[T], deltas: &[Delta<T>], context: usize) -> bool {
    deltas
        .iter()
        .rev()
        .find(|d| d.delta_type() != DeltaType::Equal)
        .is_some_and(|last| last.source().end().saturating_add(context) >= original.len())
}

fn side_label(path: &Option<String>, timestamp: &Option<String>) -> String {
    let path = path.as_deref().unwrap_or(DEV_NULL);
    match timestamp {
        Some(stamp) => format!("{path}\t{stamp}"),
        None => path.to_string(),
    }
}

/// Extended header lines in the order git emits them.
fn write_file_header(file: &UnifiedDiffFile, out: &mut Vec<String>) {
    if let Some(command) = &file.diff_command {
        out.push(command.clone());
    }
    let keyed = [
        ("old mode", &file.old_mode),
        ("new mode", &file.new_mode),
        ("deleted file mode", &file.deleted_file_mode),
        ("new file mode", &file.new_file_mode),
    ];
    for (key, value) in keyed {
        if let Some(value) = value {
            out.push(format!("{key} {value}"));
        }
    }
    if let Some(similarity) = file.similarity_index {
        out.push(format!("similarity index {similarity}%"));
    }
    let keyed = [
        ("rename from", &file.rename_from),
        ("rename to", &file.rename_to),
        ("copy from", &file.copy_from),
        ("copy to", &file.copy_to),
        ("index", &file.index),
    ];
    for (key, value) in keyed {
        if let Some(value) = value {
            out.push(format!("{key} {value}"));
        }
    }

    let from = file.from_file.as_deref().unwrap_or_default();
    let to = file.to_file.as_deref().unwrap_or_default();
    match file.binary {
        Some(BinaryChange::Added) => {
            out.push(format!("Binary files {DEV_NULL} and b/{to} differ"));
        }
        Some(BinaryChange::Deleted) => {
            out.push(format!("Binary files a/{from} and {DEV_NULL} differ"));
        }
        Some(BinaryChange::Edited) => {
            out.push(format!("Binary files a/{from} and b/{to} differ"));
        }
        None => {}
    }
}

/// Render the hunks for `deltas` against `original` and return how many
/// were written.
///
/// Deltas whose gap is at most twice the context size share one hunk. Equal
/// deltas are skipped. A side without lines is written with the position it
/// follows (`-5,0` inserts after line 5, `-0,0` at the top).
pub(crate) fn write_hunks(
    original: &[String],
    deltas: &[Delta<String>],
    context: usize,
    out: &mut Vec<String>,
) -> usize {
    let changes: Vec<&Delta<String>> = deltas
        .iter()
        .filter(|d| d.delta_type() != DeltaType::Equal)
        .collect();

    let mut hunks = 0;
    let mut start = 0;
    while start < changes.len() {
        let mut end = start + 1;
        while end < changes.len()
            && changes[end - 1].source().end().saturating_add(context.saturating_mul(2))
                >= changes[end].source().position()
        {
            end += 1;
        }
        write_hunk(original, &changes[start..end], context, out);
        hunks += 1;
        start = end;
    }
    hunks
}

fn write_hunk(original: &[String], group: &[&Delta<String>], context: usize, out: &mut Vec<String>) {
    let (Some(first), Some(last)) = (group.first(), group.last()) else {
        return;
    };
    let mut body = Vec::new();
    let mut old_count = 0;
    let mut new_count = 0;

    let first_pos = first.source().position().min(original.len());
    let context_start = first_pos.saturating_sub(context);
    for line in &original[context_start..first_pos] {
        body.push(format!(" {line}"));
    }
    let leading = first_pos - context_start;
    old_count += leading;
    new_count += leading;

    for (idx, delta) in group.iter().enumerate() {
        if idx > 0 {
            let from = group[idx - 1].source().end().min(original.len());
            let to = delta.source().position().min(original.len()).max(from);
            for line in &original[from..to] {
                body.push(format!(" {line}"));
            }
            old_count += to - from;
            new_count += to - from;
        }
        for line in delta.source().lines() {
            body.push(format!("-{line}"));
        }
        for line in delta.target().lines() {
            body.push(format!("+{line}"));
        }
        old_count += delta.source().size();
        new_count += delta.target().size();
    }

    let trailing_start = last.source().end().min(original.len());
    let trailing_end = trailing_start.saturating_add(context).min(original.len());
    for line in &original[trailing_start..trailing_end] {
        body.push(format!(" {line}"));
    }
    old_count += trailing_end - trailing_start;
    new_count += trailing_end - trailing_start;

    let old_pos = context_start;
    let new_pos = first.target().position().saturating_sub(leading);
    out.push(format!(
        "@@ -{},{} +{},{} @@",
        header_start(old_pos, old_count),
        old_count,
        header_start(new_pos, new_count),
        new_count
    ));
    out.extend(body);
}

fn header_start(position: usize, count: usize) -> usize {
    if count == 0 {
        position
    } else {
        position + 1
    }
}
