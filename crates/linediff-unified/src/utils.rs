//! Single-file helpers: render one patch as unified diff lines and read such
//! lines back into a patch.

use linediff_patch::{Chunk, Delta, Patch};

use crate::error::UnifiedDiffResult;
use crate::reader::{side_position, HunkHeader, DEV_NULL};
use crate::writer::write_hunks;

/// Unified diff lines for `patch`, with `---`/`+++` headers naming the two
/// sides (`None` is written as `/dev/null`). An empty patch yields no lines.
pub fn generate_unified_diff(
    from_file: Option<&str>,
    to_file: Option<&str>,
    original: &[String],
    patch: &Patch<String>,
    context_size: usize,
) -> Vec<String> {
    let mut out = Vec::new();
    write_hunks(original, patch.deltas(), context_size, &mut out);
    if out.is_empty() {
        return out;
    }
    let mut lines = Vec::with_capacity(out.len() + 2);
    lines.push(format!("--- {}", from_file.unwrap_or(DEV_NULL)));
    lines.push(format!("+++ {}", to_file.unwrap_or(DEV_NULL)));
    lines.extend(out);
    lines
}

/// Parse the hunks of a single-file unified diff into a patch.
///
/// Lenient: everything up to the `+++` line is skipped, hunk counts are not
/// checked and lines with an unknown tag (such as the no-newline marker) are
/// ignored. An empty line counts as empty context.
pub fn parse_unified_diff<S: AsRef<str>>(lines: &[S]) -> UnifiedDiffResult<Patch<String>> {
    let mut patch = Patch::new();
    let mut in_prelude = true;
    let mut hunk: Option<RawHunk> = None;

    for line in lines.iter().map(AsRef::as_ref) {
        if in_prelude {
            in_prelude = !line.starts_with("+++");
            continue;
        }
        if let Some(header) = HunkHeader::parse(line) {
            if let Some(done) = hunk.take() {
                done.finish(&mut patch)?;
            }
            hunk = Some(RawHunk::new(header));
            continue;
        }
        let Some(current) = hunk.as_mut() else {
            continue;
        };
        match line.chars().next() {
            None => current.push(' ', ""),
            Some(tag @ (' ' | '-' | '+')) => current.push(tag, &line[1..]),
            Some(_) => {}
        }
    }
    if let Some(done) = hunk {
        done.finish(&mut patch)?;
    }
    Ok(patch)
}

struct RawHunk {
    header: HunkHeader,
    lines: Vec<(char, String)>,
}

impl RawHunk {
    fn new(header: HunkHeader) -> Self {
        Self {
            header,
            lines: Vec::new(),
        }
    }

    fn push(&mut self, tag: char, text: &str) {
        self.lines.push((tag, text.to_string()));
    }

    fn finish(self, patch: &mut Patch<String>) -> UnifiedDiffResult<()> {
        if self.lines.is_empty() {
            return Ok(());
        }
        let old_first = self.header.old_start.max(1);
        let new_first = self.header.new_start.max(1);
        let mut original = Vec::new();
        let mut revised = Vec::new();
        let mut removed_at = Vec::new();
        let mut added_at = Vec::new();
        for (tag, text) in self.lines {
            match tag {
                '-' => {
                    original.push(text);
                    removed_at.push(old_first - 1 + original.len());
                }
                '+' => {
                    revised.push(text);
                    added_at.push(new_first - 1 + revised.len());
                }
                _ => {
                    original.push(text.clone());
                    revised.push(text);
                }
            }
        }
        let source = Chunk::with_change_positions(
            side_position(self.header.old_start, !original.is_empty()),
            original,
            removed_at,
        );
        let target = Chunk::with_change_positions(
            side_position(self.header.new_start, !revised.is_empty()),
            revised,
            added_at,
        );
        patch.add_delta(Delta::change(source, target)?);
        Ok(())
    }
}
