//! Reading and writing files as lists of lines.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::LinediffResult;

/// Read a text file into lines, without their line terminators.
pub fn read_lines(path: impl AsRef<Path>) -> LinediffResult<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    debug!(path = %path.display(), lines = lines.len(), "read lines");
    Ok(lines)
}

/// Write lines to a file, each followed by `\n`.
pub fn write_lines<S: AsRef<str>>(path: impl AsRef<Path>, lines: &[S]) -> LinediffResult<()> {
    let path = path.as_ref();
    let mut text = String::new();
    for line in lines {
        text.push_str(line.as_ref());
        text.push('\n');
    }
    fs::write(path, text)?;
    debug!(path = %path.display(), lines = lines.len(), "wrote lines");
    Ok(())
}
