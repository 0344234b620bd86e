//! In-memory form of a (possibly multi-file) unified diff.

use serde::{Deserialize, Serialize};

use linediff_patch::Patch;

use crate::error::UnifiedDiffResult;

/// A parsed unified diff: free text before the first file, the file entries
/// and the text after the `--` separator (e.g. a mail signature).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedDiff {
    pub header: Option<String>,
    pub files: Vec<UnifiedDiffFile>,
    pub tail: Option<String>,
}

impl UnifiedDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_files(
        header: Option<String>,
        tail: Option<String>,
        files: Vec<UnifiedDiffFile>,
    ) -> Self {
        Self {
            header,
            files,
            tail,
        }
    }

    pub fn add_file(&mut self, file: UnifiedDiffFile) {
        self.files.push(file);
    }

    /// Apply the patch of the first file whose source path satisfies
    /// `find_file`. Without a matching file the lines are returned unchanged.
    pub fn apply_patch_to<F>(&self, find_file: F, original: &[String]) -> UnifiedDiffResult<Vec<String>>
    where
        F: Fn(Option<&str>) -> bool,
    {
        match self.files.iter().find(|f| find_file(f.from_file.as_deref())) {
            Some(file) => Ok(file.patch.apply_to(original)?),
            None => Ok(original.to_vec()),
        }
    }
}

/// How a binary file changed; the content itself is not part of the diff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryChange {
    Added,
    Deleted,
    Edited,
}

/// One file entry of a unified diff.
///
/// Paths are stored without their `a/`/`b/` prefixes; `/dev/null` is stored
/// as `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedDiffFile {
    pub diff_command: Option<String>,
    pub from_file: Option<String>,
    pub from_timestamp: Option<String>,
    pub to_file: Option<String>,
    pub to_timestamp: Option<String>,
    pub index: Option<String>,
    pub rename_from: Option<String>,
    pub rename_to: Option<String>,
    pub copy_from: Option<String>,
    pub copy_to: Option<String>,
    pub similarity_index: Option<u32>,
    pub old_mode: Option<String>,
    pub new_mode: Option<String>,
    pub new_file_mode: Option<String>,
    pub deleted_file_mode: Option<String>,
    pub binary: Option<BinaryChange>,
    pub no_newline_at_eof: bool,
    pub patch: Patch<String>,
}

impl UnifiedDiffFile {
    pub fn from_patch(
        from_file: Option<String>,
        to_file: Option<String>,
        patch: Patch<String>,
    ) -> Self {
        Self {
            from_file,
            to_file,
            patch,
            ..Self::default()
        }
    }

    /// Whether the entry carries anything besides its hunks.
    pub fn has_extended_header(&self) -> bool {
        self.diff_command.is_some()
            || self.index.is_some()
            || self.rename_from.is_some()
            || self.rename_to.is_some()
            || self.copy_from.is_some()
            || self.copy_to.is_some()
            || self.similarity_index.is_some()
            || self.old_mode.is_some()
            || self.new_mode.is_some()
            || self.new_file_mode.is_some()
            || self.deleted_file_mode.is_some()
            || self.binary.is_some()
    }
}
