//! Line-oriented reader for unified diffs.
//!
//! Understands plain `diff -u` output as well as git-style diffs with
//! extended headers, binary markers, multiple files per document, a free-text
//! preamble (e.g. mail headers) and a `--` separated tail.

use std::io::BufRead;
use std::mem::{discriminant, Discriminant};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use linediff_patch::{Chunk, Delta};

use crate::document::{BinaryChange, UnifiedDiff, UnifiedDiffFile};
use crate::error::{UnifiedDiffError, UnifiedDiffResult};

/// Marker following a line that has no trailing newline.
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Path written for the missing side of an added or deleted file.
pub const DEV_NULL: &str = "/dev/null";

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^@@\s+-(?:(\d+)(?:,(\d+))?)\s+\+(?:(\d+)(?:,(\d+))?)\s+@@")
});
static DIFF_COMMAND: LazyLock<Regex> = LazyLock::new(|| compile(r"^diff\s"));
static INDEX: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^index\s[\da-zA-Z]+\.\.[\da-zA-Z]+(\s(\d+))?$"));
static SIMILARITY: LazyLock<Regex> = LazyLock::new(|| compile(r"^similarity index (\d+)%$"));
static RENAME_FROM: LazyLock<Regex> = LazyLock::new(|| compile(r"^rename\sfrom\s(.+)$"));
static RENAME_TO: LazyLock<Regex> = LazyLock::new(|| compile(r"^rename\sto\s(.+)$"));
static COPY_FROM: LazyLock<Regex> = LazyLock::new(|| compile(r"^copy\sfrom\s(.+)$"));
static COPY_TO: LazyLock<Regex> = LazyLock::new(|| compile(r"^copy\sto\s(.+)$"));
static OLD_MODE: LazyLock<Regex> = LazyLock::new(|| compile(r"^old\smode\s(\d+)"));
static NEW_MODE: LazyLock<Regex> = LazyLock::new(|| compile(r"^new\smode\s(\d+)"));
static NEW_FILE_MODE: LazyLock<Regex> = LazyLock::new(|| compile(r"^new\sfile\smode\s(\d+)"));
static DELETED_FILE_MODE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^deleted\sfile\smode\s(\d+)"));
static BINARY_ADDED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^Binary\sfiles\s/dev/null\sand\sb/(.+)\sdiffer"));
static BINARY_DELETED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^Binary\sfiles\sa/(.+)\sand\s/dev/null\sdiffer"));
static BINARY_EDITED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^Binary\sfiles\sa/(.+)\sand\sb/(.+)\sdiffer"));
static FROM_FILE: LazyLock<Regex> = LazyLock::new(|| compile(r"^---\s"));
static TO_FILE: LazyLock<Regex> = LazyLock::new(|| compile(r"^\+\+\+\s"));
static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}\.\d{3,})(?: [+-]\d+)?")
});
static PATH_PREFIX: LazyLock<Regex> = LazyLock::new(|| compile(r"^(a|b|old|new)/"));

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => panic!("invalid built-in pattern {pattern:?}: {e}"),
    }
}

/// Hunk ranges as written in an `@@ -a,b +c,d @@` header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HunkHeader {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
}

impl HunkHeader {
    /// Parse a hunk header line. Omitted counts default to 1; anything
    /// after the closing `@@` (a section heading) is ignored.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = HUNK_HEADER.captures(line)?;
        let number = |i: usize, default: usize| -> Option<usize> {
            match caps.get(i) {
                Some(m) => m.as_str().parse().ok(),
                None => Some(default),
            }
        };
        Some(Self {
            old_start: number(1, 1)?,
            old_count: number(2, 1)?,
            new_start: number(3, 1)?,
            new_count: number(4, 1)?,
        })
    }
}

/// Zero-based position of one side of a hunk. A side without lines sits
/// after line `start`, so its position is `start` itself.
pub(crate) fn side_position(start: usize, has_lines: bool) -> usize {
    if has_lines {
        start.saturating_sub(1)
    } else {
        start
    }
}

/// One recognised line of a file header.
#[derive(Debug)]
enum FileLine {
    DiffCommand(String),
    Index(String),
    Similarity(u32),
    RenameFrom(String),
    RenameTo(String),
    CopyFrom(String),
    CopyTo(String),
    OldMode(String),
    NewMode(String),
    NewFileMode(String),
    DeletedFileMode(String),
    Binary(BinaryChange, Option<String>, Option<String>),
    FromFile(Option<String>, Option<String>),
    ToFile(Option<String>, Option<String>),
}

impl FileLine {
    fn classify(line: &str) -> Option<Self> {
        fn first_group(re: &Regex, line: &str) -> Option<String> {
            re.captures(line)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        }
        let capture = |re: &Regex| first_group(re, line);

        if DIFF_COMMAND.is_match(line) {
            return Some(Self::DiffCommand(line.to_string()));
        }
        if INDEX.is_match(line) {
            return Some(Self::Index(line.get(6..).unwrap_or_default().to_string()));
        }
        if let Some(value) = capture(&*SIMILARITY) {
            return value.parse().ok().map(Self::Similarity);
        }
        if let Some(value) = capture(&*RENAME_FROM) {
            return Some(Self::RenameFrom(value));
        }
        if let Some(value) = capture(&*RENAME_TO) {
            return Some(Self::RenameTo(value));
        }
        if let Some(value) = capture(&*COPY_FROM) {
            return Some(Self::CopyFrom(value));
        }
        if let Some(value) = capture(&*COPY_TO) {
            return Some(Self::CopyTo(value));
        }
        if let Some(value) = capture(&*OLD_MODE) {
            return Some(Self::OldMode(value));
        }
        if let Some(value) = capture(&*NEW_MODE) {
            return Some(Self::NewMode(value));
        }
        if let Some(value) = capture(&*NEW_FILE_MODE) {
            return Some(Self::NewFileMode(value));
        }
        if let Some(value) = capture(&*DELETED_FILE_MODE) {
            return Some(Self::DeletedFileMode(value));
        }
        if let Some(to) = capture(&*BINARY_ADDED) {
            return Some(Self::Binary(BinaryChange::Added, None, Some(to)));
        }
        if let Some(from) = capture(&*BINARY_DELETED) {
            return Some(Self::Binary(BinaryChange::Deleted, Some(from), None));
        }
        if let Some(caps) = BINARY_EDITED.captures(line) {
            let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
            return Some(Self::Binary(BinaryChange::Edited, group(1), group(2)));
        }
        if FROM_FILE.is_match(line) {
            return Some(Self::FromFile(file_name(line), timestamp(line)));
        }
        if TO_FILE.is_match(line) {
            return Some(Self::ToFile(file_name(line), timestamp(line)));
        }
        None
    }

    /// Copy the line's information into `file`.
    fn apply(self, file: &mut UnifiedDiffFile) {
        match self {
            Self::DiffCommand(command) => {
                let tokens: Vec<&str> = command.split(' ').collect();
                if let (Some(&from), Some(&to)) = (tokens.get(2), tokens.get(3)) {
                    file.from_file = Some(from.strip_prefix("a/").unwrap_or(from).to_string());
                    file.to_file = Some(to.strip_prefix("b/").unwrap_or(to).to_string());
                }
                file.diff_command = Some(command);
            }
            Self::Index(value) => file.index = Some(value),
            Self::Similarity(value) => file.similarity_index = Some(value),
            Self::RenameFrom(value) => file.rename_from = Some(value),
            Self::RenameTo(value) => file.rename_to = Some(value),
            Self::CopyFrom(value) => file.copy_from = Some(value),
            Self::CopyTo(value) => file.copy_to = Some(value),
            Self::OldMode(value) => file.old_mode = Some(value),
            Self::NewMode(value) => file.new_mode = Some(value),
            Self::NewFileMode(value) => file.new_file_mode = Some(value),
            Self::DeletedFileMode(value) => file.deleted_file_mode = Some(value),
            Self::Binary(change, from, to) => {
                file.binary = Some(change);
                file.from_file = from;
                file.to_file = to;
            }
            Self::FromFile(name, stamp) => {
                file.from_file = name;
                file.from_timestamp = stamp;
            }
            Self::ToFile(name, stamp) => {
                file.to_file = name;
                file.to_timestamp = stamp;
            }
        }
    }
}

/// Path from a `---`/`+++` line: the timestamp and anything after a tab are
/// dropped, as is an `a/`, `b/`, `old/` or `new/` prefix.
fn file_name(line: &str) -> Option<String> {
    let without_stamp = match TIMESTAMP.find(line) {
        Some(m) => &line[..m.start()],
        None => line,
    };
    let name = without_stamp.split('\t').next().unwrap_or_default();
    let name = name.get(4..).unwrap_or_default();
    let name = PATH_PREFIX.replace(name, "");
    let name = name.trim();
    (name != DEV_NULL).then(|| name.to_string())
}

fn timestamp(line: &str) -> Option<String> {
    if let Some(m) = TIMESTAMP.find(line) {
        return Some(m.as_str().to_string());
    }
    line.split_once('\t')
        .map(|(_, stamp)| stamp.trim())
        .filter(|stamp| !stamp.is_empty())
        .map(str::to_string)
}

/// Lines of one hunk collected so far.
#[derive(Debug)]
struct HunkBuilder {
    header_line: usize,
    header: HunkHeader,
    original: Vec<String>,
    revised: Vec<String>,
    removed_at: Vec<usize>,
    added_at: Vec<usize>,
    old_seen: usize,
    new_seen: usize,
}

impl HunkBuilder {
    fn new(header_line: usize, header: HunkHeader) -> Self {
        Self {
            header_line,
            header,
            original: Vec::new(),
            revised: Vec::new(),
            removed_at: Vec::new(),
            added_at: Vec::new(),
            old_seen: 0,
            new_seen: 0,
        }
    }

    fn old_first_line(&self) -> usize {
        self.header.old_start.max(1)
    }

    fn new_first_line(&self) -> usize {
        self.header.new_start.max(1)
    }

    fn context(&mut self, text: &str) {
        self.old_seen += 1;
        self.new_seen += 1;
        self.original.push(text.to_string());
        self.revised.push(text.to_string());
    }

    fn removed(&mut self, text: &str) {
        self.old_seen += 1;
        self.removed_at.push(self.old_first_line() - 1 + self.old_seen);
        self.original.push(text.to_string());
    }

    fn added(&mut self, text: &str) {
        self.new_seen += 1;
        self.added_at.push(self.new_first_line() - 1 + self.new_seen);
        self.revised.push(text.to_string());
    }

    fn is_complete(&self) -> bool {
        let header = &self.header;
        (self.original.len() == header.old_count && self.revised.len() == header.new_count)
            || (header.old_count == 0
                && header.new_count == 0
                && self.original.len() == self.old_first_line()
                && self.revised.len() == self.new_first_line())
    }

    fn into_delta(self) -> UnifiedDiffResult<Option<Delta<String>>> {
        if self.original.is_empty() && self.revised.is_empty() {
            return Ok(None);
        }
        let source = Chunk::with_change_positions(
            side_position(self.header.old_start, !self.original.is_empty()),
            self.original,
            self.removed_at,
        );
        let target = Chunk::with_change_positions(
            side_position(self.header.new_start, !self.revised.is_empty()),
            self.revised,
            self.added_at,
        );
        Ok(Some(Delta::change(source, target)?))
    }
}

#[derive(Debug)]
enum State {
    /// Free text before the first file.
    Preamble,
    /// Inside a file header, before its first hunk.
    FileHeader,
    Hunk(HunkBuilder),
    /// Between hunks of a file.
    AfterHunk,
    /// After the `--` separator.
    Tail,
}

/// Reads unified diff text into a [`UnifiedDiff`].
#[derive(Debug)]
pub struct UnifiedDiffReader {
    diff: UnifiedDiff,
    state: State,
    preamble: Vec<String>,
    tail: Option<Vec<String>>,
    seen: Vec<Discriminant<FileLine>>,
}

impl UnifiedDiffReader {
    pub fn parse(input: &str) -> UnifiedDiffResult<UnifiedDiff> {
        let mut reader = Self::new();
        for (idx, line) in input.lines().enumerate() {
            reader.feed(idx + 1, line)?;
        }
        reader.finish()
    }

    pub fn parse_reader<R: BufRead>(mut input: R) -> UnifiedDiffResult<UnifiedDiff> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        Self::parse(&text)
    }

    fn new() -> Self {
        Self {
            diff: UnifiedDiff::new(),
            state: State::Preamble,
            preamble: Vec::new(),
            tail: None,
            seen: Vec::new(),
        }
    }

    fn feed(&mut self, line_number: usize, line: &str) -> UnifiedDiffResult<()> {
        match std::mem::replace(&mut self.state, State::Preamble) {
            State::Preamble => {
                self.state = State::Preamble;
                if self.start_hunk(line_number, line) {
                    return Ok(());
                }
                if let Some(file_line) = FileLine::classify(line) {
                    self.start_file();
                    self.header_line(file_line);
                    self.state = State::FileHeader;
                } else if self.diff.files.is_empty() {
                    self.preamble.push(line.to_string());
                } else {
                    debug!(line_number, "skipping text between files");
                }
            }
            State::FileHeader => {
                self.state = State::FileHeader;
                if self.start_hunk(line_number, line) {
                    return Ok(());
                }
                if is_tail_separator(line) {
                    self.start_tail();
                } else if let Some(file_line) = FileLine::classify(line) {
                    if matches!(file_line, FileLine::DiffCommand(_))
                        || self.seen.contains(&discriminant(&file_line))
                    {
                        self.start_file();
                    }
                    self.header_line(file_line);
                } else {
                    return Err(parse_error(
                        line_number,
                        line,
                        "expected file start line not found",
                    ));
                }
            }
            State::Hunk(mut hunk) => {
                if line == NO_NEWLINE_MARKER {
                    self.current_file().no_newline_at_eof = true;
                    self.state = State::Hunk(hunk);
                    return Ok(());
                }
                match line.chars().next() {
                    None => hunk.context(""),
                    Some(' ') => hunk.context(&line[1..]),
                    Some('-') => hunk.removed(&line[1..]),
                    Some('+') => hunk.added(&line[1..]),
                    Some(_) => {
                        return Err(parse_error(line_number, line, "expected hunk line"));
                    }
                }
                if hunk.is_complete() {
                    if let Some(delta) = hunk.into_delta()? {
                        self.current_file().patch.add_delta(delta);
                    }
                    self.state = State::AfterHunk;
                } else {
                    self.state = State::Hunk(hunk);
                }
            }
            State::AfterHunk => {
                self.state = State::AfterHunk;
                if line == NO_NEWLINE_MARKER {
                    self.current_file().no_newline_at_eof = true;
                } else if self.start_hunk(line_number, line) {
                    return Ok(());
                } else if is_tail_separator(line) {
                    self.start_tail();
                } else if let Some(file_line) = FileLine::classify(line) {
                    self.start_file();
                    self.header_line(file_line);
                    self.state = State::FileHeader;
                } else {
                    debug!(line_number, "skipping text between files");
                }
            }
            State::Tail => {
                self.state = State::Tail;
                if let Some(tail) = self.tail.as_mut() {
                    tail.push(line.to_string());
                }
            }
        }
        Ok(())
    }

    fn finish(mut self) -> UnifiedDiffResult<UnifiedDiff> {
        if let State::Hunk(hunk) = &self.state {
            return Err(UnifiedDiffError::UnexpectedEof {
                line_number: hunk.header_line,
            });
        }
        if !self.preamble.is_empty() {
            let mut header = self.preamble.join("\n");
            header.push('\n');
            self.diff.header = Some(header);
        }
        self.diff.tail = self.tail.map(|lines| lines.join("\n"));
        debug!(files = self.diff.files.len(), "parsed unified diff");
        Ok(self.diff)
    }

    /// Begin a hunk if `line` is a hunk header. A hunk without any file
    /// header gets an anonymous file entry.
    fn start_hunk(&mut self, line_number: usize, line: &str) -> bool {
        let Some(header) = HunkHeader::parse(line) else {
            return false;
        };
        if self.diff.files.is_empty() {
            self.start_file();
        }
        trace!(line_number, ?header, "hunk header");
        self.state = State::Hunk(HunkBuilder::new(line_number, header));
        true
    }

    fn start_file(&mut self) {
        self.seen.clear();
        self.diff.add_file(UnifiedDiffFile::default());
    }

    fn start_tail(&mut self) {
        self.tail = Some(Vec::new());
        self.state = State::Tail;
    }

    fn header_line(&mut self, file_line: FileLine) {
        trace!(?file_line, "file header line");
        self.seen.push(discriminant(&file_line));
        file_line.apply(self.current_file());
    }

    fn current_file(&mut self) -> &mut UnifiedDiffFile {
        if self.diff.files.is_empty() {
            self.diff.add_file(UnifiedDiffFile::default());
        }
        let last = self.diff.files.len() - 1;
        &mut self.diff.files[last]
    }
}

fn is_tail_separator(line: &str) -> bool {
    line.starts_with("--") && !line.starts_with("---")
}

fn parse_error(line_number: usize, line: &str, reason: &str) -> UnifiedDiffError {
    UnifiedDiffError::Parse {
        line_number,
        line: line.to_string(),
        reason: reason.to_string(),
    }
}
