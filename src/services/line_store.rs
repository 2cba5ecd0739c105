//! Ordered, mutable sequence of text lines.
//!
//! Each line keeps its own terminator, so [`LineStore::to_text`] reproduces
//! the input byte-for-byte for every line the engine did not touch. Lines the
//! engine creates use the file's dominant line ending.

use std::ops::Range;

const BOM: char = '\u{feff}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStore {
    lines: Vec<String>,
    newline: LineEnding,
    bom: bool,
}

impl LineStore {
    pub fn from_text(text: &str) -> Self {
        let (bom, body) = match text.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        Self {
            lines: body.split_inclusive('\n').map(str::to_string).collect(),
            newline: detect_line_ending(body),
            bom,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(String::len).sum::<usize>() + 3);
        if self.bom {
            out.push(BOM);
        }
        for line in &self.lines {
            out.push_str(line);
        }
        out
    }

    pub fn newline(&self) -> LineEnding {
        self.newline
    }

    /// Terminate `content` with the store's line ending.
    pub fn line(&self, content: impl AsRef<str>) -> String {
        format!("{}{}", content.as_ref(), self.newline.as_str())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Insert `new_lines` before `index` (`index == len()` appends).
    pub fn insert_lines(&mut self, index: usize, new_lines: Vec<String>) {
        if new_lines.is_empty() {
            return;
        }
        if index > 0 && index == self.lines.len() {
            self.terminate_last();
        }
        self.lines.splice(index..index, new_lines);
    }

    /// Remove `range` and return the removed lines.
    pub fn remove_range(&mut self, range: Range<usize>) -> Vec<String> {
        self.lines.drain(range).collect()
    }

    pub fn remove(&mut self, index: usize) -> String {
        self.lines.remove(index)
    }

    /// Replace `range` with `new_lines`.
    pub fn splice(&mut self, range: Range<usize>, new_lines: Vec<String>) {
        if range.start > 0 && range.end == self.lines.len() && !new_lines.is_empty() {
            self.terminate_at(range.start - 1);
        }
        self.lines.splice(range, new_lines);
    }

    fn terminate_last(&mut self) {
        if let Some(last) = self.lines.len().checked_sub(1) {
            self.terminate_at(last);
        }
    }

    fn terminate_at(&mut self, index: usize) {
        let newline = self.newline.as_str();
        if let Some(line) = self.lines.get_mut(index) {
            if !line.ends_with('\n') {
                line.push_str(newline);
            }
        }
    }
}

/// Majority vote over line terminators; ties and terminator-free text are LF.
fn detect_line_ending(text: &str) -> LineEnding {
    let bytes = text.as_bytes();
    let mut lf_count = 0usize;
    let mut crlf_count = 0usize;

    for (i, b) in bytes.iter().enumerate() {
        if *b != b'\n' {
            continue;
        }
        if i > 0 && bytes[i - 1] == b'\r' {
            crlf_count += 1;
        } else {
            lf_count += 1;
        }
    }

    if crlf_count > lf_count {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    }
}

/// Leading whitespace of `line`.
pub fn indent_of(line: &str) -> &str {
    let content = line.trim_end_matches(['\r', '\n']);
    &content[..content.len() - content.trim_start().len()]
}
