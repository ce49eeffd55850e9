use std::collections::HashSet;

/// Marks a comment line in requirement files.
pub const COMMENT_MARKER: char = '#';

/// An ordered, duplicate-free set of requirement lines.
///
/// Lines are trimmed on the way in. Blank lines and lines starting with `#`
/// are dropped, and a line already present is never added twice, so the
/// first occurrence fixes its position.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Requirements {
    lines: Vec<String>,
    seen: HashSet<String>,
}

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from multi-line text.
    pub fn from_text(text: &str) -> Self {
        let mut reqs = Self::new();
        reqs.extend_text(text);
        reqs
    }

    /// Adds a single line. Returns `true` if the line was new.
    pub fn push_line(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            return false;
        }
        if !self.seen.insert(line.to_string()) {
            return false;
        }
        self.lines.push(line.to_string());
        true
    }

    /// Adds every line of `text`, in order.
    pub fn extend_text(&mut self, text: &str) {
        for line in text.lines() {
            self.push_line(line);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// One line per requirement.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    /// All requirements on one line, ready to be passed as arguments.
    pub fn to_argument_string(&self) -> String {
        self.lines.join(" ")
    }
}

/// Appends the lines of `incoming` that `existing` does not have yet.
///
/// Both sides are trimmed line by line and comments are dropped. Lines
/// already in `existing` keep their order; new lines go to the end in the
/// order they appear in `incoming`.
pub fn merge(existing: &str, incoming: &str) -> String {
    let mut reqs = Requirements::from_text(existing);
    reqs.extend_text(incoming);
    reqs.to_text()
}

/// Collapses a requirement block to a single space-separated line.
///
/// Only whitespace is touched: each line is trimmed and blank lines are
/// skipped. No deduplication or comment handling happens here.
pub fn flatten(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
