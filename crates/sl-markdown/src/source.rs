//! Source files and line splitting.

use std::ops::Range;

/// A named document.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Display name, usually the path.
    pub name: String,
    /// Full document text.
    pub text: String,
}

impl SourceFile {
    /// Create a source file.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// The documents a world was parsed from, indexed by position.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file. Returns its index.
    pub fn add_file(&mut self, file: SourceFile) -> usize {
        self.files.push(file);
        self.files.len() - 1
    }

    /// Get a file by index.
    pub fn get_file(&self, index: usize) -> Option<&SourceFile> {
        self.files.get(index)
    }

    /// All files in load order.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }
}

/// One non-blank line of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number.
    pub number: usize,
    /// Byte offset of the first character of `text` in the document.
    pub offset: usize,
    /// Leading whitespace width; a tab counts as four columns.
    pub indent: usize,
    /// The line with surrounding whitespace removed.
    pub text: &'a str,
}

impl Line<'_> {
    /// Byte range of the trimmed text.
    pub fn span(&self) -> Range<usize> {
        self.offset..self.offset + self.text.len()
    }

    /// Whether this line is a markdown heading of exactly `level` hashes.
    pub fn heading(&self, level: usize) -> Option<&str> {
        let hashes = self.text.chars().take_while(|c| *c == '#').count();
        if hashes != level {
            return None;
        }
        let rest = &self.text[level..];
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            Some(rest.trim())
        } else {
            None
        }
    }
}

/// Split a document into its non-blank lines.
pub fn split_lines(text: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for (index, raw) in text.split('\n').enumerate() {
        let line_start = offset;
        offset += raw.len() + 1;

        let content = raw.trim_end_matches(['\r', ' ', '\t']);
        let trimmed = content.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        let lead = &content[..content.len() - trimmed.len()];
        let indent = lead.chars().map(|c| if c == '\t' { 4 } else { 1 }).sum();
        lines.push(Line {
            number: index + 1,
            offset: line_start + lead.len(),
            indent,
            text: trimmed,
        });
    }
    lines
}

/// Strip a leading list marker (`- `, `* `, `+ `).
pub fn strip_bullet(text: &str) -> &str {
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = text.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    if text == "-" || text == "*" {
        return "";
    }
    text
}

/// Split a numbered list line (`1. text`, `2) text`) into its number and text.
pub fn strip_number(text: &str) -> Option<(u32, &str)> {
    let digits = text.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &text[digits..];
    let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let number = text[..digits].parse().ok()?;
    Some((number, rest.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_measures_indent() {
        let text = "## Scene: Office\n\n- Desk (X)\n  - Locket\n\t- Tabbed\n";
        let lines = split_lines(text);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[1].text, "- Desk (X)");
        assert_eq!(lines[2].indent, 2);
        assert_eq!(lines[3].indent, 4);
        assert_eq!(&text[lines[2].span()], "- Locket");
    }

    #[test]
    fn handles_crlf() {
        let lines = split_lines("### Items\r\n- Key\r\n");
        assert_eq!(lines[0].text, "### Items");
        assert_eq!(lines[1].text, "- Key");
    }

    #[test]
    fn heading_levels() {
        let lines = split_lines("## Scene: Office\n### Items\n#### Locket\n##NoSpace");
        assert_eq!(lines[0].heading(2), Some("Scene: Office"));
        assert_eq!(lines[0].heading(3), None);
        assert_eq!(lines[1].heading(3), Some("Items"));
        assert_eq!(lines[2].heading(3), None);
        assert_eq!(lines[3].heading(2), None);
    }

    #[test]
    fn list_markers() {
        assert_eq!(strip_bullet("- Brass Key"), "Brass Key");
        assert_eq!(strip_bullet("Brass Key"), "Brass Key");
        assert_eq!(strip_number("2. Got anything?"), Some((2, "Got anything?")));
        assert_eq!(strip_number("10) Bye"), Some((10, "Bye")));
        assert_eq!(strip_number("3.5 apples"), None);
        assert_eq!(strip_number("Hello"), None);
    }
}
