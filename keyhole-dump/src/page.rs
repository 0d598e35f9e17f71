//! Rendered dump pages.

use serde::{Deserialize, Serialize};

/// Marker appended to a page when the dump continues on the next press.
pub const MORE_MARKER: &str = "--more--";

/// One rendered dump page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    /// Dump title.
    pub title: String,
    /// Rendered lines, the column header first for table dumps.
    pub lines: Vec<String>,
    /// Whether the dump continues on the next invocation.
    pub more: bool,
}

impl Page {

    /// An empty page with a title.
    pub fn new(title: &str) -> Self {
        Page {
            title: title.to_string(),
            lines: Vec::new(),
            more: false,
        }
    }

    /// Append one line.
    pub fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    /// Render the page as text, with the continuation marker when the
    /// dump has more to show.
    pub fn text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        if self.more {
            out.push_str(MORE_MARKER);
            out.push('\n');
        }
        out
    }

}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn text_carries_the_continuation_marker() {
        let mut page = Page::new("process table");
        page.push("-nr-".to_string());
        page.more = true;
        let text = page.text();
        assert!(text.starts_with("process table\n"));
        assert!(text.ends_with("--more--\n"));

        page.more = false;
        assert!(!page.text().contains(MORE_MARKER));
    }

}
