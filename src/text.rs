//! Splitting text into individually animated pieces.

use unicode_segmentation::UnicodeSegmentation;

/// Splits text into animation targets
pub trait TextSplitter {
    /// Visible characters (grapheme clusters), whitespace excluded
    fn chars(&self, text: &str) -> Vec<String>;
    /// Lines no wider than `width` columns, broken between words
    fn lines(&self, text: &str, width: usize) -> Vec<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GraphemeSplitter;

impl TextSplitter for GraphemeSplitter {
    fn chars(&self, text: &str) -> Vec<String> {
        text.graphemes(true)
            .filter(|g| !g.trim().is_empty())
            .map(String::from)
            .collect()
    }

    fn lines(&self, text: &str, width: usize) -> Vec<String> {
        let width = width.max(1);
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for word in text.split_whitespace() {
            let len = word.graphemes(true).count();
            if current_len > 0 && current_len + 1 + len > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += len;
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

/// Positions of the visible characters of `text` laid out on one line,
/// as column offsets
pub fn char_columns(text: &str) -> Vec<usize> {
    text.graphemes(true)
        .enumerate()
        .filter(|(_, g)| !g.trim().is_empty())
        .map(|(column, _)| column)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chars_skip_whitespace_and_keep_graphemes() {
        let chars = GraphemeSplitter.chars("Ax e\u{301}");
        assert_eq!(chars, vec!["A", "x", "e\u{301}"]);
    }

    #[test]
    fn char_columns_match_chars() {
        assert_eq!(char_columns("Ax e"), vec![0, 1, 3]);
        assert_eq!(char_columns("Ax e").len(), GraphemeSplitter.chars("Ax e").len());
    }

    #[test]
    fn lines_wrap_between_words() {
        let lines = GraphemeSplitter.lines("forged steel head on an ash haft", 12);
        assert_eq!(lines, vec!["forged steel", "head on an", "ash haft"]);
    }

    #[test]
    fn overlong_words_get_their_own_line() {
        let lines = GraphemeSplitter.lines("a supercalifragilistic b", 5);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(GraphemeSplitter.lines("   ", 10).is_empty());
    }
}
