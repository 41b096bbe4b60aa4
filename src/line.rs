//! Line representation and text operations

use unicode_width::UnicodeWidthChar;

/// A single line of text in a buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    /// The text content (without trailing newline)
    text: String,
}

/// Display width of `ch` when it starts at display column `col`
///
/// Tabs advance to the next multiple of `tab_width`; other characters use
/// their Unicode width, with control characters taking one column.
pub fn char_width(ch: char, col: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        tab_width - (col % tab_width)
    } else {
        UnicodeWidthChar::width(ch).unwrap_or(1)
    }
}

impl Line {
    /// Create a new empty line
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a line from a string
    pub fn from_string(s: String) -> Self {
        Self { text: s }
    }

    /// Get the text content
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Insert a character at byte position
    pub fn insert_char(&mut self, byte_pos: usize, ch: char) {
        self.text.insert(byte_pos, ch);
    }

    /// Insert text at byte position
    pub fn insert_str(&mut self, byte_pos: usize, s: &str) {
        self.text.insert_str(byte_pos, s);
    }

    /// Delete a range of bytes and return the deleted text
    pub fn delete_range(&mut self, start: usize, end: usize) -> String {
        let deleted: String = self.text[start..end].to_string();
        self.text.replace_range(start..end, "");
        deleted
    }

    /// Split the line at byte position, returning the remainder
    pub fn split_off(&mut self, byte_pos: usize) -> Line {
        let remainder = self.text.split_off(byte_pos);
        Line::from_string(remainder)
    }

    /// Append another line's content to this line
    pub fn append(&mut self, other: Line) {
        self.text.push_str(other.text());
    }

    /// Get byte position for a display column, clamped to the line end
    pub fn col_to_byte(&self, col: usize, tab_width: usize) -> usize {
        let mut current_col = 0;
        for (byte_idx, ch) in self.text.char_indices() {
            let width = char_width(ch, current_col, tab_width);
            if current_col + width > col {
                return byte_idx;
            }
            current_col += width;
        }
        self.text.len()
    }

    /// Get display column for a byte position
    pub fn byte_to_col(&self, byte_pos: usize, tab_width: usize) -> usize {
        let end = byte_pos.min(self.text.len());
        self.text[..end]
            .chars()
            .fold(0, |col, ch| col + char_width(ch, col, tab_width))
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        Self::from_string(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_delete() {
        let mut line = Line::from("int x;");
        line.insert_char(3, 'o');
        assert_eq!(line.text(), "into x;");
        assert_eq!(line.delete_range(3, 4), "o");
        assert_eq!(line.text(), "int x;");
        line.insert_str(0, "const ");
        assert_eq!(line.text(), "const int x;");
    }

    #[test]
    fn test_split_and_append() {
        let mut line = Line::from("hello world");
        let rest = line.split_off(5);
        assert_eq!(line.text(), "hello");
        assert_eq!(rest.text(), " world");
        line.append(rest);
        assert_eq!(line.text(), "hello world");
    }

    #[test]
    fn test_tab_expansion() {
        let line = Line::from("\tx\ty");
        assert_eq!(line.byte_to_col(1, 4), 4);
        assert_eq!(line.byte_to_col(2, 4), 5);
        assert_eq!(line.byte_to_col(3, 4), 8);
        assert_eq!(line.byte_to_col(4, 4), 9);
        assert_eq!(line.col_to_byte(2, 4), 0);
        assert_eq!(line.col_to_byte(4, 4), 1);
        assert_eq!(line.col_to_byte(99, 4), 4);
    }

    #[test]
    fn test_wide_chars() {
        let line = Line::from("a日b");
        assert_eq!(line.byte_to_col(1, 4), 1);
        assert_eq!(line.byte_to_col(4, 4), 3);
        assert_eq!(line.col_to_byte(2, 4), 1);
        assert_eq!(line.col_to_byte(3, 4), 4);
    }
}
