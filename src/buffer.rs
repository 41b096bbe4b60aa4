//! Buffer representation - a collection of lines with associated metadata
//!
//! Besides line-oriented editing, a buffer exposes its content as one linear
//! text (lines joined by `\n`) and maps positions in that text back to
//! lines. It also owns the style tags that highlighting writes into.
//!
//! Every edit records how to revert itself. Commands are separated by undo
//! boundaries, and `undo` reverts everything back to the last boundary.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{EditorError, Result};
use crate::line::Line;
use crate::syntax::TagTable;

/// Recorded edits kept for undo
const MAX_UNDO_STEPS: usize = 10_000;

/// The edit that reverts one recorded change
#[derive(Debug, Clone, PartialEq, Eq)]
enum UndoStep {
    /// Separates the changes of two commands
    Boundary,
    /// Remove `start..end` from a line
    Remove { line: usize, start: usize, end: usize },
    /// Put deleted text back into a line
    Restore { line: usize, pos: usize, text: String },
    /// Split a line that an edit joined
    Split { line: usize, pos: usize },
    /// Join a line with the next one
    Join { line: usize },
}

/// A buffer containing text and metadata
#[derive(Debug)]
pub struct Buffer {
    /// Lines of text
    lines: Vec<Line>,
    /// Buffer name (e.g., "main.cpp", "*scratch*")
    name: String,
    /// Associated file path (None for unnamed buffers)
    filename: Option<PathBuf>,
    /// Whether buffer has unsaved changes
    modified: bool,
    /// Bumped on every content change
    revision: u64,
    /// Style tags painted over the text
    tags: TagTable,
    /// Reverting edits, newest last
    undo: VecDeque<UndoStep>,
}

impl Buffer {
    /// Create a new empty buffer with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            lines: vec![Line::new()], // Always have at least one line
            name: name.into(),
            filename: None,
            modified: false,
            revision: 0,
            tags: TagTable::default(),
            undo: VecDeque::new(),
        }
    }

    /// Create a buffer holding `content`
    pub fn from_content(name: impl Into<String>, content: &str) -> Self {
        let mut buffer = Self::new(name);
        buffer.lines = split_lines(content);
        buffer
    }

    /// Create a buffer from file contents, refusing files over `max_size` bytes
    pub fn from_file(path: &Path, max_size: u64) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .map_err(|_| EditorError::FileNotFound(path.display().to_string()))?;
        if metadata.len() > max_size {
            debug!(path = %path.display(), size = metadata.len(), "refusing large file");
            return Err(EditorError::FileTooLarge { limit: max_size });
        }

        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());

        let mut buffer = Self::from_content(name, &content);
        buffer.filename = Some(path.to_path_buf());
        debug!(path = %path.display(), bytes = content.len(), "loaded file");
        Ok(buffer)
    }

    /// Replace the whole content, forgetting undo history
    #[cfg(test)]
    pub fn set_content(&mut self, content: &str) {
        self.lines = split_lines(content);
        self.undo.clear();
        self.touch();
    }

    /// Get buffer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get filename if set
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Set the filename (and the buffer name with it)
    pub fn set_filename(&mut self, path: PathBuf) {
        if let Some(name) = path.file_name() {
            self.name = name.to_string_lossy().into_owned();
        }
        self.filename = Some(path);
    }

    /// Check if buffer is modified
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Content revision, bumped on every edit
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn tags(&self) -> &TagTable {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagTable {
        &mut self.tags
    }

    /// Get number of lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get a line by index
    pub fn line(&self, idx: usize) -> Option<&Line> {
        self.lines.get(idx)
    }

    /// The full content as one text, lines joined by `\n`
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.text_len());
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(line.text());
        }
        text
    }

    /// Length of `text()` in bytes
    pub fn text_len(&self) -> usize {
        self.lines.iter().map(Line::len).sum::<usize>() + self.lines.len() - 1
    }

    /// Number of characters in `text()`
    pub fn char_count(&self) -> usize {
        self.lines.iter().map(|l| l.text().chars().count()).sum::<usize>() + self.lines.len() - 1
    }

    /// Offset in `text()` where a line starts
    pub fn line_start(&self, idx: usize) -> Option<usize> {
        if idx >= self.lines.len() {
            return None;
        }
        Some(self.lines[..idx].iter().map(|l| l.len() + 1).sum())
    }

    /// Index of the line containing a position in `text()`
    ///
    /// A line's trailing `\n` belongs to it, and the end of the text belongs
    /// to the last line. Positions past the end have no line.
    pub fn line_at(&self, position: usize) -> Option<usize> {
        let mut start = 0;
        for (idx, line) in self.lines.iter().enumerate() {
            let end = start + line.len();
            if position <= end {
                return Some(idx);
            }
            start = end + 1;
        }
        None
    }

    /// Insert a character at position
    pub fn insert_char(&mut self, line_idx: usize, byte_pos: usize, ch: char) {
        if let Some(line) = self.lines.get_mut(line_idx) {
            line.insert_char(byte_pos, ch);
            self.record(UndoStep::Remove {
                line: line_idx,
                start: byte_pos,
                end: byte_pos + ch.len_utf8(),
            });
            self.touch();
        }
    }

    /// Insert a newline, splitting the current line
    pub fn insert_newline(&mut self, line_idx: usize, byte_pos: usize) {
        if let Some(line) = self.lines.get_mut(line_idx) {
            let new_line = line.split_off(byte_pos);
            self.lines.insert(line_idx + 1, new_line);
            self.record(UndoStep::Join { line: line_idx });
            self.touch();
        }
    }

    /// Delete a character at position, returns the deleted char
    pub fn delete_char(&mut self, line_idx: usize, byte_pos: usize) -> Option<char> {
        let line = self.lines.get_mut(line_idx)?;
        let ch = line.text().get(byte_pos..)?.chars().next()?;
        line.delete_range(byte_pos, byte_pos + ch.len_utf8());
        self.record(UndoStep::Restore {
            line: line_idx,
            pos: byte_pos,
            text: ch.to_string(),
        });
        self.touch();
        Some(ch)
    }

    /// Delete backward (backspace), returns deleted char and new position
    pub fn delete_backward(&mut self, line_idx: usize, byte_pos: usize) -> Option<(char, usize)> {
        if byte_pos == 0 {
            return None;
        }
        let line = self.lines.get_mut(line_idx)?;
        let ch = line.text().get(..byte_pos)?.chars().last()?;
        let new_pos = byte_pos - ch.len_utf8();
        line.delete_range(new_pos, byte_pos);
        self.record(UndoStep::Restore {
            line: line_idx,
            pos: new_pos,
            text: ch.to_string(),
        });
        self.touch();
        Some((ch, new_pos))
    }

    /// Join line with the next line (delete newline at end of line)
    pub fn join_line(&mut self, line_idx: usize) -> bool {
        if line_idx + 1 < self.lines.len() {
            let next_line = self.lines.remove(line_idx + 1);
            let pos = self.lines[line_idx].len();
            self.lines[line_idx].append(next_line);
            self.record(UndoStep::Split { line: line_idx, pos });
            self.touch();
            return true;
        }
        false
    }

    /// Join with previous line (when backspacing at start of line)
    pub fn join_with_previous(&mut self, line_idx: usize) -> Option<usize> {
        if line_idx == 0 || line_idx >= self.lines.len() {
            return None;
        }
        let current_line = self.lines.remove(line_idx);
        let prev_line = &mut self.lines[line_idx - 1];
        let join_pos = prev_line.len();
        prev_line.append(current_line);
        self.record(UndoStep::Split {
            line: line_idx - 1,
            pos: join_pos,
        });
        self.touch();
        Some(join_pos)
    }

    /// Delete from position to end of line; at end of line, join the next
    pub fn kill_to_eol(&mut self, line_idx: usize, byte_pos: usize) -> Option<String> {
        let line_len = self.lines.get(line_idx)?.len();
        if byte_pos < line_len {
            let killed = self.lines[line_idx].delete_range(byte_pos, line_len);
            self.record(UndoStep::Restore {
                line: line_idx,
                pos: byte_pos,
                text: killed.clone(),
            });
            self.touch();
            Some(killed)
        } else if self.join_line(line_idx) {
            Some("\n".to_string())
        } else {
            None
        }
    }

    /// Write buffer to its file
    pub fn save(&mut self) -> Result<()> {
        let path = self.filename.clone().ok_or(EditorError::NoFileName)?;
        self.write_to(&path)?;
        self.modified = false;
        debug!(path = %path.display(), "saved buffer");
        Ok(())
    }

    /// Write buffer to specific path
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.text())?;
        Ok(())
    }

    /// Close the current undo group; later edits undo separately
    pub fn add_undo_boundary(&mut self) {
        if !matches!(self.undo.back(), None | Some(UndoStep::Boundary)) {
            self.undo.push_back(UndoStep::Boundary);
        }
    }

    /// Revert the edits back to the last boundary
    ///
    /// Returns where the cursor belongs afterwards, or None when there was
    /// nothing to undo. An undo is itself an edit: it bumps the revision.
    pub fn undo(&mut self) -> Option<(usize, usize)> {
        while self.undo.back() == Some(&UndoStep::Boundary) {
            self.undo.pop_back();
        }
        let mut cursor = None;
        while let Some(step) = self.undo.pop_back() {
            if step == UndoStep::Boundary {
                break;
            }
            cursor = Some(self.revert(step));
        }
        if cursor.is_some() {
            debug!(revision = self.revision + 1, "undo");
            self.touch();
        }
        cursor
    }

    fn revert(&mut self, step: UndoStep) -> (usize, usize) {
        match step {
            UndoStep::Boundary => {}
            UndoStep::Remove { line, start, end } => {
                if let Some(l) = self.lines.get_mut(line) {
                    l.delete_range(start, end);
                }
                return (line, start);
            }
            UndoStep::Restore { line, pos, text } => {
                if let Some(l) = self.lines.get_mut(line) {
                    l.insert_str(pos, &text);
                }
                return (line, pos + text.len());
            }
            UndoStep::Split { line, pos } => {
                if let Some(l) = self.lines.get_mut(line) {
                    let rest = l.split_off(pos);
                    self.lines.insert(line + 1, rest);
                }
                return (line, pos);
            }
            UndoStep::Join { line } => {
                if line + 1 < self.lines.len() {
                    let next = self.lines.remove(line + 1);
                    let pos = self.lines[line].len();
                    self.lines[line].append(next);
                    return (line, pos);
                }
            }
        }
        (0, 0)
    }

    fn record(&mut self, step: UndoStep) {
        self.undo.push_back(step);
        if self.undo.len() > MAX_UNDO_STEPS {
            self.undo.pop_front();
        }
    }

    fn touch(&mut self) {
        self.modified = true;
        self.revision += 1;
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new("*scratch*")
    }
}

/// Split text into lines on `\n`, dropping a `\r` before each break
fn split_lines(content: &str) -> Vec<Line> {
    content
        .split('\n')
        .map(|l| Line::from(l.strip_suffix('\r').unwrap_or(l)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = Buffer::new("x");
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.text(), "");
        assert_eq!(buf.text_len(), 0);
        assert_eq!(buf.line_at(0), Some(0));
        assert_eq!(buf.line_at(1), None);
    }

    #[test]
    fn test_text_roundtrip_keeps_trailing_newline() {
        let buf = Buffer::from_content("a.c", "int a;\r\nint b;\n");
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.text(), "int a;\nint b;\n");
        assert_eq!(buf.text_len(), buf.text().len());

        let wide = Buffer::from_content("b.c", "é\n日");
        assert_eq!(wide.char_count(), 3);
        assert_eq!(wide.text_len(), 6);
    }

    #[test]
    fn test_line_offsets() {
        let buf = Buffer::from_content("a.c", "ab\n\ncde");
        assert_eq!(buf.line_start(1), Some(3));
        assert_eq!(buf.line_start(2), Some(4));
        assert_eq!(buf.line_start(3), None);
        assert_eq!(buf.line_at(2), Some(0));
        assert_eq!(buf.line_at(3), Some(1));
        assert_eq!(buf.line_at(7), Some(2));
        assert_eq!(buf.line_at(8), None);
    }

    #[test]
    fn test_edits_bump_revision() {
        let mut buf = Buffer::new("x");
        let r0 = buf.revision();
        buf.insert_char(0, 0, 'a');
        buf.insert_newline(0, 1);
        buf.insert_char(1, 0, 'b');
        assert_eq!(buf.text(), "a\nb");
        assert!(buf.revision() > r0);
        assert!(buf.is_modified());

        assert_eq!(buf.join_with_previous(1), Some(1));
        assert_eq!(buf.text(), "ab");
        assert_eq!(buf.delete_backward(0, 2), Some(('b', 1)));
        assert_eq!(buf.delete_char(0, 0), Some('a'));
        assert_eq!(buf.delete_char(0, 0), None);
    }

    #[test]
    fn test_kill_to_eol_joins_at_end() {
        let mut buf = Buffer::from_content("x", "abc\ndef");
        assert_eq!(buf.kill_to_eol(0, 1).as_deref(), Some("bc"));
        assert_eq!(buf.kill_to_eol(0, 1).as_deref(), Some("\n"));
        assert_eq!(buf.text(), "adef");
        assert_eq!(buf.kill_to_eol(0, 4), None);
    }

    #[test]
    fn test_undo_reverts_one_group() {
        let mut buf = Buffer::from_content("x", "int a;\nint b;");
        buf.insert_char(0, 6, ' ');
        buf.insert_char(0, 7, 'x');
        buf.add_undo_boundary();
        buf.insert_newline(0, 3);
        assert_eq!(buf.text(), "int\n a; x\nint b;");

        let revision = buf.revision();
        assert_eq!(buf.undo(), Some((0, 3)));
        assert_eq!(buf.text(), "int a; x\nint b;");
        assert!(buf.revision() > revision);

        assert_eq!(buf.undo(), Some((0, 6)));
        assert_eq!(buf.text(), "int a;\nint b;");
        assert_eq!(buf.undo(), None);
    }

    #[test]
    fn test_undo_restores_deletions() {
        let mut buf = Buffer::from_content("x", "abc\ndéf");
        buf.kill_to_eol(0, 1);
        buf.kill_to_eol(0, 1);
        buf.add_undo_boundary();
        assert_eq!(buf.delete_backward(0, 4), Some(('é', 2)));
        buf.delete_char(0, 1);
        assert_eq!(buf.text(), "af");

        buf.undo();
        assert_eq!(buf.text(), "adéf");
        assert_eq!(buf.undo(), Some((0, 3)));
        assert_eq!(buf.text(), "abc\ndéf");
        assert_eq!(buf.line_count(), 2);
    }

    #[test]
    fn test_undo_splits_joined_lines() {
        let mut buf = Buffer::from_content("x", "one\ntwo\nthree");
        buf.join_with_previous(2);
        buf.add_undo_boundary();
        buf.join_line(0);
        assert_eq!(buf.text(), "onetwothree");
        buf.undo();
        buf.undo();
        assert_eq!(buf.text(), "one\ntwo\nthree");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.cpp");
        let mut buf = Buffer::from_content("main.cpp", "int main() {}\n");
        assert!(matches!(buf.save(), Err(EditorError::NoFileName)));

        buf.set_filename(path.clone());
        buf.insert_char(0, 0, ' ');
        buf.save().unwrap();
        assert!(!buf.is_modified());

        let loaded = Buffer::from_file(&path, 1024).unwrap();
        assert_eq!(loaded.text(), " int main() {}\n");
        assert_eq!(loaded.name(), "main.cpp");
    }

    #[test]
    fn test_refuses_large_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.c");
        std::fs::write(&path, "x".repeat(64)).unwrap();
        assert!(matches!(
            Buffer::from_file(&path, 32),
            Err(EditorError::FileTooLarge { limit: 32, .. })
        ));
        assert!(matches!(
            Buffer::from_file(&dir.path().join("missing.c"), 32),
            Err(EditorError::FileNotFound(_))
        ));
    }
}
