//! Buffer access - the capability interface the highlighting core runs against
//!
//! The tokenizer, highlight engine and gutter renderer never touch a
//! [`Buffer`] or [`Window`] directly. They see the text as one linear
//! sequence, add and clear tag ranges, and ask layout questions about the
//! viewport: which screen row shows the line holding a position, and where
//! the next line starts.

use crate::buffer::Buffer;
use crate::error::{EditorError, Result};
use crate::syntax::TokenCategory;
use crate::window::Window;

/// Text, tags and viewport layout as seen by the highlighting core
///
/// Positions are byte offsets into `text()` that fall on `char` boundaries;
/// line breaks count as one position each. Layout queries return an error
/// when the viewport can no longer answer (e.g. it was torn down mid-redraw).
pub trait BufferAccess {
    /// The full buffer content
    fn text(&self) -> String;

    /// Remove every range from a category's tag
    fn clear_tag_ranges(&mut self, category: TokenCategory);

    /// Add `[start, end)` to a category's tag
    fn add_tag_range(&mut self, category: TokenCategory, start: usize, end: usize);

    /// Position of the character under the viewport's top-left cell
    fn top_visible_position(&self) -> Result<usize>;

    /// Screen row of the line containing `position`, or None when that line
    /// is not currently laid out in the viewport
    fn line_offset_at(&self, position: usize) -> Result<Option<u16>>;

    /// First position of the line after the one containing `position`.
    /// Past the last line this is a position beyond the end of the text.
    fn next_line_start(&self, position: usize) -> Result<usize>;

    /// Zero-based index of the line containing `position`
    fn line_index_at(&self, position: usize) -> Result<usize>;
}

/// A buffer seen through the window currently displaying it
pub struct ViewAccess<'a> {
    buffer: &'a mut Buffer,
    window: &'a Window,
}

impl<'a> ViewAccess<'a> {
    pub fn new(buffer: &'a mut Buffer, window: &'a Window) -> Self {
        Self { buffer, window }
    }
}

impl BufferAccess for ViewAccess<'_> {
    fn text(&self) -> String {
        self.buffer.text()
    }

    fn clear_tag_ranges(&mut self, category: TokenCategory) {
        self.buffer.tags_mut().clear(category);
    }

    fn add_tag_range(&mut self, category: TokenCategory, start: usize, end: usize) {
        self.buffer.tags_mut().add(category, start, end);
    }

    fn top_visible_position(&self) -> Result<usize> {
        let top = self
            .window
            .top_line()
            .min(self.buffer.line_count().saturating_sub(1));
        self.buffer
            .line_start(top)
            .ok_or(EditorError::ViewportUnavailable)
    }

    fn line_offset_at(&self, position: usize) -> Result<Option<u16>> {
        Ok(self
            .buffer
            .line_at(position)
            .and_then(|line| self.window.line_to_screen_row(line)))
    }

    fn next_line_start(&self, position: usize) -> Result<usize> {
        let past_end = self.buffer.text_len() + 1;
        let next = self
            .buffer
            .line_at(position)
            .and_then(|line| self.buffer.line_start(line + 1));
        Ok(next.unwrap_or(past_end.max(position + 1)))
    }

    fn line_index_at(&self, position: usize) -> Result<usize> {
        self.buffer
            .line_at(position)
            .ok_or(EditorError::ViewportUnavailable)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! An in-memory [`BufferAccess`] with a fixed-height viewport

    use std::cell::Cell;

    use super::*;
    use crate::syntax::TagTable;

    pub struct FakeAccess {
        text: String,
        line_starts: Vec<usize>,
        pub tags: TagTable,
        /// Every `add_tag_range` call in order
        pub tag_log: Vec<(TokenCategory, usize, usize)>,
        /// Every `clear_tag_ranges` call in order
        pub cleared: Vec<TokenCategory>,
        pub top_line: usize,
        pub height: usize,
        /// Layout queries succeed this many times, then fail
        pub fail_after: Option<usize>,
        queries: Cell<usize>,
    }

    impl FakeAccess {
        pub fn new(text: &str) -> Self {
            let mut access = Self {
                text: String::new(),
                line_starts: Vec::new(),
                tags: TagTable::default(),
                tag_log: Vec::new(),
                cleared: Vec::new(),
                top_line: 0,
                height: 24,
                fail_after: None,
                queries: Cell::new(0),
            };
            access.set_text(text);
            access
        }

        pub fn set_text(&mut self, text: &str) {
            self.text = text.to_string();
            self.line_starts = std::iter::once(0)
                .chain(text.match_indices('\n').map(|(i, _)| i + 1))
                .collect();
        }

        fn query(&self) -> Result<()> {
            let n = self.queries.get();
            self.queries.set(n + 1);
            match self.fail_after {
                Some(limit) if n >= limit => Err(EditorError::ViewportUnavailable),
                _ => Ok(()),
            }
        }

        fn line_at(&self, position: usize) -> Option<usize> {
            if position > self.text.len() {
                return None;
            }
            Some(self.line_starts.partition_point(|&start| start <= position) - 1)
        }
    }

    impl BufferAccess for FakeAccess {
        fn text(&self) -> String {
            self.text.clone()
        }

        fn clear_tag_ranges(&mut self, category: TokenCategory) {
            self.cleared.push(category);
            self.tags.clear(category);
        }

        fn add_tag_range(&mut self, category: TokenCategory, start: usize, end: usize) {
            self.tag_log.push((category, start, end));
            self.tags.add(category, start, end);
        }

        fn top_visible_position(&self) -> Result<usize> {
            self.query()?;
            Ok(self.line_starts[self.top_line.min(self.line_starts.len() - 1)])
        }

        fn line_offset_at(&self, position: usize) -> Result<Option<u16>> {
            self.query()?;
            Ok(self.line_at(position).and_then(|line| {
                (line >= self.top_line && line < self.top_line + self.height)
                    .then(|| (line - self.top_line) as u16)
            }))
        }

        fn next_line_start(&self, position: usize) -> Result<usize> {
            self.query()?;
            let next = self
                .line_at(position)
                .and_then(|line| self.line_starts.get(line + 1).copied());
            Ok(next.unwrap_or(self.text.len() + 1))
        }

        fn line_index_at(&self, position: usize) -> Result<usize> {
            self.query()?;
            self.line_at(position).ok_or(EditorError::ViewportUnavailable)
        }
    }
}
