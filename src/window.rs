//! Window representation - the viewport into the buffer

/// Scroll geometry of a window; any change is a viewport change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportKey {
    pub top_line: usize,
    pub top_row: u16,
    pub height: u16,
}

/// A window displaying a portion of the buffer
#[derive(Debug)]
pub struct Window {
    /// First visible line in the window
    top_line: usize,
    /// Cursor line position (0-indexed)
    cursor_line: usize,
    /// Cursor column position (byte offset within line)
    cursor_col: usize,
    /// Row on screen where window starts
    top_row: u16,
    /// Number of text rows in window (excluding status line)
    height: u16,
    /// Goal column for vertical movement
    goal_col: usize,
}

impl Window {
    /// Create a new window
    pub fn new(top_row: u16, height: u16) -> Self {
        Self {
            top_line: 0,
            cursor_line: 0,
            cursor_col: 0,
            top_row,
            height,
            goal_col: 0,
        }
    }

    /// Reset scroll and cursor (after loading new content)
    pub fn reset(&mut self) {
        self.top_line = 0;
        self.cursor_line = 0;
        self.cursor_col = 0;
        self.goal_col = 0;
    }

    /// Current scroll geometry
    pub fn viewport(&self) -> ViewportKey {
        ViewportKey {
            top_line: self.top_line,
            top_row: self.top_row,
            height: self.height,
        }
    }

    /// Get the top visible line
    pub fn top_line(&self) -> usize {
        self.top_line
    }

    /// Set the top visible line
    pub fn set_top_line(&mut self, line: usize) {
        self.top_line = line;
    }

    /// Get cursor line
    pub fn cursor_line(&self) -> usize {
        self.cursor_line
    }

    /// Get cursor column (byte offset)
    pub fn cursor_col(&self) -> usize {
        self.cursor_col
    }

    /// Set cursor position
    pub fn set_cursor(&mut self, line: usize, col: usize) {
        self.cursor_line = line;
        self.cursor_col = col;
    }

    /// Get the goal column for vertical movement
    pub fn goal_col(&self) -> usize {
        self.goal_col
    }

    /// Set the goal column
    pub fn set_goal_col(&mut self, col: usize) {
        self.goal_col = col;
    }

    /// Get top row on screen
    pub fn top_row(&self) -> u16 {
        self.top_row
    }

    /// Get window height in rows
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Set window height
    pub fn set_height(&mut self, height: u16) {
        self.height = height;
    }

    /// Check if a line is visible in the window
    pub fn is_line_visible(&self, line: usize) -> bool {
        line >= self.top_line && line < self.top_line + self.height as usize
    }

    /// Ensure cursor is visible, adjusting top_line if needed
    pub fn ensure_cursor_visible(&mut self) {
        if self.height == 0 {
            return;
        }
        if self.cursor_line < self.top_line {
            self.top_line = self.cursor_line;
        } else if self.cursor_line >= self.top_line + self.height as usize {
            self.top_line = self.cursor_line - self.height as usize + 1;
        }
    }

    /// Get the screen row for a buffer line (None if not visible)
    pub fn line_to_screen_row(&self, line: usize) -> Option<u16> {
        if self.is_line_visible(line) {
            Some(self.top_row + (line - self.top_line) as u16)
        } else {
            None
        }
    }

    /// Scroll down by n lines
    pub fn scroll_down(&mut self, n: usize, line_count: usize) {
        let new_top = self.top_line.saturating_add(n);
        self.top_line = new_top.min(line_count.saturating_sub(1));
        // Move cursor to stay in view
        if self.cursor_line < self.top_line {
            self.cursor_line = self.top_line;
            self.cursor_col = 0;
        }
    }

    /// Scroll up by n lines
    pub fn scroll_up(&mut self, n: usize) {
        self.top_line = self.top_line.saturating_sub(n);
        // Move cursor to stay in view
        let bottom = (self.top_line + self.height as usize).saturating_sub(1);
        if self.cursor_line > bottom {
            self.cursor_line = bottom;
            self.cursor_col = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_rows() {
        let mut window = Window::new(1, 3);
        window.set_top_line(10);
        assert_eq!(window.line_to_screen_row(9), None);
        assert_eq!(window.line_to_screen_row(10), Some(1));
        assert_eq!(window.line_to_screen_row(12), Some(3));
        assert_eq!(window.line_to_screen_row(13), None);
    }

    #[test]
    fn test_ensure_cursor_visible() {
        let mut window = Window::new(0, 5);
        window.set_cursor(12, 0);
        window.ensure_cursor_visible();
        assert_eq!(window.top_line(), 8);
        window.set_cursor(2, 0);
        window.ensure_cursor_visible();
        assert_eq!(window.top_line(), 2);
    }

    #[test]
    fn test_scroll_keeps_cursor_in_view() {
        let mut window = Window::new(0, 5);
        window.scroll_down(3, 100);
        assert_eq!(window.top_line(), 3);
        assert_eq!(window.cursor_line(), 3);
        window.scroll_down(500, 100);
        assert_eq!(window.top_line(), 99);

        window.scroll_up(90);
        assert_eq!(window.top_line(), 9);
        assert_eq!(window.cursor_line(), 13);
    }

    #[test]
    fn test_viewport_key_changes() {
        let mut window = Window::new(0, 5);
        let before = window.viewport();
        window.set_height(6);
        assert_ne!(before, window.viewport());
    }
}
