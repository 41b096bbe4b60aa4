//! Display rendering
//!
//! Screen layout, top to bottom: text rows (with the gutter on the left),
//! the mode line, the console pane when shown, and the minibuffer.

use crate::buffer::Buffer;
use crate::console::{Console, ConsoleKind};
use crate::error::Result;
use crate::gutter::GutterRenderer;
use crate::line::char_width;
use crate::syntax::{Color, Style, StyledRun, Theme, TokenCategory};
use crate::terminal::Terminal;
use crate::window::Window;

/// Rows assigned to each screen area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub text_rows: u16,
    pub mode_line: u16,
    pub console_top: u16,
    pub console_rows: u16,
    pub minibuffer: u16,
}

impl Layout {
    pub fn compute(rows: u16, console_height: u16) -> Self {
        let minibuffer = rows.saturating_sub(1);
        let console_rows = console_height.min(rows.saturating_sub(3));
        let console_top = minibuffer - console_rows;
        let mode_line = console_top.saturating_sub(1);
        Self {
            text_rows: mode_line,
            mode_line,
            console_top,
            console_rows,
            minibuffer,
        }
    }
}

/// Everything one frame draws from
pub struct Frame<'a> {
    pub buffer: &'a Buffer,
    pub window: &'a Window,
    /// None while line numbers are hidden
    pub gutter: Option<&'a GutterRenderer>,
    pub console: &'a Console,
    pub layout: Layout,
    pub tab_width: usize,
    /// Minibuffer prompt and input while reading a reply
    pub prompt: Option<(&'a str, &'a str)>,
}

/// Display state
pub struct Display {
    /// Whether a full redraw is needed
    needs_redraw: bool,
    /// Message to show in minibuffer (bottom line)
    message: Option<String>,
}

impl Display {
    pub fn new() -> Self {
        Self {
            needs_redraw: true,
            message: None,
        }
    }

    /// Mark that a full redraw is needed
    pub fn force_redraw(&mut self) {
        self.needs_redraw = true;
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    #[cfg(test)]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Render the editor display
    pub fn render(&mut self, terminal: &mut Terminal, frame: &Frame) -> Result<()> {
        let cols = terminal.cols() as usize;
        let theme = frame.buffer.tags().theme();

        terminal.set_cursor_visible(false)?;
        if self.needs_redraw {
            terminal.apply_style(theme.base)?;
            terminal.clear_screen()?;
        }

        self.render_text(terminal, frame, cols)?;
        self.render_mode_line(terminal, frame, cols)?;
        self.render_console(terminal, frame, cols)?;
        let prompt_col = self.render_minibuffer(terminal, frame, cols)?;

        match prompt_col {
            Some(col) => terminal.move_cursor(frame.layout.minibuffer, col)?,
            None => self.position_cursor(terminal, frame, cols)?,
        }

        terminal.reset_attributes()?;
        terminal.set_cursor_visible(true)?;
        terminal.flush()?;

        self.needs_redraw = false;
        Ok(())
    }

    fn render_text(&self, terminal: &mut Terminal, frame: &Frame, cols: usize) -> Result<()> {
        let buffer = frame.buffer;
        let window = frame.window;
        let theme = buffer.tags().theme();
        let gutter_width = gutter_width(frame.gutter);
        let text_cols = cols.saturating_sub(gutter_width);

        for row_offset in 0..window.height() {
            let screen_row = window.top_row() + row_offset;
            let line_idx = window.top_line() + row_offset as usize;
            terminal.move_cursor(screen_row, 0)?;

            if let Some(gutter) = frame.gutter {
                let label = gutter
                    .labels()
                    .iter()
                    .find(|l| l.row == screen_row)
                    .map(|l| format!("{:>width$} ", l.line_number, width = gutter_width - 1))
                    .unwrap_or_else(|| " ".repeat(gutter_width));
                terminal.apply_style(theme.gutter)?;
                terminal.write_str(&label)?;
            }

            if let (Some(line), Some(start)) = (buffer.line(line_idx), buffer.line_start(line_idx)) {
                let runs = buffer.tags().runs(start, line.len());
                for (category, text) in layout_line(line.text(), &runs, frame.tab_width, text_cols) {
                    let style = match category {
                        Some(category) => theme.style(category).over(theme.base),
                        None => theme.base,
                    };
                    terminal.apply_style(style)?;
                    terminal.write_str(&text)?;
                }
            }

            terminal.apply_style(theme.base)?;
            terminal.clear_to_eol()?;
        }

        Ok(())
    }

    /// Render the mode line
    fn render_mode_line(&self, terminal: &mut Terminal, frame: &Frame, cols: usize) -> Result<()> {
        let buffer = frame.buffer;
        let window = frame.window;
        terminal.move_cursor(frame.layout.mode_line, 0)?;
        let mut style = buffer.tags().theme().base;
        style.reverse = true;
        terminal.apply_style(style)?;

        let modified = if buffer.is_modified() { "**" } else { "--" };
        let filename = buffer
            .filename()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "no file".to_string());
        let col = buffer
            .line(window.cursor_line())
            .map(|l| l.byte_to_col(window.cursor_col(), frame.tab_width))
            .unwrap_or(0);

        // Format: -- SpurC: name (file) L1 C1 -- Length: N chars --
        let mode_line = format!(
            "{}- SpurC: {} ({}) L{} C{} -- Length: {} chars ",
            modified,
            buffer.name(),
            filename,
            window.cursor_line() + 1,
            col + 1,
            buffer.char_count(),
        );

        terminal.write_str(&pad_to_width(&mode_line, cols, '-'))?;
        Ok(())
    }

    fn render_console(&self, terminal: &mut Terminal, frame: &Frame, cols: usize) -> Result<()> {
        let rows = frame.layout.console_rows;
        if rows == 0 {
            return Ok(());
        }
        let theme = frame.buffer.tags().theme();
        let lines: Vec<_> = frame.console.tail(rows as usize).collect();

        for row in 0..rows {
            terminal.move_cursor(frame.layout.console_top + row, 0)?;
            terminal.apply_style(theme.base)?;
            if let Some(line) = lines.get(row as usize) {
                terminal.apply_style(console_style(theme, line.kind))?;
                terminal.write_str(&truncate_to_width(&line.text, cols))?;
            }
            terminal.clear_to_eol()?;
        }
        Ok(())
    }

    /// Render the minibuffer; returns the cursor column while prompting
    fn render_minibuffer(
        &self,
        terminal: &mut Terminal,
        frame: &Frame,
        cols: usize,
    ) -> Result<Option<u16>> {
        terminal.move_cursor(frame.layout.minibuffer, 0)?;
        terminal.reset_attributes()?;

        let (text, prompting) = match (frame.prompt, &self.message) {
            (Some((prompt, input)), _) => (format!("{}{}", prompt, input), true),
            (None, Some(msg)) => (msg.clone(), false),
            (None, None) => (String::new(), false),
        };
        let shown = truncate_to_width(&text, cols);
        terminal.write_str(&shown)?;
        terminal.clear_to_eol()?;

        Ok(prompting.then(|| display_width(&shown).min(cols.saturating_sub(1)) as u16))
    }

    /// Position the hardware cursor at the correct location
    fn position_cursor(&self, terminal: &mut Terminal, frame: &Frame, cols: usize) -> Result<()> {
        let window = frame.window;
        let cursor_line = window.cursor_line();
        let display_col = frame
            .buffer
            .line(cursor_line)
            .map(|l| l.byte_to_col(window.cursor_col(), frame.tab_width))
            .unwrap_or(0);

        let screen_row = window
            .line_to_screen_row(cursor_line)
            .unwrap_or(window.top_row());
        let screen_col = (gutter_width(frame.gutter) + display_col).min(cols.saturating_sub(1));

        terminal.move_cursor(screen_row, screen_col as u16)?;
        Ok(())
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

/// Columns taken by the gutter: at least three digits plus a separator
pub fn gutter_width(gutter: Option<&GutterRenderer>) -> usize {
    gutter.map_or(0, |g| g.label_width().max(3) + 1)
}

fn console_style(theme: &Theme, kind: ConsoleKind) -> Style {
    let mut style = theme.base;
    match kind {
        ConsoleKind::Info => {}
        ConsoleKind::Success => style.fg = Color::BrightGreen,
        ConsoleKind::Error => style.fg = Color::BrightRed,
    }
    style
}

/// Cut a line into styled pieces that fit `max_cols`, expanding tabs
fn layout_line(
    text: &str,
    runs: &[StyledRun],
    tab_width: usize,
    max_cols: usize,
) -> Vec<(Option<TokenCategory>, String)> {
    let mut pieces = Vec::new();
    let mut col = 0;

    for run in runs {
        let Some(slice) = text.get(run.start..run.end) else {
            continue;
        };
        let mut piece = String::new();
        for ch in slice.chars() {
            let width = char_width(ch, col, tab_width);
            if col + width > max_cols {
                if !piece.is_empty() {
                    pieces.push((run.category, piece));
                }
                return pieces;
            }
            if ch == '\t' {
                piece.extend(std::iter::repeat(' ').take(width));
            } else if ch.is_control() {
                piece.push('?');
            } else {
                piece.push(ch);
            }
            col += width;
        }
        if !piece.is_empty() {
            pieces.push((run.category, piece));
        }
    }

    pieces
}

fn display_width(s: &str) -> usize {
    s.chars()
        .map(|ch| unicode_width::UnicodeWidthChar::width(ch).unwrap_or(1))
        .sum()
}

/// Pad with `fill` or truncate to exactly `width` columns
fn pad_to_width(s: &str, width: usize, fill: char) -> String {
    let mut result = truncate_to_width(s, width);
    let used = display_width(&result);
    result.extend(std::iter::repeat(fill).take(width.saturating_sub(used)));
    result
}

/// Truncate a string to fit within a display width
fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut width = 0;

    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(1);
        if width + ch_width > max_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }

    result
}
