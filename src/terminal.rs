//! Terminal abstraction using crossterm

use std::io::{self, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, MouseEventKind,
    },
    execute, queue,
    style::{Attribute, Color as TermColor, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};

use crate::error::Result;
use crate::syntax::{Color, Style};

/// An input event the editor cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    ScrollUp,
    ScrollDown,
}

/// Terminal wrapper for cross-platform terminal I/O
pub struct Terminal {
    /// Terminal width in columns
    cols: u16,
    /// Terminal height in rows
    rows: u16,
}

impl Terminal {
    /// Create a new terminal instance and enter raw mode
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let (cols, rows) = terminal::size()?;

        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        Ok(Self { cols, rows })
    }

    /// Get terminal width
    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Get terminal height
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Clear the entire screen
    pub fn clear_screen(&mut self) -> Result<()> {
        queue!(io::stdout(), terminal::Clear(ClearType::All))?;
        Ok(())
    }

    /// Clear from cursor to end of line
    pub fn clear_to_eol(&mut self) -> Result<()> {
        queue!(io::stdout(), terminal::Clear(ClearType::UntilNewLine))?;
        Ok(())
    }

    /// Move cursor to position (0-indexed)
    pub fn move_cursor(&mut self, row: u16, col: u16) -> Result<()> {
        queue!(io::stdout(), cursor::MoveTo(col, row))?;
        Ok(())
    }

    /// Write a string at current cursor position
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        queue!(io::stdout(), Print(s))?;
        Ok(())
    }

    /// Flush output buffer to terminal
    pub fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    /// Set cursor visibility
    pub fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        if visible {
            queue!(io::stdout(), cursor::Show)?;
        } else {
            queue!(io::stdout(), cursor::Hide)?;
        }
        Ok(())
    }

    /// Wait up to `timeout` for an input event
    ///
    /// Resizes update the cached size before being returned. Mouse events
    /// other than wheel scrolling are dropped.
    pub fn read_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let event = match event::read()? {
            Event::Key(key) => Some(InputEvent::Key(key)),
            Event::Resize(cols, rows) => {
                self.cols = cols;
                self.rows = rows;
                Some(InputEvent::Resize(cols, rows))
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => Some(InputEvent::ScrollUp),
                MouseEventKind::ScrollDown => Some(InputEvent::ScrollDown),
                _ => None,
            },
            _ => None,
        };
        Ok(event)
    }

    /// Set colours and attributes for following output
    pub fn apply_style(&mut self, style: Style) -> Result<()> {
        let mut out = io::stdout();
        queue!(
            out,
            SetAttribute(Attribute::Reset),
            SetForegroundColor(term_color(style.fg)),
            SetBackgroundColor(term_color(style.bg))
        )?;
        if style.bold {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        if style.italic {
            queue!(out, SetAttribute(Attribute::Italic))?;
        }
        if style.reverse {
            queue!(out, SetAttribute(Attribute::Reverse))?;
        }
        Ok(())
    }

    /// Reset all attributes
    pub fn reset_attributes(&mut self) -> Result<()> {
        queue!(io::stdout(), SetAttribute(Attribute::Reset))?;
        Ok(())
    }

    /// Sound the bell
    pub fn beep(&mut self) -> Result<()> {
        queue!(io::stdout(), Print('\x07'))?;
        self.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = execute!(
            io::stdout(),
            SetAttribute(Attribute::Reset),
            cursor::Show,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

fn term_color(color: Color) -> TermColor {
    match color {
        Color::Default => TermColor::Reset,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::White => TermColor::Grey,
        Color::BrightBlack => TermColor::DarkGrey,
        Color::BrightRed => TermColor::Red,
        Color::BrightGreen => TermColor::Green,
        Color::BrightYellow => TermColor::Yellow,
        Color::BrightBlue => TermColor::Blue,
        Color::BrightMagenta => TermColor::Magenta,
        Color::BrightCyan => TermColor::Cyan,
        Color::BrightWhite => TermColor::White,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_mapping() {
        assert_eq!(term_color(Color::Default), TermColor::Reset);
        assert_eq!(term_color(Color::BrightBlack), TermColor::DarkGrey);
        assert_eq!(
            term_color(Color::Rgb(0x13, 0x22, 0x57)),
            TermColor::Rgb { r: 0x13, g: 0x22, b: 0x57 }
        );
    }
}
