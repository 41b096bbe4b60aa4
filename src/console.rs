//! Console pane - build and run output shown below the text

use std::collections::VecDeque;

/// Oldest lines are dropped past this many
const MAX_LINES: usize = 1000;

/// Rows the pane takes while shown
pub const CONSOLE_HEIGHT: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub kind: ConsoleKind,
    pub text: String,
}

#[derive(Debug)]
pub struct Console {
    lines: VecDeque<ConsoleLine>,
    visible: bool,
}

impl Console {
    pub fn new() -> Self {
        Self {
            lines: VecDeque::new(),
            visible: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the pane; returns the new visibility
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    /// Rows taken on screen
    pub fn height(&self) -> u16 {
        if self.visible {
            CONSOLE_HEIGHT
        } else {
            0
        }
    }

    /// Append text, one console line per line of `text`
    pub fn write(&mut self, kind: ConsoleKind, text: &str) {
        for line in text.lines() {
            self.lines.push_back(ConsoleLine {
                kind,
                text: line.to_string(),
            });
        }
        while self.lines.len() > MAX_LINES {
            self.lines.pop_front();
        }
    }

    pub fn info(&mut self, text: &str) {
        self.write(ConsoleKind::Info, text);
    }

    pub fn success(&mut self, text: &str) {
        self.write(ConsoleKind::Success, text);
    }

    pub fn error(&mut self, text: &str) {
        self.write(ConsoleKind::Error, text);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// The last `count` lines, oldest first
    pub fn tail(&self, count: usize) -> impl Iterator<Item = &ConsoleLine> {
        self.lines.iter().skip(self.lines.len().saturating_sub(count))
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
