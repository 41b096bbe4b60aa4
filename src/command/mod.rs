//! Command dispatch system
//!
//! This module provides the key binding table and command implementations.
//! Commands are organized into submodules by category.

mod build;
mod editing;
mod files;
mod misc;
mod navigation;

use std::collections::HashMap;

use crate::editor::EditorState;
use crate::error::Result;
use crate::input::{special, Key};

/// Command result status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure,
    Abort,
}

/// Command function signature
/// - editor: mutable reference to editor state
/// - f: true if numeric argument was provided
/// - n: numeric argument (repeat count, default 1)
pub type CommandFn = fn(&mut EditorState, bool, i32) -> Result<CommandStatus>;

/// Key binding entry with command function and name
struct BindingEntry {
    function: CommandFn,
    name: &'static str,
}

/// Key binding table
pub struct KeyTable {
    bindings: HashMap<u32, BindingEntry>,
}

impl KeyTable {
    /// Create an empty key table
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Create key table with default bindings
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.setup_defaults();
        table
    }

    /// Add a key binding with command name
    pub fn bind_named(&mut self, key: Key, cmd: CommandFn, name: &'static str) {
        self.bindings.insert(key.code(), BindingEntry { function: cmd, name });
    }

    /// Look up a command for a key
    pub fn lookup(&self, key: Key) -> Option<CommandFn> {
        self.bindings.get(&key.code()).map(|e| e.function)
    }

    /// Look up a command name for a key
    #[cfg(test)]
    pub fn lookup_name(&self, key: Key) -> Option<&'static str> {
        self.bindings.get(&key.code()).map(|e| e.name)
    }

    /// Get all bindings as (key_code, command_name) pairs, sorted by name
    pub fn all_bindings(&self) -> Vec<(u32, &'static str)> {
        let mut bindings: Vec<_> = self
            .bindings
            .iter()
            .map(|(&code, entry)| (code, entry.name))
            .collect();
        bindings.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(&b.0)));
        bindings
    }

    /// Set up default key bindings
    fn setup_defaults(&mut self) {
        use build::*;
        use editing::*;
        use files::*;
        use misc::*;
        use navigation::*;

        // Basic cursor movement
        self.bind_named(Key::ctrl('f'), forward_char, "forward-char");
        self.bind_named(Key::ctrl('b'), backward_char, "backward-char");
        self.bind_named(Key::ctrl('n'), next_line, "next-line");
        self.bind_named(Key::ctrl('p'), previous_line, "previous-line");
        self.bind_named(Key::ctrl('a'), beginning_of_line, "beginning-of-line");
        self.bind_named(Key::ctrl('e'), end_of_line, "end-of-line");

        // Page movement
        self.bind_named(Key::ctrl('v'), scroll_down, "scroll-down");
        self.bind_named(Key::meta('v'), scroll_up, "scroll-up");
        self.bind_named(Key::meta('<'), beginning_of_buffer, "beginning-of-buffer");
        self.bind_named(Key::meta('>'), end_of_buffer, "end-of-buffer");
        self.bind_named(Key::meta('g'), goto_line, "goto-line");

        // Arrow keys (special keys)
        self.bind_named(Key::special(special::RIGHT), forward_char, "forward-char");
        self.bind_named(Key::special(special::LEFT), backward_char, "backward-char");
        self.bind_named(Key::special(special::DOWN), next_line, "next-line");
        self.bind_named(Key::special(special::UP), previous_line, "previous-line");
        self.bind_named(Key::special(special::PAGE_UP), scroll_up, "scroll-up");
        self.bind_named(Key::special(special::PAGE_DOWN), scroll_down, "scroll-down");
        self.bind_named(Key::special(special::HOME), beginning_of_line, "beginning-of-line");
        self.bind_named(Key::special(special::END), end_of_line, "end-of-line");

        // Screen
        self.bind_named(Key::ctrl('l'), redraw_display, "redraw-display");
        self.bind_named(Key::ctlx('#'), toggle_line_numbers, "toggle-line-numbers");

        // Quit / abort
        self.bind_named(Key::ctlx_ctrl('c'), quit, "save-buffers-kill-emacs");
        self.bind_named(Key::ctrl('g'), abort, "keyboard-quit");

        // Editing
        self.bind_named(Key::ctrl('d'), delete_char_forward, "delete-char");
        self.bind_named(Key::special(special::DELETE), delete_char_forward, "delete-char");
        self.bind_named(Key(0x7f), delete_char_backward, "delete-backward-char");
        self.bind_named(Key::ctrl('h'), delete_char_backward, "delete-backward-char");
        self.bind_named(Key::ctrl('k'), kill_line, "kill-line");
        self.bind_named(Key::ctrl('y'), yank, "yank");
        self.bind_named(Key::ctrl('/'), undo, "undo");
        self.bind_named(Key::ctrl('_'), undo, "undo");
        self.bind_named(Key::ctrl('m'), newline, "newline");
        self.bind_named(Key::ctrl('o'), open_line, "open-line");
        self.bind_named(Key::ctrl('j'), indent_newline, "newline-and-indent");
        self.bind_named(Key::ctrl('i'), insert_tab, "tab-to-tab-stop");

        // Files
        self.bind_named(Key::ctlx_ctrl('f'), find_file, "find-file");
        self.bind_named(Key::ctlx_ctrl('s'), save_buffer, "save-buffer");
        self.bind_named(Key::ctlx_ctrl('w'), write_file, "write-file");

        // Build and run
        self.bind_named(Key::special(special::f(5)), compile, "compile");
        self.bind_named(Key::ctlc_ctrl('c'), compile, "compile");
        self.bind_named(Key::special(special::f(6)), run_program, "run-program");
        self.bind_named(Key::ctlc_ctrl('r'), run_program, "run-program");
        self.bind_named(Key::special(special::f(7)), toggle_console, "toggle-console");
        self.bind_named(Key::ctlc_ctrl('t'), toggle_console, "toggle-console");

        // Help
        self.bind_named(Key::special(special::f(1)), describe_bindings, "describe-bindings");
    }
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_keys_are_bound() {
        let table = KeyTable::with_defaults();
        assert_eq!(table.lookup_name(Key::special(special::f(5))), Some("compile"));
        assert_eq!(table.lookup_name(Key::ctlc_ctrl('c')), Some("compile"));
        assert_eq!(table.lookup_name(Key::special(special::f(6))), Some("run-program"));
        assert_eq!(table.lookup_name(Key::ctlc_ctrl('t')), Some("toggle-console"));
        assert_eq!(table.lookup_name(Key::ctlx_ctrl('s')), Some("save-buffer"));
        assert!(table.lookup(Key::char('a')).is_none());
    }

    #[test]
    fn test_all_bindings_sorted_by_name() {
        let table = KeyTable::with_defaults();
        let names: Vec<_> = table.all_bindings().into_iter().map(|(_, n)| n).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
