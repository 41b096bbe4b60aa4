//! Navigation commands - cursor movement

use super::CommandStatus;
use crate::editor::{EditorState, PromptAction};
use crate::error::Result;

/// Move cursor forward one character
pub fn forward_char(editor: &mut EditorState, _f: bool, n: i32) -> Result<CommandStatus> {
    for _ in 0..n.abs() {
        if n > 0 {
            editor.move_cursor_right();
        } else {
            editor.move_cursor_left();
        }
    }
    Ok(CommandStatus::Success)
}

/// Move cursor backward one character
pub fn backward_char(editor: &mut EditorState, _f: bool, n: i32) -> Result<CommandStatus> {
    for _ in 0..n.abs() {
        if n > 0 {
            editor.move_cursor_left();
        } else {
            editor.move_cursor_right();
        }
    }
    Ok(CommandStatus::Success)
}

/// Move cursor to next line
pub fn next_line(editor: &mut EditorState, _f: bool, n: i32) -> Result<CommandStatus> {
    for _ in 0..n.abs() {
        if n > 0 {
            editor.move_cursor_down();
        } else {
            editor.move_cursor_up();
        }
    }
    Ok(CommandStatus::Success)
}

/// Move cursor to previous line
pub fn previous_line(editor: &mut EditorState, _f: bool, n: i32) -> Result<CommandStatus> {
    for _ in 0..n.abs() {
        if n > 0 {
            editor.move_cursor_up();
        } else {
            editor.move_cursor_down();
        }
    }
    Ok(CommandStatus::Success)
}

pub fn beginning_of_line(editor: &mut EditorState, _f: bool, _n: i32) -> Result<CommandStatus> {
    editor.move_to_bol();
    Ok(CommandStatus::Success)
}

pub fn end_of_line(editor: &mut EditorState, _f: bool, _n: i32) -> Result<CommandStatus> {
    editor.move_to_eol();
    Ok(CommandStatus::Success)
}

/// Scroll down one page (C-v)
pub fn scroll_down(editor: &mut EditorState, _f: bool, n: i32) -> Result<CommandStatus> {
    for _ in 0..n.max(1) {
        editor.page_down();
    }
    Ok(CommandStatus::Success)
}

/// Scroll up one page (M-v)
pub fn scroll_up(editor: &mut EditorState, _f: bool, n: i32) -> Result<CommandStatus> {
    for _ in 0..n.max(1) {
        editor.page_up();
    }
    Ok(CommandStatus::Success)
}

pub fn beginning_of_buffer(editor: &mut EditorState, _f: bool, _n: i32) -> Result<CommandStatus> {
    editor.move_to_buffer_start();
    Ok(CommandStatus::Success)
}

pub fn end_of_buffer(editor: &mut EditorState, _f: bool, _n: i32) -> Result<CommandStatus> {
    editor.move_to_buffer_end();
    Ok(CommandStatus::Success)
}

/// Go to line; prompts unless a numeric argument is given (M-g)
pub fn goto_line(editor: &mut EditorState, f: bool, n: i32) -> Result<CommandStatus> {
    if f {
        editor.goto_line(n.max(1) as usize);
    } else {
        editor.start_prompt("Goto line", PromptAction::GotoLine, None);
    }
    Ok(CommandStatus::Success)
}
