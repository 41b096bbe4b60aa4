//! Editing commands - text modification operations

use super::CommandStatus;
use crate::editor::EditorState;
use crate::error::Result;

/// Delete character at cursor (forward)
pub fn delete_char_forward(editor: &mut EditorState, f: bool, n: i32) -> Result<CommandStatus> {
    if n < 0 {
        return delete_char_backward(editor, f, -n);
    }

    for _ in 0..n.max(1) {
        let cursor_line = editor.window.cursor_line();
        let cursor_col = editor.window.cursor_col();
        let line_len = editor.buffer.line(cursor_line).map_or(0, |l| l.len());

        if cursor_col < line_len {
            editor.buffer.delete_char(cursor_line, cursor_col);
        } else if !editor.buffer.join_line(cursor_line) {
            return Ok(CommandStatus::Failure);
        }
    }

    Ok(CommandStatus::Success)
}

/// Delete character before cursor (backward)
pub fn delete_char_backward(editor: &mut EditorState, f: bool, n: i32) -> Result<CommandStatus> {
    if n < 0 {
        return delete_char_forward(editor, f, -n);
    }

    for _ in 0..n.max(1) {
        let cursor_line = editor.window.cursor_line();
        let cursor_col = editor.window.cursor_col();

        if cursor_col > 0 {
            if let Some((_, new_col)) = editor.buffer.delete_backward(cursor_line, cursor_col) {
                editor.window.set_cursor(cursor_line, new_col);
            }
        } else if let Some(join_pos) = editor.buffer.join_with_previous(cursor_line) {
            editor.window.set_cursor(cursor_line - 1, join_pos);
        } else {
            return Ok(CommandStatus::Failure);
        }
    }

    editor.window.ensure_cursor_visible();
    Ok(CommandStatus::Success)
}

/// Kill to end of line; at the end of a line, join the next one
///
/// Consecutive kills collect into one kill ring entry.
pub fn kill_line(editor: &mut EditorState, _f: bool, n: i32) -> Result<CommandStatus> {
    editor.start_kill();
    for _ in 0..n.max(1) {
        let cursor_line = editor.window.cursor_line();
        let cursor_col = editor.window.cursor_col();
        match editor.buffer.kill_to_eol(cursor_line, cursor_col) {
            Some(killed) => editor.kill_append(&killed),
            None => return Ok(CommandStatus::Failure),
        }
    }
    Ok(CommandStatus::Success)
}

/// Insert the last killed text at the cursor (C-y)
pub fn yank(editor: &mut EditorState, _f: bool, n: i32) -> Result<CommandStatus> {
    if n < 0 {
        return Ok(CommandStatus::Failure);
    }
    let Some(text) = editor.yank_text().map(str::to_string) else {
        editor.display.set_message("Kill ring is empty");
        return Ok(CommandStatus::Failure);
    };
    for _ in 0..n.max(1) {
        editor.insert_text(&text);
    }
    Ok(CommandStatus::Success)
}

/// Undo the last command's changes (C-/, C-_)
pub fn undo(editor: &mut EditorState, _f: bool, n: i32) -> Result<CommandStatus> {
    editor.buffer.add_undo_boundary();
    for _ in 0..n.max(1) {
        match editor.buffer.undo() {
            Some((line, col)) => editor.set_cursor(line, col),
            None => {
                editor.display.set_message("Nothing to undo");
                return Ok(CommandStatus::Failure);
            }
        }
    }
    editor.display.set_message("Undo!");
    Ok(CommandStatus::Success)
}

/// Insert newline and move cursor to new line
pub fn newline(editor: &mut EditorState, _f: bool, n: i32) -> Result<CommandStatus> {
    if n < 0 {
        return Ok(CommandStatus::Failure);
    }

    for _ in 0..n.max(1) {
        let cursor_line = editor.window.cursor_line();
        let cursor_col = editor.window.cursor_col();
        editor.buffer.insert_newline(cursor_line, cursor_col);
        editor.window.set_cursor(cursor_line + 1, 0);
    }

    editor.window.set_goal_col(0);
    editor.window.ensure_cursor_visible();
    Ok(CommandStatus::Success)
}

/// Open line below (insert newline, cursor stays)
pub fn open_line(editor: &mut EditorState, _f: bool, n: i32) -> Result<CommandStatus> {
    if n < 0 {
        return Ok(CommandStatus::Failure);
    }

    let cursor_line = editor.window.cursor_line();
    let cursor_col = editor.window.cursor_col();
    for _ in 0..n.max(1) {
        editor.buffer.insert_newline(cursor_line, cursor_col);
    }

    Ok(CommandStatus::Success)
}

/// Insert newline with indentation from current line
pub fn indent_newline(editor: &mut EditorState, _f: bool, n: i32) -> Result<CommandStatus> {
    if n < 0 {
        return Ok(CommandStatus::Failure);
    }

    for _ in 0..n.max(1) {
        let cursor_line = editor.window.cursor_line();
        let cursor_col = editor.window.cursor_col();

        let indent: String = editor
            .buffer
            .line(cursor_line)
            .map(|line| {
                line.text()
                    .chars()
                    .take_while(|c| *c == ' ' || *c == '\t')
                    .collect()
            })
            .unwrap_or_default();

        editor.buffer.insert_newline(cursor_line, cursor_col);
        editor.window.set_cursor(cursor_line + 1, 0);

        for ch in indent.chars() {
            editor.insert_char(ch);
        }
    }

    editor.window.ensure_cursor_visible();
    Ok(CommandStatus::Success)
}

/// Insert tab character
pub fn insert_tab(editor: &mut EditorState, _f: bool, n: i32) -> Result<CommandStatus> {
    if n < 0 {
        return Ok(CommandStatus::Failure);
    }

    for _ in 0..n.max(1) {
        editor.insert_char('\t');
    }

    Ok(CommandStatus::Success)
}
