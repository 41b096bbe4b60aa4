//! Compile, run and console commands

use super::CommandStatus;
use crate::editor::EditorState;
use crate::error::Result;

/// Compile the current file (F5, C-c C-c)
pub fn compile(editor: &mut EditorState, _f: bool, _n: i32) -> Result<CommandStatus> {
    match editor.compile() {
        Ok(()) => Ok(CommandStatus::Success),
        Err(e) => {
            editor.report_error(&e);
            Ok(CommandStatus::Failure)
        }
    }
}

/// Run the compiled program (F6, C-c C-r)
pub fn run_program(editor: &mut EditorState, _f: bool, _n: i32) -> Result<CommandStatus> {
    match editor.run_program() {
        Ok(()) => Ok(CommandStatus::Success),
        Err(e) => {
            editor.report_error(&e);
            Ok(CommandStatus::Failure)
        }
    }
}

/// Show or hide the console pane (F7, C-c C-t)
pub fn toggle_console(editor: &mut EditorState, _f: bool, _n: i32) -> Result<CommandStatus> {
    let status = if editor.toggle_console() {
        "Console shown"
    } else {
        "Console hidden"
    };
    editor.display.set_message(status);
    Ok(CommandStatus::Success)
}
