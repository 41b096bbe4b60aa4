//! Miscellaneous commands

use super::CommandStatus;
use crate::editor::{EditorState, PromptAction};
use crate::error::Result;
use crate::input::Key;

/// Recenter display with cursor line in middle of window (C-l)
pub fn redraw_display(editor: &mut EditorState, f: bool, n: i32) -> Result<CommandStatus> {
    let cursor_line = editor.window.cursor_line();
    let height = editor.window.height() as usize;

    // With an argument, put the cursor on line n of the window
    let new_top = if f {
        cursor_line.saturating_sub((n - 1).max(0) as usize)
    } else {
        cursor_line.saturating_sub(height / 2)
    };

    editor.window.set_top_line(new_top);
    editor.force_redraw();
    Ok(CommandStatus::Success)
}

/// Toggle line numbers display (C-x #)
pub fn toggle_line_numbers(editor: &mut EditorState, _f: bool, _n: i32) -> Result<CommandStatus> {
    editor.show_line_numbers = !editor.show_line_numbers;
    editor.force_redraw();
    let status = if editor.show_line_numbers {
        "Line numbers enabled"
    } else {
        "Line numbers disabled"
    };
    editor.display.set_message(status);
    Ok(CommandStatus::Success)
}

/// Quit the editor, asking first if the buffer is modified
pub fn quit(editor: &mut EditorState, f: bool, _n: i32) -> Result<CommandStatus> {
    if !f && editor.buffer.is_modified() {
        editor.start_prompt(
            "Buffer modified; really quit? (y/n)",
            PromptAction::ConfirmQuit,
            None,
        );
        return Ok(CommandStatus::Success);
    }

    editor.quit();
    Ok(CommandStatus::Success)
}

/// Abort current operation, stopping a running compile or program first
pub fn abort(editor: &mut EditorState, _f: bool, _n: i32) -> Result<CommandStatus> {
    if editor.cancel_job() {
        return Ok(CommandStatus::Success);
    }
    Ok(CommandStatus::Abort)
}

/// List key bindings in the console (F1)
pub fn describe_bindings(editor: &mut EditorState, _f: bool, _n: i32) -> Result<CommandStatus> {
    let lines: Vec<String> = editor
        .keytab
        .all_bindings()
        .into_iter()
        .map(|(code, name)| format!("{:<28}{}", name, Key(code).display_name()))
        .collect();

    editor.console.info("Key bindings:");
    for line in &lines {
        editor.console.info(line);
    }
    if !editor.console.is_visible() {
        editor.toggle_console();
    }
    Ok(CommandStatus::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn editor() -> EditorState {
        EditorState::new(Config::default(), 24).unwrap()
    }

    #[test]
    fn test_quit_confirms_when_modified() {
        let mut ed = editor();
        quit(&mut ed, false, 1).unwrap();
        assert!(!ed.running);

        let mut ed = editor();
        ed.insert_char('x');
        quit(&mut ed, false, 1).unwrap();
        assert!(ed.running);
        assert_eq!(ed.prompt.action, PromptAction::ConfirmQuit);
        ed.handle_key(Key::char('y')).unwrap();
        ed.handle_key(Key::ctrl('m')).unwrap();
        assert!(!ed.running);
    }

    #[test]
    fn test_abort_without_job() {
        let mut ed = editor();
        assert_eq!(abort(&mut ed, false, 1).unwrap(), CommandStatus::Abort);
    }

    #[cfg(unix)]
    #[test]
    fn test_quit_stops_running_job() {
        use crate::toolchain::{JobKind, JobRequest};

        let mut ed = editor();
        ed.toolchain
            .submit(JobRequest {
                kind: JobKind::Run,
                program: "sleep".into(),
                args: vec!["30".into()],
            })
            .unwrap();
        quit(&mut ed, false, 1).unwrap();
        assert!(!ed.running);
        assert_eq!(ed.toolchain.running(), 0);
    }

    #[test]
    fn test_toggle_line_numbers_hides_gutter() {
        let mut ed = editor();
        assert!(ed.show_line_numbers);
        toggle_line_numbers(&mut ed, false, 1).unwrap();
        assert!(!ed.show_line_numbers);
        assert_eq!(ed.display.message(), Some("Line numbers disabled"));
    }

    #[test]
    fn test_redraw_centers_cursor() {
        let mut ed = editor();
        let text = vec!["x"; 50].join("\n");
        ed.buffer.set_content(&text);
        ed.goto_line(31);
        redraw_display(&mut ed, false, 1).unwrap();
        let half = ed.window.height() as usize / 2;
        assert_eq!(ed.window.top_line(), 30 - half);
    }

    #[test]
    fn test_describe_bindings_fills_console() {
        let mut ed = editor();
        describe_bindings(&mut ed, false, 1).unwrap();
        assert!(ed
            .console
            .tail(ed.console.len())
            .any(|l| l.text.starts_with("compile") && l.text.ends_with("F5")));
    }
}
