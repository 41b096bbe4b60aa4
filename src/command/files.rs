//! File commands

use super::CommandStatus;
use crate::editor::{EditorState, PromptAction};
use crate::error::Result;

/// Find file (open or create)
pub fn find_file(editor: &mut EditorState, _f: bool, _n: i32) -> Result<CommandStatus> {
    editor.start_prompt("Find file", PromptAction::FindFile, None);
    Ok(CommandStatus::Success)
}

/// Save the buffer, asking for a name if it has none
pub fn save_buffer(editor: &mut EditorState, _f: bool, _n: i32) -> Result<CommandStatus> {
    if editor.buffer.filename().is_some() && !editor.buffer.is_modified() {
        editor.display.set_message("(No changes need to be saved)");
        return Ok(CommandStatus::Success);
    }
    match editor.save() {
        Ok(()) => Ok(CommandStatus::Success),
        Err(e) => {
            editor.report_error(&e);
            Ok(CommandStatus::Failure)
        }
    }
}

/// Write buffer to a file chosen at the prompt
pub fn write_file(editor: &mut EditorState, _f: bool, _n: i32) -> Result<CommandStatus> {
    let default = editor
        .buffer
        .filename()
        .map(|p| p.display().to_string())
        .or_else(|| Some("untitled.cpp".to_string()));
    editor.start_prompt("Write file", PromptAction::WriteFile, default);
    Ok(CommandStatus::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::input::Key;

    fn editor() -> EditorState {
        EditorState::new(Config::default(), 24).unwrap()
    }

    fn answer(editor: &mut EditorState, text: &str) {
        for ch in text.chars() {
            editor.handle_key(Key::char(ch)).unwrap();
        }
        editor.handle_key(Key::ctrl('m')).unwrap();
    }

    #[test]
    fn test_save_without_name_prompts() {
        let mut ed = editor();
        ed.insert_char('x');
        assert_eq!(save_buffer(&mut ed, false, 1).unwrap(), CommandStatus::Success);
        assert!(ed.prompt.active);
        assert_eq!(ed.prompt.action, PromptAction::WriteFile);
        assert_eq!(ed.prompt.default.as_deref(), Some("untitled.cpp"));
    }

    #[test]
    fn test_write_file_adds_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut ed = editor();
        for ch in "int main() {}".chars() {
            ed.insert_char(ch);
        }

        write_file(&mut ed, false, 1).unwrap();
        answer(&mut ed, dir.path().join("hello").to_str().unwrap());

        let saved = dir.path().join("hello.cpp");
        assert_eq!(std::fs::read_to_string(&saved).unwrap(), "int main() {}");
        assert!(!ed.buffer.is_modified());
        assert_eq!(ed.console.tail(1).next().unwrap().text, "Saved successfully");
    }

    #[test]
    fn test_find_file_opens_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.c");
        std::fs::write(&path, "return 0;\n").unwrap();

        let mut ed = editor();
        find_file(&mut ed, false, 1).unwrap();
        answer(&mut ed, path.to_str().unwrap());
        assert_eq!(ed.buffer.line(0).unwrap().text(), "return 0;");
        assert_eq!(ed.buffer.filename(), Some(path.as_path()));
    }

    #[test]
    fn test_find_file_rejects_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.c");
        std::fs::write(&path, vec![b'x'; 64]).unwrap();

        let mut config = Config::default();
        config.max_file_size = 16;
        let mut ed = EditorState::new(config, 24).unwrap();
        find_file(&mut ed, false, 1).unwrap();
        answer(&mut ed, path.to_str().unwrap());
        assert_eq!(ed.display.message(), Some("File exceeds 16 bytes."));
        assert!(ed.buffer.filename().is_none());
    }
}
