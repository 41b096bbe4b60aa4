//! Editor state and main loop

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::access::ViewAccess;
use crate::buffer::Buffer;
use crate::command::{CommandStatus, KeyTable};
use crate::config::Config;
use crate::console::Console;
use crate::display::{Display, Frame, Layout};
use crate::error::{EditorError, Result};
use crate::input::{InputState, Key};
use crate::scheduler::{ChangeScheduler, ChangeTracker};
use crate::syntax::FullRescanTokenizer;
use crate::terminal::{InputEvent, Terminal};
use crate::toolchain::{JobOutcome, Toolchain};
use crate::window::Window;

/// How long the loop waits for input before checking on jobs
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Lines moved per mouse wheel notch
const WHEEL_LINES: usize = 3;

/// Kill ring entries kept
const KILL_RING_MAX: usize = 32;

/// What a key press did, as far as grouping is concerned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum LastCommand {
    #[default]
    Other,
    /// Typed a character; consecutive ones undo together
    SelfInsert,
    /// Killed text; consecutive kills share a kill ring entry
    Kill,
}

/// Main editor state
pub struct EditorState {
    /// The buffer being edited
    pub buffer: Buffer,
    /// The window showing it
    pub window: Window,
    /// Display state
    pub display: Display,
    /// Input state
    pub input: InputState,
    /// Key bindings
    pub keytab: KeyTable,
    /// Build and run output
    pub console: Console,
    /// Compile and run jobs
    pub toolchain: Toolchain,
    /// Startup configuration
    pub config: Config,
    /// Whether the line-number gutter is shown
    pub show_line_numbers: bool,
    /// Whether editor is running
    pub running: bool,
    /// Minibuffer prompt state
    pub prompt: PromptState,
    /// Killed text, newest last
    pub kill_ring: Vec<String>,
    /// What the previous key did
    last_command: LastCommand,
    /// What the current key did so far
    this_command: LastCommand,
    scheduler: ChangeScheduler,
    tracker: ChangeTracker,
    layout: Layout,
    screen_rows: u16,
    bell: bool,
}

/// What action to perform when prompt completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    None,
    FindFile,
    WriteFile,
    GotoLine,
    ConfirmQuit,
}

/// Minibuffer prompt state
#[derive(Debug, Clone)]
pub struct PromptState {
    /// Whether prompt is active
    pub active: bool,
    /// The prompt string (e.g., "Find file")
    pub prompt: String,
    /// Current input
    pub input: String,
    /// What to do when complete
    pub action: PromptAction,
    /// Default value (shown in prompt)
    pub default: Option<String>,
}

impl Default for PromptState {
    fn default() -> Self {
        Self {
            active: false,
            prompt: String::new(),
            input: String::new(),
            action: PromptAction::None,
            default: None,
        }
    }
}

impl PromptState {
    /// Text shown before the input
    pub fn label(&self) -> String {
        match &self.default {
            Some(def) => format!("{} (default {}): ", self.prompt, def),
            None => format!("{}: ", self.prompt),
        }
    }
}

impl EditorState {
    /// Create a new editor state for a screen `screen_rows` tall
    pub fn new(config: Config, screen_rows: u16) -> Result<Self> {
        let tokenizer = FullRescanTokenizer::new(&config.keywords)?;
        info!(keywords = tokenizer.keyword_count(), "tokenizer ready");

        let console = Console::new();
        let layout = Layout::compute(screen_rows, console.height());
        let mut buffer = Buffer::new("*scratch*");
        buffer.tags_mut().set_theme(config.theme.clone());

        Ok(Self {
            buffer,
            window: Window::new(0, layout.text_rows),
            display: Display::new(),
            input: InputState::new(),
            keytab: KeyTable::with_defaults(),
            console,
            toolchain: Toolchain::new(),
            show_line_numbers: config.show_line_numbers,
            config,
            running: true,
            prompt: PromptState::default(),
            kill_ring: Vec::new(),
            last_command: LastCommand::Other,
            this_command: LastCommand::Other,
            scheduler: ChangeScheduler::new(Box::new(tokenizer)),
            tracker: ChangeTracker::new(),
            layout,
            screen_rows,
            bell: false,
        })
    }

    /// Replace the edited buffer
    fn install_buffer(&mut self, mut buffer: Buffer) {
        buffer.tags_mut().set_theme(self.config.theme.clone());
        self.buffer = buffer;
        self.window.reset();
        self.tracker.invalidate();
        self.display.force_redraw();
    }

    /// Open a file, replacing the current buffer
    pub fn open_file(&mut self, path: &Path) -> Result<()> {
        let buffer = Buffer::from_file(path, self.config.max_file_size)?;
        info!(path = %path.display(), lines = buffer.line_count(), "opened file");
        self.install_buffer(buffer);
        Ok(())
    }

    /// Start an empty buffer for a file that doesn't exist yet
    pub fn open_new_file(&mut self, path: &Path) {
        let mut buffer = Buffer::new("");
        buffer.set_filename(path.to_path_buf());
        self.install_buffer(buffer);
        self.display
            .set_message(format!("(New file) {}", self.buffer.name()));
    }

    /// Open `path`, or start a new buffer for it if it doesn't exist
    pub fn visit_file(&mut self, path: &Path) {
        match self.open_file(path) {
            Ok(()) => self.display.set_message(format!("Opened {}", path.display())),
            Err(EditorError::FileNotFound(_)) => self.open_new_file(path),
            Err(e) => self.report_error(&e),
        }
    }

    /// Save the buffer to its file; without a file name, ask for one
    pub fn save(&mut self) -> Result<()> {
        if self.buffer.filename().is_none() {
            self.start_prompt("Write file", PromptAction::WriteFile, Some("untitled.cpp".to_string()));
            return Ok(());
        }
        self.buffer.save()?;
        self.console.success("Saved successfully");
        self.display.set_message(format!(
            "Wrote {} lines to {}",
            self.buffer.line_count(),
            self.buffer.filename().map(|p| p.display().to_string()).unwrap_or_default()
        ));
        Ok(())
    }

    /// Save under a new name; names without an extension get `.cpp`
    pub fn save_as(&mut self, path: PathBuf) -> Result<()> {
        let path = with_default_extension(path);
        self.buffer.set_filename(path);
        self.save()
    }

    /// Compile the saved file in the background
    pub fn compile(&mut self) -> Result<()> {
        if self.toolchain.running() > 0 {
            return Err(EditorError::JobRunning);
        }
        let source = self.saved_source("Save file first.")?;
        self.toolchain.compile(&source)?;
        self.console.info(&format!("Compiling {} ...", source.display()));
        Ok(())
    }

    /// Run the compiled program in the background
    pub fn run_program(&mut self) -> Result<()> {
        if self.toolchain.running() > 0 {
            return Err(EditorError::JobRunning);
        }
        let source = self.saved_source("Save and compile file first.")?;
        self.toolchain.run(&source)?;
        self.console.info(&format!("Running {} ...", source.display()));
        Ok(())
    }

    /// Path of the buffer's file, saving pending changes first
    fn saved_source(&mut self, unsaved: &str) -> Result<PathBuf> {
        let Some(path) = self.buffer.filename().map(Path::to_path_buf) else {
            return Err(EditorError::Message(unsaved.to_string()));
        };
        if self.buffer.is_modified() {
            self.save()?;
        }
        Ok(path)
    }

    /// Move a finished job's result to the console
    pub fn drain_jobs(&mut self) -> bool {
        match self.toolchain.try_recv() {
            Some(outcome) => {
                self.report_outcome(&outcome);
                true
            }
            None => false,
        }
    }

    /// Kill the running job; false when there was none
    pub fn cancel_job(&mut self) -> bool {
        match self.toolchain.cancel() {
            Some(outcome) => {
                self.report_outcome(&outcome);
                true
            }
            None => false,
        }
    }

    fn report_outcome(&mut self, outcome: &JobOutcome) {
        let headline = outcome.headline();
        if outcome.succeeded() {
            self.console.success(&headline);
            self.console.info(&outcome.output);
        } else {
            self.console.error(&headline);
            self.console.error(&outcome.output);
        }
        self.display.set_message(headline);
    }

    /// Show an error on the console and the message line
    pub fn report_error(&mut self, error: &EditorError) {
        warn!(%error, "command failed");
        let text = error.to_string();
        self.console.error(&text);
        self.display.set_message(text);
    }

    /// Show or hide the console pane
    pub fn toggle_console(&mut self) -> bool {
        let visible = self.console.toggle();
        self.relayout();
        visible
    }

    /// Adapt to a new screen height
    pub fn resize(&mut self, rows: u16) {
        self.screen_rows = rows;
        self.relayout();
    }

    fn relayout(&mut self) {
        self.layout = Layout::compute(self.screen_rows, self.console.height());
        self.window.set_height(self.layout.text_rows);
        self.window.ensure_cursor_visible();
        self.display.force_redraw();
    }

    /// Notify the highlighting pipelines of whatever changed since last time
    pub fn refresh(&mut self) {
        if let Some(notification) = self
            .tracker
            .observe(self.buffer.revision(), self.window.viewport())
        {
            debug!(?notification, "refreshing");
            let mut access = ViewAccess::new(&mut self.buffer, &self.window);
            self.scheduler.dispatch(notification, &mut access);
        }
    }

    /// Gutter labels from the last refresh
    #[cfg(test)]
    pub fn gutter(&self) -> &crate::gutter::GutterRenderer {
        self.scheduler.gutter()
    }

    /// Run the main editor loop
    pub fn run(&mut self, terminal: &mut Terminal) -> Result<()> {
        self.resize(terminal.rows());
        let mut dirty = true;

        while self.running {
            dirty |= self.drain_jobs();

            if dirty {
                self.refresh();
                self.render(terminal)?;
                dirty = false;
            }

            let Some(event) = terminal.read_event(POLL_INTERVAL)? else {
                continue;
            };
            dirty = true;

            match event {
                InputEvent::Key(key_event) => {
                    if let Some(key) = self.input.translate_key(key_event) {
                        self.handle_key(key)?;
                    } else if let Some(prefix) = self.input.pending_prefix() {
                        self.display.set_message(format!("{} -", prefix));
                    }
                }
                InputEvent::Resize(_, rows) => self.resize(rows),
                InputEvent::ScrollUp => self.scroll_view_up(WHEEL_LINES),
                InputEvent::ScrollDown => self.scroll_view_down(WHEEL_LINES),
            }

            if std::mem::take(&mut self.bell) {
                terminal.beep()?;
            }
        }

        Ok(())
    }

    fn render(&mut self, terminal: &mut Terminal) -> Result<()> {
        let label = self.prompt.label();
        let frame = Frame {
            buffer: &self.buffer,
            window: &self.window,
            gutter: self.show_line_numbers.then(|| self.scheduler.gutter()),
            console: &self.console,
            layout: self.layout,
            tab_width: self.config.tab_width,
            prompt: self
                .prompt
                .active
                .then(|| (label.as_str(), self.prompt.input.as_str())),
        };
        self.display.render(terminal, &frame)
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: Key) -> Result<()> {
        if self.prompt.active {
            return self.handle_prompt_key(key);
        }

        self.display.clear_message();

        self.last_command = std::mem::take(&mut self.this_command);
        let typing = key.is_self_insert() && self.keytab.lookup(key).is_none();
        if !(typing && self.last_command == LastCommand::SelfInsert) {
            self.buffer.add_undo_boundary();
        }

        if let Some(cmd) = self.keytab.lookup(key) {
            match cmd(self, false, 1)? {
                CommandStatus::Success => {}
                CommandStatus::Failure => self.bell = true,
                CommandStatus::Abort => {
                    self.display.set_message("Quit");
                    self.bell = true;
                }
            }
        } else if typing {
            if let Some(ch) = key.base_char() {
                self.insert_char(ch);
                self.this_command = LastCommand::SelfInsert;
            }
        } else {
            self.bell = true;
            self.display
                .set_message(format!("{} is undefined", key.display_name()));
        }

        Ok(())
    }

    /// Insert a character at cursor
    pub fn insert_char(&mut self, ch: char) {
        let cursor_line = self.window.cursor_line();
        let cursor_col = self.window.cursor_col();

        self.buffer.insert_char(cursor_line, cursor_col, ch);

        let new_col = cursor_col + ch.len_utf8();
        self.window.set_cursor(cursor_line, new_col);
        self.update_goal_col();
    }

    /// Insert text at cursor, splitting lines at each `\n`
    pub fn insert_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                let cursor_line = self.window.cursor_line();
                self.buffer.insert_newline(cursor_line, self.window.cursor_col());
                self.window.set_cursor(cursor_line + 1, 0);
            } else {
                self.insert_char(ch);
            }
        }
        self.update_goal_col();
        self.window.ensure_cursor_visible();
    }

    /// Start a new kill ring entry, or keep adding to the last one when
    /// the previous key was also a kill
    pub fn start_kill(&mut self) {
        if self.last_command != LastCommand::Kill || self.kill_ring.is_empty() {
            self.kill_ring.push(String::new());
            if self.kill_ring.len() > KILL_RING_MAX {
                self.kill_ring.remove(0);
            }
        }
        self.this_command = LastCommand::Kill;
    }

    /// Append text to the current kill entry
    pub fn kill_append(&mut self, text: &str) {
        if let Some(entry) = self.kill_ring.last_mut() {
            entry.push_str(text);
        }
    }

    /// Text for yanking
    pub fn yank_text(&self) -> Option<&str> {
        self.kill_ring.last().map(String::as_str)
    }

    /// Put the cursor at a byte position, scrolling it into view
    pub fn set_cursor(&mut self, line: usize, col: usize) {
        let line = line.min(self.buffer.line_count().saturating_sub(1));
        let col = col.min(self.buffer.line(line).map_or(0, |l| l.len()));
        self.window.set_cursor(line, col);
        self.update_goal_col();
        self.window.ensure_cursor_visible();
    }

    /// Move cursor right
    pub fn move_cursor_right(&mut self) {
        let cursor_line = self.window.cursor_line();
        let cursor_col = self.window.cursor_col();

        if let Some(line) = self.buffer.line(cursor_line) {
            if let Some(ch) = line.text().get(cursor_col..).and_then(|s| s.chars().next()) {
                self.window.set_cursor(cursor_line, cursor_col + ch.len_utf8());
            } else if cursor_line + 1 < self.buffer.line_count() {
                self.window.set_cursor(cursor_line + 1, 0);
            }
        }

        self.update_goal_col();
        self.window.ensure_cursor_visible();
    }

    /// Move cursor left
    pub fn move_cursor_left(&mut self) {
        let cursor_line = self.window.cursor_line();
        let cursor_col = self.window.cursor_col();

        if cursor_col > 0 {
            if let Some(ch) = self
                .buffer
                .line(cursor_line)
                .and_then(|l| l.text().get(..cursor_col))
                .and_then(|s| s.chars().last())
            {
                self.window.set_cursor(cursor_line, cursor_col - ch.len_utf8());
            }
        } else if cursor_line > 0 {
            let prev_line_len = self.buffer.line(cursor_line - 1).map_or(0, |l| l.len());
            self.window.set_cursor(cursor_line - 1, prev_line_len);
        }

        self.update_goal_col();
        self.window.ensure_cursor_visible();
    }

    /// Move cursor down, keeping the goal column
    pub fn move_cursor_down(&mut self) {
        let cursor_line = self.window.cursor_line();
        if cursor_line + 1 < self.buffer.line_count() {
            let new_col = self.col_to_byte_in_line(cursor_line + 1, self.window.goal_col());
            self.window.set_cursor(cursor_line + 1, new_col);
        }
        self.window.ensure_cursor_visible();
    }

    /// Move cursor up, keeping the goal column
    pub fn move_cursor_up(&mut self) {
        let cursor_line = self.window.cursor_line();
        if cursor_line > 0 {
            let new_col = self.col_to_byte_in_line(cursor_line - 1, self.window.goal_col());
            self.window.set_cursor(cursor_line - 1, new_col);
        }
        self.window.ensure_cursor_visible();
    }

    /// Move to beginning of line
    pub fn move_to_bol(&mut self) {
        let cursor_line = self.window.cursor_line();
        self.window.set_cursor(cursor_line, 0);
        self.window.set_goal_col(0);
    }

    /// Move to end of line
    pub fn move_to_eol(&mut self) {
        let cursor_line = self.window.cursor_line();
        let line_len = self.buffer.line(cursor_line).map_or(0, |l| l.len());
        self.window.set_cursor(cursor_line, line_len);
        self.update_goal_col();
    }

    /// Page down
    pub fn page_down(&mut self) {
        let height = self.window.height() as usize;
        self.window
            .scroll_down(height.saturating_sub(2).max(1), self.buffer.line_count());
        let top = self.window.top_line();
        let new_col = self.col_to_byte_in_line(top, self.window.goal_col());
        self.window.set_cursor(top, new_col);
    }

    /// Page up
    pub fn page_up(&mut self) {
        let height = self.window.height() as usize;
        self.window.scroll_up(height.saturating_sub(2).max(1));
        let top = self.window.top_line();
        let new_col = self.col_to_byte_in_line(top, self.window.goal_col());
        self.window.set_cursor(top, new_col);
    }

    /// Scroll the view without moving the cursor unless it leaves the view
    pub fn scroll_view_down(&mut self, lines: usize) {
        self.window.scroll_down(lines, self.buffer.line_count());
    }

    pub fn scroll_view_up(&mut self, lines: usize) {
        self.window.scroll_up(lines);
    }

    /// Move to beginning of buffer
    pub fn move_to_buffer_start(&mut self) {
        self.window.set_cursor(0, 0);
        self.window.set_top_line(0);
        self.window.set_goal_col(0);
    }

    /// Move to end of buffer
    pub fn move_to_buffer_end(&mut self) {
        let last_line = self.buffer.line_count().saturating_sub(1);
        let last_col = self.buffer.line(last_line).map_or(0, |l| l.len());
        self.window.set_cursor(last_line, last_col);
        self.update_goal_col();
        self.window.ensure_cursor_visible();
    }

    /// Move to a 1-based line number, clamped to the buffer
    pub fn goto_line(&mut self, line_number: usize) {
        let target = line_number
            .saturating_sub(1)
            .min(self.buffer.line_count().saturating_sub(1));
        self.window.set_cursor(target, 0);
        self.window.set_goal_col(0);
        self.window.ensure_cursor_visible();
    }

    pub fn force_redraw(&mut self) {
        self.display.force_redraw();
    }

    pub fn quit(&mut self) {
        self.toolchain.cancel();
        self.running = false;
    }

    fn update_goal_col(&mut self) {
        let col = self
            .buffer
            .line(self.window.cursor_line())
            .map_or(0, |l| l.byte_to_col(self.window.cursor_col(), self.config.tab_width));
        self.window.set_goal_col(col);
    }

    /// Convert display column to byte offset in a line
    fn col_to_byte_in_line(&self, line_idx: usize, display_col: usize) -> usize {
        self.buffer
            .line(line_idx)
            .map_or(0, |line| line.col_to_byte(display_col, self.config.tab_width))
    }

    /// Start a minibuffer prompt
    pub fn start_prompt(&mut self, prompt: &str, action: PromptAction, default: Option<String>) {
        self.prompt.active = true;
        self.prompt.prompt = prompt.to_string();
        self.prompt.input.clear();
        self.prompt.action = action;
        self.prompt.default = default;
        self.display.clear_message();
    }

    /// Handle key press during prompt mode
    fn handle_prompt_key(&mut self, key: Key) -> Result<()> {
        if key == Key::ctrl('g') {
            self.prompt.active = false;
            self.prompt.action = PromptAction::None;
            self.display.set_message("Quit");
            return Ok(());
        }

        if key == Key::ctrl('m') {
            let input = if self.prompt.input.is_empty() {
                self.prompt.default.clone().unwrap_or_default()
            } else {
                self.prompt.input.clone()
            };
            let action = self.prompt.action;
            self.prompt.active = false;
            self.prompt.action = PromptAction::None;
            return self.complete_prompt(action, input);
        }

        if key == Key(0x7f) || key == Key::ctrl('h') {
            self.prompt.input.pop();
            return Ok(());
        }

        if key.is_self_insert() {
            if let Some(ch) = key.base_char() {
                self.prompt.input.push(ch);
            }
            return Ok(());
        }

        self.bell = true;
        Ok(())
    }

    /// Complete a prompt action
    fn complete_prompt(&mut self, action: PromptAction, input: String) -> Result<()> {
        match action {
            PromptAction::FindFile => {
                if input.is_empty() {
                    self.display.set_message("No file name");
                    return Ok(());
                }
                self.visit_file(Path::new(&input));
            }
            PromptAction::WriteFile => {
                if input.is_empty() {
                    self.display.set_message("No file name");
                    return Ok(());
                }
                if let Err(e) = self.save_as(PathBuf::from(input)) {
                    self.report_error(&e);
                }
            }
            PromptAction::GotoLine => match input.trim().parse::<usize>() {
                Ok(line_number) => self.goto_line(line_number),
                Err(_) => self.display.set_message("Invalid line number"),
            },
            PromptAction::ConfirmQuit => {
                if input.trim().eq_ignore_ascii_case("y") || input.trim().eq_ignore_ascii_case("yes") {
                    self.quit();
                }
            }
            PromptAction::None => {}
        }
        Ok(())
    }
}

/// Add `.cpp` to a path that has no extension
fn with_default_extension(mut path: PathBuf) -> PathBuf {
    if path.extension().is_none() {
        path.set_extension("cpp");
    }
    path
}
