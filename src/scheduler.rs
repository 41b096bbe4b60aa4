//! Change scheduler
//!
//! Binds buffer and viewport notifications to the highlighting pipelines.
//! Every notification runs synchronously on the calling thread and fully
//! recomputes from the current state; nothing is debounced or coalesced.

use tracing::debug;

use crate::access::BufferAccess;
use crate::gutter::GutterRenderer;
use crate::syntax::{HighlightEngine, Tokenizer};
use crate::window::ViewportKey;

/// What changed since the pipelines last ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// Text was edited or replaced
    BufferChanged,
    /// Scrolled, resized or moved on screen
    ViewportChanged,
}

/// Runs tokenizer, highlight engine and gutter renderer on notification
pub struct ChangeScheduler {
    tokenizer: Box<dyn Tokenizer>,
    engine: HighlightEngine,
    gutter: GutterRenderer,
}

impl ChangeScheduler {
    pub fn new(tokenizer: Box<dyn Tokenizer>) -> Self {
        Self {
            tokenizer,
            engine: HighlightEngine::new(),
            gutter: GutterRenderer::new(),
        }
    }

    /// Gutter labels from the most recent redraw
    pub fn gutter(&self) -> &GutterRenderer {
        &self.gutter
    }

    /// Re-highlight the whole buffer, then redraw the gutter
    pub fn on_buffer_changed(&mut self, access: &mut dyn BufferAccess) {
        let text = access.text();
        let tokens = self.tokenizer.tokenize(&text);
        self.engine.apply(&tokens, access);
        let labels = self.gutter.redraw(access);
        debug!(len = text.len(), tokens = tokens.len(), labels, "buffer change handled");
    }

    /// Redraw the gutter only
    pub fn on_viewport_changed(&mut self, access: &dyn BufferAccess) {
        let labels = self.gutter.redraw(access);
        debug!(labels, "viewport change handled");
    }

    pub fn dispatch(&mut self, notification: Notification, access: &mut dyn BufferAccess) {
        match notification {
            Notification::BufferChanged => self.on_buffer_changed(access),
            Notification::ViewportChanged => self.on_viewport_changed(access),
        }
    }
}

/// Observed state the tracker compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    revision: u64,
    viewport: ViewportKey,
}

/// Turns before/after state of the event loop into notifications
///
/// The first observation always reports a buffer change so the initial
/// content gets highlighted.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    last: Option<Snapshot>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current state; returns what changed since the last call
    pub fn observe(&mut self, revision: u64, viewport: ViewportKey) -> Option<Notification> {
        let now = Snapshot { revision, viewport };
        let notification = match self.last {
            None => Some(Notification::BufferChanged),
            Some(prev) if prev.revision != now.revision => Some(Notification::BufferChanged),
            Some(prev) if prev.viewport != now.viewport => Some(Notification::ViewportChanged),
            Some(_) => None,
        };
        self.last = Some(now);
        notification
    }

    /// Force the next observation to report a buffer change
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::testing::FakeAccess;
    use crate::syntax::{FullRescanTokenizer, KeywordSet, TokenCategory};

    fn scheduler() -> ChangeScheduler {
        let tokenizer = FullRescanTokenizer::new(&KeywordSet::builtin()).unwrap();
        ChangeScheduler::new(Box::new(tokenizer))
    }

    fn viewport(top_line: usize) -> ViewportKey {
        ViewportKey {
            top_line,
            top_row: 0,
            height: 10,
        }
    }

    #[test]
    fn test_buffer_change_highlights_and_redraws() {
        let mut access = FakeAccess::new("int x = 1;\n// done");
        let mut scheduler = scheduler();
        scheduler.on_buffer_changed(&mut access);

        assert_eq!(access.tags.ranges(TokenCategory::Keyword), &[0..3]);
        assert_eq!(access.tags.ranges(TokenCategory::Number), &[8..9]);
        assert_eq!(access.tags.ranges(TokenCategory::LineComment), &[11..18]);
        assert_eq!(scheduler.gutter().labels().len(), 2);
    }

    #[test]
    fn test_edit_leaves_no_stale_ranges() {
        let mut access = FakeAccess::new("/* long comment */ int y;");
        let mut scheduler = scheduler();
        scheduler.on_buffer_changed(&mut access);

        access.set_text("int");
        scheduler.on_buffer_changed(&mut access);
        assert!(access.tags.ranges(TokenCategory::BlockComment).is_empty());
        assert!(access.tags.max_end().unwrap() <= 3);
    }

    #[test]
    fn test_viewport_change_leaves_tags_alone() {
        let mut access = FakeAccess::new("a\nb\nc\nd");
        let mut scheduler = scheduler();
        scheduler.on_buffer_changed(&mut access);
        let cleared = access.cleared.len();

        access.top_line = 2;
        scheduler.dispatch(Notification::ViewportChanged, &mut access);
        assert_eq!(access.cleared.len(), cleared);
        assert_eq!(scheduler.gutter().labels()[0].line_number, 3);
    }

    #[test]
    fn test_repeated_runs_are_idempotent() {
        let mut access = FakeAccess::new("char *s = \"int\"; /* 42 */");
        let mut scheduler = scheduler();
        scheduler.on_buffer_changed(&mut access);
        let first: Vec<_> = TokenCategory::APPLY_ORDER
            .iter()
            .map(|c| access.tags.ranges(*c).to_vec())
            .collect();
        let labels = scheduler.gutter().labels().to_vec();

        scheduler.on_buffer_changed(&mut access);
        let second: Vec<_> = TokenCategory::APPLY_ORDER
            .iter()
            .map(|c| access.tags.ranges(*c).to_vec())
            .collect();
        assert_eq!(first, second);
        assert_eq!(labels, scheduler.gutter().labels());
    }

    #[test]
    fn test_tracker_reports_changes() {
        let mut tracker = ChangeTracker::new();
        assert_eq!(tracker.observe(0, viewport(0)), Some(Notification::BufferChanged));
        assert_eq!(tracker.observe(0, viewport(0)), None);
        assert_eq!(tracker.observe(0, viewport(3)), Some(Notification::ViewportChanged));
        // An edit that also scrolls is a buffer change
        assert_eq!(tracker.observe(1, viewport(4)), Some(Notification::BufferChanged));

        tracker.invalidate();
        assert_eq!(tracker.observe(1, viewport(4)), Some(Notification::BufferChanged));
    }
}
