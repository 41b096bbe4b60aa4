//! Highlight engine
//!
//! Turns a token list into style tag ranges on the buffer: every tag is
//! emptied, then ranges are re-added one category at a time in
//! `TokenCategory::APPLY_ORDER`. There is no diffing against the previous
//! pass.

use tracing::debug;

use super::tokens::{Token, TokenCategory};
use crate::access::BufferAccess;

#[derive(Debug, Default, Clone, Copy)]
pub struct HighlightEngine;

impl HighlightEngine {
    pub fn new() -> Self {
        Self
    }

    /// Replace all tag ranges with the spans in `tokens`
    ///
    /// Within a category, spans are added in start order.
    pub fn apply(&self, tokens: &[Token], access: &mut dyn BufferAccess) {
        for category in TokenCategory::APPLY_ORDER {
            access.clear_tag_ranges(category);
        }

        for category in TokenCategory::APPLY_ORDER {
            let mut spans: Vec<(usize, usize)> = tokens
                .iter()
                .filter(|t| t.category == category)
                .map(|t| (t.start, t.end))
                .collect();
            spans.sort_unstable();
            for (start, end) in spans {
                access.add_tag_range(category, start, end);
            }
        }

        debug!(tokens = tokens.len(), "highlight pass applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::testing::FakeAccess;
    use crate::syntax::{FullRescanTokenizer, KeywordSet, Tokenizer};

    fn highlight(access: &mut FakeAccess) {
        let tokenizer = FullRescanTokenizer::new(&KeywordSet::builtin()).unwrap();
        let tokens = tokenizer.tokenize(&access.text());
        HighlightEngine::new().apply(&tokens, access);
    }

    #[test]
    fn test_applies_in_category_order() {
        let mut access = FakeAccess::new("/* a */ \"b\" 1 int");
        highlight(&mut access);

        let order: Vec<TokenCategory> = access.tag_log.iter().map(|(c, _, _)| *c).collect();
        let mut expected = order.clone();
        expected.sort_by_key(|c| c.index());
        assert_eq!(order, expected);
        assert_eq!(access.cleared, TokenCategory::APPLY_ORDER.to_vec());
    }

    #[test]
    fn test_keyword_inside_string_renders_as_keyword() {
        let mut access = FakeAccess::new("x = \"while true\";");
        highlight(&mut access);

        // "while" occupies offsets 5..10
        for pos in 5..10 {
            assert_eq!(access.tags.category_at(pos), Some(TokenCategory::Keyword));
        }
        assert_eq!(access.tags.category_at(4), Some(TokenCategory::String));
        assert_eq!(access.tags.category_at(11), Some(TokenCategory::String));
    }

    #[test]
    fn test_keywords_added_in_text_order() {
        // Keyword passes run alphabetically: "return" before "while"
        let mut access = FakeAccess::new("while (x) return;");
        highlight(&mut access);

        let starts: Vec<usize> = access
            .tag_log
            .iter()
            .filter(|(c, _, _)| *c == TokenCategory::Keyword)
            .map(|(_, start, _)| *start)
            .collect();
        assert_eq!(starts, vec![0, 10]);
        assert_eq!(access.tags.ranges(TokenCategory::Keyword), &[0..5, 10..16]);
    }

    #[test]
    fn test_no_stale_ranges_after_deletion() {
        let mut access = FakeAccess::new("int x = 123; /* long comment */");
        highlight(&mut access);
        assert!(access.tags.range_count() > 0);

        access.set_text("int");
        highlight(&mut access);
        assert_eq!(access.tags.max_end(), Some(3));
        assert!(access.tags.ranges(TokenCategory::BlockComment).is_empty());
        assert!(access.tags.ranges(TokenCategory::Number).is_empty());
    }

    #[test]
    fn test_empty_text_clears_everything() {
        let mut access = FakeAccess::new("return 0;");
        highlight(&mut access);
        access.set_text("");
        highlight(&mut access);
        assert_eq!(access.tags.range_count(), 0);
    }
}
