//! Pattern rules for syntax highlighting
//!
//! Each rule is one regular expression scanned across the whole buffer
//! text, independently of every other rule.

use regex::Regex;

use super::tokens::{Token, TokenCategory};
use crate::error::Result;

/// `/* ... */`, non-greedy, running to end of text when unterminated
pub const BLOCK_COMMENT: &str = r"(?s)/\*.*?(?:\*/|\z)";

/// `//` up to (not including) the next line break
pub const LINE_COMMENT: &str = r"//.*";

/// `"..."` where a backslash escapes any character, line breaks included.
/// Unterminated strings run to end of text.
pub const STRING: &str = r#""(?:\\(?s:.)|[^"\\])*(?:"|\\?\z)"#;

/// Digits with an optional single fraction, word-bounded
pub const NUMBER: &str = r"\b\d+(?:\.\d+)?\b";

/// A single whole-text scanning rule
#[derive(Debug, Clone)]
pub struct PatternRule {
    /// Name for debugging
    pub name: String,
    /// Compiled regex pattern
    pub pattern: Regex,
    /// Category assigned to matches
    pub category: TokenCategory,
}

impl PatternRule {
    /// Create a new pattern rule
    pub fn new(name: &str, pattern: &str, category: TokenCategory) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            pattern: Regex::new(pattern)?,
            category,
        })
    }

    /// Rule matching one keyword on word boundaries
    pub fn keyword(word: &str) -> Result<Self> {
        let pattern = format!(r"\b{}\b", regex::escape(word));
        Self::new(word, &pattern, TokenCategory::Keyword)
    }

    /// All non-overlapping matches in `text`, left to right
    pub fn find_all<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Token> + 't {
        self.pattern
            .find_iter(text)
            .filter(|m| m.start() < m.end())
            .map(move |m| Token::new(self.category, m.start(), m.end()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(rule: &PatternRule, text: &str) -> Vec<(usize, usize)> {
        rule.find_all(text).map(|t| (t.start, t.end)).collect()
    }

    #[test]
    fn test_number_rule() {
        let rule = PatternRule::new("number", NUMBER, TokenCategory::Number).unwrap();
        assert_eq!(spans(&rule, "abc 123 def"), vec![(4, 7)]);
        assert_eq!(spans(&rule, "x = 3.14;"), vec![(4, 8)]);
        assert_eq!(spans(&rule, "x1 = y2"), vec![]);
        assert_eq!(spans(&rule, "no numbers"), vec![]);
    }

    #[test]
    fn test_block_comment_rule() {
        let rule = PatternRule::new("block", BLOCK_COMMENT, TokenCategory::BlockComment).unwrap();
        assert_eq!(spans(&rule, "/* a */ b /* c */"), vec![(0, 7), (10, 17)]);
        assert_eq!(spans(&rule, "a /* b\nc */ d"), vec![(2, 11)]);
        assert_eq!(spans(&rule, "a /* open"), vec![(2, 9)]);
    }

    #[test]
    fn test_line_comment_stops_at_newline() {
        let rule = PatternRule::new("line", LINE_COMMENT, TokenCategory::LineComment).unwrap();
        assert_eq!(spans(&rule, "x; // hi\ny;"), vec![(3, 8)]);
        assert_eq!(spans(&rule, "// end"), vec![(0, 6)]);
    }

    #[test]
    fn test_string_rule_with_escape() {
        let rule = PatternRule::new("string", STRING, TokenCategory::String).unwrap();
        assert_eq!(spans(&rule, r#"s = "hello\"world";"#), vec![(4, 18)]);
        assert_eq!(spans(&rule, r#""a" "b""#), vec![(0, 3), (4, 7)]);
        // Unterminated, including a trailing escape
        assert_eq!(spans(&rule, r#"x "open"#), vec![(2, 7)]);
        assert_eq!(spans(&rule, "x \"ab\\"), vec![(2, 6)]);
    }

    #[test]
    fn test_keyword_rule_escapes_word() {
        let rule = PatternRule::keyword("c++").unwrap();
        assert_eq!(rule.category, TokenCategory::Keyword);
        let rule = PatternRule::keyword("int").unwrap();
        assert_eq!(spans(&rule, "int x; intx; print"), vec![(0, 3)]);
    }
}
