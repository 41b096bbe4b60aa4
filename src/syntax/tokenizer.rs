//! Whole-buffer tokenizer
//!
//! The [`Tokenizer`] trait is the seam between scanning and tag application.
//! [`FullRescanTokenizer`] rescans the entire text on every call; a windowed
//! implementation that only rescans changed lines can replace it without
//! touching the highlight engine or the gutter.

use tracing::trace;

use super::keywords::KeywordSet;
use super::rules::{self, PatternRule};
use super::tokens::{Token, TokenCategory};
use crate::error::Result;

/// Classifies buffer text into tokens
pub trait Tokenizer {
    /// Produce every token in `text`. Never fails; malformed constructs
    /// degrade to spans that run to the end of the text.
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Rescans the full text with one independent pass per category
///
/// Passes run in tag application order: block comments, line comments,
/// strings, numbers, then one pass per keyword in sorted keyword order.
/// Because every pass sees the whole text, spans of different categories
/// may overlap (a `//` inside a string is still a line comment); the
/// highlight engine's application order settles which style shows.
///
/// The keyword passes cost O(text length × keyword count).
pub struct FullRescanTokenizer {
    rules: Vec<PatternRule>,
    keywords: Vec<PatternRule>,
}

impl FullRescanTokenizer {
    /// Compile the category rules and one rule per keyword
    pub fn new(keywords: &KeywordSet) -> Result<Self> {
        let rules = vec![
            PatternRule::new("block_comment", rules::BLOCK_COMMENT, TokenCategory::BlockComment)?,
            PatternRule::new("line_comment", rules::LINE_COMMENT, TokenCategory::LineComment)?,
            PatternRule::new("string", rules::STRING, TokenCategory::String)?,
            PatternRule::new("number", rules::NUMBER, TokenCategory::Number)?,
        ];
        let keywords = keywords
            .iter()
            .map(PatternRule::keyword)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules, keywords })
    }

    /// Number of keyword rules
    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}

impl Tokenizer for FullRescanTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        if text.is_empty() {
            return tokens;
        }

        for rule in self.rules.iter().chain(self.keywords.iter()) {
            let before = tokens.len();
            tokens.extend(rule.find_all(text));
            trace!(rule = %rule.name, matches = tokens.len() - before, "scanned rule");
        }

        trace!(len = text.len(), tokens = tokens.len(), "tokenized buffer");
        tokens
    }
}
