//! Token categories for syntax highlighting
//!
//! This module defines the syntax categories the tokenizer recognizes,
//! the order in which their tags are applied, and their default styles.

use super::style::{Color, Style};

/// Syntax categories recognized in C/C++ source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenCategory {
    /// `/* ... */`, possibly spanning lines
    BlockComment,
    /// `// ...` up to the end of the line
    LineComment,
    /// `"..."` with backslash escapes
    String,
    /// Decimal integers and fractions
    Number,
    /// Members of the keyword set
    Keyword,
}

impl TokenCategory {
    /// Number of categories
    pub const COUNT: usize = 5;

    /// Tag application order. Later categories are painted over earlier
    /// ones where their ranges overlap.
    pub const APPLY_ORDER: [TokenCategory; Self::COUNT] = [
        TokenCategory::BlockComment,
        TokenCategory::LineComment,
        TokenCategory::String,
        TokenCategory::Number,
        TokenCategory::Keyword,
    ];

    /// Position in `APPLY_ORDER`
    pub fn index(&self) -> usize {
        match self {
            TokenCategory::BlockComment => 0,
            TokenCategory::LineComment => 1,
            TokenCategory::String => 2,
            TokenCategory::Number => 3,
            TokenCategory::Keyword => 4,
        }
    }

    /// Get the default style for this category
    pub fn default_style(&self) -> Style {
        match self {
            TokenCategory::BlockComment | TokenCategory::LineComment => {
                Style::fg(Color::Rgb(0x7f, 0x8c, 0x8d)).with_italic()
            }
            TokenCategory::String => Style::fg(Color::Rgb(0xe6, 0x7e, 0x22)),
            TokenCategory::Number => Style::fg(Color::Rgb(0x5d, 0xad, 0xe2)),
            TokenCategory::Keyword => Style::fg(Color::Rgb(0xa6, 0xce, 0xe3)).with_bold(),
        }
    }

    /// Name used in the configuration file
    pub fn name(&self) -> &'static str {
        match self {
            TokenCategory::BlockComment => "block-comment",
            TokenCategory::LineComment => "line-comment",
            TokenCategory::String => "string",
            TokenCategory::Number => "number",
            TokenCategory::Keyword => "keyword",
        }
    }

    /// Parse a category from its configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        TokenCategory::APPLY_ORDER
            .into_iter()
            .find(|category| category.name() == name)
    }
}

/// A classified span of the buffer text
///
/// Offsets are UTF-8 byte positions into the whole text, with each line
/// break counted as one byte. They always fall on `char` boundaries, and
/// match character offsets only while the text before them is ASCII.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub category: TokenCategory,
    /// Inclusive start
    pub start: usize,
    /// Exclusive end
    pub end: usize,
}

impl Token {
    pub fn new(category: TokenCategory, start: usize, end: usize) -> Self {
        Self { category, start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_order_matches_index() {
        for (i, category) in TokenCategory::APPLY_ORDER.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
        assert_eq!(TokenCategory::APPLY_ORDER.last(), Some(&TokenCategory::Keyword));
    }

    #[test]
    fn test_from_name() {
        for category in TokenCategory::APPLY_ORDER {
            assert_eq!(TokenCategory::from_name(category.name()), Some(category));
        }
        assert_eq!(TokenCategory::from_name("comment"), None);
        assert_eq!(TokenCategory::from_name(""), None);
    }
}
