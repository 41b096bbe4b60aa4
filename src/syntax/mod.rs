//! Syntax highlighting core
//!
//! Text goes through a [`Tokenizer`] into categorized [`Token`]s, and the
//! [`HighlightEngine`] paints them as tag ranges onto the buffer. Tags are
//! painted in [`TokenCategory::APPLY_ORDER`]; where ranges overlap the later
//! category wins.

mod highlight;
mod keywords;
mod rules;
mod style;
mod tags;
mod tokenizer;
mod tokens;

pub use highlight::HighlightEngine;
pub use keywords::KeywordSet;
pub use style::{Color, Style, Theme};
pub use tags::{StyledRun, TagTable};
pub use tokenizer::{FullRescanTokenizer, Tokenizer};
pub use tokens::TokenCategory;
