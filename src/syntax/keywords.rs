//! The keyword set
//!
//! Fixed once at startup from the built-in list or the configuration file.

use std::collections::BTreeSet;

/// Built-in C/C++ keywords
const BUILTIN_KEYWORDS: &[&str] = &[
    "int", "float", "double", "char", "void", "bool", "long", "short", "unsigned", "signed",
    "if", "else", "while", "for", "do", "switch", "case", "default", "break", "continue",
    "return", "class", "struct", "public", "private", "protected", "namespace", "using", "new",
    "delete", "this", "cout", "cin", "endl", "main", "auto", "constexpr", "nullptr",
    "template", "typename", "static", "inline", "virtual",
];

/// Immutable, case-sensitive set of keywords
///
/// Iteration is in sorted order so tokenizer output is reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    words: BTreeSet<String>,
}

impl KeywordSet {
    /// The built-in keyword set
    pub fn builtin() -> Self {
        Self::from_words(BUILTIN_KEYWORDS.iter().copied())
    }

    /// Build a set from arbitrary words; blank entries are dropped
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    #[cfg(test)]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(|s| s.as_str())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.words.len()
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::builtin()
    }
}
