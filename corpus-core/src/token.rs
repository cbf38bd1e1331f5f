//! The tokenizer's output record.

use serde::{Deserialize, Serialize};

/// A single emitted token: either a dictionary lexeme or a non-lexical
/// filler run (punctuation, digits, Latin runs, symbols).
///
/// Immutable once constructed; `lexical` is `false` only for the latter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub word: String,
    pub lexical: bool,
}

impl Token {
    /// Construct a lexical token (`word` is a stored lexeme).
    pub fn lexical<T: Into<String>>(word: T) -> Self {
        Self {
            word: word.into(),
            lexical: true,
        }
    }

    /// Construct a non-lexical filler token.
    pub fn non_lexical<T: Into<String>>(word: T) -> Self {
        Self {
            word: word.into(),
            lexical: false,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.word)
    }
}
