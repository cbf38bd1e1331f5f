//! Error taxonomy for the tokenization core.
//!
//! `LookupMiss` from the spec's taxonomy is deliberately absent here: a
//! missing lexicon entry is not an error, it's the `exists = false` field
//! of [`crate::trie::Trie::get`]'s return tuple.

use thiserror::Error;

/// Errors surfaced by [`crate::lexicon::Lexicon`] and
/// [`crate::tokenizer::Tokenizer`].
///
/// Propagation policy: errors are always surfaced to the caller, never
/// retried or swallowed internally. A failed call leaves the core free to
/// be invoked again on the next input.
#[derive(Debug, Error)]
pub enum TokenizeError {
    /// `text` passed to [`crate::tokenizer::Tokenizer::tokenize`] was not
    /// valid UTF-8.
    #[error("input text is not valid UTF-8")]
    InvalidEncoding,

    /// The four-rule tie-breaking cascade eliminated every candidate.
    /// Should be unreachable in practice (each rule preserves at least one
    /// candidate); surfaced defensively rather than panicking.
    #[error("ambiguity cascade eliminated every candidate chunk at a cursor position")]
    NoCandidate,

    /// The injected [`crate::lexicon::LexiconStorage`] failed.
    #[error("lexicon storage operation failed: {0}")]
    Storage(#[from] Box<dyn std::error::Error + Send + Sync>),
}
