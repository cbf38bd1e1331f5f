//! Persistence adapters for `corpus-core`: concrete
//! [`corpus_core::LexiconStorage`] implementations, a dictionary text-file
//! parser for seeding a lexicon, and a store for tokenized article output.
//!
//! None of this crate's types are referenced by the tokenization core
//! itself — it consumes only the `LexiconStorage` trait, so swapping the
//! in-memory adapter here for the `redb`-backed one requires no change to
//! `corpus-core`.

pub mod dictfile;
pub mod lexicon_store;
pub mod tokens_store;

pub use dictfile::parse_dictionary_file;
pub use lexicon_store::{InMemoryLexiconStorage, RedbLexiconStorage};
pub use tokens_store::{ArticleTokenStore, RedbArticleTokenStore};
