//! Persisted tokenization output, keyed by article identifier.
//!
//! This is ambient stack the core tokenizer has no opinion on: the spec's
//! external-interfaces note about per-article idempotent token storage,
//! implemented the way the teacher's `UserDict` stores keyed records in
//! `redb`, but with a `bincode`-serialized `Vec<Token>` payload instead of
//! a bare integer.

use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, TableDefinition};

use corpus_core::Token;

const TABLE: TableDefinition<'static, i64, Vec<u8>> = TableDefinition::new("article_tokens");

/// Narrow persistence capability for tokenized article output. Kept
/// separate from [`corpus_core::LexiconStorage`] — callers that only
/// tokenize and don't persist results never need to implement this.
///
/// `article_id` is an `i64` (spec.md §6's `save_tokens(article_id: int, ...)`),
/// not a string — article identifiers are the relational store's primary
/// key, not a free-form label.
pub trait ArticleTokenStore {
    /// Persist `tokens` under `article_id`. Idempotent: calling this again
    /// with the same `article_id` and an identical token list is a no-op
    /// that still returns `Ok`; calling it with a different token list
    /// overwrites the prior entry.
    fn save_tokens(&self, article_id: i64, tokens: &[Token]) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Fetch the tokens previously saved under `article_id`, or `None` if
    /// nothing has been saved for it.
    fn load_tokens(&self, article_id: i64) -> Result<Option<Vec<Token>>, Box<dyn std::error::Error + Send + Sync>>;
}

/// `redb`-backed [`ArticleTokenStore`].
#[derive(Debug)]
pub struct RedbArticleTokenStore {
    db: Database,
    #[allow(dead_code)]
    path: PathBuf,
}

impl RedbArticleTokenStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, redb::Error> {
        if let Some(dir) = path.as_ref().parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        let db = Database::create(path.as_ref())?;
        Ok(Self {
            db,
            path: path.as_ref().to_path_buf(),
        })
    }
}

impl ArticleTokenStore for RedbArticleTokenStore {
    fn save_tokens(&self, article_id: i64, tokens: &[Token]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let encoded = bincode::serialize(tokens)?;

        let read_txn = self.db.begin_read()?;
        let existing = match read_txn.open_table(TABLE) {
            Ok(table) => table.get(article_id)?.map(|v| v.value().to_vec()),
            Err(redb::TableError::TableDoesNotExist(_)) => None,
            Err(e) => return Err(Box::new(e)),
        };
        drop(read_txn);

        if existing.as_deref() == Some(encoded.as_slice()) {
            tracing::debug!(article_id, "tokens already saved, skipping write");
            return Ok(());
        }

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE)?;
            table.insert(article_id, encoded)?;
        }
        write_txn.commit()?;
        tracing::debug!(article_id, token_count = tokens.len(), "saved article tokens");
        Ok(())
    }

    fn load_tokens(&self, article_id: i64) -> Result<Option<Vec<Token>>, Box<dyn std::error::Error + Send + Sync>> {
        let read_txn = self.db.begin_read()?;
        let raw = match read_txn.open_table(TABLE) {
            Ok(table) => table.get(article_id)?.map(|v| v.value().to_vec()),
            Err(redb::TableError::TableDoesNotExist(_)) => None,
            Err(e) => return Err(Box::new(e)),
        };

        match raw {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> RedbArticleTokenStore {
        let dir = std::env::temp_dir().join(format!(
            "corpus-storage-tokens-test-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        RedbArticleTokenStore::open(dir.join("tokens.redb")).unwrap()
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = temp_store();
        let tokens = vec![Token::lexical("教育"), Token::non_lexical("。")];
        store.save_tokens(1, &tokens).unwrap();
        let loaded = store.load_tokens(1).unwrap();
        assert_eq!(loaded, Some(tokens));
    }

    #[test]
    fn loading_an_unknown_article_returns_none() {
        let store = temp_store();
        assert_eq!(store.load_tokens(404).unwrap(), None);
    }

    #[test]
    fn saving_twice_with_the_same_tokens_is_idempotent() {
        let store = temp_store();
        let tokens = vec![Token::lexical("總統大選")];
        store.save_tokens(2, &tokens).unwrap();
        store.save_tokens(2, &tokens).unwrap();
        assert_eq!(store.load_tokens(2).unwrap(), Some(tokens));
    }

    #[test]
    fn saving_different_tokens_overwrites_the_prior_entry() {
        let store = temp_store();
        store.save_tokens(3, &[Token::lexical("教育")]).unwrap();
        store.save_tokens(3, &[Token::lexical("總統大選")]).unwrap();
        assert_eq!(
            store.load_tokens(3).unwrap(),
            Some(vec![Token::lexical("總統大選")])
        );
    }
}
