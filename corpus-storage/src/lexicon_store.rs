//! [`corpus_core::LexiconStorage`] implementations.
//!
//! `RedbLexiconStorage` follows the read-transaction-then-write-transaction
//! shape the teacher's `UserDict` uses: a read to check current state, then
//! a fresh write transaction whose table handle is dropped before `commit`.
//! `InMemoryLexiconStorage` is a `Mutex`-guarded map for tests and small
//! tools that don't need a file-backed store at all.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use redb::{Database, ReadableTable, TableDefinition};

use corpus_core::LexiconStorage;

const TABLE: TableDefinition<'static, &'static str, i64> = TableDefinition::new("lexemes");

fn table_key(name: &str, language: &str, lexeme: &str) -> String {
    format!("{name}\0{language}\0{lexeme}")
}

/// `HashMap`-backed [`LexiconStorage`] with no persistence. Useful in tests
/// and for tools that build a `Lexicon` ad hoc from in-process data.
#[derive(Debug, Default)]
pub struct InMemoryLexiconStorage {
    entries: Mutex<HashMap<String, i64>>,
}

impl InMemoryLexiconStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LexiconStorage for InMemoryLexiconStorage {
    fn get_lexemes(
        &self,
        name: &str,
        language: &str,
    ) -> Result<(Vec<String>, Vec<i64>), Box<dyn std::error::Error + Send + Sync>> {
        let prefix = format!("{name}\0{language}\0");
        let guard = self.entries.lock().expect("lexicon storage mutex poisoned");
        let mut lexemes = Vec::new();
        let mut frequencies = Vec::new();
        for (key, frequency) in guard.iter() {
            if let Some(lexeme) = key.strip_prefix(&prefix) {
                lexemes.push(lexeme.to_string());
                frequencies.push(*frequency);
            }
        }
        Ok((lexemes, frequencies))
    }

    fn add_lexeme(
        &self,
        name: &str,
        language: &str,
        lexeme: &str,
        frequency: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut guard = self.entries.lock().expect("lexicon storage mutex poisoned");
        guard.insert(table_key(name, language, lexeme), frequency);
        Ok(())
    }

    /// Bulk insert. Unlike [`InMemoryLexiconStorage::add_lexeme`], this
    /// fails atomically (no entries written) if any lexeme in the batch is
    /// already present or repeated within the batch itself — matching
    /// `original_source/repository/repository.go`'s `AddLexemes`, whose
    /// `pq.CopyIn`-based bulk insert fails on a duplicate where the
    /// single-entry `AddLexeme` silently ignores one (`ON CONFLICT DO
    /// NOTHING`).
    fn add_lexemes(
        &self,
        name: &str,
        language: &str,
        lexemes: &[String],
        frequencies: &[i64],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut guard = self.entries.lock().expect("lexicon storage mutex poisoned");
        let mut seen_in_batch = std::collections::HashSet::new();
        for lexeme in lexemes {
            let key = table_key(name, language, lexeme);
            if guard.contains_key(&key) || !seen_in_batch.insert(key) {
                return Err(format!("duplicate lexeme in bulk insert: {lexeme}").into());
            }
        }

        for (lexeme, frequency) in lexemes.iter().zip(frequencies.iter()) {
            guard.insert(table_key(name, language, lexeme), *frequency);
        }
        Ok(())
    }
}

/// `redb`-backed [`LexiconStorage`], one table shared across every
/// `(name, language)` pair, keyed by a NUL-joined composite string.
#[derive(Debug)]
pub struct RedbLexiconStorage {
    db: Database,
    #[allow(dead_code)]
    path: PathBuf,
}

impl RedbLexiconStorage {
    /// Create or open a lexicon store at `path`, creating parent directories
    /// as needed.
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

impl LexiconStorage for RedbLexiconStorage {
    fn get_lexemes(
        &self,
        name: &str,
        language: &str,
    ) -> Result<(Vec<String>, Vec<i64>), Box<dyn std::error::Error + Send + Sync>> {
        let prefix = format!("{name}\0{language}\0");
        let read_txn = self.db.begin_read()?;
        let mut lexemes = Vec::new();
        let mut frequencies = Vec::new();

        match read_txn.open_table(TABLE) {
            Ok(table) => {
                for item in table.iter()? {
                    let (key, value) = item?;
                    if let Some(lexeme) = key.value().strip_prefix(&prefix) {
                        lexemes.push(lexeme.to_string());
                        frequencies.push(value.value());
                    }
                }
            }
            Err(redb::TableError::TableDoesNotExist(_)) => {}
            Err(e) => return Err(Box::new(e)),
        }

        tracing::debug!(name, language, count = lexemes.len(), "loaded lexemes from redb");
        Ok((lexemes, frequencies))
    }

    fn add_lexeme(
        &self,
        name: &str,
        language: &str,
        lexeme: &str,
        frequency: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let key = table_key(name, language, lexeme);
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE)?;
            table.insert(key.as_str(), frequency)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Bulk insert. Fails atomically — no write transaction is opened — if
    /// any lexeme in the batch already exists in the table or repeats
    /// within the batch itself, mirroring `original_source`'s
    /// `pq.CopyIn`-based `AddLexemes`, which fails on a duplicate where the
    /// single-entry `AddLexeme` silently ignores one.
    fn add_lexemes(
        &self,
        name: &str,
        language: &str,
        lexemes: &[String],
        frequencies: &[i64],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let read_txn = self.db.begin_read()?;
        let mut seen_in_batch = std::collections::HashSet::new();
        for lexeme in lexemes {
            let key = table_key(name, language, lexeme);
            let already_stored = match read_txn.open_table(TABLE) {
                Ok(table) => table.get(key.as_str())?.is_some(),
                Err(redb::TableError::TableDoesNotExist(_)) => false,
                Err(e) => return Err(Box::new(e)),
            };
            if already_stored || !seen_in_batch.insert(key) {
                return Err(format!("duplicate lexeme in bulk insert: {lexeme}").into());
            }
        }
        drop(read_txn);

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE)?;
            for (lexeme, frequency) in lexemes.iter().zip(frequencies.iter()) {
                let key = table_key(name, language, lexeme);
                table.insert(key.as_str(), *frequency)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}
