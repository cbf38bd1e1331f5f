//! Lexicon: a named, language-tagged [`Trie`] mediating between persistence
//! and in-memory lookup (spec §3, §4.2).

use crate::error::TokenizeError;
use crate::trie::Trie;

/// The narrow persistence interface the core consumes (spec §6). Storage is
/// an injected capability rather than a process-wide singleton — the
/// opposite of the original Go source's `sync.Once`-guarded global
/// repository — so a [`Lexicon`] can be built against an in-memory store in
/// tests and a `redb`-backed store in production with no code change here.
pub trait LexiconStorage {
    /// Fetch every stored `(lexeme, frequency)` pair for `(name, language)`.
    fn get_lexemes(
        &self,
        name: &str,
        language: &str,
    ) -> Result<(Vec<String>, Vec<i64>), Box<dyn std::error::Error + Send + Sync>>;

    /// Persist a single lexeme.
    fn add_lexeme(
        &self,
        name: &str,
        language: &str,
        lexeme: &str,
        frequency: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Persist many lexemes; fails atomically on any constraint violation.
    fn add_lexemes(
        &self,
        name: &str,
        language: &str,
        lexemes: &[String],
        frequencies: &[i64],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// A trie plus the identity used to select it in persistent storage.
pub struct Lexicon {
    name: String,
    language: String,
    trie: Trie,
}

impl Lexicon {
    /// Create an empty lexicon with no backing trie entries yet.
    pub fn new<N: Into<String>, L: Into<String>>(name: N, language: L) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            trie: Trie::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Bulk-load every persisted lexeme for this lexicon's `(name, language)`
    /// into a fresh trie. If storage returns nothing, or errors, the error
    /// propagates and the lexicon is left empty but still usable.
    pub fn load_repository(&mut self, storage: &impl LexiconStorage) -> Result<(), TokenizeError> {
        let (lexemes, frequencies) = storage
            .get_lexemes(&self.name, &self.language)
            .map_err(TokenizeError::Storage)?;
        self.trie.insert_bulk(&lexemes, &frequencies);
        Ok(())
    }

    /// Dual-write a lexeme: trie first, then storage. If storage fails, the
    /// trie is rolled back to its pre-mutation snapshot (spec §9's preferred
    /// resolution — the opposite order from the original Go source, which
    /// writes storage first and never rolls back a later in-memory step).
    pub fn add_lexeme(
        &mut self,
        storage: &impl LexiconStorage,
        lexeme: &str,
        frequency: i64,
    ) -> Result<(), TokenizeError> {
        let snapshot = self.trie.entries();
        self.trie.insert(lexeme, frequency);

        if let Err(e) = storage.add_lexeme(&self.name, &self.language, lexeme, frequency) {
            self.trie = rebuild_from(&snapshot);
            return Err(TokenizeError::Storage(e));
        }

        Ok(())
    }

    /// Dual-write many lexemes at once, same rollback contract as
    /// [`Lexicon::add_lexeme`].
    pub fn add_lexemes(
        &mut self,
        storage: &impl LexiconStorage,
        lexemes: &[String],
        frequencies: &[i64],
    ) -> Result<(), TokenizeError> {
        let n = lexemes.len().min(frequencies.len());
        let snapshot = self.trie.entries();
        self.trie.insert_bulk(&lexemes[..n], &frequencies[..n]);

        if let Err(e) =
            storage.add_lexemes(&self.name, &self.language, &lexemes[..n], &frequencies[..n])
        {
            self.trie = rebuild_from(&snapshot);
            return Err(TokenizeError::Storage(e));
        }

        Ok(())
    }

    /// Direct delegation to the trie (spec §4.2).
    pub fn get_lexeme_frequency(&self, s: &str) -> (i64, bool, bool) {
        self.trie.get(s)
    }

    pub fn num_entries(&self) -> usize {
        self.trie.num_entries()
    }

    pub(crate) fn trie(&self) -> &Trie {
        &self.trie
    }
}

/// Rebuild a trie from a prior [`Trie::entries`] snapshot. The trie has no
/// delete operation (spec §3's lifecycle note), so undoing a dual-write on
/// the rare storage-failure path means re-deriving the trie wholesale
/// rather than surgically reverting one lexeme.
fn rebuild_from(snapshot: &[(String, i64)]) -> Trie {
    let mut rebuilt = Trie::new();
    for (lexeme, frequency) in snapshot {
        rebuilt.insert(lexeme, *frequency);
    }
    rebuilt
}
