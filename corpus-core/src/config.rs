//! Tokenizer configuration (spec §6's `MaxDepth` and Lexicon identity),
//! loadable from TOML the way `libchinese-core`'s top-level `Config` is in
//! the teacher crate.

use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::tokenizer::Tokenizer`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenizerConfig {
    /// Upper bound on chain length explored per cursor step. Must be ≥ 1;
    /// values loaded from a config file are clamped up to 1 rather than
    /// left at 0, which would wedge the tokenizer into never extending past
    /// the leading segments.
    pub max_depth: usize,
    /// Identity of the lexicon this tokenizer should be paired with.
    pub lexicon_name: String,
    /// Language tag for the lexicon (spec's parametric language tag).
    pub language: String,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            lexicon_name: String::new(),
            language: String::new(),
        }
    }
}

impl TokenizerConfig {
    /// Construct with an explicit `max_depth`, clamped to a minimum of 1.
    pub fn new<N: Into<String>, L: Into<String>>(max_depth: usize, lexicon_name: N, language: L) -> Self {
        Self {
            max_depth: max_depth.max(1),
            lexicon_name: lexicon_name.into(),
            language: language.into(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.max_depth = config.max_depth.max(1);
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
