//! Driver binary for `corpus-core`: load a dictionary file into a
//! persisted lexicon, then tokenize text against it.
//!
//! This binary is deliberately thin — everything it does is delegate to
//! `corpus-core`/`corpus-storage`. It owns only argument parsing, config
//! loading, and logging setup, the way the teacher's `tools` binary is a
//! thin `clap` wrapper around `convert_table`/`convert_interpolation`.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use corpus_core::{Lexicon, Tokenizer, TokenizerConfig};
use corpus_storage::{parse_dictionary_file, ArticleTokenStore, RedbArticleTokenStore, RedbLexiconStorage};

#[derive(Parser)]
#[command(name = "corpus-cli", about = "Segment Traditional Chinese text against a persisted lexicon")]
struct Args {
    /// Path to a TOML `TokenizerConfig`. Falls back to `TokenizerConfig::default()`.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load lexemes from a dictionary text file into a redb-backed lexicon store.
    Load {
        /// Dictionary text file: one `lexeme frequency` entry per line.
        #[arg(long)]
        dict_file: PathBuf,
        /// redb database file backing the lexicon store.
        #[arg(long)]
        lexicon_db: PathBuf,
        /// Lexicon name, overriding the config file's `lexicon_name`.
        #[arg(long)]
        lexicon_name: Option<String>,
        /// Language tag, overriding the config file's `language`.
        #[arg(long)]
        language: Option<String>,
    },
    /// Tokenize text read from a file, or from stdin if no file is given.
    Tokenize {
        /// redb database file backing the lexicon store.
        #[arg(long)]
        lexicon_db: PathBuf,
        /// Lexicon name, overriding the config file's `lexicon_name`.
        #[arg(long)]
        lexicon_name: Option<String>,
        /// Language tag, overriding the config file's `language`.
        #[arg(long)]
        language: Option<String>,
        /// Maximum chain depth explored per cursor step, overriding the config file's `max_depth`.
        #[arg(long)]
        max_depth: Option<usize>,
        /// Input file to tokenize; reads stdin if omitted.
        #[arg(long)]
        input: Option<PathBuf>,
        /// If set, persist the resulting tokens under this article id.
        #[arg(long)]
        article_id: Option<i64>,
        /// redb database file backing the article-token store. Required if `--article-id` is set.
        #[arg(long)]
        tokens_db: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => TokenizerConfig::load_toml(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => TokenizerConfig::default(),
    };

    match args.command {
        Command::Load {
            dict_file,
            lexicon_db,
            lexicon_name,
            language,
        } => {
            if let Some(name) = lexicon_name {
                config.lexicon_name = name;
            }
            if let Some(lang) = language {
                config.language = lang;
            }
            run_load(&dict_file, &lexicon_db, &config)
        }
        Command::Tokenize {
            lexicon_db,
            lexicon_name,
            language,
            max_depth,
            input,
            article_id,
            tokens_db,
        } => {
            if let Some(name) = lexicon_name {
                config.lexicon_name = name;
            }
            if let Some(lang) = language {
                config.language = lang;
            }
            if let Some(depth) = max_depth {
                config.max_depth = depth.max(1);
            }
            run_tokenize(&lexicon_db, &config, input, article_id, tokens_db)
        }
    }
}

fn run_load(dict_file: &std::path::Path, lexicon_db: &std::path::Path, config: &TokenizerConfig) -> Result<()> {
    let (lexemes, frequencies) = parse_dictionary_file(dict_file)
        .with_context(|| format!("parsing dictionary file {}", dict_file.display()))?;
    tracing::info!(count = lexemes.len(), path = %dict_file.display(), "parsed dictionary file");

    let storage = RedbLexiconStorage::open(lexicon_db)
        .with_context(|| format!("opening lexicon store at {}", lexicon_db.display()))?;
    let mut lexicon = Lexicon::new(config.lexicon_name.clone(), config.language.clone());
    lexicon
        .add_lexemes(&storage, &lexemes, &frequencies)
        .context("persisting lexemes")?;

    println!("loaded {} lexemes into {}", lexicon.num_entries(), lexicon_db.display());
    Ok(())
}

fn run_tokenize(
    lexicon_db: &std::path::Path,
    config: &TokenizerConfig,
    input: Option<PathBuf>,
    article_id: Option<i64>,
    tokens_db: Option<PathBuf>,
) -> Result<()> {
    let storage = RedbLexiconStorage::open(lexicon_db)
        .with_context(|| format!("opening lexicon store at {}", lexicon_db.display()))?;
    let mut lexicon = Lexicon::new(config.lexicon_name.clone(), config.language.clone());
    lexicon
        .load_repository(&storage)
        .context("loading lexicon")?;
    tracing::info!(entries = lexicon.num_entries(), "lexicon loaded");

    let text = match &input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading input file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    let tokenizer = Tokenizer::new(config);
    let tokens = tokenizer
        .tokenize_str(&text, &lexicon)
        .context("tokenizing input")?;

    for token in &tokens {
        println!("{}\t{}", token.word, if token.lexical { "lexical" } else { "non-lexical" });
    }

    if let Some(article_id) = article_id {
        let tokens_db = tokens_db.context("--tokens-db is required when --article-id is set")?;
        let store = RedbArticleTokenStore::open(&tokens_db)
            .with_context(|| format!("opening token store at {}", tokens_db.display()))?;
        store
            .save_tokens(article_id, &tokens)
            .context("saving tokens")?;
        tracing::info!(article_id, "saved tokens");
    }

    Ok(())
}
