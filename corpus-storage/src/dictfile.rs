//! Dictionary text-file format: one `lexeme<space>frequency` entry per
//! line, `#`-prefixed comment lines, blank and malformed lines silently
//! skipped. Mirrors the line-scanning style of the teacher's tabular
//! dictionary converter, adapted to `anyhow::Result` for the loader itself.

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};

/// Parse a dictionary file into parallel `(lexemes, frequencies)` vectors
/// suitable for [`corpus_core::Trie::insert_bulk`] or
/// [`corpus_core::LexiconStorage::add_lexemes`].
///
/// Lines are whitespace-split; the first field is the lexeme, the last
/// field must parse as a non-negative decimal integer frequency (spec §6).
/// `#`-prefixed and blank lines are skipped. A line with fewer than two
/// fields, or whose frequency field doesn't parse as `u64` (including a
/// negative value), is skipped rather than treated as an error — dictionary
/// exports commonly carry stray header or footer lines.
pub fn parse_dictionary_file<P: AsRef<Path>>(path: P) -> Result<(Vec<String>, Vec<i64>)> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening dictionary file {}", path.display()))?;
    let reader = std::io::BufReader::new(file);

    let mut lexemes = Vec::new();
    let mut frequencies = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {} of {}", line_number + 1, path.display()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() < 2 {
            continue;
        }

        let frequency = match fields.last().and_then(|f| f.parse::<u64>().ok()) {
            Some(f) => f as i64,
            None => continue,
        };

        lexemes.push(fields[0].to_string());
        frequencies.push(frequency);
    }

    Ok((lexemes, frequencies))
}
