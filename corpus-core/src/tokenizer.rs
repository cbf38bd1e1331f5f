//! The maximum-matching, ambiguity-resolving tokenizer (spec §4.3).
//!
//! At every cursor position the tokenizer enumerates all dictionary-legal
//! segmentations up to `MaxDepth` and selects one chain via a fixed
//! four-rule cascade (an MMSEG variant): longest total match, then largest
//! average word length, then smallest word-length variance, then largest
//! sum of single-character lexeme frequencies.

use std::collections::VecDeque;

use crate::config::TokenizerConfig;
use crate::error::TokenizeError;
use crate::lexicon::Lexicon;
use crate::segment::{SegmentArena, SegmentHandle};
use crate::token::Token;

/// Drives the cursor over input text, applying the four-rule cascade at
/// every ambiguous position.
pub struct Tokenizer {
    max_depth: usize,
}

impl Tokenizer {
    /// Build a tokenizer from a [`TokenizerConfig`]. `max_depth` below 1 is
    /// clamped to 1 rather than accepted as-is.
    pub fn new(config: &TokenizerConfig) -> Self {
        Self {
            max_depth: config.max_depth.max(1),
        }
    }

    /// Build a tokenizer with an explicit depth bound, independent of a
    /// [`TokenizerConfig`].
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    /// Tokenize `text` against `lexicon`, producing tokens that cover `text`
    /// exactly, in order, with no gaps or overlaps.
    ///
    /// `text` is raw bytes rather than `&str` because spec's `InvalidEncoding`
    /// failure mode is meaningful only if the input can actually fail UTF-8
    /// validation — a `&str` parameter would make that check unreachable.
    pub fn tokenize(&self, text: &[u8], lexicon: &Lexicon) -> Result<Vec<Token>, TokenizeError> {
        let text = std::str::from_utf8(text).map_err(|_| TokenizeError::InvalidEncoding)?;
        self.tokenize_str(text, lexicon)
    }

    /// Tokenize an already-validated UTF-8 string.
    pub fn tokenize_str(&self, text: &str, lexicon: &Lexicon) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens = Vec::new();
        let mut offset = 0usize;

        while offset < text.len() {
            let mut arena = SegmentArena::new();
            let root = arena.push_root(offset);
            let (leading, failure_offset) = find_following(text, &mut arena, root, lexicon);

            if leading.is_empty() {
                if failure_offset == offset {
                    tracing::debug!(offset, "find_following made no progress, halting defensively");
                    break;
                }
                let run = &text[offset..failure_offset];
                tracing::trace!(offset, failure_offset, run, "emitting non-lexical run");
                tokens.push(Token::non_lexical(run));
                offset = failure_offset;
                continue;
            }

            let chosen = self.resolve_chunk(text, &mut arena, leading, lexicon)?;
            let chain = arena.chain_root_to_leaf(chosen);
            tracing::trace!(
                offset,
                runes = arena.get(chosen).cumulative_runes,
                segments = chain.len(),
                "emitting lexical chunk"
            );
            for segment in &chain {
                tokens.push(Token::lexical(segment.seg_string));
            }
            offset = arena.get(chosen).text_offset;
        }

        Ok(tokens)
    }

    /// §4.3.3–§4.3.4: breadth-first chunk enumeration up to `max_depth`,
    /// then the four-rule tie-breaking cascade.
    fn resolve_chunk<'a>(
        &self,
        text: &'a str,
        arena: &mut SegmentArena<'a>,
        leading: Vec<SegmentHandle>,
        lexicon: &Lexicon,
    ) -> Result<SegmentHandle, TokenizeError> {
        let mut candidates: Vec<SegmentHandle> = Vec::new();
        let mut best_cumulative: Option<u32> = None;
        let mut queue: VecDeque<SegmentHandle> = leading.into_iter().collect();

        while let Some(segment) = queue.pop_front() {
            let cumulative = arena.get(segment).cumulative_runes;
            match best_cumulative {
                None => {
                    candidates = vec![segment];
                    best_cumulative = Some(cumulative);
                }
                Some(best) if cumulative > best => {
                    candidates = vec![segment];
                    best_cumulative = Some(cumulative);
                }
                Some(best) if cumulative == best => {
                    candidates.push(segment);
                }
                _ => {}
            }

            if arena.get(segment).depth < self.max_depth as u32 {
                let (children, _) = find_following(text, arena, segment, lexicon);
                queue.extend(children);
            }
        }

        tracing::trace!(survivors = candidates.len(), "rule 1 (maximum matching) applied");

        candidates = filter_by_greatest_average_length(arena, candidates);
        tracing::trace!(survivors = candidates.len(), "rule 2 (greatest average length) applied");

        candidates = filter_by_smallest_word_length_variance(arena, candidates);
        tracing::trace!(survivors = candidates.len(), "rule 3 (smallest length variance) applied");

        candidates = filter_by_largest_single_char_frequency_sum(arena, candidates);
        tracing::trace!(survivors = candidates.len(), "rule 4 (largest single-char frequency sum) applied");

        candidates.into_iter().next().ok_or(TokenizeError::NoCandidate)
    }
}

/// §4.3.2: walk forward code point by code point from `parent`'s offset,
/// emitting a child segment for every extension that is itself a stored
/// lexeme, and stopping once an extension is neither a lexeme nor a prefix
/// of one. Returns the emitted children and the byte offset one past the
/// last code point examined.
fn find_following<'a>(
    text: &'a str,
    arena: &mut SegmentArena<'a>,
    parent: SegmentHandle,
    lexicon: &Lexicon,
) -> (Vec<SegmentHandle>, usize) {
    let base_offset = arena.get(parent).text_offset;
    let mut segments = Vec::new();
    let mut total_width = 0usize;
    let mut total_runes = 0u32;

    for ch in text[base_offset..].chars() {
        total_width += ch.len_utf8();
        total_runes += 1;
        let seg_string = &text[base_offset..base_offset + total_width];
        let (frequency, is_prefix, exists) = lexicon.get_lexeme_frequency(seg_string);

        if exists {
            let child = arena.push_child(parent, seg_string, frequency, total_runes, base_offset + total_width);
            segments.push(child);
        }

        if !exists && !is_prefix {
            break;
        }
    }

    (segments, base_offset + total_width)
}

/// Rule 2: keep the chunks with the greatest `cumulative_runes / depth`.
fn filter_by_greatest_average_length(
    arena: &SegmentArena,
    candidates: Vec<SegmentHandle>,
) -> Vec<SegmentHandle> {
    let mut filtered = Vec::new();
    let mut max_mean = f64::NEG_INFINITY;

    for candidate in candidates {
        let node = arena.get(candidate);
        let mean = node.cumulative_runes as f64 / node.depth as f64;
        if filtered.is_empty() || mean > max_mean {
            filtered = vec![candidate];
            max_mean = mean;
        } else if mean == max_mean {
            filtered.push(candidate);
        }
    }

    filtered
}

/// Rule 3: keep the chunks with the smallest population variance of
/// segment lengths (Σ then divide, per spec's floating-point note). The
/// sum walks leaf-to-root, matching the original source's `segment.parent`
/// walk (`original_source/tokenizer/zhtw/tokenizer.go`'s
/// `filterBySmallestWordLengthVariance`) rather than
/// `chain_root_to_leaf`'s root-to-leaf order — IEEE-754 addition is not
/// associative, so the two orders can disagree on a tie.
fn filter_by_smallest_word_length_variance(
    arena: &SegmentArena,
    candidates: Vec<SegmentHandle>,
) -> Vec<SegmentHandle> {
    let mut filtered = Vec::new();
    let mut least_variance = f64::INFINITY;

    for candidate in candidates {
        let node = arena.get(candidate);
        let mean = node.cumulative_runes as f64 / node.depth as f64;
        let chain = arena.chain_root_to_leaf(candidate);
        let squared_difference_sum: f64 = chain
            .iter()
            .rev()
            .map(|segment| {
                let diff = segment.num_runes as f64 - mean;
                diff * diff
            })
            .sum();
        let variance = squared_difference_sum / node.depth as f64;

        if filtered.is_empty() || variance < least_variance {
            filtered = vec![candidate];
            least_variance = variance;
        } else if variance == least_variance {
            filtered.push(candidate);
        }
    }

    filtered
}

/// Rule 4: keep the chunks with the greatest sum of single-character
/// lexeme frequencies. Unlike the original source, the running maximum
/// is updated whenever a strictly greater sum is seen (spec §9(i)) —
/// the source's corresponding branch never updates it, which can leave
/// later chains with an intermediate sum incorrectly grouped in.
fn filter_by_largest_single_char_frequency_sum(
    arena: &SegmentArena,
    candidates: Vec<SegmentHandle>,
) -> Vec<SegmentHandle> {
    let mut filtered = Vec::new();
    let mut max_sum = i64::MIN;

    for candidate in candidates {
        let chain = arena.chain_root_to_leaf(candidate);
        let sum: i64 = chain
            .iter()
            .filter(|segment| segment.num_runes == 1)
            .map(|segment| segment.frequency)
            .sum();

        if filtered.is_empty() || sum > max_sum {
            filtered = vec![candidate];
            max_sum = sum;
        } else if sum == max_sum {
            filtered.push(candidate);
        }
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LexiconStorage;

    struct StaticStorage {
        entries: Vec<(&'static str, i64)>,
    }

    impl LexiconStorage for StaticStorage {
        fn get_lexemes(
            &self,
            _name: &str,
            _language: &str,
        ) -> Result<(Vec<String>, Vec<i64>), Box<dyn std::error::Error + Send + Sync>> {
            Ok((
                self.entries.iter().map(|(l, _)| l.to_string()).collect(),
                self.entries.iter().map(|(_, f)| *f).collect(),
            ))
        }

        fn add_lexeme(
            &self,
            _name: &str,
            _language: &str,
            _lexeme: &str,
            _frequency: i64,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Ok(())
        }

        fn add_lexemes(
            &self,
            _name: &str,
            _language: &str,
            _lexemes: &[String],
            _frequencies: &[i64],
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Ok(())
        }
    }

    fn seeded_lexicon() -> Lexicon {
        let storage = StaticStorage {
            entries: vec![
                ("教育", 10),
                ("教育學", 5),
                ("總統", 50),
                ("總統大選", 25),
                ("本", 1),
                ("次", 1),
                ("地震", 20),
                ("發生", 30),
                ("位置", 15),
                ("約", 1),
                ("位於", 25),
                ("日本", 40),
                ("本州", 20),
                ("西部", 15),
                ("近海", 10),
            ],
        };
        let mut lexicon = Lexicon::new("seed", "zh-tw");
        lexicon.load_repository(&storage).unwrap();
        lexicon
    }

    fn words(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.word.as_str()).collect()
    }

    #[test]
    fn single_lexeme_input() {
        let lexicon = seeded_lexicon();
        let tok = Tokenizer::with_max_depth(3);
        let tokens = tok.tokenize_str("教育", &lexicon).unwrap();
        assert_eq!(tokens, vec![Token::lexical("教育")]);
    }

    #[test]
    fn lexeme_followed_by_unknown_trailer() {
        let lexicon = seeded_lexicon();
        let tok = Tokenizer::with_max_depth(3);
        let tokens = tok.tokenize_str("教育學貓", &lexicon).unwrap();
        assert_eq!(words(&tokens), vec!["教育學", "貓"]);
        assert!(!tokens[1].lexical);
    }

    #[test]
    fn maximum_matching_prefers_the_longest_chunk() {
        let lexicon = seeded_lexicon();
        let tok = Tokenizer::with_max_depth(3);
        let tokens = tok.tokenize_str("總統大選", &lexicon).unwrap();
        assert_eq!(words(&tokens), vec!["總統大選"]);
    }

    #[test]
    fn seed_sentence_matches_the_documented_segmentation() {
        let lexicon = seeded_lexicon();
        let tok = Tokenizer::with_max_depth(3);
        let text = "本次地震發生位置約位於日本本州西部近海。";
        let tokens = tok.tokenize_str(text, &lexicon).unwrap();
        let expected = vec![
            "本", "次", "地震", "發生", "位置", "約", "位於", "日本", "本州", "西部", "近海", "。",
        ];
        assert_eq!(words(&tokens), expected);
        assert!(!tokens.last().unwrap().lexical);
    }

    #[test]
    fn coverage_property_reconstructs_input_exactly() {
        let lexicon = seeded_lexicon();
        let tok = Tokenizer::with_max_depth(3);
        let text = "本次地震發生位置約位於日本本州西部近海。";
        let tokens = tok.tokenize_str(text, &lexicon).unwrap();
        let reconstructed: String = tokens.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(reconstructed, text);
    }

    #[test]
    fn every_lexical_token_exists_in_the_lexicon() {
        let lexicon = seeded_lexicon();
        let tok = Tokenizer::with_max_depth(3);
        let text = "本次地震發生位置約位於日本本州西部近海。";
        let tokens = tok.tokenize_str(text, &lexicon).unwrap();
        for token in tokens.iter().filter(|t| t.lexical) {
            let (_, _, exists) = lexicon.get_lexeme_frequency(&token.word);
            assert!(exists, "{} should exist in lexicon", token.word);
        }
    }

    #[test]
    fn no_two_consecutive_non_lexical_tokens() {
        let lexicon = seeded_lexicon();
        let tok = Tokenizer::with_max_depth(3);
        let text = "本次地震發生位置約位於日本本州西部近海。";
        let tokens = tok.tokenize_str(text, &lexicon).unwrap();
        for pair in tokens.windows(2) {
            assert!(!(!pair[0].lexical && !pair[1].lexical));
        }
    }

    #[test]
    fn determinism_across_repeated_calls() {
        let lexicon = seeded_lexicon();
        let tok = Tokenizer::with_max_depth(3);
        let text = "本次地震發生位置約位於日本本州西部近海。";
        let first = tok.tokenize_str(text, &lexicon).unwrap();
        let second = tok.tokenize_str(text, &lexicon).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn characters_with_no_dictionary_overlap_each_become_their_own_non_lexical_token() {
        // None of "A".."F" appear as the first rune of any seeded lexeme, so
        // each one fails find_following immediately at the root and is
        // emitted as its own single-rune non-lexical token — a single
        // find_following sweep never grows past a rune with zero trie
        // children.
        let lexicon = seeded_lexicon();
        let tok = Tokenizer::with_max_depth(3);
        let tokens = tok.tokenize_str("ABCDEF", &lexicon).unwrap();
        assert_eq!(tokens.len(), 6);
        assert!(tokens.iter().all(|t| !t.lexical));
        let reconstructed: String = tokens.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(reconstructed, "ABCDEF");
    }

    #[test]
    fn a_dangling_unterminated_prefix_is_clumped_into_one_non_lexical_token() {
        // A single find_following sweep keeps extending through runes that
        // are prefixes of some lexeme without ever completing one; if the
        // sweep then fails outright, every rune it walked through — not
        // just the first — is clumped into one non-lexical token. "XYZQ" is
        // the only entry under X, so "XYZW" walks X -> XY -> XYZ (all
        // dangling prefixes) before failing on the fourth rune.
        let storage = StaticStorage {
            entries: vec![("XYZQ", 1)],
        };
        let mut lexicon = Lexicon::new("dangling", "zh-tw");
        lexicon.load_repository(&storage).unwrap();
        let tok = Tokenizer::with_max_depth(3);
        let tokens = tok.tokenize_str("XYZW", &lexicon).unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(!tokens[0].lexical);
        assert_eq!(tokens[0].word, "XYZW");
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        let lexicon = seeded_lexicon();
        let tok = Tokenizer::with_max_depth(3);
        let tokens = tok.tokenize_str("", &lexicon).unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn invalid_utf8_bytes_surface_invalid_encoding() {
        let lexicon = seeded_lexicon();
        let tok = Tokenizer::with_max_depth(3);
        let bad_bytes: &[u8] = &[0xff, 0xfe, 0x00];
        let result = tok.tokenize(bad_bytes, &lexicon);
        assert!(matches!(result, Err(TokenizeError::InvalidEncoding)));
    }

    #[test]
    fn rule_four_breaks_ties_by_single_char_frequency_sum() {
        let storage = StaticStorage {
            entries: vec![("甲", 5), ("乙", 50), ("丙", 1), ("甲乙", 1), ("乙丙", 1)],
        };
        let mut lexicon = Lexicon::new("rule4", "zh-tw");
        lexicon.load_repository(&storage).unwrap();
        let tok = Tokenizer::with_max_depth(2);
        // Both "甲"+"乙丙" and "甲乙"+"丙" span 3 runes at depth 2 with
        // identical mean (1.5) and variance (0.25); rule 4 sums frequencies
        // over single-rune segments only: "甲"+"乙丙" contributes 甲's
        // freq 5, "甲乙"+"丙" contributes 丙's freq 1. The higher sum wins.
        let tokens = tok.tokenize_str("甲乙丙", &lexicon).unwrap();
        assert_eq!(words(&tokens), vec!["甲", "乙丙"]);
    }

    #[test]
    fn rule_three_pins_population_variance_not_sample_variance() {
        // Two synthetic chains built directly against the arena (bypassing
        // the trie) so depth and word-length spread can be chosen to make
        // population variance (/depth) and sample variance (/(depth-1))
        // disagree on which chain is "smoothest".
        //
        // Chain A: depth 2, runs [1, 5], cumulative 6, mean 3.
        //   squared-difference sum = 4 + 4 = 8
        //   population variance (/depth)       = 8 / 2 = 4.0
        //   sample variance (/(depth-1))        = 8 / 1 = 8.0
        // Chain B: depth 3, runs [1, 4, 6], cumulative 11, mean 11/3.
        //   squared-difference sum = 64/9 + 1/9 + 49/9 = 114/9
        //   population variance (/depth)       = 114/27 ≈ 4.222
        //   sample variance (/(depth-1))        = 114/18 ≈ 6.333
        //
        // Under population variance A < B, so A wins. Under sample variance
        // A > B, so B would win instead — the two conventions disagree.
        let text = "aaaaaaaaaaaa";
        let mut arena = SegmentArena::new();
        let root = arena.push_root(0);

        let a1 = arena.push_child(root, &text[0..1], 0, 1, 1);
        let a2 = arena.push_child(a1, &text[1..6], 0, 5, 6);

        let b1 = arena.push_child(root, &text[0..1], 0, 1, 1);
        let b2 = arena.push_child(b1, &text[1..5], 0, 4, 5);
        let b3 = arena.push_child(b2, &text[5..11], 0, 6, 11);

        let filtered = filter_by_smallest_word_length_variance(&arena, vec![a2, b3]);
        assert_eq!(filtered, vec![a2], "population variance should prefer the depth-2 chain");
    }

    #[test]
    fn max_depth_of_one_still_picks_the_longest_single_lexeme() {
        let lexicon = seeded_lexicon();
        let tok = Tokenizer::with_max_depth(1);
        let tokens = tok.tokenize_str("教育學貓", &lexicon).unwrap();
        // find_following's walk from the root is governed by trie structure,
        // not MaxDepth — it already surfaces both "教育" (cum 2) and
        // "教育學" (cum 3) as depth-1 candidates. MaxDepth=1 only forbids
        // extending past depth 1, so rule 1 alone picks the longer lexeme.
        assert_eq!(words(&tokens)[0], "教育學");
    }
}
