//! Vowel-boundary syllabization.
//!
//! This approximates English syllable boundaries from spelling alone. It is
//! deliberately naive: each chunk is a run of non-vowels, one or more vowels,
//! then any trailing non-vowels that are not followed by a vowel. Y counts as
//! a vowel. Words without a vowel are cut into fixed 3-character pieces.

use fancy_regex::Regex;
use once_cell::sync::Lazy;

/// Width of the fallback chunks used for words with no vowel.
pub const FALLBACK_CHUNK_CHARS: usize = 3;

static RE_SYLLABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[^AEIOUY]*[AEIOUY]+(?:[^AEIOUY](?![AEIOUY]))*")
        .expect("syllable pattern is valid")
});

/// Split a single word into chunks whose concatenation is the word.
///
/// Returns an empty list for an empty word.
pub fn syllabize_word(word: &str) -> Vec<String> {
    if word.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    for m in RE_SYLLABLE.find_iter(word) {
        match m {
            Ok(m) => chunks.push(m.as_str().to_string()),
            Err(e) => {
                log::warn!("Syllable matching aborted for {word:?}: {e}");
                chunks.clear();
                break;
            }
        }
    }

    if chunks.is_empty() {
        log::debug!("No vowel run in {word:?}, using fixed-width chunks");
        return fixed_width_chunks(word, FALLBACK_CHUNK_CHARS);
    }

    debug_assert_eq!(chunks.concat(), word);
    chunks
}

/// Uppercase `text`, split it on whitespace and syllabize each word in order.
pub fn syllabize_text(text: &str) -> Vec<String> {
    text.to_uppercase()
        .split_whitespace()
        .flat_map(syllabize_word)
        .collect()
}

fn fixed_width_chunks(word: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(width)
        .map(|c| c.iter().collect::<String>())
        .collect()
}
