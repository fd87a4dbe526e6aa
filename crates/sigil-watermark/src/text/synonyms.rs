//! Synonym-swap channel
//!
//! A fixed table of visible-equivalent word pairs; at each matched
//! token the first member encodes bit 0 and the second bit 1. The case
//! of the first letter is preserved, so sentence-initial words survive
//! substitution.

use tracing::warn;

use crate::bits::BitString;
use crate::error::{Result, WatermarkError};

/// The fixed synonym-pair table: (original, alternative)
pub const SYNONYM_PAIRS: &[(&str, &str)] = &[
    ("big", "large"),
    ("small", "tiny"),
    ("quick", "fast"),
    ("slow", "sluggish"),
    ("happy", "glad"),
    ("sad", "unhappy"),
    ("smart", "clever"),
    ("begin", "start"),
    ("end", "finish"),
    ("show", "display"),
    ("help", "assist"),
    ("make", "create"),
    ("good", "fine"),
    ("important", "significant"),
    ("easy", "simple"),
    ("hard", "difficult"),
];

fn lookup(word: &str) -> Option<(usize, bool)> {
    let lower = word.to_lowercase();
    SYNONYM_PAIRS.iter().enumerate().find_map(|(i, (orig, alt))| {
        if lower == *orig {
            Some((i, false))
        } else if lower == *alt {
            Some((i, true))
        } else {
            None
        }
    })
}

/// Number of candidate tokens the carrier offers.
pub fn candidate_count(text: &str) -> usize {
    tokens(text).filter(|t| t.is_word && lookup(t.text).is_some()).count()
}

/// Embed a framed bit sequence by swapping synonym tokens.
pub fn embed(text: &str, frame: &BitString) -> Result<String> {
    let available = candidate_count(text);
    if available < frame.len() {
        warn!(
            needed = frame.len(),
            available, "synonym channel carrier too small"
        );
        return Err(WatermarkError::InsufficientCarrierCapacity {
            needed: frame.len(),
            available,
        });
    }

    let mut out = String::with_capacity(text.len());
    let mut index = 0;

    for token in tokens(text) {
        if !token.is_word {
            out.push_str(token.text);
            continue;
        }
        let Some((pair, _)) = lookup(token.text) else {
            out.push_str(token.text);
            continue;
        };

        match frame.get(index) {
            Some(bit) => {
                let (orig, alt) = SYNONYM_PAIRS[pair];
                let replacement = if bit { alt } else { orig };
                out.push_str(&match_case(token.text, replacement));
            }
            None => out.push_str(token.text),
        }
        index += 1;
    }

    Ok(out)
}

/// Walk every candidate token left-to-right and emit its bit.
pub fn extract(text: &str) -> BitString {
    tokens(text)
        .filter(|t| t.is_word)
        .filter_map(|t| lookup(t.text))
        .map(|(_, is_alternative)| is_alternative)
        .collect()
}

/// Carry the original token's first-letter case onto the replacement.
fn match_case(original: &str, replacement: &str) -> String {
    let starts_upper = original
        .chars()
        .next()
        .map(|c| c.is_uppercase())
        .unwrap_or(false);
    if starts_upper {
        let mut chars = replacement.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        replacement.to_string()
    }
}

struct Token<'a> {
    text: &'a str,
    is_word: bool,
}

/// Split into alternating word / non-word segments.
fn tokens(text: &str) -> impl Iterator<Item = Token<'_>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut current_is_word: Option<bool> = None;

    for (i, c) in text.char_indices() {
        let is_word = c.is_alphabetic();
        match current_is_word {
            Some(prev) if prev == is_word => {}
            Some(prev) => {
                segments.push(Token {
                    text: &text[start..i],
                    is_word: prev,
                });
                start = i;
                current_is_word = Some(is_word);
            }
            None => current_is_word = Some(is_word),
        }
    }
    if let Some(is_word) = current_is_word {
        segments.push(Token {
            text: &text[start..],
            is_word,
        });
    }
    segments.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(pattern: &[u8]) -> BitString {
        pattern.iter().map(|&b| b == 1).collect()
    }

    #[test]
    fn test_candidate_count() {
        assert_eq!(candidate_count("a big dog and a small cat"), 2);
        assert_eq!(candidate_count("nothing matches here"), 0);
    }

    #[test]
    fn test_embed_extract_roundtrip() {
        let text = "the big dog was quick to show a happy face";
        let frame = bits(&[1, 0, 1]);
        let carrier = embed(text, &frame).unwrap();
        assert_eq!(carrier, "the large dog was quick to display a happy face");
        // the walk covers every candidate; the embedded prefix matches
        let recovered = extract(&carrier);
        for (i, bit) in frame.iter().enumerate() {
            assert_eq!(recovered.get(i), Some(bit), "bit {i}");
        }
        assert_eq!(recovered.len(), 4);
    }

    #[test]
    fn test_case_preserved() {
        let carrier = embed("Big plans", &bits(&[1])).unwrap();
        assert_eq!(carrier, "Large plans");
        let back = embed(&carrier, &bits(&[0])).unwrap();
        assert_eq!(back, "Big plans");
    }

    #[test]
    fn test_partial_word_not_matched() {
        // "bigger" contains "big" but is not a candidate token
        assert_eq!(candidate_count("bigger plans"), 0);
    }

    #[test]
    fn test_capacity_failure() {
        let err = embed("a big dog", &bits(&[1, 0])).unwrap_err();
        assert!(matches!(
            err,
            WatermarkError::InsufficientCarrierCapacity { needed: 2, available: 1 }
        ));
    }

    #[test]
    fn test_tokens_preserve_all_bytes() {
        let text = "Help! begin... end-of-line";
        let rebuilt: String = tokens(text).map(|t| t.text).collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_trailing_candidates_unchanged() {
        let text = "big small quick";
        let carrier = embed(text, &bits(&[1])).unwrap();
        assert_eq!(carrier, "large small quick");
    }
}
