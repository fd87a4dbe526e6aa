//! Space-substitution channel
//!
//! Candidate positions are space-equivalents: an ASCII space, a
//! no-break space, or a zero-width space immediately followed by an
//! ASCII space. Bit 0 renders as a plain space; bit 1 renders as
//! U+00A0, or as the pair U+200B U+0020 when the zero-width form is
//! selected. Characters outside candidate positions pass through
//! untouched.

use tracing::warn;

use crate::bits::BitString;
use crate::error::{Result, WatermarkError};

/// No-break space, the default bit-1 form
pub const NO_BREAK_SPACE: char = '\u{00A0}';

/// Zero-width space, the alternative bit-1 marker
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Number of candidate positions the carrier offers.
pub fn candidate_count(text: &str) -> usize {
    let mut count = 0;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ' ' | NO_BREAK_SPACE => count += 1,
            ZERO_WIDTH_SPACE if chars.peek() == Some(&' ') => {
                chars.next();
                count += 1;
            }
            _ => {}
        }
    }
    count
}

/// Embed a framed bit sequence into the text's space positions.
pub fn embed(text: &str, frame: &BitString, use_zero_width: bool) -> Result<String> {
    let available = candidate_count(text);
    if available < frame.len() {
        warn!(
            needed = frame.len(),
            available, "space channel carrier too small"
        );
        return Err(WatermarkError::InsufficientCarrierCapacity {
            needed: frame.len(),
            available,
        });
    }

    let mut out = String::with_capacity(text.len());
    let mut index = 0;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let is_candidate = match c {
            ' ' | NO_BREAK_SPACE => true,
            ZERO_WIDTH_SPACE if chars.peek() == Some(&' ') => {
                chars.next();
                true
            }
            _ => false,
        };

        if !is_candidate {
            out.push(c);
            continue;
        }

        match frame.get(index) {
            Some(false) => out.push(' '),
            Some(true) => {
                if use_zero_width {
                    out.push(ZERO_WIDTH_SPACE);
                    out.push(' ');
                } else {
                    out.push(NO_BREAK_SPACE);
                }
            }
            // candidates past the message stay as they were
            None => {
                if c == ZERO_WIDTH_SPACE {
                    out.push(ZERO_WIDTH_SPACE);
                    out.push(' ');
                } else {
                    out.push(c);
                }
            }
        }
        index += 1;
    }

    Ok(out)
}

/// Walk every candidate position left-to-right and emit its bit.
pub fn extract(text: &str) -> BitString {
    let mut bits = BitString::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ' ' => bits.push(false),
            NO_BREAK_SPACE => bits.push(true),
            ZERO_WIDTH_SPACE if chars.peek() == Some(&' ') => {
                chars.next();
                bits.push(true);
            }
            _ => {}
        }
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(pattern: &[u8]) -> BitString {
        pattern.iter().map(|&b| b == 1).collect()
    }

    #[test]
    fn test_candidate_count() {
        assert_eq!(candidate_count("a b c d"), 3);
        assert_eq!(candidate_count("no-spaces-here"), 0);
        assert_eq!(candidate_count(""), 0);
    }

    #[test]
    fn test_embed_extract_roundtrip() {
        let text = "one two three four five six";
        let frame = bits(&[1, 0, 1, 1, 0]);
        let carrier = embed(text, &frame, false).unwrap();
        let recovered = extract(&carrier);
        for (i, bit) in frame.iter().enumerate() {
            assert_eq!(recovered.get(i), Some(bit));
        }
    }

    #[test]
    fn test_zero_width_form_roundtrip() {
        let text = "one two three four";
        let frame = bits(&[1, 1, 0]);
        let carrier = embed(text, &frame, true).unwrap();
        assert!(carrier.contains(ZERO_WIDTH_SPACE));
        let recovered = extract(&carrier);
        assert_eq!(recovered.get(0), Some(true));
        assert_eq!(recovered.get(1), Some(true));
        assert_eq!(recovered.get(2), Some(false));
    }

    #[test]
    fn test_non_candidates_unchanged() {
        let text = "alpha beta gamma";
        let frame = bits(&[1, 1]);
        let carrier = embed(text, &frame, false).unwrap();
        let stripped: String = carrier
            .chars()
            .map(|c| if c == NO_BREAK_SPACE { ' ' } else { c })
            .collect();
        assert_eq!(stripped, text);
    }

    #[test]
    fn test_capacity_failure() {
        let err = embed("one two", &bits(&[1, 0, 1]), false).unwrap_err();
        assert!(matches!(
            err,
            WatermarkError::InsufficientCarrierCapacity {
                needed: 3,
                available: 1
            }
        ));
    }

    #[test]
    fn test_trailing_candidates_kept_verbatim() {
        let text = "a b c d e";
        let frame = bits(&[1]);
        let carrier = embed(text, &frame, false).unwrap();
        // one substituted, three ordinary spaces remain
        assert_eq!(carrier.matches(NO_BREAK_SPACE).count(), 1);
        assert_eq!(carrier.matches(' ').count(), 3);
    }

    #[test]
    fn test_reembedding_over_marked_text() {
        // a carrier that already holds marks is rewritten, not stacked
        let text = "one two three";
        let first = embed(text, &bits(&[1, 1]), false).unwrap();
        let second = embed(&first, &bits(&[0, 0]), false).unwrap();
        assert_eq!(second, text);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(candidate_count(""), 0);
        assert!(extract("").is_empty());
        assert!(embed("", &BitString::new(), false).unwrap().is_empty());
    }
}
