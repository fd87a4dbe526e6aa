//! Punctuation-substitution channel
//!
//! Fixed visible-equivalent pairs: `.` ↔ `…`, `-` ↔ `–`, `"` ↔ `“`/`”`,
//! `'` ↔ `‘`/`’`. The original glyph encodes bit 0, the alternative
//! bit 1. Candidate positions are occurrences of either member of a
//! pair, so re-embedding over already-marked text rewrites cleanly.
//!
//! Curly quotes carry an open/close distinction the straight forms do
//! not: embedding emits the opening glyph at even-numbered occurrences
//! of that quote kind and the closing glyph at odd ones, and decoding
//! accepts either glyph as bit 1.

use tracing::warn;

use crate::bits::BitString;
use crate::error::{Result, WatermarkError};

const ELLIPSIS: char = '…';
const EN_DASH: char = '–';
const LEFT_DOUBLE: char = '\u{201C}';
const RIGHT_DOUBLE: char = '\u{201D}';
const LEFT_SINGLE: char = '\u{2018}';
const RIGHT_SINGLE: char = '\u{2019}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairKind {
    Period,
    Hyphen,
    DoubleQuote,
    SingleQuote,
}

fn classify(c: char) -> Option<(PairKind, bool)> {
    match c {
        '.' => Some((PairKind::Period, false)),
        ELLIPSIS => Some((PairKind::Period, true)),
        '-' => Some((PairKind::Hyphen, false)),
        EN_DASH => Some((PairKind::Hyphen, true)),
        '"' => Some((PairKind::DoubleQuote, false)),
        LEFT_DOUBLE | RIGHT_DOUBLE => Some((PairKind::DoubleQuote, true)),
        '\'' => Some((PairKind::SingleQuote, false)),
        LEFT_SINGLE | RIGHT_SINGLE => Some((PairKind::SingleQuote, true)),
        _ => None,
    }
}

/// Number of candidate positions the carrier offers.
pub fn candidate_count(text: &str) -> usize {
    text.chars().filter(|&c| classify(c).is_some()).count()
}

/// Embed a framed bit sequence into the text's punctuation positions.
pub fn embed(text: &str, frame: &BitString) -> Result<String> {
    let available = candidate_count(text);
    if available < frame.len() {
        warn!(
            needed = frame.len(),
            available, "punctuation channel carrier too small"
        );
        return Err(WatermarkError::InsufficientCarrierCapacity {
            needed: frame.len(),
            available,
        });
    }

    let mut out = String::with_capacity(text.len());
    let mut index = 0;
    let mut double_quote_seen = 0usize;
    let mut single_quote_seen = 0usize;

    for c in text.chars() {
        let Some((kind, _)) = classify(c) else {
            out.push(c);
            continue;
        };

        // occurrence parity decides open vs close for curly quotes
        let occurrence = match kind {
            PairKind::DoubleQuote => {
                double_quote_seen += 1;
                double_quote_seen - 1
            }
            PairKind::SingleQuote => {
                single_quote_seen += 1;
                single_quote_seen - 1
            }
            _ => 0,
        };

        match frame.get(index) {
            Some(bit) => out.push(render(kind, bit, occurrence)),
            None => out.push(c),
        }
        index += 1;
    }

    Ok(out)
}

fn render(kind: PairKind, bit: bool, occurrence: usize) -> char {
    let opening = occurrence % 2 == 0;
    match (kind, bit) {
        (PairKind::Period, false) => '.',
        (PairKind::Period, true) => ELLIPSIS,
        (PairKind::Hyphen, false) => '-',
        (PairKind::Hyphen, true) => EN_DASH,
        (PairKind::DoubleQuote, false) => '"',
        (PairKind::DoubleQuote, true) => {
            if opening {
                LEFT_DOUBLE
            } else {
                RIGHT_DOUBLE
            }
        }
        (PairKind::SingleQuote, false) => '\'',
        (PairKind::SingleQuote, true) => {
            if opening {
                LEFT_SINGLE
            } else {
                RIGHT_SINGLE
            }
        }
    }
}

/// Walk every candidate position left-to-right and emit its bit.
pub fn extract(text: &str) -> BitString {
    text.chars()
        .filter_map(classify)
        .map(|(_, is_alternative)| is_alternative)
        .collect()
}
