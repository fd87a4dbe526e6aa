//! Text watermarking
//!
//! Three independent channels map single bits onto visible-equivalent
//! alternatives: space substitution, punctuation substitution, and
//! synonym swaps. The combined mode splits a payload across the space
//! and punctuation channels. Every embedded frame carries a 32-bit
//! payload-length header (see [`crate::bits`]), so decoding stays
//! aligned even when the carrier holds more candidate positions than
//! the message used.

pub mod punctuation;
pub mod spaces;
pub mod synonyms;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bits::BitString;
use crate::error::Result;
use crate::payload::WatermarkPayload;

/// Minimum recovered bits for the space and punctuation channels
const MIN_CHANNEL_BITS: usize = 16;

/// Minimum recovered bits for the synonym channel
const MIN_SYNONYM_BITS: usize = 8;

/// Which channel carries the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextChannel {
    /// Space substitution (default)
    #[default]
    Spaces,
    /// Punctuation substitution
    Punctuation,
    /// Synonym swaps
    Synonyms,
    /// Payload split across spaces then punctuation
    Combined,
}

/// Options controlling text embedding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextOptions {
    /// Channel selection
    pub channel: TextChannel,
    /// Use the `U+200B U+0020` pair instead of U+00A0 for bit 1 on the
    /// space channel
    pub use_zero_width: bool,
}

impl TextOptions {
    /// Options for a specific channel with default settings.
    pub fn channel(channel: TextChannel) -> Self {
        Self {
            channel,
            ..Self::default()
        }
    }
}

/// Embed a payload into text under the selected channel.
///
/// Fails with [`WatermarkError::InsufficientCarrierCapacity`] when the
/// carrier offers fewer candidate positions than header + payload bits.
/// No character outside a candidate position is altered.
pub fn embed_payload(
    text: &str,
    payload: &WatermarkPayload,
    options: &TextOptions,
) -> Result<String> {
    let bits = payload.to_bits()?;
    debug!(
        channel = ?options.channel,
        payload_bits = bits.len(),
        "embedding text watermark"
    );

    match options.channel {
        TextChannel::Spaces => spaces::embed(text, &bits.frame(), options.use_zero_width),
        TextChannel::Punctuation => punctuation::embed(text, &bits.frame()),
        TextChannel::Synonyms => synonyms::embed(text, &bits.frame()),
        TextChannel::Combined => {
            let mid = bits.len() / 2;
            let prefix = bits.slice(0, mid);
            let suffix = bits.slice(mid, bits.len());
            let rewritten = spaces::embed(text, &prefix.frame(), options.use_zero_width)?;
            punctuation::embed(&rewritten, &suffix.frame())
        }
    }
}

/// Recover a payload from text under the selected channel.
///
/// Returns `None` when no valid payload can be reconstructed; decoding
/// failure is a predicate, never an error.
pub fn extract_payload(text: &str, options: &TextOptions) -> Option<WatermarkPayload> {
    let payload_bits = match options.channel {
        TextChannel::Spaces => deframe_walk(spaces::extract(text), MIN_CHANNEL_BITS)?,
        TextChannel::Punctuation => deframe_walk(punctuation::extract(text), MIN_CHANNEL_BITS)?,
        TextChannel::Synonyms => deframe_walk(synonyms::extract(text), MIN_SYNONYM_BITS)?,
        TextChannel::Combined => {
            let mut joined = deframe_walk(spaces::extract(text), MIN_CHANNEL_BITS)?;
            let suffix = deframe_walk(punctuation::extract(text), MIN_CHANNEL_BITS)?;
            joined.extend(&suffix);
            joined
        }
    };

    WatermarkPayload::from_bits(&payload_bits)
}

fn deframe_walk(walk: BitString, min_bits: usize) -> Option<BitString> {
    if walk.len() < min_bits {
        return None;
    }
    walk.deframe()
}

/// Candidate positions the selected channel finds in this text.
pub fn carrier_capacity(text: &str, options: &TextOptions) -> usize {
    match options.channel {
        TextChannel::Spaces => spaces::candidate_count(text),
        TextChannel::Punctuation => punctuation::candidate_count(text),
        TextChannel::Synonyms => synonyms::candidate_count(text),
        TextChannel::Combined => {
            spaces::candidate_count(text) + punctuation::candidate_count(text)
        }
    }
}
