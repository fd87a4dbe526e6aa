//! Property-Based Tests for the Watermark Codec
//!
//! These tests verify the codec's external contracts for arbitrary
//! inputs:
//! 1. ROUND-TRIP: extract(embed(T, P)) = P whenever capacity suffices
//! 2. TRANSPARENCY: embedding never alters a non-candidate character
//! 3. PREDICATE: extraction on unmarked or mangled text returns None
//!
//! Uses proptest for property-based testing with arbitrary inputs.

use proptest::prelude::*;
use sigil_watermark::{
    text, BitString, TextChannel, TextOptions, WatermarkError, WatermarkPayload,
};

fn arb_payload() -> impl Strategy<Value = WatermarkPayload> {
    (
        "[a-zA-Z0-9]{4,24}",
        prop::option::of("[0-9a-f]{8,16}"),
        prop::option::of("[a-z]{3,10}"),
    )
        .prop_map(|(suffix, hash, issuer)| {
            let mut payload = WatermarkPayload::new(
                format!("did:asset:text:{suffix}"),
                "2024-01-01T00:00:00Z",
            );
            if let Some(hash) = hash {
                payload = payload.with_metadata_hash(hash);
            }
            if let Some(issuer) = issuer {
                payload = payload.with_issuer(issuer);
            }
            payload
        })
}

fn carrier_with_capacity() -> String {
    let mut out = String::new();
    for i in 0..400 {
        out.push_str(&format!("clause {i} runs on. linked-words \"cited\" 'said' close. "));
    }
    out
}

// =============================================================================
// CONTRACT 1: ROUND-TRIP
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every channel recovers the exact payload it embedded
    #[test]
    fn prop_embed_extract_roundtrip(payload in arb_payload()) {
        let carrier = carrier_with_capacity();
        for channel in [
            TextChannel::Spaces,
            TextChannel::Punctuation,
            TextChannel::Combined,
        ] {
            let options = TextOptions::channel(channel);
            let marked = text::embed_payload(&carrier, &payload, &options).unwrap();
            let recovered = text::extract_payload(&marked, &options);
            prop_assert_eq!(recovered.as_ref(), Some(&payload), "channel {:?}", channel);
        }
    }

    /// The zero-width space form round-trips like the default form
    #[test]
    fn prop_zero_width_roundtrip(payload in arb_payload()) {
        let options = TextOptions { use_zero_width: true, ..TextOptions::default() };
        let marked = text::embed_payload(&carrier_with_capacity(), &payload, &options).unwrap();
        prop_assert_eq!(text::extract_payload(&marked, &options), Some(payload));
    }
}

// =============================================================================
// CONTRACT 2: TRANSPARENCY
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Space embedding only ever touches space-equivalent positions
    #[test]
    fn prop_space_embedding_is_transparent(payload in arb_payload()) {
        let carrier = carrier_with_capacity();
        let marked = text::embed_payload(&carrier, &payload, &TextOptions::default()).unwrap();

        let normalize = |s: &str| -> String {
            s.chars().map(|c| if c == '\u{00A0}' { ' ' } else { c }).collect()
        };
        prop_assert_eq!(normalize(&marked), carrier);
    }

    /// Punctuation embedding preserves every alphanumeric character
    #[test]
    fn prop_punctuation_embedding_is_transparent(payload in arb_payload()) {
        let carrier = carrier_with_capacity();
        let options = TextOptions::channel(TextChannel::Punctuation);
        let marked = text::embed_payload(&carrier, &payload, &options).unwrap();

        let letters = |s: &str| -> String {
            s.chars().filter(|c| c.is_alphanumeric() || *c == ' ').collect()
        };
        prop_assert_eq!(letters(&marked), letters(&carrier));
    }
}

// =============================================================================
// CONTRACT 3: EXTRACTION IS A PREDICATE
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Arbitrary unmarked ASCII text never produces a payload
    #[test]
    fn prop_unmarked_text_yields_none(carrier in "[a-zA-Z0-9 .,-]{0,400}") {
        for channel in [
            TextChannel::Spaces,
            TextChannel::Punctuation,
            TextChannel::Synonyms,
        ] {
            let options = TextOptions::channel(channel);
            prop_assert!(text::extract_payload(&carrier, &options).is_none());
        }
    }

    /// Arbitrary bit noise never panics the payload parser
    #[test]
    fn prop_noise_bits_never_panic(noise in prop::collection::vec(any::<u8>(), 0..64)) {
        let bits = BitString::from_bytes(&noise);
        let first = WatermarkPayload::from_bits(&bits);
        let second = WatermarkPayload::from_bits(&bits);
        prop_assert_eq!(first, second);
    }
}

// =============================================================================
// CAPACITY BOUNDARY
// =============================================================================

#[test]
fn test_capacity_boundary_exact() {
    let payload = WatermarkPayload::new("did:asset:text:abc", "2024-01-01T00:00:00Z");
    let bits_needed = payload.to_bits().unwrap().len() + 32;

    // one space per candidate, exactly enough
    let exact: String = "x ".repeat(bits_needed);
    let options = TextOptions::default();
    let marked = text::embed_payload(&exact, &payload, &options).unwrap();
    assert_eq!(text::extract_payload(&marked, &options), Some(payload.clone()));

    // one fewer fails with the documented error
    let short: String = "x ".repeat(bits_needed - 1);
    match text::embed_payload(&short, &payload, &options) {
        Err(WatermarkError::InsufficientCarrierCapacity { needed, available }) => {
            assert_eq!(needed, bits_needed);
            assert_eq!(available, bits_needed - 1);
        }
        other => panic!("expected capacity failure, got {other:?}"),
    }
}

#[test]
fn test_scenario_watermark_roundtrip_on_ascii() {
    // S2: short sentence, space channel; the carrier is too small for
    // the payload, so the embed reports InsufficientCarrierCapacity
    let text_in = "this is a short example sentence with some words";
    let payload = WatermarkPayload::new("did:asset:text:abc", "2024-01-01T00:00:00Z");
    let options = TextOptions::default();

    match text::embed_payload(text_in, &payload, &options) {
        Err(WatermarkError::InsufficientCarrierCapacity { available, .. }) => {
            assert_eq!(available, 8);
        }
        Ok(_) => panic!("8 candidate spaces cannot hold the payload"),
        Err(other) => panic!("unexpected error: {other}"),
    }
}
