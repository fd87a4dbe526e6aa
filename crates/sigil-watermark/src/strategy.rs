//! Watermark strategy slots
//!
//! Every resource type gets one strategy slot behind the same
//! capability interface: embed, extract, verify, strength. Only the
//! text strategy is implemented here; image, audio, and ai-model slots
//! are declared so callers can register their own implementations
//! without changing the calling code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, WatermarkError};
use crate::payload::WatermarkPayload;
use crate::text::{self, TextOptions};

/// A resource a strategy can operate on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// Natural-language text
    Text(String),
    /// Opaque binary content (image, audio, model weights)
    Bytes(Vec<u8>),
}

/// Relative robustness of an embedded mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedStrength {
    /// Survives copying but not re-editing
    Fragile,
    /// Survives light editing
    Moderate,
    /// Survives format conversion
    Robust,
}

/// Outcome of a verification call
///
/// Verified-false is a result, not an error: `reason` explains what
/// failed to match when `verified` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    /// Whether the recovered payload matches the expectation
    pub verified: bool,
    /// The payload recovered from the resource, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted: Option<WatermarkPayload>,
    /// Why verification failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerificationReport {
    fn verified(extracted: WatermarkPayload) -> Self {
        Self {
            verified: true,
            extracted: Some(extracted),
            reason: None,
        }
    }

    fn failed(extracted: Option<WatermarkPayload>, reason: impl Into<String>) -> Self {
        Self {
            verified: false,
            extracted,
            reason: Some(reason.into()),
        }
    }
}

/// The capability interface every strategy slot satisfies
pub trait WatermarkStrategy {
    /// Embed a payload, returning the rewritten resource.
    fn embed(&self, resource: &Resource, payload: &WatermarkPayload) -> Result<Resource>;

    /// Recover a payload, or `None` when the resource carries no
    /// readable mark.
    fn extract(&self, resource: &Resource) -> Option<WatermarkPayload>;

    /// Extract and compare against an expected payload.
    ///
    /// Equality covers `did`, and `metadata_hash` when the expectation
    /// carries one.
    fn verify(&self, resource: &Resource, expected: &WatermarkPayload) -> VerificationReport {
        match self.extract(resource) {
            None => VerificationReport::failed(None, "no payload recovered"),
            Some(found) => {
                if found.did != expected.did {
                    let reason = format!(
                        "identifier mismatch: expected '{}', recovered '{}'",
                        expected.did, found.did
                    );
                    return VerificationReport::failed(Some(found), reason);
                }
                if let Some(ref expected_hash) = expected.metadata_hash {
                    if found.metadata_hash.as_ref() != Some(expected_hash) {
                        return VerificationReport::failed(
                            Some(found),
                            "metadata hash mismatch",
                        );
                    }
                }
                VerificationReport::verified(found)
            }
        }
    }

    /// Robustness of marks this strategy produces.
    fn strength(&self) -> EmbedStrength;
}

/// Text strategy backed by the three substitution channels
#[derive(Debug, Clone, Default)]
pub struct TextWatermarker {
    options: TextOptions,
}

impl TextWatermarker {
    /// A text watermarker with the given channel options.
    pub fn new(options: TextOptions) -> Self {
        Self { options }
    }

    /// The configured options.
    pub fn options(&self) -> &TextOptions {
        &self.options
    }
}

impl WatermarkStrategy for TextWatermarker {
    fn embed(&self, resource: &Resource, payload: &WatermarkPayload) -> Result<Resource> {
        match resource {
            Resource::Text(text) => {
                let marked = text::embed_payload(text, payload, &self.options)?;
                Ok(Resource::Text(marked))
            }
            Resource::Bytes(_) => Err(WatermarkError::UnsupportedResource(
                "text strategy requires a text resource".into(),
            )),
        }
    }

    fn extract(&self, resource: &Resource) -> Option<WatermarkPayload> {
        match resource {
            Resource::Text(text) => text::extract_payload(text, &self.options),
            Resource::Bytes(_) => None,
        }
    }

    fn strength(&self) -> EmbedStrength {
        match self.options.channel {
            text::TextChannel::Synonyms => EmbedStrength::Moderate,
            _ => EmbedStrength::Fragile,
        }
    }
}

/// Strategy slots keyed by resource-type tag
///
/// The text slot is populated by default; image, audio, and ai-model
/// slots exist but hold no strategy until a caller registers one.
pub struct StrategyRegistry {
    slots: BTreeMap<String, Option<Box<dyn WatermarkStrategy>>>,
}

impl StrategyRegistry {
    /// Slot tags declared by default.
    pub const DECLARED_SLOTS: [&'static str; 4] = ["text", "image", "audio", "ai-model"];

    /// Registry with the text strategy installed and the remaining
    /// declared slots empty.
    pub fn with_defaults() -> Self {
        let mut slots: BTreeMap<String, Option<Box<dyn WatermarkStrategy>>> = BTreeMap::new();
        for tag in Self::DECLARED_SLOTS {
            slots.insert(tag.to_string(), None);
        }
        slots.insert(
            "text".to_string(),
            Some(Box::new(TextWatermarker::default())),
        );
        Self { slots }
    }

    /// Install (or replace) a strategy in a slot.
    pub fn register(&mut self, tag: impl Into<String>, strategy: Box<dyn WatermarkStrategy>) {
        let tag = tag.into();
        debug!(slot = %tag, "registering watermark strategy");
        self.slots.insert(tag, Some(strategy));
    }

    /// The strategy for a resource-type tag.
    pub fn strategy_for(&self, tag: &str) -> Result<&dyn WatermarkStrategy> {
        self.slots
            .get(tag)
            .and_then(|slot| slot.as_deref())
            .ok_or_else(|| WatermarkError::StrategyUnavailable(tag.to_string()))
    }

    /// Tags with a populated strategy.
    pub fn populated_slots(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.is_some())
            .map(|(tag, _)| tag.as_str())
            .collect()
    }

    /// All declared tags, populated or not.
    pub fn declared_slots(&self) -> Vec<&str> {
        self.slots.keys().map(|tag| tag.as_str()).collect()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextChannel;

    fn carrier() -> Resource {
        let mut text = String::new();
        for i in 0..200 {
            text.push_str(&format!("sentence {i} with spaces. and-marks \"q\" end. "));
        }
        Resource::Text(text)
    }

    fn payload() -> WatermarkPayload {
        WatermarkPayload::new("did:asset:text:abc", "2024-01-01T00:00:00Z")
    }

    #[test]
    fn test_text_strategy_roundtrip() {
        let strategy = TextWatermarker::default();
        let marked = strategy.embed(&carrier(), &payload()).unwrap();
        assert_eq!(strategy.extract(&marked).unwrap(), payload());
    }

    #[test]
    fn test_text_strategy_rejects_bytes() {
        let strategy = TextWatermarker::default();
        assert!(matches!(
            strategy.embed(&Resource::Bytes(vec![1, 2, 3]), &payload()),
            Err(WatermarkError::UnsupportedResource(_))
        ));
        assert!(strategy.extract(&Resource::Bytes(vec![1, 2, 3])).is_none());
    }

    #[test]
    fn test_verify_match() {
        let strategy = TextWatermarker::default();
        let marked = strategy.embed(&carrier(), &payload()).unwrap();
        let report = strategy.verify(&marked, &payload());
        assert!(report.verified);
        assert!(report.reason.is_none());
    }

    #[test]
    fn test_verify_mismatch_is_not_an_error() {
        let strategy = TextWatermarker::default();
        let marked = strategy.embed(&carrier(), &payload()).unwrap();
        let other = WatermarkPayload::new("did:asset:text:other", "2024-01-01T00:00:00Z");
        let report = strategy.verify(&marked, &other);
        assert!(!report.verified);
        assert!(report.reason.unwrap().contains("identifier mismatch"));
        assert!(report.extracted.is_some());
    }

    #[test]
    fn test_verify_metadata_hash() {
        let strategy = TextWatermarker::default();
        let with_hash = payload().with_metadata_hash("aabb");
        let marked = strategy.embed(&carrier(), &with_hash).unwrap();

        assert!(strategy.verify(&marked, &with_hash).verified);
        let wrong = payload().with_metadata_hash("ccdd");
        assert!(!strategy.verify(&marked, &wrong).verified);
        // expectation without a hash only checks the identifier
        assert!(strategy.verify(&marked, &payload()).verified);
    }

    #[test]
    fn test_verify_unmarked_text() {
        let strategy = TextWatermarker::default();
        let report = strategy.verify(&carrier(), &payload());
        assert!(!report.verified);
        assert!(report.extracted.is_none());
    }

    #[test]
    fn test_registry_defaults() {
        let registry = StrategyRegistry::with_defaults();
        assert!(registry.strategy_for("text").is_ok());
        assert!(matches!(
            registry.strategy_for("image"),
            Err(WatermarkError::StrategyUnavailable(_))
        ));
        assert_eq!(registry.populated_slots(), vec!["text"]);
        assert_eq!(
            registry.declared_slots(),
            vec!["ai-model", "audio", "image", "text"]
        );
    }

    #[test]
    fn test_registry_registration() {
        let mut registry = StrategyRegistry::with_defaults();
        registry.register(
            "text",
            Box::new(TextWatermarker::new(TextOptions::channel(
                TextChannel::Punctuation,
            ))),
        );
        let strategy = registry.strategy_for("text").unwrap();
        assert_eq!(strategy.strength(), EmbedStrength::Fragile);
    }

    #[test]
    fn test_synonym_strength() {
        let strategy = TextWatermarker::new(TextOptions::channel(TextChannel::Synonyms));
        assert_eq!(strategy.strength(), EmbedStrength::Moderate);
    }
}
