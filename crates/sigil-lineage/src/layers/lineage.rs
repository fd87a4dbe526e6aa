//! Lineage layer (`prov`)
//!
//! Entity / activity / agent participants and the five PROV relations
//! between them, as indexed maps keyed by participant identifier.
//! Required: at least one participant map non-empty.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{now_iso, LayerKind, MetadataLayer};
use crate::error::{MetadataError, MetadataResult};

/// The lineage layer of a metadata bundle
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageLayer {
    /// Entities, keyed by identifier
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub entity: BTreeMap<String, Value>,
    /// Activities, keyed by identifier
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub activity: BTreeMap<String, Value>,
    /// Agents, keyed by identifier
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub agent: BTreeMap<String, Value>,
    /// entity → generating activity
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub was_generated_by: BTreeMap<String, Value>,
    /// activity → used entity
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub used: BTreeMap<String, Value>,
    /// entity → attributed agent
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub was_attributed_to: BTreeMap<String, Value>,
    /// entity → origin entity
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub was_derived_from: BTreeMap<String, Value>,
    /// activity → associated agent
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub was_associated_with: BTreeMap<String, Value>,
    /// Forward-compatible unknown fields
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
    /// Last modification (ISO-8601 UTC)
    #[serde(default)]
    pub updated_at: String,
}

impl LineageLayer {
    /// An empty lineage layer (invalid until a participant is added).
    pub fn new() -> Self {
        Self {
            updated_at: now_iso(),
            ..Self::default()
        }
    }

    /// Add an entity participant.
    pub fn add_entity(&mut self, id: impl Into<String>, record: Value) -> &mut Self {
        self.entity.insert(id.into(), record);
        self.touch();
        self
    }

    /// Add an activity participant.
    pub fn add_activity(&mut self, id: impl Into<String>, record: Value) -> &mut Self {
        self.activity.insert(id.into(), record);
        self.touch();
        self
    }

    /// Add an agent participant.
    pub fn add_agent(&mut self, id: impl Into<String>, record: Value) -> &mut Self {
        self.agent.insert(id.into(), record);
        self.touch();
        self
    }

    /// Record `entity wasGeneratedBy activity`.
    pub fn record_generation(
        &mut self,
        entity: impl Into<String>,
        activity: impl Into<String>,
    ) -> &mut Self {
        self.was_generated_by
            .insert(entity.into(), json!({"prov:activity": activity.into()}));
        self.touch();
        self
    }

    /// Record `activity used entity`.
    pub fn record_usage(
        &mut self,
        activity: impl Into<String>,
        entity: impl Into<String>,
    ) -> &mut Self {
        self.used
            .insert(activity.into(), json!({"prov:entity": entity.into()}));
        self.touch();
        self
    }

    /// Record `entity wasDerivedFrom origin`.
    pub fn record_derivation(
        &mut self,
        entity: impl Into<String>,
        origin: impl Into<String>,
    ) -> &mut Self {
        self.was_derived_from
            .insert(entity.into(), json!({"prov:usedEntity": origin.into()}));
        self.touch();
        self
    }
}

impl MetadataLayer for LineageLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Lineage
    }

    fn standard_tag(&self) -> &'static str {
        "prov"
    }

    fn validate(&self) -> MetadataResult<()> {
        if self.entity.is_empty() && self.activity.is_empty() && self.agent.is_empty() {
            return Err(MetadataError::InvalidLineageLayer {
                fields: vec![
                    "entity".to_string(),
                    "activity".to_string(),
                    "agent".to_string(),
                ],
            });
        }
        Ok(())
    }

    fn project(&self) -> Value {
        json!({
            "entity": self.entity,
            "activity": self.activity,
            "agent": self.agent,
            "wasGeneratedBy": self.was_generated_by,
            "used": self.used,
            "wasAttributedTo": self.was_attributed_to,
            "wasDerivedFrom": self.was_derived_from,
            "wasAssociatedWith": self.was_associated_with,
        })
    }

    fn updated_at(&self) -> &str {
        &self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = now_iso();
    }
}
