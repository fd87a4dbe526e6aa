//! Characteristics layer (`model-card` / `data-sheet` / `general`)
//!
//! Type-specific descriptive fields. Required: `resourceType`; the
//! model-card and data-sheet schemas additionally require `name` and
//! `description`. Projects to a schema.org-style object.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{now_iso, LayerKind, MetadataLayer};
use crate::error::{MetadataError, MetadataResult};

/// Which characteristics schema the layer follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CharacteristicsSchema {
    /// AI model card
    ModelCard,
    /// Dataset data sheet
    DataSheet,
    /// Anything else
    #[default]
    General,
}

impl CharacteristicsSchema {
    /// The schema's standard tag.
    pub fn tag(&self) -> &'static str {
        match self {
            CharacteristicsSchema::ModelCard => "model-card",
            CharacteristicsSchema::DataSheet => "data-sheet",
            CharacteristicsSchema::General => "general",
        }
    }
}

/// The characteristics layer of a metadata bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacteristicsLayer {
    /// Schema this layer follows
    pub schema: CharacteristicsSchema,
    /// Resource type tag of the described asset
    pub resource_type: String,
    /// Display name (required for model-card and data-sheet)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description (required for model-card and data-sheet)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Measured variables (data-sheet)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub variable_measured: Vec<String>,
    /// Distribution records (data-sheet)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub distribution: Vec<Value>,
    /// Forward-compatible unknown fields
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
    /// Last modification (ISO-8601 UTC)
    pub updated_at: String,
}

impl CharacteristicsLayer {
    /// A general characteristics layer for a resource type.
    pub fn general(resource_type: impl Into<String>) -> Self {
        Self {
            schema: CharacteristicsSchema::General,
            resource_type: resource_type.into(),
            name: None,
            description: None,
            variable_measured: Vec::new(),
            distribution: Vec::new(),
            extensions: BTreeMap::new(),
            updated_at: now_iso(),
        }
    }

    /// A model card for an AI model.
    pub fn model_card(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            schema: CharacteristicsSchema::ModelCard,
            resource_type: "ai-model".into(),
            name: Some(name.into()),
            description: Some(description.into()),
            ..Self::general("ai-model")
        }
    }

    /// A data sheet for a dataset.
    pub fn data_sheet(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            schema: CharacteristicsSchema::DataSheet,
            resource_type: "dataset".into(),
            name: Some(name.into()),
            description: Some(description.into()),
            ..Self::general("dataset")
        }
    }
}

impl MetadataLayer for CharacteristicsLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Characteristics
    }

    fn standard_tag(&self) -> &'static str {
        self.schema.tag()
    }

    fn validate(&self) -> MetadataResult<()> {
        let mut fields = Vec::new();
        if self.resource_type.is_empty() {
            fields.push("resourceType".to_string());
        }
        if matches!(
            self.schema,
            CharacteristicsSchema::ModelCard | CharacteristicsSchema::DataSheet
        ) {
            if self.name.as_deref().unwrap_or("").is_empty() {
                fields.push("name".to_string());
            }
            if self.description.as_deref().unwrap_or("").is_empty() {
                fields.push("description".to_string());
            }
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(MetadataError::InvalidCharacteristicsLayer { fields })
        }
    }

    /// schema.org-style object: `SoftwareApplication` for ai-model,
    /// `Dataset` for dataset, else `CreativeWork`.
    fn project(&self) -> Value {
        let mut doc = match self.resource_type.as_str() {
            "ai-model" => json!({
                "@context": "https://schema.org",
                "@type": "SoftwareApplication",
                "applicationCategory": "AI Model",
            }),
            "dataset" => json!({
                "@context": "https://schema.org",
                "@type": "Dataset",
                "variableMeasured": self.variable_measured,
                "distribution": self.distribution,
            }),
            _ => json!({
                "@context": "https://schema.org",
                "@type": "CreativeWork",
            }),
        };

        let map = doc.as_object_mut().expect("object literal");
        if let Some(ref name) = self.name {
            map.insert("name".into(), json!(name));
        }
        if let Some(ref description) = self.description {
            map.insert("description".into(), json!(description));
        }
        for (key, value) in &self.extensions {
            map.insert(key.clone(), value.clone());
        }
        doc
    }

    fn updated_at(&self) -> &str {
        &self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = now_iso();
    }
}
