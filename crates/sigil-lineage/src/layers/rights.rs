//! Rights layer (`odrl`)
//!
//! License plus permission / prohibition / obligation rules in an
//! ODRL-like shape. Required: a license with type and url; every rule
//! carries an action and zero or more constraints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{now_iso, LayerKind, MetadataLayer};
use crate::error::{MetadataError, MetadataResult};

/// License terms attached to an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    /// License type tag (e.g. `CC-BY-4.0`)
    #[serde(rename = "type")]
    pub license_type: String,
    /// Canonical license URL
    pub url: String,
    /// Inline license text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A constraint on a policy rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConstraint {
    pub left_operand: String,
    pub operator: String,
    pub right_operand: String,
}

/// One permission / prohibition / obligation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    /// The governed action
    pub action: String,
    /// Constraints narrowing the rule
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub constraint: Vec<PolicyConstraint>,
}

impl PolicyRule {
    /// An unconstrained rule for an action.
    pub fn action(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            constraint: Vec::new(),
        }
    }

    /// Add a constraint (builder pattern).
    pub fn constrained(
        mut self,
        left_operand: impl Into<String>,
        operator: impl Into<String>,
        right_operand: impl Into<String>,
    ) -> Self {
        self.constraint.push(PolicyConstraint {
            left_operand: left_operand.into(),
            operator: operator.into(),
            right_operand: right_operand.into(),
        });
        self
    }
}

/// The rights layer of a metadata bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RightsLayer {
    /// The governing license
    pub license: License,
    /// Permitted actions
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub permission: Vec<PolicyRule>,
    /// Prohibited actions
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub prohibition: Vec<PolicyRule>,
    /// Obligations
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub obligation: Vec<PolicyRule>,
    /// Forward-compatible unknown fields
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
    /// Last modification (ISO-8601 UTC)
    pub updated_at: String,
}

impl RightsLayer {
    /// A rights layer carrying just a license.
    pub fn new(license_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            license: License {
                license_type: license_type.into(),
                url: url.into(),
                text: None,
            },
            permission: Vec::new(),
            prohibition: Vec::new(),
            obligation: Vec::new(),
            extensions: BTreeMap::new(),
            updated_at: now_iso(),
        }
    }

    /// Add a permission rule.
    pub fn permit(mut self, rule: PolicyRule) -> Self {
        self.permission.push(rule);
        self
    }

    /// Add a prohibition rule.
    pub fn prohibit(mut self, rule: PolicyRule) -> Self {
        self.prohibition.push(rule);
        self
    }

    /// Add an obligation rule.
    pub fn oblige(mut self, rule: PolicyRule) -> Self {
        self.obligation.push(rule);
        self
    }
}

impl MetadataLayer for RightsLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Rights
    }

    fn standard_tag(&self) -> &'static str {
        "odrl"
    }

    fn validate(&self) -> MetadataResult<()> {
        let mut fields = Vec::new();
        if self.license.license_type.is_empty() {
            fields.push("license.type".to_string());
        }
        if self.license.url.is_empty() {
            fields.push("license.url".to_string());
        }
        for (group, rules) in [
            ("permission", &self.permission),
            ("prohibition", &self.prohibition),
            ("obligation", &self.obligation),
        ] {
            for (i, rule) in rules.iter().enumerate() {
                if rule.action.is_empty() {
                    fields.push(format!("{group}[{i}].action"));
                }
            }
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(MetadataError::InvalidRightsLayer { fields })
        }
    }

    /// ODRL-like policy object.
    fn project(&self) -> Value {
        json!({
            "@context": "https://www.w3.org/ns/odrl.jsonld",
            "@type": "Policy",
            "license": self.license,
            "permission": self.permission,
            "prohibition": self.prohibition,
            "obligation": self.obligation,
        })
    }

    fn updated_at(&self) -> &str {
        &self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = now_iso();
    }
}
