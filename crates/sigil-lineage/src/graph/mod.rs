//! Directed resource relationship graph
//!
//! A labeled multigraph over asset identifiers with closed entity and
//! relationship vocabularies. At most one edge exists per
//! `(source, target, type)` tuple; re-adding merges the property map.
//! The graph owns its nodes and edges; removing a node cascades to
//! every incident edge. Cycles are allowed — traversal carries a
//! per-call visited set rather than relying on acyclicity.

pub mod prov;
pub mod traversal;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::layers::now_iso;

/// Closed set of node entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityType {
    DigitalResource,
    Dataset,
    #[serde(rename = "AIModel")]
    AiModel,
    TextContent,
    ImageContent,
    AudioContent,
    VideoContent,
    SoftwareCode,
    Agent,
    Person,
    Organization,
    Software,
    Activity,
}

impl EntityType {
    /// All declared entity types.
    pub const ALL: [EntityType; 13] = [
        EntityType::DigitalResource,
        EntityType::Dataset,
        EntityType::AiModel,
        EntityType::TextContent,
        EntityType::ImageContent,
        EntityType::AudioContent,
        EntityType::VideoContent,
        EntityType::SoftwareCode,
        EntityType::Agent,
        EntityType::Person,
        EntityType::Organization,
        EntityType::Software,
        EntityType::Activity,
    ];

    /// String form used in serialized graphs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::DigitalResource => "DigitalResource",
            EntityType::Dataset => "Dataset",
            EntityType::AiModel => "AIModel",
            EntityType::TextContent => "TextContent",
            EntityType::ImageContent => "ImageContent",
            EntityType::AudioContent => "AudioContent",
            EntityType::VideoContent => "VideoContent",
            EntityType::SoftwareCode => "SoftwareCode",
            EntityType::Agent => "Agent",
            EntityType::Person => "Person",
            EntityType::Organization => "Organization",
            EntityType::Software => "Software",
            EntityType::Activity => "Activity",
        }
    }

    /// Whether this type partitions to the PROV agent class.
    pub fn is_agent(&self) -> bool {
        matches!(
            self,
            EntityType::Agent | EntityType::Person | EntityType::Organization | EntityType::Software
        )
    }

    /// Whether this type partitions to the PROV activity class.
    pub fn is_activity(&self) -> bool {
        matches!(self, EntityType::Activity)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = GraphError;

    fn from_str(s: &str) -> GraphResult<Self> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GraphError::UnsupportedEntityType(s.to_string()))
    }
}

/// Closed set of edge relationship types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipType {
    // structural
    Contains,
    IsPartOf,
    HasComponent,
    IsComponentOf,
    // derivation
    WasDerivedFrom,
    WasRevisionOf,
    WasQuotedFrom,
    WasInfluencedBy,
    // generation
    WasGeneratedBy,
    Used,
    WasAttributedTo,
    WasAssociatedWith,
    // dependency
    DependsOn,
    Requires,
    Uses,
    Supports,
    // temporal
    Precedes,
    Follows,
    Replaces,
    // AI-specific
    TrainedOn,
    FineTunedFrom,
    Generates,
    Analyzes,
}

impl RelationshipType {
    /// All declared relationship types.
    pub const ALL: [RelationshipType; 23] = [
        RelationshipType::Contains,
        RelationshipType::IsPartOf,
        RelationshipType::HasComponent,
        RelationshipType::IsComponentOf,
        RelationshipType::WasDerivedFrom,
        RelationshipType::WasRevisionOf,
        RelationshipType::WasQuotedFrom,
        RelationshipType::WasInfluencedBy,
        RelationshipType::WasGeneratedBy,
        RelationshipType::Used,
        RelationshipType::WasAttributedTo,
        RelationshipType::WasAssociatedWith,
        RelationshipType::DependsOn,
        RelationshipType::Requires,
        RelationshipType::Uses,
        RelationshipType::Supports,
        RelationshipType::Precedes,
        RelationshipType::Follows,
        RelationshipType::Replaces,
        RelationshipType::TrainedOn,
        RelationshipType::FineTunedFrom,
        RelationshipType::Generates,
        RelationshipType::Analyzes,
    ];

    /// String form used in serialized graphs and PROV projections.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Contains => "contains",
            RelationshipType::IsPartOf => "isPartOf",
            RelationshipType::HasComponent => "hasComponent",
            RelationshipType::IsComponentOf => "isComponentOf",
            RelationshipType::WasDerivedFrom => "wasDerivedFrom",
            RelationshipType::WasRevisionOf => "wasRevisionOf",
            RelationshipType::WasQuotedFrom => "wasQuotedFrom",
            RelationshipType::WasInfluencedBy => "wasInfluencedBy",
            RelationshipType::WasGeneratedBy => "wasGeneratedBy",
            RelationshipType::Used => "used",
            RelationshipType::WasAttributedTo => "wasAttributedTo",
            RelationshipType::WasAssociatedWith => "wasAssociatedWith",
            RelationshipType::DependsOn => "dependsOn",
            RelationshipType::Requires => "requires",
            RelationshipType::Uses => "uses",
            RelationshipType::Supports => "supports",
            RelationshipType::Precedes => "precedes",
            RelationshipType::Follows => "follows",
            RelationshipType::Replaces => "replaces",
            RelationshipType::TrainedOn => "trainedOn",
            RelationshipType::FineTunedFrom => "fineTunedFrom",
            RelationshipType::Generates => "generates",
            RelationshipType::Analyzes => "analyzes",
        }
    }

    /// The five relations the PROV vocabulary names directly.
    pub fn is_prov_native(&self) -> bool {
        matches!(
            self,
            RelationshipType::WasDerivedFrom
                | RelationshipType::WasGeneratedBy
                | RelationshipType::Used
                | RelationshipType::WasAttributedTo
                | RelationshipType::WasAssociatedWith
        )
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = GraphError;

    fn from_str(s: &str) -> GraphResult<Self> {
        RelationshipType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GraphError::UnsupportedRelationshipType(s.to_string()))
    }
}

/// Direction of edge queries relative to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// A graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier key
    pub id: String,
    /// Entity type tag
    pub entity_type: EntityType,
    /// Human-readable label
    pub label: String,
    /// Open property map
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub properties: BTreeMap<String, Value>,
    /// Creation timestamp (ISO-8601 UTC)
    pub created_at: String,
    /// Last-update timestamp (ISO-8601 UTC)
    pub updated_at: String,
}

/// A directed, typed edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub relationship: RelationshipType,
    /// Open property map; merged when a duplicate edge is added
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub properties: BTreeMap<String, Value>,
    /// Creation timestamp (ISO-8601 UTC)
    pub created_at: String,
}

type EdgeKey = (String, String, RelationshipType);

/// The in-memory relationship graph
///
/// Callers share a graph instance explicitly; there is no module-level
/// singleton and no internal locking. Concurrent access must be
/// serialized externally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceGraph {
    nodes: BTreeMap<String, Node>,
    edges: BTreeMap<EdgeKey, Edge>,
}

impl ResourceGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Add a node, or merge properties into an existing one.
    ///
    /// Merging refreshes `updated_at` and replaces the label; the
    /// original `created_at` is kept.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        entity_type: EntityType,
        label: impl Into<String>,
        properties: BTreeMap<String, Value>,
    ) -> &Node {
        let id = id.into();
        let label = label.into();
        let now = now_iso();

        let node = self
            .nodes
            .entry(id.clone())
            .and_modify(|existing| {
                existing.label = label.clone();
                existing.entity_type = entity_type;
                existing.properties.extend(properties.clone());
                existing.updated_at = now.clone();
            })
            .or_insert_with(|| Node {
                id,
                entity_type,
                label,
                properties,
                created_at: now.clone(),
                updated_at: now,
            });
        node
    }

    /// Look up a node.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Remove a node and every incident edge.
    pub fn remove_node(&mut self, id: &str) -> GraphResult<Node> {
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;

        let incident: Vec<EdgeKey> = self
            .edges
            .keys()
            .filter(|(source, target, _)| source == id || target == id)
            .cloned()
            .collect();
        for key in &incident {
            self.edges.remove(key);
        }
        debug!(node = %id, cascaded_edges = incident.len(), "removed graph node");
        Ok(node)
    }

    /// Add an edge, or merge properties into the existing edge for the
    /// same `(source, target, type)` tuple.
    ///
    /// Both endpoints must already be in the graph. The edge count is
    /// unchanged when the tuple already exists.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        relationship: RelationshipType,
        properties: BTreeMap<String, Value>,
    ) -> GraphResult<&Edge> {
        if !self.nodes.contains_key(source) {
            return Err(GraphError::NodeNotFound(source.to_string()));
        }
        if !self.nodes.contains_key(target) {
            return Err(GraphError::NodeNotFound(target.to_string()));
        }

        let key = (source.to_string(), target.to_string(), relationship);
        if let Some(existing) = self.edges.get_mut(&key) {
            debug!(%source, %target, %relationship, "merging duplicate edge");
            existing.properties.extend(properties);
            return Ok(self.edges.get(&key).expect("just merged"));
        }

        let edge = Edge {
            source: source.to_string(),
            target: target.to_string(),
            relationship,
            properties,
            created_at: now_iso(),
        };
        self.edges.insert(key.clone(), edge);
        Ok(self.edges.get(&key).expect("just inserted"))
    }

    /// Remove edges between two nodes, optionally restricted to one
    /// relationship type. Returns how many edges were removed.
    pub fn remove_edge(
        &mut self,
        source: &str,
        target: &str,
        relationship: Option<RelationshipType>,
    ) -> usize {
        let matching: Vec<EdgeKey> = self
            .edges
            .keys()
            .filter(|(s, t, r)| {
                s == source && t == target && relationship.map_or(true, |want| *r == want)
            })
            .cloned()
            .collect();
        for key in &matching {
            self.edges.remove(key);
        }
        matching.len()
    }

    /// Edges incident to a node in the given direction.
    pub fn get_edges(&self, id: &str, direction: Direction) -> Vec<&Edge> {
        self.edges
            .values()
            .filter(|edge| match direction {
                Direction::Outgoing => edge.source == id,
                Direction::Incoming => edge.target == id,
                Direction::Both => edge.source == id || edge.target == id,
            })
            .collect()
    }

    /// Nodes connected to `id` in the given direction, optionally
    /// restricted to one relationship type, deduplicated by identifier.
    pub fn get_connected_nodes(
        &self,
        id: &str,
        direction: Direction,
        relationship: Option<RelationshipType>,
    ) -> Vec<&Node> {
        let mut seen = BTreeSet::new();
        let mut connected = Vec::new();
        for edge in self.get_edges(id, direction) {
            if let Some(want) = relationship {
                if edge.relationship != want {
                    continue;
                }
            }
            let other = if edge.source == id {
                &edge.target
            } else {
                &edge.source
            };
            if seen.insert(other.clone()) {
                if let Some(node) = self.nodes.get(other) {
                    connected.push(node);
                }
            }
        }
        connected
    }

    /// Iterate over all nodes in identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Iterate over all edges in key order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }
}
