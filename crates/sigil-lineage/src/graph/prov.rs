//! PROV projection and its reverse
//!
//! Projects the relationship graph onto the W3C PROV partition:
//! Activity nodes become `activity` entries, agent-class nodes become
//! `agent` entries, everything else becomes an `entity` entry. The
//! projection is a pure function of graph state — identical graphs
//! produce byte-identical documents, because every map is ordered and
//! every identifier list is sorted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{EntityType, RelationshipType, ResourceGraph};
use crate::error::GraphResult;

/// Predicate map of one PROV subject: predicate → sorted identifiers
pub type ProvRecord = BTreeMap<String, Vec<String>>;

/// A graph projected onto the PROV entity / activity / agent partition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvDocument {
    /// Entity records, keyed by identifier
    pub entity: BTreeMap<String, ProvRecord>,
    /// Activity records, keyed by identifier
    pub activity: BTreeMap<String, ProvRecord>,
    /// Agent records, keyed by identifier
    pub agent: BTreeMap<String, ProvRecord>,
}

/// The three PROV partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Partition {
    Entity,
    Activity,
    Agent,
}

fn partition_of(entity_type: EntityType) -> Partition {
    if entity_type.is_activity() {
        Partition::Activity
    } else if entity_type.is_agent() {
        Partition::Agent
    } else {
        Partition::Entity
    }
}

impl ProvDocument {
    fn record_mut(&mut self, partition: Partition, id: &str) -> &mut ProvRecord {
        let map = match partition {
            Partition::Entity => &mut self.entity,
            Partition::Activity => &mut self.activity,
            Partition::Agent => &mut self.agent,
        };
        map.entry(id.to_string()).or_default()
    }

    fn add_relation(&mut self, partition: Partition, subject: &str, predicate: &str, object: &str) {
        let values = self
            .record_mut(partition, subject)
            .entry(predicate.to_string())
            .or_default();
        // keep identifier lists sorted and unique for stable output
        if let Err(pos) = values.binary_search(&object.to_string()) {
            values.insert(pos, object.to_string());
        }
    }

    /// Total number of subject records across the three partitions.
    pub fn subject_count(&self) -> usize {
        self.entity.len() + self.activity.len() + self.agent.len()
    }
}

/// Project a graph onto the PROV vocabulary.
///
/// Edge mapping: `wasDerivedFrom` lands on the **target** record; the
/// four other PROV-native relations land on the **source** record;
/// every non-PROV type lands on the source record under
/// `asset:{type}`. The object of each predicate is the other endpoint.
pub fn to_prov(graph: &ResourceGraph) -> ProvDocument {
    let mut doc = ProvDocument::default();

    for node in graph.nodes() {
        doc.record_mut(partition_of(node.entity_type), &node.id);
    }

    for edge in graph.edges() {
        let source_partition = graph
            .get_node(&edge.source)
            .map(|n| partition_of(n.entity_type))
            .unwrap_or(Partition::Entity);
        let target_partition = graph
            .get_node(&edge.target)
            .map(|n| partition_of(n.entity_type))
            .unwrap_or(Partition::Entity);

        match edge.relationship {
            RelationshipType::WasDerivedFrom => {
                doc.add_relation(
                    target_partition,
                    &edge.target,
                    "prov:wasDerivedFrom",
                    &edge.source,
                );
            }
            RelationshipType::WasGeneratedBy
            | RelationshipType::Used
            | RelationshipType::WasAttributedTo
            | RelationshipType::WasAssociatedWith => {
                let predicate = format!("prov:{}", edge.relationship.as_str());
                doc.add_relation(source_partition, &edge.source, &predicate, &edge.target);
            }
            other => {
                let predicate = format!("asset:{}", other.as_str());
                doc.add_relation(source_partition, &edge.source, &predicate, &edge.target);
            }
        }
    }

    doc
}

/// Rebuild a graph from a PROV document.
///
/// Node entity types collapse to the partition defaults
/// (`DigitalResource` / `Activity` / `Agent`), so the result is
/// equivalent to the original under [`to_prov`] rather than identical
/// to it. Identifiers referenced only as predicate objects become
/// default entity nodes.
pub fn from_prov(doc: &ProvDocument) -> GraphResult<ResourceGraph> {
    let mut graph = ResourceGraph::new();

    for (id, _) in &doc.entity {
        graph.add_node(id.clone(), EntityType::DigitalResource, id.clone(), BTreeMap::new());
    }
    for (id, _) in &doc.activity {
        graph.add_node(id.clone(), EntityType::Activity, id.clone(), BTreeMap::new());
    }
    for (id, _) in &doc.agent {
        graph.add_node(id.clone(), EntityType::Agent, id.clone(), BTreeMap::new());
    }

    let partitions = [&doc.entity, &doc.activity, &doc.agent];
    for partition in partitions {
        for (subject, record) in partition {
            for (predicate, objects) in record {
                for object in objects {
                    if graph.get_node(object).is_none() {
                        graph.add_node(
                            object.clone(),
                            EntityType::DigitalResource,
                            object.clone(),
                            BTreeMap::new(),
                        );
                    }

                    let (source, target, relationship) = decode_predicate(subject, object, predicate)?;
                    graph.add_edge(&source, &target, relationship, BTreeMap::new())?;
                }
            }
        }
    }

    Ok(graph)
}

fn decode_predicate(
    subject: &str,
    object: &str,
    predicate: &str,
) -> GraphResult<(String, String, RelationshipType)> {
    if predicate == "prov:wasDerivedFrom" {
        // recorded on the target; the object is the origin
        return Ok((
            object.to_string(),
            subject.to_string(),
            RelationshipType::WasDerivedFrom,
        ));
    }
    let name = predicate
        .strip_prefix("prov:")
        .or_else(|| predicate.strip_prefix("asset:"))
        .unwrap_or(predicate);
    let relationship: RelationshipType = name.parse()?;
    Ok((subject.to_string(), object.to_string(), relationship))
}
