//! Graph traversal queries
//!
//! Path search and reachability over the relationship graph. All
//! traversal is cycle-safe: a per-call visited set bounds the walk, so
//! the queries terminate on any graph, cyclic or not.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Direction, RelationshipType, ResourceGraph};
use crate::error::{GraphError, GraphResult};

/// Options for [`ResourceGraph::find_paths`]
#[derive(Debug, Clone)]
pub struct PathOptions {
    /// Maximum number of edges in a path
    pub max_depth: usize,
    /// Restrict traversal to these edge types, when given
    pub relationship_types: Option<Vec<RelationshipType>>,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            relationship_types: None,
        }
    }
}

/// Options for reachability queries
#[derive(Debug, Clone)]
pub struct RelatedOptions {
    /// Maximum number of layers to recurse when transitive
    pub max_depth: usize,
    /// Follow chains beyond direct neighbors
    pub transitive: bool,
}

impl Default for RelatedOptions {
    fn default() -> Self {
        Self {
            max_depth: 1,
            transitive: false,
        }
    }
}

/// A node reached by a reachability query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedResource {
    /// Identifier of the reached node
    pub id: String,
    /// The edge type that reached it
    pub relationship: RelationshipType,
    /// How many edges from the start node
    pub depth: usize,
    /// Reached through an intermediate node rather than directly
    pub transitive: bool,
}

/// Type-sets the traversal wrappers fix, one per lineage question
mod type_sets {
    use super::RelationshipType::{self, *};

    pub const SOURCES: &[RelationshipType] = &[
        WasDerivedFrom, WasRevisionOf, WasQuotedFrom, WasGeneratedBy, Used, TrainedOn,
        FineTunedFrom,
    ];
    pub const DERIVED: &[RelationshipType] =
        &[WasDerivedFrom, WasRevisionOf, WasQuotedFrom, Generates, FineTunedFrom];
    pub const DEPENDENCIES: &[RelationshipType] = &[DependsOn, Requires, Uses];
    pub const DEPENDENTS: &[RelationshipType] = &[DependsOn, Requires, Uses, Supports];
    pub const COMPONENTS: &[RelationshipType] = &[Contains, HasComponent];
}

impl ResourceGraph {
    /// All simple paths from `source` to `target` over outgoing edges.
    ///
    /// Depth-first with a per-path visited set: no node repeats within
    /// a single path, so the search terminates on cyclic graphs. Paths
    /// are returned as node-identifier sequences including both
    /// endpoints, at most `max_depth` edges long.
    pub fn find_paths(
        &self,
        source: &str,
        target: &str,
        options: &PathOptions,
    ) -> GraphResult<Vec<Vec<String>>> {
        if self.get_node(source).is_none() {
            return Err(GraphError::NodeNotFound(source.to_string()));
        }
        if self.get_node(target).is_none() {
            return Err(GraphError::NodeNotFound(target.to_string()));
        }

        let mut paths = Vec::new();
        let mut current = vec![source.to_string()];
        let mut visited: BTreeSet<String> = [source.to_string()].into();
        self.dfs_paths(source, target, options, &mut current, &mut visited, &mut paths);
        Ok(paths)
    }

    fn dfs_paths(
        &self,
        at: &str,
        target: &str,
        options: &PathOptions,
        current: &mut Vec<String>,
        visited: &mut BTreeSet<String>,
        paths: &mut Vec<Vec<String>>,
    ) {
        if at == target {
            paths.push(current.clone());
            return;
        }
        if current.len() > options.max_depth {
            return;
        }

        for edge in self.get_edges(at, Direction::Outgoing) {
            if let Some(ref allowed) = options.relationship_types {
                if !allowed.contains(&edge.relationship) {
                    continue;
                }
            }
            if visited.contains(&edge.target) {
                continue;
            }

            visited.insert(edge.target.clone());
            current.push(edge.target.clone());
            self.dfs_paths(&edge.target, target, options, current, visited, paths);
            current.pop();
            visited.remove(&edge.target);
        }
    }

    /// Nodes reachable from `id` through edges in `types`, in the
    /// given direction.
    ///
    /// Direct neighbors are depth 1; with `transitive`, the walk
    /// recurses up to `max_depth` layers and tags indirectly reached
    /// nodes. Results are deduplicated by identifier (first reach
    /// wins) and never include the start node.
    pub fn find_related(
        &self,
        id: &str,
        direction: Direction,
        types: &[RelationshipType],
        options: &RelatedOptions,
    ) -> GraphResult<Vec<RelatedResource>> {
        if self.get_node(id).is_none() {
            return Err(GraphError::NodeNotFound(id.to_string()));
        }

        let max_depth = if options.transitive { options.max_depth } else { 1 };
        let mut seen: BTreeSet<String> = [id.to_string()].into();
        let mut results: Vec<RelatedResource> = Vec::new();
        let mut frontier = vec![id.to_string()];

        for depth in 1..=max_depth {
            let mut next = Vec::new();
            for at in &frontier {
                for edge in self.get_edges(at, direction) {
                    if !types.contains(&edge.relationship) {
                        continue;
                    }
                    let other = if edge.source == *at {
                        &edge.target
                    } else {
                        &edge.source
                    };
                    // under Both, an edge can point back at the frontier node
                    if other == at || !seen.insert(other.clone()) {
                        continue;
                    }
                    results.push(RelatedResource {
                        id: other.clone(),
                        relationship: edge.relationship,
                        depth,
                        transitive: depth > 1,
                    });
                    next.push(other.clone());
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        Ok(results)
    }

    /// Resources this node's content flowed from.
    pub fn find_sources(&self, id: &str, options: &RelatedOptions) -> GraphResult<Vec<RelatedResource>> {
        self.find_related(id, Direction::Incoming, type_sets::SOURCES, options)
    }

    /// Resources derived from this node.
    pub fn find_derived_resources(
        &self,
        id: &str,
        options: &RelatedOptions,
    ) -> GraphResult<Vec<RelatedResource>> {
        self.find_related(id, Direction::Outgoing, type_sets::DERIVED, options)
    }

    /// What this node depends on.
    pub fn find_dependencies(
        &self,
        id: &str,
        options: &RelatedOptions,
    ) -> GraphResult<Vec<RelatedResource>> {
        self.find_related(id, Direction::Outgoing, type_sets::DEPENDENCIES, options)
    }

    /// What depends on this node.
    pub fn find_dependents(
        &self,
        id: &str,
        options: &RelatedOptions,
    ) -> GraphResult<Vec<RelatedResource>> {
        self.find_related(id, Direction::Incoming, type_sets::DEPENDENTS, options)
    }

    /// Structural components of this node.
    pub fn find_components(
        &self,
        id: &str,
        options: &RelatedOptions,
    ) -> GraphResult<Vec<RelatedResource>> {
        self.find_related(id, Direction::Outgoing, type_sets::COMPONENTS, options)
    }
}
