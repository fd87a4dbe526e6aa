//! # Sigil Lineage
//!
//! Layered asset metadata and the resource relationship graph.
//!
//! ## Key Concepts
//!
//! - **Bundle**: a sparse composition of five metadata layers
//!   (identity → provenance → characteristics → lineage → rights),
//!   each a tagged variant with an open extensions map
//! - **Projection**: every layer renders into its named external
//!   vocabulary; the integrated view merges them under a fixed
//!   `@context`
//! - **Relationship graph**: a directed labeled multigraph over asset
//!   identifiers with closed entity and relationship vocabularies,
//!   cycle-safe traversal, and a PROV-compatible projection
//!
//! ## Ownership
//!
//! The bundle owns its layers and the graph owns its nodes and edges;
//! removing a node cascades to every incident edge, and dropping a
//! bundle or graph releases everything it holds. There are no weak
//! references and no internal locks — callers share instances
//! explicitly and serialize access externally.

pub mod bundle;
pub mod error;
pub mod graph;
pub mod layers;
pub mod registry;

pub use bundle::{MetadataBundle, INTEGRATED_CONTEXT};
pub use error::{GraphError, GraphResult, MetadataError, MetadataResult};
pub use graph::prov::{from_prov, to_prov, ProvDocument, ProvRecord};
pub use graph::traversal::{PathOptions, RelatedOptions, RelatedResource};
pub use graph::{Direction, Edge, EntityType, Node, RelationshipType, ResourceGraph};
pub use layers::{
    CharacteristicsLayer, CharacteristicsSchema, IdentityLayer, LayerKind, License, LineageLayer,
    MetadataLayer, PolicyConstraint, PolicyRule, ProvenanceLayer, ProvenanceSignature, RightsLayer,
};
pub use registry::{
    MemoryRegistry, RegisteredAsset, RegisteredResource, RegistrationOutcome, RegistrationReceipt,
    RegistrationRequest, ResourceRegistry,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the library version
pub fn version() -> &'static str {
    VERSION
}
