//! End-to-end registration flow
//!
//! Drives the full data flow: derive an identifier from typed
//! attributes, initialize the metadata bundle, populate the remaining
//! layers, embed a watermark carrying the identifier and metadata
//! hash, record the lineage in the relationship graph, and anchor the
//! integrated view in a registry.

use std::collections::BTreeMap;

use serde_json::json;
use sigil_core::{DigestEncoding, ResourceType};
use sigil_lineage::{
    CharacteristicsLayer, Direction, EntityType, LayerKind, LineageLayer, MemoryRegistry,
    PathOptions, PolicyRule, ProvenanceLayer, RegistrationOutcome, RegistrationRequest,
    RelatedOptions, RelationshipType, ResourceGraph, ResourceRegistry, RightsLayer, to_prov,
};
use sigil_watermark::{Resource, TextWatermarker, WatermarkPayload, WatermarkStrategy};

fn generated_text() -> String {
    let mut text = String::new();
    for i in 0..300 {
        text.push_str(&format!(
            "paragraph {i} describes the generated result. details-follow \"cited\" here. "
        ));
    }
    text
}

fn register_text(content: &[u8]) -> sigil_lineage::RegisteredAsset {
    let attributes = json!({
        "content_hash": sigil_core::content_digest(content),
        "mime_type": "text/plain",
        "charset": "utf-8",
        "language": "en",
    })
    .as_object()
    .unwrap()
    .clone();

    RegistrationRequest::new(ResourceType::Text, attributes)
        .with_owner("studio-a")
        .with_encoding(DigestEncoding::Base58)
        .execute()
        .unwrap()
}

#[test]
fn test_full_registration_flow() {
    let text = generated_text();
    let mut asset = register_text(text.as_bytes());

    // the identifier carries the owner tag and parses back
    let compact = asset.identifier.to_string();
    let parsed =
        sigil_core::AssetId::parse_with_encoding(&compact, Some(DigestEncoding::Base58)).unwrap();
    assert_eq!(parsed, asset.identifier);
    assert!(parsed.owner_tag.is_some());

    // populate the remaining layers
    asset.bundle.set_provenance(ProvenanceLayer::new(json!({
        "generator": "model-m",
        "assertions": [],
    })));
    asset
        .bundle
        .set_characteristics(CharacteristicsLayer::general("text"));
    let mut lineage = LineageLayer::new();
    lineage.add_entity(compact.clone(), json!({}));
    asset.bundle.set_lineage(lineage);
    asset.bundle.set_rights(
        RightsLayer::new("CC-BY-4.0", "https://creativecommons.org/licenses/by/4.0/")
            .permit(PolicyRule::action("reproduce")),
    );
    assert!(asset.bundle.is_valid());

    // embed a watermark binding the identifier to the metadata hash
    let payload = WatermarkPayload::new(compact.clone(), "2024-06-01T00:00:00.000Z")
        .with_metadata_hash(asset.bundle.metadata_hash());
    let strategy = TextWatermarker::default();
    let marked = strategy
        .embed(&Resource::Text(text), &payload)
        .unwrap();

    let report = strategy.verify(&marked, &payload);
    assert!(report.verified);
    assert_eq!(report.extracted.unwrap().did, compact);

    // anchor the integrated view
    let mut registry = MemoryRegistry::new();
    let receipt = registry.register(&compact, &asset.bundle.integrated_view(), "studio-a");
    assert_eq!(receipt.metadata_hash, asset.bundle.metadata_hash());
    assert!(registry.get_resource(&compact).is_some());
}

#[test]
fn test_metadata_hash_change_fails_verification() {
    let text = generated_text();
    let mut asset = register_text(text.as_bytes());
    asset.bundle.set_provenance(ProvenanceLayer::new(json!({"generator": "m"})));

    let payload = WatermarkPayload::new(asset.identifier.to_string(), "2024-06-01T00:00:00.000Z")
        .with_metadata_hash(asset.bundle.metadata_hash());
    let strategy = TextWatermarker::default();
    let marked = strategy.embed(&Resource::Text(text), &payload).unwrap();

    // the bundle changes after embedding; the stale hash no longer verifies
    asset
        .bundle
        .update_field(LayerKind::Provenance, "claim.generator", json!("other"))
        .unwrap();
    let expectation = WatermarkPayload::new(asset.identifier.to_string(), "2024-06-01T00:00:00.000Z")
        .with_metadata_hash(asset.bundle.metadata_hash());

    let report = strategy.verify(&marked, &expectation);
    assert!(!report.verified);
    assert_eq!(report.reason.as_deref(), Some("metadata hash mismatch"));
}

#[test]
fn test_lineage_recorded_in_graph() {
    let dataset = register_text(b"the training corpus");
    let model_attrs = json!({
        "model_hash": sigil_core::content_digest(b"weights"),
        "architecture": "transformer",
        "parameters": 7_000_000_000u64,
        "training_dataset_ref": dataset.identifier.to_string(),
    })
    .as_object()
    .unwrap()
    .clone();
    let model = RegistrationRequest::new(ResourceType::AiModel, model_attrs)
        .execute()
        .unwrap();
    let output = register_text(b"the generated output");

    let dataset_id = dataset.identifier.to_string();
    let model_id = model.identifier.to_string();
    let output_id = output.identifier.to_string();

    let mut graph = ResourceGraph::new();
    graph.add_node(&dataset_id, EntityType::Dataset, "corpus", BTreeMap::new());
    graph.add_node(&model_id, EntityType::AiModel, "model", BTreeMap::new());
    graph.add_node(&output_id, EntityType::TextContent, "output", BTreeMap::new());
    graph
        .add_edge(&dataset_id, &model_id, RelationshipType::Used, BTreeMap::new())
        .unwrap();
    graph
        .add_edge(&model_id, &output_id, RelationshipType::WasGeneratedBy, BTreeMap::new())
        .unwrap();

    // the output's full derivation chain is reachable
    let paths = graph
        .find_paths(&dataset_id, &output_id, &PathOptions { max_depth: 5, relationship_types: None })
        .unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].len(), 3);

    let sources = graph
        .find_sources(&output_id, &RelatedOptions { max_depth: 2, transitive: true })
        .unwrap();
    let ids: Vec<&str> = sources.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![model_id.as_str(), dataset_id.as_str()]);

    // and the projection carries the same structure
    let doc = to_prov(&graph);
    assert_eq!(doc.entity.len(), 3);
    assert_eq!(doc.entity[&dataset_id]["prov:used"], vec![model_id.clone()]);

    // removing the model cuts both lineage edges
    graph.remove_node(&model_id).unwrap();
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.get_edges(&output_id, Direction::Both).is_empty());
}

#[test]
fn test_registration_outcome_boundary() {
    // boundary APIs surface failures as structured results, not panics
    let missing = RegistrationRequest::new(ResourceType::AiModel, serde_json::Map::new());
    let outcome = RegistrationOutcome::from_result(&missing.execute());
    assert!(!outcome.ok);
    assert_eq!(outcome.error_kind.as_deref(), Some("MissingRequiredAttribute"));

    let ok = RegistrationOutcome::from_result(&Ok(register_text(b"fine")));
    assert!(ok.ok);
    assert!(ok.details.unwrap()["identifier"]
        .as_str()
        .unwrap()
        .starts_with("did:asset:text:"));
}

#[test]
fn test_selective_view_across_flow() {
    let mut asset = register_text(b"view subject");
    asset.bundle.set_provenance(ProvenanceLayer::new(json!({"generator": "m"})));
    asset.bundle.set_rights(RightsLayer::new(
        "MIT",
        "https://opensource.org/license/mit/",
    ));

    let view = asset.bundle.selective_view(&["c2pa", "odrl"]).unwrap();
    let map = view.as_object().unwrap();
    assert_eq!(map["id"], asset.identifier.to_string());
    assert!(map.contains_key("c2pa"));
    assert!(map.contains_key("odrl"));
    assert!(!map.contains_key("prov"));
    assert!(!map.contains_key("general"));
}
