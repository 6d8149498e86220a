//! Scenario tests
//!
//! Production-like flows across crates, grouped by area. Each scenario
//! drives the manager through the mock engine and an in-memory store.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use pres_core::{
    CONCRETE_CLASS_QUERY, ErrorKind, HierarchyCompareOptions, HierarchyState, LABEL_BATCH_SIZE,
    ManagerConfig, PARENT_QUERY, PresentationManager, StoreRequestOptions,
};
use pres_engine::{HierarchyUpdateInfo, RequestKind, SessionMode};
use pres_store::{QueryValue, Row, StoreKey};
use pres_test_utils::{MemoryRecordStore, MockEngine, StaticSelectionScopes};
use pres_types::{
    EntityId, EntityKey, LabelDefinition, Node, Ruleset, SelectionScope, apply_to_level,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

// =============================================================================
// Test Infrastructure
// =============================================================================

async fn manager_with(engine: &Arc<MockEngine>, config: ManagerConfig) -> PresentationManager {
    PresentationManager::builder(engine.clone())
        .config(config)
        .build()
        .await
        .unwrap()
}

fn ruleset(id: &str, spec_type: &str) -> Ruleset {
    Ruleset::from_json(
        &json!({"id": id, "rules": [{"ruleType": "RootNodes", "specifications": [{"specType": spec_type}]}]})
            .to_string(),
    )
    .unwrap()
}

fn text(value: &str) -> Row {
    Row::new(vec![QueryValue::Text(value.to_string())])
}

// =============================================================================
// Rulesets
// =============================================================================

#[tokio::test]
async fn changed_ruleset_content_stays_registered_until_removed() {
    let engine = Arc::new(MockEngine::new());
    let manager = manager_with(&engine, ManagerConfig::default()).await;

    let first = manager.rulesets().add(ruleset("tree", "AllInstanceNodes")).await.unwrap();
    let second = manager.rulesets().add(ruleset("tree", "CustomNode")).await.unwrap();
    assert_ne!(first.hash, second.hash);

    assert_eq!(engine.add_ruleset_calls(), 2);
    assert!(engine.remove_ruleset_calls().is_empty());
    assert_eq!(manager.rulesets().get("tree").await, Some(second.clone()));

    assert!(manager.rulesets().remove("tree").await.unwrap());
    let mut removed = engine.remove_ruleset_calls();
    removed.sort();
    let mut expected = vec![
        ("tree".to_string(), first.unique_identifier),
        ("tree".to_string(), second.unique_identifier),
    ];
    expected.sort();
    assert_eq!(removed, expected);
    assert!(manager.rulesets().is_empty().await);
}

#[tokio::test]
async fn shared_content_survives_removal_of_one_alias() {
    let engine = Arc::new(MockEngine::new());
    let manager = manager_with(&engine, ManagerConfig::default()).await;

    manager.rulesets().add(ruleset("a", "AllInstanceNodes")).await.unwrap();
    manager.rulesets().add(ruleset("b", "AllInstanceNodes")).await.unwrap();
    assert_eq!(engine.add_ruleset_calls(), 1);

    assert!(manager.rulesets().remove("a").await.unwrap());
    assert!(engine.remove_ruleset_calls().is_empty());
    assert!(manager.rulesets().get("b").await.is_some());

    assert!(manager.rulesets().remove("b").await.unwrap());
    assert_eq!(engine.remove_ruleset_calls().len(), 1);
    assert!(!manager.rulesets().remove("b").await.unwrap());
}

// =============================================================================
// Hierarchy comparison
// =============================================================================

#[tokio::test]
async fn comparison_result_replays_onto_rendered_level() {
    let engine = Arc::new(MockEngine::new());
    let node = |name: &str| {
        json!({
            "key": {"type": "Generic", "nodeType": "T", "pathFromRoot": [name]},
            "label": LabelDefinition::from_string(name),
        })
    };
    engine.respond(
        RequestKind::CompareHierarchies,
        &json!([
            {"type": "Delete", "position": 0, "target": node("a")["key"]},
            {"type": "Insert", "position": 1, "node": node("c")},
        ])
        .to_string(),
    );
    let manager = manager_with(&engine, ManagerConfig::default()).await;
    let store = MemoryRecordStore::new("s");

    let changes = manager
        .compare_hierarchies(
            &HierarchyCompareOptions::new(
                &store,
                HierarchyState::new(ruleset("tree", "AllInstanceNodes")),
                HierarchyState::new(ruleset("tree", "CustomNode")),
            )
            .with_locale("fr"),
        )
        .await
        .unwrap();

    let mut level: Vec<Node> = vec![
        serde_json::from_value(node("a")).unwrap(),
        serde_json::from_value(node("b")).unwrap(),
    ];
    apply_to_level(&mut level, None, &changes).unwrap();
    let names: Vec<_> = level.iter().map(|n| n.label.display_value.as_str()).collect();
    assert_eq!(names, vec!["b", "c"]);

    let params = &engine.requests()[0].envelope["params"];
    assert_ne!(params["prevRulesetId"], params["currRulesetId"]);
    assert_eq!(params["locale"], "fr");
    assert!(engine.remove_ruleset_calls().is_empty());
}

// =============================================================================
// Labels
// =============================================================================

#[tokio::test]
async fn label_requests_are_batched() {
    let engine = Arc::new(MockEngine::new());
    let manager = manager_with(&engine, ManagerConfig::default()).await;
    let store = MemoryRecordStore::new("s");
    let keys: Vec<EntityKey> = (0..LABEL_BATCH_SIZE + 5)
        .map(|i| EntityKey::new("Foo:Bar", format!("0x{:x}", i + 1)))
        .collect();

    let labels = manager
        .get_display_label_definitions(&StoreRequestOptions::new(&store).with_locale("en"), &keys)
        .await
        .unwrap();

    assert_eq!(labels.len(), keys.len());
    assert!(labels.iter().all(LabelDefinition::is_empty));

    let requests = engine.requests_of(RequestKind::GetContent);
    assert_eq!(requests.len(), 2);
    let batch_sizes: Vec<usize> = requests
        .iter()
        .map(|r| {
            r.envelope["params"]["keys"]["instanceKeys"]
                .as_array()
                .map_or(0, Vec::len)
        })
        .collect();
    assert_eq!(batch_sizes, vec![LABEL_BATCH_SIZE, 5]);
    for request in &requests {
        assert_eq!(request.envelope["params"]["locale"], "en");
        assert_eq!(request.envelope["params"]["rulesetVariables"], json!([]));
    }
}

#[tokio::test]
async fn missing_single_label_is_placeholder() {
    let engine = Arc::new(MockEngine::new());
    engine.respond(RequestKind::GetDisplayLabel, "null");
    let manager = manager_with(&engine, ManagerConfig::default()).await;
    let store = MemoryRecordStore::new("s");

    let label = manager
        .get_display_label_definition(&StoreRequestOptions::new(&store), &EntityKey::new("Foo:Bar", "0x1"))
        .await
        .unwrap();
    assert_eq!(label, LabelDefinition::empty());
    assert_eq!(store.query_count(), 0);
}

// =============================================================================
// Selection scopes
// =============================================================================

#[tokio::test]
async fn default_scopes_walk_assemblies() {
    let engine = Arc::new(MockEngine::new());
    let manager = manager_with(&engine, ManagerConfig::default()).await;
    let store = MemoryRecordStore::new("s")
        .with_row(PARENT_QUERY, "0x3", text("0x2"))
        .with_row(PARENT_QUERY, "0x2", text("0x1"))
        .with_row(CONCRETE_CLASS_QUERY, "0x1", text("Plant:Unit"));
    let options = StoreRequestOptions::new(&store);

    let scopes = manager.get_selection_scopes(&options).await.unwrap();
    assert_eq!(scopes.len(), 3);

    let selected = manager
        .compute_selection(&options, &[EntityId::new("0x3")], "top-assembly")
        .await
        .unwrap();
    assert!(selected.contains_entity_key(&EntityKey::new("Plant:Unit", "0x1")));
    assert!(engine.requests().is_empty());
}

#[tokio::test]
async fn custom_scope_provider_is_used() {
    let engine = Arc::new(MockEngine::new());
    let provider = Arc::new(StaticSelectionScopes::new(vec![SelectionScope::new(
        "category",
        "Category",
    )]));
    let manager = PresentationManager::builder(engine.clone())
        .selection_scopes(provider.clone())
        .build()
        .await
        .unwrap();
    let store = MemoryRecordStore::new("s");
    let options = StoreRequestOptions::new(&store);

    let scopes = manager.get_selection_scopes(&options).await.unwrap();
    assert_eq!(scopes, vec![SelectionScope::new("category", "Category")]);

    let err = manager
        .compute_selection(&options, &[EntityId::new("0x1")], "element")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert_eq!(provider.computed_scopes(), vec!["element".to_string()]);
}

// =============================================================================
// Update notifications
// =============================================================================

#[tokio::test]
async fn updates_are_published_per_store() {
    let engine = Arc::new(MockEngine::new());
    engine.push_update_info(
        &json!({
            "a.bim": {"tree": {"hierarchy": [{"type": "Delete", "position": 0,
                "target": {"type": "Generic", "nodeType": "T", "pathFromRoot": ["x"]}}]}},
            "b.bim": {"tree": {"content": "FULL"}},
            "c.bim": {}
        })
        .to_string(),
    );
    let config = ManagerConfig {
        mode: SessionMode::ReadWrite,
        updates_poll_interval: Some(5),
        ..Default::default()
    };
    let manager = manager_with(&engine, config).await;
    let mut updates = manager.on_updated();

    let mut received = Vec::new();
    for _ in 0..2 {
        let event = tokio::time::timeout(Duration::from_secs(5), updates.recv())
            .await
            .unwrap()
            .unwrap();
        received.push(event);
    }
    received.sort_by(|a, b| a.store.as_str().cmp(b.store.as_str()));

    assert_eq!(received[0].store, StoreKey::from("a.bim"));
    assert!(matches!(
        received[0].rulesets["tree"].hierarchy,
        Some(HierarchyUpdateInfo::Partial(ref edits)) if edits.len() == 1
    ));
    assert_eq!(received[1].store, StoreKey::from("b.bim"));
    assert!(received[1].rulesets["tree"].content.is_some());

    manager.dispose();
    assert!(!manager.is_polling());
}

#[tokio::test]
async fn poll_failures_do_not_stop_polling() {
    let engine = Arc::new(MockEngine::new());
    engine.fail_update_info("engine busy");
    let config = ManagerConfig {
        mode: SessionMode::ReadWrite,
        updates_poll_interval: Some(2),
        ..Default::default()
    };
    let manager = manager_with(&engine, config).await;

    tokio::time::timeout(Duration::from_secs(5), async {
        while engine.update_info_calls() < 3 {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap();
    assert!(manager.is_polling());
}

// =============================================================================
// Configuration formats
// =============================================================================

#[rstest]
#[case(".toml", "mode = \"read-write\"\nupdates-poll-interval = 250\n")]
#[case(".json", r#"{"mode": "read-write", "updates-poll-interval": 250}"#)]
#[case(".yaml", "mode: read-write\nupdates-poll-interval: 250\n")]
fn config_formats_agree(#[case] suffix: &str, #[case] content: &str) {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();

    let config = ManagerConfig::load(file.path()).unwrap();
    assert_eq!(config.mode, SessionMode::ReadWrite);
    assert_eq!(config.poll_interval(), Some(Duration::from_millis(250)));
}

#[test]
fn unknown_config_format_is_rejected() {
    let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
    let err = ManagerConfig::load(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[tokio::test]
async fn invalid_task_priority_fails_build() {
    let engine = Arc::new(MockEngine::new());
    let mut config = ManagerConfig::default();
    config.task_allocations_map.insert("high".into(), 4);

    let err = PresentationManager::builder(engine.clone())
        .config(config)
        .build()
        .await
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(engine.configured_options().is_none());
}
