//! End-to-end session test
//!
//! Exercises a whole session: config file -> manager -> rulesets and
//! variables -> hierarchy, content and label requests -> dispose.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use pres_core::{
    BUILTIN_SUPPLEMENTAL_DIRECTORY, CONCRETE_CLASS_QUERY, ErrorKind, ManagerConfig,
    PresentationManager, RequestOptions, StoreRequestOptions,
};
use pres_engine::{RequestKind, SessionMode};
use pres_store::{QueryValue, Row};
use pres_test_utils::{MemoryRecordStore, MockEngine};
use pres_types::{
    DescriptorOverrides, EntityKey, KeySet, LabelDefinition, PageOptions, Ruleset, VariableValue,
    VariableValueType,
};
use serde_json::json;
use tempfile::TempDir;

/// Write a TOML manager config into a fresh directory
fn setup_config() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("presentation.toml");
    fs::write(
        &path,
        r#"
id = "viewer"
ruleset-directories = ["rules", "rules", "more-rules"]
supplemental-ruleset-directories = ["extra"]
active-locale = "en"
mode = "read-only"

[task-allocations-map]
"1000" = 2
"#,
    )
    .unwrap();
    (temp, path)
}

fn hierarchy_ruleset() -> Ruleset {
    Ruleset::from_json(
        &json!({
            "id": "tree",
            "rules": [{"ruleType": "RootNodes", "specifications": [{"specType": "AllInstanceNodes"}]}]
        })
        .to_string(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_config_to_engine_setup() {
    let (_temp, path) = setup_config();
    let config = ManagerConfig::load(&path).unwrap();
    assert_eq!(config.mode, SessionMode::ReadOnly);

    let engine = Arc::new(MockEngine::new());
    let manager = PresentationManager::builder(engine.clone())
        .config(config)
        .build()
        .await
        .unwrap();

    let options = engine.configured_options().unwrap();
    assert_eq!(options.id, "viewer");
    assert_eq!(options.task_allocations.get(&1000), Some(&2));

    assert_eq!(
        engine.ruleset_directories(),
        vec![vec![PathBuf::from("rules"), PathBuf::from("more-rules")]]
    );
    assert_eq!(
        engine.supplemental_ruleset_directories(),
        vec![vec![
            PathBuf::from(BUILTIN_SUPPLEMENTAL_DIRECTORY),
            PathBuf::from("extra")
        ]]
    );
    assert_eq!(manager.active_locale().as_deref(), Some("en"));
    assert!(!manager.is_polling());
}

#[tokio::test]
async fn test_full_session() {
    // Fails harmlessly if another test installed the subscriber first
    let _ = pres_core::logging::init_with_default("pres_core=debug,info");
    let (_temp, path) = setup_config();
    let engine = Arc::new(MockEngine::new());
    let manager = PresentationManager::builder(engine.clone())
        .config(ManagerConfig::load(&path).unwrap())
        .build()
        .await
        .unwrap();
    let store = MemoryRecordStore::new("model.bim").with_row(
        CONCRETE_CLASS_QUERY,
        "0x20",
        Row::new(vec![QueryValue::Text("Plant:Pump".into())]),
    );

    // Rulesets and variables
    let registered = manager.rulesets().add(hierarchy_ruleset()).await.unwrap();
    assert_eq!(registered.hash, hierarchy_ruleset().content_hash());
    let vars = manager.vars("tree");
    vars.set("show_hidden", VariableValue::Bool(true));
    assert_eq!(
        vars.get("show_hidden", VariableValueType::Bool),
        VariableValue::Bool(true)
    );

    // Hierarchy
    engine.respond(
        RequestKind::GetRootNodes,
        &json!([{
            "key": {"type": "Instances", "instanceKeys": [{"className": "Plant:Pump", "id": "0x20"}], "pathFromRoot": ["p"]},
            "label": LabelDefinition::from_string("Pump"),
            "hasChildren": false
        }])
        .to_string(),
    );
    engine.respond(RequestKind::GetRootNodesCount, "1");
    let page = manager
        .get_nodes_and_count(&RequestOptions::new(&store, "tree"), None, Some(PageOptions::new(0, 10)))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items.len(), 1);

    let nodes_request = &engine.requests_of(RequestKind::GetRootNodes)[0];
    assert_eq!(nodes_request.store.as_str(), "model.bim");
    let params = &nodes_request.envelope["params"];
    assert_eq!(params["rulesetId"], json!(registered.unique_identifier));
    assert_eq!(params["locale"], "en");
    assert_eq!(
        params["rulesetVariables"],
        json!([{"id": "show_hidden", "type": "bool", "value": true}])
    );

    // Content, with an abstract key resolved to its concrete class
    engine.respond(RequestKind::GetContentSetSize, "1");
    let keys: KeySet = [EntityKey::new("BisCore:Element", "0x20")].into_iter().collect();
    let size = manager
        .get_content_set_size(
            &RequestOptions::new(&store, "tree").with_locale("de"),
            &DescriptorOverrides::default().into(),
            &keys,
        )
        .await
        .unwrap();
    assert_eq!(size, 1);
    let params = &engine.requests_of(RequestKind::GetContentSetSize)[0].envelope["params"];
    assert_eq!(params["locale"], "de");
    assert_eq!(
        params["keys"]["instanceKeys"],
        json!([{"className": "Plant:Pump", "id": "0x20"}])
    );

    // Single label through the engine's label request
    engine.respond(
        RequestKind::GetDisplayLabel,
        &serde_json::to_string(&LabelDefinition::from_string("Pump 20")).unwrap(),
    );
    let label = manager
        .get_display_label_definition(
            &StoreRequestOptions::new(&store),
            &EntityKey::new("BisCore:Element", "0x20"),
        )
        .await
        .unwrap();
    assert_eq!(label, LabelDefinition::from_string("Pump 20"));
    let params = &engine.requests_of(RequestKind::GetDisplayLabel)[0].envelope["params"];
    assert_eq!(params["key"], json!({"className": "Plant:Pump", "id": "0x20"}));

    // Teardown
    manager.dispose();
    assert_eq!(engine.dispose_calls(), 1);
    let err = manager
        .get_nodes_count(&RequestOptions::new(&store, "tree"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
}

#[tokio::test]
async fn test_drop_releases_engine() {
    let engine = Arc::new(MockEngine::new());
    let manager = PresentationManager::builder(engine.clone())
        .build()
        .await
        .unwrap();
    drop(manager);
    assert_eq!(engine.dispose_calls(), 1);
}
