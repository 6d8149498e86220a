//! Behavioural properties of the presentation manager, exercised through
//! the public API against the mock engine.

use std::sync::Arc;
use std::time::Duration;

use pres_core::{
    CONCRETE_CLASS_QUERY, ErrorKind, HierarchyCompareOptions, HierarchyState, ManagerConfig,
    PresentationManager, RequestOptions, StoreRequestOptions,
};
use pres_engine::{RequestKind, SessionMode};
use pres_store::{QueryValue, Row, StoreKey, StoreOpenedEvents};
use pres_test_utils::{MemoryRecordStore, MockEngine};
use pres_types::{
    DescriptorOverrides, EntityKey, FieldDescriptor, KeySet, LabelDefinition, PageOptions, Ruleset,
    RulesetVariable, VariableValue,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn ruleset(id: &str) -> Ruleset {
    Ruleset::from_json(&json!({"id": id, "rules": [{"ruleType": "RootNodes"}]}).to_string()).unwrap()
}

async fn manager(engine: &Arc<MockEngine>) -> PresentationManager {
    PresentationManager::builder(engine.clone())
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn identical_content_registers_once() {
    let engine = Arc::new(MockEngine::new());
    engine.respond(RequestKind::GetRootNodesCount, "0");
    let manager = manager(&engine).await;
    let store = MemoryRecordStore::new("s");

    manager
        .get_nodes_count(&RequestOptions::new(&store, ruleset("first")), None)
        .await
        .unwrap();
    manager
        .get_nodes_count(&RequestOptions::new(&store, ruleset("second")), None)
        .await
        .unwrap();

    assert_eq!(engine.add_ruleset_calls(), 1);
    let ids: Vec<Value> = engine
        .requests()
        .iter()
        .map(|r| r.envelope["params"]["rulesetId"].clone())
        .collect();
    assert_eq!(ids[0], ids[1]);
    assert_eq!(ids[0], json!(ruleset("any").content_hash()));
}

#[tokio::test]
async fn compare_with_different_rulesets_never_dispatches() {
    let engine = Arc::new(MockEngine::new());
    let manager = manager(&engine).await;
    let store = MemoryRecordStore::new("s");

    let err = manager
        .compare_hierarchies(&HierarchyCompareOptions::new(
            &store,
            HierarchyState::new("a"),
            HierarchyState::new("b"),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(engine.requests().is_empty());
}

#[tokio::test]
async fn compare_sends_locale_and_changed_variables() {
    let engine = Arc::new(MockEngine::new());
    engine.respond(RequestKind::CompareHierarchies, "[]");
    let manager = manager(&engine).await;
    let store = MemoryRecordStore::new("s");

    let prev = HierarchyState::new("rules").with_variables(vec![
        RulesetVariable::new("same", VariableValue::Int(1)),
        RulesetVariable::new("changed", VariableValue::Bool(false)),
    ]);
    let curr = HierarchyState::new("rules").with_variables(vec![
        RulesetVariable::new("same", VariableValue::Int(1)),
        RulesetVariable::new("changed", VariableValue::Bool(true)),
    ]);
    let changes = manager
        .compare_hierarchies(&HierarchyCompareOptions::new(&store, prev, curr))
        .await
        .unwrap();
    assert!(changes.is_empty());

    let params = &engine.requests()[0].envelope["params"];
    assert_eq!(params["prevRulesetId"], "rules");
    assert_eq!(params["currRulesetId"], "rules");
    assert_eq!(params["locale"], "");
    assert_eq!(
        params["prevRulesetVariables"],
        json!([{"id": "changed", "type": "bool", "value": false}])
    );
    assert_eq!(
        params["currRulesetVariables"],
        json!([{"id": "changed", "type": "bool", "value": true}])
    );
}

#[tokio::test]
async fn compare_uses_active_locale() {
    let engine = Arc::new(MockEngine::new());
    engine.respond(
        RequestKind::CompareHierarchies,
        r#"[{"type": "Delete", "position": 0,
             "target": {"type": "Generic", "nodeType": "T", "pathFromRoot": ["a"]}}]"#,
    );
    let manager = manager(&engine).await;
    manager.set_active_locale(Some("lt".into()));
    let store = MemoryRecordStore::new("s");

    let changes = manager
        .compare_hierarchies(&HierarchyCompareOptions::new(
            &store,
            HierarchyState::new("rules"),
            HierarchyState::new("rules"),
        ))
        .await
        .unwrap();
    assert_eq!(changes.len(), 1);

    let params = &engine.requests()[0].envelope["params"];
    assert_eq!(params["locale"], "lt");
    assert!(params.get("prevRulesetVariables").is_none());
}

#[tokio::test]
async fn compare_across_content_change_keeps_both_registered() {
    let engine = Arc::new(MockEngine::new());
    engine.respond(RequestKind::CompareHierarchies, "[]");
    let manager = manager(&engine).await;
    let store = MemoryRecordStore::new("s");
    let prev = ruleset("tree");
    let curr = Ruleset::from_json(
        &json!({"id": "tree", "rules": [{"ruleType": "ChildNodes"}]}).to_string(),
    )
    .unwrap();

    manager
        .compare_hierarchies(&HierarchyCompareOptions::new(
            &store,
            HierarchyState::new(prev.clone()),
            HierarchyState::new(curr.clone()),
        ))
        .await
        .unwrap();

    assert!(engine.remove_ruleset_calls().is_empty());
    assert_eq!(engine.add_ruleset_calls(), 2);
    let params = &engine.requests()[0].envelope["params"];
    assert_eq!(params["prevRulesetId"], json!(prev.content_hash()));
    assert_eq!(params["currRulesetId"], json!(curr.content_hash()));
    assert_eq!(manager.rulesets().registration_count().await, 2);
}

#[tokio::test]
async fn nested_field_distinct_values_short_circuit() {
    let engine = Arc::new(MockEngine::new());
    let manager = manager(&engine).await;
    let store = MemoryRecordStore::new("s");
    let field = FieldDescriptor::Name {
        field_name: "child".into(),
        parent: Some("nested".into()),
    };

    let values = manager
        .get_paged_distinct_values(
            &RequestOptions::new(&store, "rules"),
            &DescriptorOverrides::default().into(),
            &KeySet::new(),
            &field,
            None,
        )
        .await
        .unwrap();

    assert_eq!(values.total, 0);
    assert!(values.items.is_empty());
    assert!(engine.requests().is_empty());
}

#[tokio::test]
async fn labels_follow_input_order() {
    let engine = Arc::new(MockEngine::new());
    let a = EntityKey::new("Foo:A", "0x1");
    let b = EntityKey::new("Foo:B", "0x2");
    let unmatched = EntityKey::new("Foo:C", "0x3");
    engine.respond(
        RequestKind::GetContent,
        &json!({
            "descriptor": {"displayType": "List"},
            "contentSet": [
                {"primaryKeys": [b], "label": LabelDefinition::from_string("B")},
                {"primaryKeys": [a], "label": LabelDefinition::from_string("A")},
            ]
        })
        .to_string(),
    );
    let manager = manager(&engine).await;
    let store = MemoryRecordStore::new("s");

    let labels = manager
        .get_display_label_definitions(
            &StoreRequestOptions::new(&store),
            &[a.clone(), unmatched, b.clone()],
        )
        .await
        .unwrap();

    assert_eq!(
        labels,
        vec![
            LabelDefinition::from_string("A"),
            LabelDefinition::empty(),
            LabelDefinition::from_string("B"),
        ]
    );
}

#[tokio::test]
async fn labels_use_resolved_keys() {
    let engine = Arc::new(MockEngine::new());
    let concrete = EntityKey::new("Foo:Bar", "0x1");
    engine.respond(
        RequestKind::GetContent,
        &json!({
            "descriptor": {"displayType": "List"},
            "contentSet": [{"primaryKeys": [concrete], "label": LabelDefinition::from_string("Bar")}]
        })
        .to_string(),
    );
    let manager = manager(&engine).await;
    let store = MemoryRecordStore::new("s").with_row(
        CONCRETE_CLASS_QUERY,
        "0x1",
        Row::new(vec![QueryValue::Text("Foo:Bar".into())]),
    );

    let labels = manager
        .get_display_label_definitions(
            &StoreRequestOptions::new(&store),
            &[EntityKey::new("BisCore:Element", "0x1")],
        )
        .await
        .unwrap();
    assert_eq!(labels, vec![LabelDefinition::from_string("Bar")]);
}

#[tokio::test]
async fn element_keys_resolved_before_content_dispatch() {
    let engine = Arc::new(MockEngine::new());
    engine.respond(RequestKind::GetContentSetSize, "1");
    let manager = manager(&engine).await;
    let store = MemoryRecordStore::new("s").with_row(
        CONCRETE_CLASS_QUERY,
        "0x1",
        Row::new(vec![QueryValue::Text("Foo:Bar".into())]),
    );
    let keys: KeySet = [
        EntityKey::new("BisCore:Element", "0x1"),
        EntityKey::new("BisCore:Element", "0x2"),
    ]
    .into_iter()
    .collect();

    manager
        .get_content_set_size(
            &RequestOptions::new(&store, "rules"),
            &DescriptorOverrides::default().into(),
            &keys,
        )
        .await
        .unwrap();

    let instance_keys = &engine.requests()[0].envelope["params"]["keys"]["instanceKeys"];
    assert_eq!(
        instance_keys,
        &json!([
            {"className": "BisCore:Element", "id": "0x2"},
            {"className": "Foo:Bar", "id": "0x1"},
        ])
    );
}

#[tokio::test]
async fn nodes_and_count_share_parameters() {
    let engine = Arc::new(MockEngine::new());
    engine.respond(RequestKind::GetRootNodes, "[]");
    engine.respond(RequestKind::GetRootNodesCount, "3");
    let manager = manager(&engine).await;
    let store = MemoryRecordStore::new("s");

    let page = manager
        .get_nodes_and_count(
            &RequestOptions::new(&store, "rules"),
            None,
            Some(PageOptions::new(0, 2)),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 3);

    let requests = engine.requests();
    assert_eq!(requests.len(), 2);
    let mut kinds: Vec<_> = requests.iter().map(|r| r.kind).collect();
    kinds.sort_by_key(|kind| kind.as_str());
    assert_eq!(kinds, vec![RequestKind::GetRootNodes, RequestKind::GetRootNodesCount]);
    for request in &requests {
        assert_eq!(request.envelope["params"]["rulesetId"], "rules");
        assert_eq!(request.envelope["params"]["paging"], json!({"start": 0, "size": 2}));
    }
}

#[tokio::test]
async fn content_and_size_reports_single_failure() {
    let engine = Arc::new(MockEngine::new());
    engine.respond(RequestKind::GetContent, "null");
    engine.fail(RequestKind::GetContentSetSize, "count failed");
    let manager = manager(&engine).await;
    let store = MemoryRecordStore::new("s");

    let err = manager
        .get_content_and_size(
            &RequestOptions::new(&store, "rules"),
            &DescriptorOverrides::default().into(),
            &KeySet::new(),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, pres_core::Error::Engine { ref operation, .. } if operation == "GetContentSetSize"));
}

#[tokio::test]
async fn dispose_is_idempotent_and_blocks_operations() {
    let engine = Arc::new(MockEngine::new());
    let manager = manager(&engine).await;
    let store = MemoryRecordStore::new("s");

    manager.dispose();
    manager.dispose();
    assert!(manager.is_disposed());
    assert_eq!(engine.dispose_calls(), 1);

    let err = manager
        .get_display_label_definitions(&StoreRequestOptions::new(&store), &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
}

#[tokio::test]
async fn read_write_session_polls_until_disposed() {
    let engine = Arc::new(MockEngine::new());
    engine.push_update_info(r#"{"s": {"rules": {"hierarchy": "FULL"}}}"#);
    let config = ManagerConfig {
        mode: SessionMode::ReadWrite,
        updates_poll_interval: Some(5),
        ..Default::default()
    };
    let manager = PresentationManager::builder(engine.clone())
        .config(config)
        .build()
        .await
        .unwrap();
    let mut updates = manager.on_updated();
    assert!(manager.is_polling());

    let event = tokio::time::timeout(Duration::from_secs(5), updates.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.store, StoreKey::from("s"));
    assert!(event.rulesets.contains_key("rules"));

    manager.dispose();
    assert!(!manager.is_polling());
    let polls = engine.update_info_calls();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(engine.update_info_calls(), polls);
}

#[tokio::test]
async fn read_only_session_never_polls() {
    let engine = Arc::new(MockEngine::new());
    let config = ManagerConfig {
        updates_poll_interval: Some(5),
        ..Default::default()
    };
    let manager = PresentationManager::builder(engine.clone())
        .config(config)
        .build()
        .await
        .unwrap();
    assert!(!manager.is_polling());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(engine.update_info_calls(), 0);
}

#[tokio::test]
async fn schemas_preloaded_on_store_open() {
    let engine = Arc::new(MockEngine::new());
    let events = StoreOpenedEvents::new();
    let config = ManagerConfig {
        schemas_preload: true,
        ..Default::default()
    };
    let manager = PresentationManager::builder(engine.clone())
        .config(config)
        .store_opened_events(events.clone())
        .build()
        .await
        .unwrap();

    assert_eq!(events.notify(StoreKey::from("opened")), 1);
    tokio::time::timeout(Duration::from_secs(5), async {
        while engine.schema_loads().is_empty() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(engine.schema_loads(), vec![StoreKey::from("opened")]);

    manager.dispose();
    tokio::task::yield_now().await;
    tokio::time::timeout(Duration::from_secs(5), async {
        while events.listener_count() > 0 {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn active_unit_system_applies_to_requests() {
    let engine = Arc::new(MockEngine::new());
    engine.respond(RequestKind::GetRootNodesCount, "0");
    let manager = manager(&engine).await;
    manager.set_active_unit_system(Some(pres_types::UnitSystem::Imperial));
    let store = MemoryRecordStore::new("s");

    manager
        .get_nodes_count(&RequestOptions::new(&store, "rules"), None)
        .await
        .unwrap();
    manager
        .get_nodes_count(
            &RequestOptions::new(&store, "rules").with_unit_system(pres_types::UnitSystem::Metric),
            None,
        )
        .await
        .unwrap();

    let requests = engine.requests();
    assert_eq!(requests[0].envelope["params"]["unitSystem"], "imperial");
    assert_eq!(requests[1].envelope["params"]["unitSystem"], "metric");
    assert_eq!(manager.active_unit_system(), Some(pres_types::UnitSystem::Imperial));
}
