//! Request parameter objects
//!
//! Each engine request kind takes its own parameter object. Ruleset-scoped
//! requests share [`CommonParams`], flattened into the object.

use pres_types::{
    ContentFlags, DescriptorOverrides, EntityKey, FieldDescriptor, KeySet, NodeKey, PageOptions,
    RulesetVariable, SelectionInfo, UnitSystem,
};
use serde::Serialize;

/// Parameters shared by every ruleset-scoped request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonParams {
    pub ruleset_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_system: Option<UnitSystem>,
    pub ruleset_variables: Vec<RulesetVariable>,
}

/// `GetRootNodes`, `GetChildren` and their count counterparts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodesParams {
    #[serde(flatten)]
    pub common: CommonParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_key: Option<NodeKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<PageOptions>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredNodePathsParams {
    #[serde(flatten)]
    pub common: CommonParams,
    pub filter_text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePathsParams {
    #[serde(flatten)]
    pub common: CommonParams,
    /// Each path lists the keys from a root down to a target node
    pub paths: Vec<Vec<EntityKey>>,
    pub marked_index: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDescriptorParams {
    #[serde(flatten)]
    pub common: CommonParams,
    pub display_type: String,
    pub keys: KeySet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_flags: Option<ContentFlags>,
}

/// `GetContent` and `GetContentSetSize`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentParams {
    #[serde(flatten)]
    pub common: CommonParams,
    pub descriptor_overrides: DescriptorOverrides,
    pub keys: KeySet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<PageOptions>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistinctValuesParams {
    #[serde(flatten)]
    pub common: CommonParams,
    pub descriptor_overrides: DescriptorOverrides,
    pub keys: KeySet,
    pub field_name: String,
    /// 0 means no limit
    pub maximum_value_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedDistinctValuesParams {
    #[serde(flatten)]
    pub common: CommonParams,
    pub descriptor_overrides: DescriptorOverrides,
    pub keys: KeySet,
    pub field_descriptor: FieldDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<PageOptions>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayLabelParams {
    pub key: EntityKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_system: Option<UnitSystem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareHierarchiesParams {
    pub prev_ruleset_id: String,
    pub curr_ruleset_id: String,
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_ruleset_variables: Option<Vec<RulesetVariable>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curr_ruleset_variables: Option<Vec<RulesetVariable>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded_node_keys: Option<Vec<NodeKey>>,
}
