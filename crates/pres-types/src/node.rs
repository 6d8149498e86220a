//! Hierarchy nodes and node keys

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::keys::EntityKey;
use crate::label::LabelDefinition;

/// Structural identity of a hierarchy node.
///
/// Two keys are equal only when every structural component matches;
/// display labels never take part in identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKey {
    /// Node produced by a custom node rule
    #[serde(rename_all = "camelCase")]
    Generic {
        node_type: String,
        path_from_root: Vec<String>,
    },

    /// Node representing one or more records
    #[serde(rename_all = "camelCase")]
    Instances {
        instance_keys: Vec<EntityKey>,
        path_from_root: Vec<String>,
    },

    /// Node grouping records by class
    #[serde(rename_all = "camelCase")]
    ClassGrouping {
        class_name: String,
        grouped_instances_count: u64,
        path_from_root: Vec<String>,
    },

    /// Node grouping records by a property value
    #[serde(rename_all = "camelCase")]
    PropertyGrouping {
        class_name: String,
        property_name: String,
        grouping_values: Vec<String>,
        grouped_instances_count: u64,
        path_from_root: Vec<String>,
    },

    /// Node grouping records by display label
    #[serde(rename_all = "camelCase")]
    LabelGrouping {
        label: String,
        grouped_instances_count: u64,
        path_from_root: Vec<String>,
    },
}

impl NodeKey {
    /// Hash path from the hierarchy root to this node.
    pub fn path_from_root(&self) -> &[String] {
        match self {
            NodeKey::Generic { path_from_root, .. }
            | NodeKey::Instances { path_from_root, .. }
            | NodeKey::ClassGrouping { path_from_root, .. }
            | NodeKey::PropertyGrouping { path_from_root, .. }
            | NodeKey::LabelGrouping { path_from_root, .. } => path_from_root,
        }
    }

    /// Entity keys carried by an instances node; empty for other kinds.
    pub fn instance_keys(&self) -> &[EntityKey] {
        match self {
            NodeKey::Instances { instance_keys, .. } => instance_keys,
            _ => &[],
        }
    }

    /// Check whether this is one of the grouping node kinds.
    pub fn is_grouping(&self) -> bool {
        matches!(
            self,
            NodeKey::ClassGrouping { .. }
                | NodeKey::PropertyGrouping { .. }
                | NodeKey::LabelGrouping { .. }
        )
    }

    /// Number of records grouped under a grouping node.
    pub fn grouped_instances_count(&self) -> Option<u64> {
        match self {
            NodeKey::ClassGrouping {
                grouped_instances_count,
                ..
            }
            | NodeKey::PropertyGrouping {
                grouped_instances_count,
                ..
            }
            | NodeKey::LabelGrouping {
                grouped_instances_count,
                ..
            } => Some(*grouped_instances_count),
            _ => None,
        }
    }
}

/// One hierarchy node as returned by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Structural identity
    pub key: NodeKey,
    /// Display label
    #[serde(default)]
    pub label: LabelDefinition,
    /// Optional description (tooltip)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the node has (or may have) children
    #[serde(default)]
    pub has_children: bool,
    /// Whether the node should be rendered expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
    /// Rule-supplied extra data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_data: Option<Map<String, Value>>,
}

/// Match counters for filtered node paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteringData {
    /// Matches in this node's own label
    pub matches_count: u64,
    /// Matches in the node's descendants
    pub children_matches_count: u64,
}

/// One element of a node path tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePathElement {
    pub node: Node,
    pub index: usize,
    #[serde(default)]
    pub is_marked: bool,
    #[serde(default)]
    pub children: Vec<NodePathElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtering_data: Option<FilteringData>,
}
