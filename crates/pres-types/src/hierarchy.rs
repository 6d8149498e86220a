//! Hierarchy edit scripts
//!
//! Comparing two hierarchy states yields an ordered list of
//! [`PartialHierarchyModification`]s. The order matters: the script is valid
//! only when replayed left to right against the previously rendered tree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::node::{Node, NodeKey};

/// One edit of a hierarchy, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PartialHierarchyModification {
    /// Insert `node` at `position` under `parent` (root level when absent)
    #[serde(rename_all = "camelCase")]
    Insert {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<NodeKey>,
        position: usize,
        node: Node,
    },

    /// Apply a partial node object to the node identified by `target`
    #[serde(rename_all = "camelCase")]
    Update {
        target: NodeKey,
        changes: Map<String, Value>,
    },

    /// Remove the node identified by `target` from `parent`
    #[serde(rename_all = "camelCase")]
    Delete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<NodeKey>,
        position: usize,
        target: NodeKey,
    },
}

/// Replay `modifications` against the children of `parent`.
///
/// Only edits addressed to this level are applied; inserts and deletes for
/// other parents and updates of nodes not present here are skipped. Edits
/// are applied strictly in order.
///
/// # Errors
///
/// Returns an error if an insert position is past the end of the level, a
/// deleted node is not found, or an update produces an invalid node.
pub fn apply_to_level(
    level: &mut Vec<Node>,
    parent: Option<&NodeKey>,
    modifications: &[PartialHierarchyModification],
) -> Result<()> {
    for modification in modifications {
        match modification {
            PartialHierarchyModification::Insert {
                parent: target_parent,
                position,
                node,
            } => {
                if target_parent.as_ref() != parent {
                    continue;
                }
                if *position > level.len() {
                    return Err(Error::ReplayOutOfBounds {
                        operation: "insert",
                        position: *position,
                        len: level.len(),
                    });
                }
                level.insert(*position, node.clone());
            }
            PartialHierarchyModification::Delete {
                parent: target_parent,
                position,
                target,
            } => {
                if target_parent.as_ref() != parent {
                    continue;
                }
                let index = level
                    .iter()
                    .position(|node| node.key == *target)
                    .ok_or(Error::ReplayOutOfBounds {
                        operation: "delete",
                        position: *position,
                        len: level.len(),
                    })?;
                level.remove(index);
            }
            PartialHierarchyModification::Update { target, changes } => {
                if let Some(node) = level.iter_mut().find(|node| node.key == *target) {
                    let mut merged = match serde_json::to_value(&*node)? {
                        Value::Object(map) => map,
                        _ => Map::new(),
                    };
                    for (name, value) in changes {
                        merged.insert(name.clone(), value.clone());
                    }
                    *node = serde_json::from_value(Value::Object(merged))?;
                }
            }
        }
    }
    Ok(())
}
