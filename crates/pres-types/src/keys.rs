//! Entity identity and key sets
//!
//! An [`EntityKey`] names one record by class and id. A [`KeySet`] collects
//! entity keys and hierarchy node keys; duplicates collapse by structural
//! identity and iteration order is deterministic (sorted), which keeps
//! serialized requests stable.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::NodeKey;

/// Opaque identifier of one record within a record-store session.
///
/// Identifiers are usually hexadecimal strings such as `0x1c`; `"0"` is the
/// invalid identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// String form of the invalid identifier
    pub const INVALID: &'static str = "0";

    /// Create an identifier from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The invalid identifier (`"0"`).
    pub fn invalid() -> Self {
        Self(Self::INVALID.to_string())
    }

    /// Check whether this identifier refers to a record.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && self.0 != Self::INVALID
    }

    /// Get the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::invalid()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identity of one record: its full class name (`Schema:Class`) and id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityKey {
    /// Full class name in `Schema:Class` form
    pub class_name: String,
    /// Record identifier
    pub id: EntityId,
}

impl EntityKey {
    /// Create a key from a class name and an id.
    pub fn new(class_name: impl Into<String>, id: impl Into<EntityId>) -> Self {
        Self {
            class_name: class_name.into(),
            id: id.into(),
        }
    }

    /// The schema part of the class name, if the name is qualified.
    pub fn schema_name(&self) -> Option<&str> {
        self.class_name.split_once(':').map(|(schema, _)| schema)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class_name, self.id)
    }
}

/// De-duplicated collection of entity keys and node keys.
///
/// # Example
///
/// ```
/// use pres_types::{EntityKey, KeySet};
///
/// let mut keys = KeySet::new();
/// keys.add_entity_key(EntityKey::new("BisCore:Element", "0x1"));
/// keys.add_entity_key(EntityKey::new("BisCore:Element", "0x1"));
/// assert_eq!(keys.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySet {
    #[serde(default)]
    instance_keys: BTreeSet<EntityKey>,
    #[serde(default)]
    node_keys: BTreeSet<NodeKey>,
}

impl KeySet {
    /// Create an empty key set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a key set from entity keys and node keys.
    pub fn from_parts(
        entity_keys: impl IntoIterator<Item = EntityKey>,
        node_keys: impl IntoIterator<Item = NodeKey>,
    ) -> Self {
        Self {
            instance_keys: entity_keys.into_iter().collect(),
            node_keys: node_keys.into_iter().collect(),
        }
    }

    /// Add an entity key. Returns false if an identical key was present.
    pub fn add_entity_key(&mut self, key: EntityKey) -> bool {
        self.instance_keys.insert(key)
    }

    /// Add a node key. Returns false if an identical key was present.
    pub fn add_node_key(&mut self, key: NodeKey) -> bool {
        self.node_keys.insert(key)
    }

    /// Iterate entity keys in sorted order.
    pub fn entity_keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.instance_keys.iter()
    }

    /// Iterate node keys in sorted order.
    pub fn node_keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.node_keys.iter()
    }

    /// Check whether an entity key is part of the set.
    pub fn contains_entity_key(&self, key: &EntityKey) -> bool {
        self.instance_keys.contains(key)
    }

    /// Check whether a node key is part of the set.
    pub fn contains_node_key(&self, key: &NodeKey) -> bool {
        self.node_keys.contains(key)
    }

    /// Total number of keys of both kinds.
    pub fn len(&self) -> usize {
        self.instance_keys.len() + self.node_keys.len()
    }

    /// Check whether the set holds no keys at all.
    pub fn is_empty(&self) -> bool {
        self.instance_keys.is_empty() && self.node_keys.is_empty()
    }

    /// Split the set into its entity keys and node keys.
    pub fn into_parts(self) -> (Vec<EntityKey>, Vec<NodeKey>) {
        (
            self.instance_keys.into_iter().collect(),
            self.node_keys.into_iter().collect(),
        )
    }
}

impl FromIterator<EntityKey> for KeySet {
    fn from_iter<I: IntoIterator<Item = EntityKey>>(iter: I) -> Self {
        Self::from_parts(iter, std::iter::empty())
    }
}

impl Extend<EntityKey> for KeySet {
    fn extend<I: IntoIterator<Item = EntityKey>>(&mut self, iter: I) {
        self.instance_keys.extend(iter);
    }
}

impl Extend<NodeKey> for KeySet {
    fn extend<I: IntoIterator<Item = NodeKey>>(&mut self, iter: I) {
        self.node_keys.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_entity_id_validity() {
        assert!(EntityId::new("0x1c").is_valid());
        assert!(!EntityId::invalid().is_valid());
        assert!(!EntityId::new("").is_valid());
    }

    #[test]
    fn test_entity_key_schema_name() {
        let key = EntityKey::new("BisCore:Element", "0x1");
        assert_eq!(key.schema_name(), Some("BisCore"));
        assert_eq!(EntityKey::new("Element", "0x1").schema_name(), None);
    }

    #[test]
    fn test_key_set_collapses_duplicates() {
        let keys: KeySet = vec![
            EntityKey::new("A:B", "0x2"),
            EntityKey::new("A:B", "0x1"),
            EntityKey::new("A:B", "0x2"),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_key_set_serializes_sorted() {
        let keys: KeySet = vec![EntityKey::new("A:B", "0x2"), EntityKey::new("A:B", "0x1")]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&keys).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "instanceKeys": [
                    {"className": "A:B", "id": "0x1"},
                    {"className": "A:B", "id": "0x2"}
                ],
                "nodeKeys": []
            })
        );
    }

    #[test]
    fn test_key_set_deserializes_with_missing_parts() {
        let keys: KeySet = serde_json::from_str(r#"{"instanceKeys":[{"className":"A:B","id":"0x1"}]}"#).unwrap();
        assert!(keys.contains_entity_key(&EntityKey::new("A:B", "0x1")));
        assert_eq!(keys.node_keys().count(), 0);
    }

    #[test]
    fn test_key_set_node_keys_by_structure() {
        let mut keys = KeySet::new();
        let key = NodeKey::Generic {
            node_type: "root".to_string(),
            path_from_root: vec!["a".to_string()],
        };
        assert!(keys.add_node_key(key.clone()));
        assert!(!keys.add_node_key(key.clone()));
        assert!(keys.contains_node_key(&key));
    }
}
