//! Element key resolution
//!
//! Callers often only know the abstract base class of a record
//! (`BisCore:Element`). Rules match on concrete classes, so such keys are
//! rewritten to the record's concrete class before a request is dispatched.

use std::collections::BTreeSet;

use pres_store::{QueryValue, RecordStore};
use pres_types::{EntityKey, KeySet};

use crate::Result;

/// Abstract class resolved by default
pub const DEFAULT_ABSTRACT_CLASS: &str = "BisCore:Element";

/// Query selecting the concrete class name of an element by id
pub const CONCRETE_CLASS_QUERY: &str =
    "SELECT ec_classname(ECClassId, 's:c') FROM bis.Element WHERE ECInstanceId = ?";

/// Rewrites abstract-class entity keys to concrete-class keys
#[derive(Debug, Clone)]
pub struct ElementKeyResolver {
    abstract_classes: BTreeSet<String>,
}

impl ElementKeyResolver {
    /// Resolver for [`DEFAULT_ABSTRACT_CLASS`].
    pub fn new() -> Self {
        Self::with_classes([DEFAULT_ABSTRACT_CLASS])
    }

    /// Resolver for a custom set of abstract classes.
    pub fn with_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            abstract_classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether keys of `class_name` need resolving.
    pub fn is_abstract(&self, class_name: &str) -> bool {
        self.abstract_classes.contains(class_name)
    }

    /// Resolve a single key.
    ///
    /// Keys of concrete classes are returned as-is without querying. A key the
    /// store has no row for is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Store`] when the query fails.
    pub async fn resolve_key(&self, store: &dyn RecordStore, key: &EntityKey) -> Result<EntityKey> {
        if !self.is_abstract(&key.class_name) {
            return Ok(key.clone());
        }

        let row = store
            .query_row(CONCRETE_CLASS_QUERY, &[QueryValue::Id(key.id.clone())])
            .await?;

        match row.as_ref().and_then(|row| row.get_str(0)) {
            Some(class_name) => Ok(EntityKey::new(class_name, key.id.clone())),
            None => {
                tracing::debug!(store = %store.key(), key = %key, "No concrete class found, passing key through");
                Ok(key.clone())
            }
        }
    }

    /// Resolve keys in order.
    pub async fn resolve_all(
        &self,
        store: &dyn RecordStore,
        keys: &[EntityKey],
    ) -> Result<Vec<EntityKey>> {
        let mut resolved = Vec::with_capacity(keys.len());
        for key in keys {
            resolved.push(self.resolve_key(store, key).await?);
        }
        Ok(resolved)
    }

    /// Resolve the entity keys of a key set. Node keys are kept unchanged.
    pub async fn resolve_key_set(&self, store: &dyn RecordStore, keys: &KeySet) -> Result<KeySet> {
        if !keys.entity_keys().any(|key| self.is_abstract(&key.class_name)) {
            return Ok(keys.clone());
        }

        let (entity_keys, node_keys) = keys.clone().into_parts();
        let entity_keys = self.resolve_all(store, &entity_keys).await?;
        Ok(KeySet::from_parts(entity_keys, node_keys))
    }
}

impl Default for ElementKeyResolver {
    fn default() -> Self {
        Self::new()
    }
}
