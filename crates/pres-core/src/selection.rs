//! Element selection scopes
//!
//! The default [`SelectionScopesProvider`]: scopes over the element parent
//! hierarchy. `element` selects the picked element, `assembly` its parent
//! and `top-assembly` its topmost ancestor.

use async_trait::async_trait;
use pres_store::{QueryValue, RecordStore, SelectionScopesProvider};
use pres_types::{EntityId, EntityKey, KeySet, SelectionScope};

use crate::resolver::{CONCRETE_CLASS_QUERY, DEFAULT_ABSTRACT_CLASS};

/// Query selecting the parent id of an element
pub const PARENT_QUERY: &str = "SELECT Parent.Id FROM bis.Element WHERE ECInstanceId = ?";

/// Parent chains longer than this are treated as cycles
const MAX_ASSEMBLY_DEPTH: usize = 1000;

const SCOPES: [(&str, &str, &str); 3] = [
    ("element", "Element", "Select the picked element"),
    ("assembly", "Assembly", "Select the parent of the picked element"),
    ("top-assembly", "Top Assembly", "Select the topmost parent of the picked element"),
];

/// Selection scopes over the element parent hierarchy
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementSelectionScopes;

impl ElementSelectionScopes {
    pub fn new() -> Self {
        Self
    }

    async fn text_of(
        store: &dyn RecordStore,
        sql: &str,
        id: &EntityId,
    ) -> pres_store::Result<Option<String>> {
        let row = store.query_row(sql, &[QueryValue::Id(id.clone())]).await?;
        Ok(row.as_ref().and_then(|row| row.get_str(0)).map(str::to_string))
    }

    async fn parent_of(store: &dyn RecordStore, id: &EntityId) -> pres_store::Result<Option<EntityId>> {
        Ok(Self::text_of(store, PARENT_QUERY, id)
            .await?
            .map(EntityId::new)
            .filter(EntityId::is_valid))
    }

    async fn top_assembly_of(store: &dyn RecordStore, id: &EntityId) -> pres_store::Result<EntityId> {
        let mut current = id.clone();
        for _ in 0..MAX_ASSEMBLY_DEPTH {
            match Self::parent_of(store, &current).await? {
                Some(parent) => current = parent,
                None => return Ok(current),
            }
        }
        tracing::warn!(id = %id, "Parent chain too deep, stopping at last parent");
        Ok(current)
    }

    async fn element_key(store: &dyn RecordStore, id: EntityId) -> pres_store::Result<EntityKey> {
        let class_name = Self::text_of(store, CONCRETE_CLASS_QUERY, &id)
            .await?
            .unwrap_or_else(|| DEFAULT_ABSTRACT_CLASS.to_string());
        Ok(EntityKey::new(class_name, id))
    }
}

#[async_trait]
impl SelectionScopesProvider for ElementSelectionScopes {
    async fn get_selection_scopes(
        &self,
        _store: &dyn RecordStore,
        _locale: Option<&str>,
    ) -> pres_store::Result<Vec<SelectionScope>> {
        Ok(SCOPES
            .iter()
            .map(|(id, label, description)| {
                let mut scope = SelectionScope::new(*id, *label);
                scope.description = Some(description.to_string());
                scope
            })
            .collect())
    }

    async fn compute_selection(
        &self,
        store: &dyn RecordStore,
        ids: &[EntityId],
        scope_id: &str,
    ) -> pres_store::Result<KeySet> {
        if !SCOPES.iter().any(|(id, _, _)| *id == scope_id) {
            return Err(pres_store::Error::UnknownSelectionScope {
                id: scope_id.to_string(),
            });
        }

        let mut keys = KeySet::new();
        for id in ids.iter().filter(|id| id.is_valid()) {
            let selected = match scope_id {
                "assembly" => Self::parent_of(store, id).await?.unwrap_or_else(|| id.clone()),
                "top-assembly" => Self::top_assembly_of(store, id).await?,
                _ => id.clone(),
            };
            keys.add_entity_key(Self::element_key(store, selected).await?);
        }
        Ok(keys)
    }
}
