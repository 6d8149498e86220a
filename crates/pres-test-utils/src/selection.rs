//! Fixed selection scope provider.

use std::sync::Mutex;

use async_trait::async_trait;
use pres_store::{Error, RecordStore, Result, SelectionScopesProvider};
use pres_types::{EntityId, EntityKey, KeySet, SelectionScope};

/// Offers a fixed list of scopes; every scope selects the picked ids as
/// `BisCore:Element` keys.
#[derive(Debug, Default)]
pub struct StaticSelectionScopes {
    scopes: Vec<SelectionScope>,
    calls: Mutex<Vec<String>>,
}

impl StaticSelectionScopes {
    pub fn new(scopes: Vec<SelectionScope>) -> Self {
        Self {
            scopes,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Scope ids passed to `compute_selection`, in call order.
    pub fn computed_scopes(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl SelectionScopesProvider for StaticSelectionScopes {
    async fn get_selection_scopes(
        &self,
        _store: &dyn RecordStore,
        _locale: Option<&str>,
    ) -> Result<Vec<SelectionScope>> {
        Ok(self.scopes.clone())
    }

    async fn compute_selection(
        &self,
        _store: &dyn RecordStore,
        ids: &[EntityId],
        scope_id: &str,
    ) -> Result<KeySet> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(scope_id.to_string());
        if !self.scopes.iter().any(|scope| scope.id == scope_id) {
            return Err(Error::UnknownSelectionScope {
                id: scope_id.to_string(),
            });
        }
        Ok(ids
            .iter()
            .map(|id| EntityKey::new("BisCore:Element", id.clone()))
            .collect())
    }
}
