//! Selection scope boundary

use async_trait::async_trait;
use pres_types::{EntityId, KeySet, SelectionScope};

use crate::Result;
use crate::store::RecordStore;

/// Turns picked record ids into the keys that end up selected.
///
/// Implementations decide which scopes exist; an id they do not offer is
/// rejected with [`Error::UnknownSelectionScope`](crate::Error::UnknownSelectionScope).
#[async_trait]
pub trait SelectionScopesProvider: Send + Sync {
    /// Scopes available for a store.
    async fn get_selection_scopes(
        &self,
        store: &dyn RecordStore,
        locale: Option<&str>,
    ) -> Result<Vec<SelectionScope>>;

    /// Keys selected when `ids` are picked with scope `scope_id`.
    async fn compute_selection(
        &self,
        store: &dyn RecordStore,
        ids: &[EntityId],
        scope_id: &str,
    ) -> Result<KeySet>;
}
