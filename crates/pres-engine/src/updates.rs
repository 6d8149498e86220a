//! Update notifications reported by the engine
//!
//! In read-write sessions the engine accumulates information about which
//! hierarchies and content became stale. The payload is keyed by store, then
//! by ruleset id:
//!
//! ```json
//! {
//!   "briefcase-1": {
//!     "my-ruleset": { "hierarchy": "FULL", "content": "FULL" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use pres_store::StoreKey;
use pres_types::PartialHierarchyModification;
use serde::{Deserialize, Serialize};

/// Marker for "everything changed, reload"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FullUpdate {
    #[serde(rename = "FULL")]
    Full,
}

/// Hierarchy part of an update: full reload or an edit script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HierarchyUpdateInfo {
    Full(FullUpdate),
    Partial(Vec<PartialHierarchyModification>),
}

/// Content part of an update
pub type ContentUpdateInfo = FullUpdate;

/// Update information for one ruleset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RulesetUpdateInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy: Option<HierarchyUpdateInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentUpdateInfo>,
}

/// Update information keyed by store, then ruleset id
pub type UpdateInfo = BTreeMap<StoreKey, BTreeMap<String, RulesetUpdateInfo>>;

/// Updates affecting one record store
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEvent {
    pub store: StoreKey,
    pub rulesets: BTreeMap<String, RulesetUpdateInfo>,
}

/// Decode an update payload into per-store events.
///
/// Stores with no ruleset entries produce no event.
pub fn parse_update_info(json: &str) -> serde_json::Result<Vec<UpdateEvent>> {
    let info: UpdateInfo = serde_json::from_str(json)?;
    Ok(info
        .into_iter()
        .filter(|(_, rulesets)| !rulesets.is_empty())
        .map(|(store, rulesets)| UpdateEvent { store, rulesets })
        .collect())
}
