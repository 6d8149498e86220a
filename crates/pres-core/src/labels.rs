//! Display label reconciliation
//!
//! Labels for many keys are fetched as content: a list of items with labels
//! and no fields. The engine returns items in its own order and skips keys
//! it has nothing for, so results are matched back to the requested keys.

use std::collections::HashMap;

use pres_types::{Content, EntityKey, LabelDefinition};

/// Ruleset the engine ships for label requests
pub const DISPLAY_LABEL_RULESET_ID: &str = "RulesDrivenECPresentationManager_RulesetId_DisplayLabel";

/// Keys per label content request
pub const LABEL_BATCH_SIZE: usize = 1000;

/// Labels for `keys`, in the same order.
///
/// Keys without a matching content item get the empty label, as does every
/// key when there is no content at all.
pub fn reconcile_labels(keys: &[EntityKey], content: Option<&Content>) -> Vec<LabelDefinition> {
    let Some(content) = content else {
        return vec![LabelDefinition::empty(); keys.len()];
    };

    let mut index: HashMap<&EntityKey, &LabelDefinition> = HashMap::new();
    for item in &content.content_set {
        for key in &item.primary_keys {
            index.entry(key).or_insert(&item.label);
        }
    }

    keys.iter()
        .map(|key| {
            index
                .get(key)
                .map(|label| (*label).clone())
                .unwrap_or_else(LabelDefinition::empty)
        })
        .collect()
}
