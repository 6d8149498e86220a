//! Hierarchy comparison
//!
//! Compares the hierarchy a caller has (built with one ruleset state) against
//! the hierarchy the current state produces and returns the edits that turn
//! one into the other.

use std::collections::{BTreeMap, BTreeSet};

use pres_engine::RequestKind;
use pres_types::{PartialHierarchyModification, RulesetVariable, VariableValue};

use crate::dispatcher::RequestDispatcher;
use crate::options::HierarchyCompareOptions;
use crate::params::CompareHierarchiesParams;
use crate::rulesets::RulesetManager;
use crate::{Error, Result};

/// Builds and sends `CompareHierarchies` requests
pub struct HierarchyComparator<'a> {
    rulesets: &'a RulesetManager,
    dispatcher: &'a RequestDispatcher,
}

impl<'a> HierarchyComparator<'a> {
    pub fn new(rulesets: &'a RulesetManager, dispatcher: &'a RequestDispatcher) -> Self {
        Self {
            rulesets,
            dispatcher,
        }
    }

    /// Compare two hierarchy states.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RulesetMismatch`] without contacting the engine when
    /// the two states declare different rulesets.
    pub async fn compare(
        &self,
        options: &HierarchyCompareOptions<'_>,
        active_locale: Option<String>,
    ) -> Result<Vec<PartialHierarchyModification>> {
        let params = self.build_params(options, active_locale).await?;
        let modifications: Vec<PartialHierarchyModification> = self
            .dispatcher
            .send_typed(options.store.key(), RequestKind::CompareHierarchies, &params)
            .await?;
        tracing::debug!(
            ruleset = %options.curr.ruleset.declared_id(),
            changes = modifications.len(),
            "Compared hierarchies"
        );
        Ok(modifications)
    }

    async fn build_params(
        &self,
        options: &HierarchyCompareOptions<'_>,
        active_locale: Option<String>,
    ) -> Result<CompareHierarchiesParams> {
        let prev_id = options.prev.ruleset.declared_id();
        let curr_id = options.curr.ruleset.declared_id();
        if prev_id != curr_id {
            return Err(Error::RulesetMismatch {
                prev: prev_id.to_string(),
                curr: curr_id.to_string(),
            });
        }

        let prev_ruleset_id = self.rulesets.resolve_id(&options.prev.ruleset).await?;
        let curr_ruleset_id = self.rulesets.resolve_id(&options.curr.ruleset).await?;

        let (prev_ruleset_variables, curr_ruleset_variables) =
            if options.prev.variables.is_some() || options.curr.variables.is_some() {
                let (prev, curr) = changed_variables(
                    options.prev.variables.as_deref().unwrap_or_default(),
                    options.curr.variables.as_deref().unwrap_or_default(),
                );
                (Some(prev), Some(curr))
            } else {
                (None, None)
            };

        Ok(CompareHierarchiesParams {
            prev_ruleset_id,
            curr_ruleset_id,
            locale: options.locale.clone().or(active_locale).unwrap_or_default(),
            prev_ruleset_variables,
            curr_ruleset_variables,
            expanded_node_keys: options.expanded_node_keys.clone(),
        })
    }
}

/// Variables of each side whose value differs from the other side.
///
/// A variable is included when it was added, removed or changed; variables
/// equal on both sides are dropped.
pub fn changed_variables(
    prev: &[RulesetVariable],
    curr: &[RulesetVariable],
) -> (Vec<RulesetVariable>, Vec<RulesetVariable>) {
    let prev_map: BTreeMap<&str, &VariableValue> =
        prev.iter().map(|v| (v.id.as_str(), &v.value)).collect();
    let curr_map: BTreeMap<&str, &VariableValue> =
        curr.iter().map(|v| (v.id.as_str(), &v.value)).collect();

    let changed: BTreeSet<&str> = prev_map
        .keys()
        .chain(curr_map.keys())
        .copied()
        .filter(|id| prev_map.get(id) != curr_map.get(id))
        .collect();

    let restrict = |map: &BTreeMap<&str, &VariableValue>| -> Vec<RulesetVariable> {
        map.iter()
            .filter(|(id, _)| changed.contains(*id))
            .map(|(id, value)| RulesetVariable::new(*id, (*value).clone()))
            .collect()
    };

    (restrict(&prev_map), restrict(&curr_map))
}
