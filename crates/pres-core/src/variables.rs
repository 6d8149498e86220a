//! Ruleset variables
//!
//! Variables are local state. They reach the engine only as the
//! `rulesetVariables` parameter of requests for the ruleset they belong to.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use pres_types::{RulesetVariable, VariableValue, VariableValueType};

type VariableMap = BTreeMap<String, VariableValue>;

/// Variable values of every ruleset, keyed by ruleset id
#[derive(Debug, Default)]
pub struct RulesetVariablesManager {
    values: RwLock<HashMap<String, VariableMap>>,
}

impl RulesetVariablesManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable. The last write wins.
    pub fn set(&self, ruleset_id: &str, variable_id: &str, value: VariableValue) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values
            .entry(ruleset_id.to_string())
            .or_default()
            .insert(variable_id.to_string(), value);
    }

    /// Get a variable as `value_type`.
    ///
    /// Unset variables, and variables stored with a different type, read as
    /// the default for `value_type`.
    pub fn get(
        &self,
        ruleset_id: &str,
        variable_id: &str,
        value_type: VariableValueType,
    ) -> VariableValue {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values
            .get(ruleset_id)
            .and_then(|vars| vars.get(variable_id))
            .filter(|value| value.value_type() == value_type)
            .cloned()
            .unwrap_or_else(|| VariableValue::default_for(value_type))
    }

    /// Remove a variable. Returns whether it was set.
    pub fn unset(&self, ruleset_id: &str, variable_id: &str) -> bool {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        let Some(vars) = values.get_mut(ruleset_id) else {
            return false;
        };
        let removed = vars.remove(variable_id).is_some();
        if vars.is_empty() {
            values.remove(ruleset_id);
        }
        removed
    }

    /// All variables of a ruleset, ordered by variable id.
    pub fn variables(&self, ruleset_id: &str) -> Vec<RulesetVariable> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values
            .get(ruleset_id)
            .map(|vars| {
                vars.iter()
                    .map(|(id, value)| RulesetVariable::new(id.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Variables to send with a request: the stored variables of the ruleset
    /// overridden by the request's own variables with the same id.
    pub fn request_variables(
        &self,
        ruleset_id: &str,
        overrides: &[RulesetVariable],
    ) -> Vec<RulesetVariable> {
        let mut merged: VariableMap = {
            let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
            values.get(ruleset_id).cloned().unwrap_or_default()
        };
        for variable in overrides {
            merged.insert(variable.id.clone(), variable.value.clone());
        }
        merged
            .into_iter()
            .map(|(id, value)| RulesetVariable::new(id, value))
            .collect()
    }

    /// A view of one ruleset's variables.
    pub fn scoped(&self, ruleset_id: impl Into<String>) -> RulesetVariables<'_> {
        RulesetVariables {
            manager: self,
            ruleset_id: ruleset_id.into(),
        }
    }
}

/// Variables of a single ruleset
#[derive(Debug)]
pub struct RulesetVariables<'a> {
    manager: &'a RulesetVariablesManager,
    ruleset_id: String,
}

impl RulesetVariables<'_> {
    pub fn ruleset_id(&self) -> &str {
        &self.ruleset_id
    }

    pub fn set(&self, variable_id: &str, value: VariableValue) {
        self.manager.set(&self.ruleset_id, variable_id, value);
    }

    pub fn get(&self, variable_id: &str, value_type: VariableValueType) -> VariableValue {
        self.manager.get(&self.ruleset_id, variable_id, value_type)
    }

    pub fn unset(&self, variable_id: &str) -> bool {
        self.manager.unset(&self.ruleset_id, variable_id)
    }

    pub fn all(&self) -> Vec<RulesetVariable> {
        self.manager.variables(&self.ruleset_id)
    }
}
