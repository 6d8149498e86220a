//! Per-request options

use pres_store::RecordStore;
use pres_types::{NodeKey, RulesetOrId, RulesetVariable, UnitSystem};

/// Options shared by ruleset-scoped requests.
///
/// `locale` and `unit_system` fall back to the manager's active values when
/// not set here.
#[derive(Clone)]
pub struct RequestOptions<'a> {
    pub store: &'a dyn RecordStore,
    pub ruleset: RulesetOrId,
    pub locale: Option<String>,
    pub unit_system: Option<UnitSystem>,
    /// Override the stored variables of the ruleset for this request only
    pub variables: Vec<RulesetVariable>,
}

impl<'a> RequestOptions<'a> {
    pub fn new(store: &'a dyn RecordStore, ruleset: impl Into<RulesetOrId>) -> Self {
        Self {
            store,
            ruleset: ruleset.into(),
            locale: None,
            unit_system: None,
            variables: Vec::new(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_unit_system(mut self, unit_system: UnitSystem) -> Self {
        self.unit_system = Some(unit_system);
        self
    }

    pub fn with_variable(mut self, variable: RulesetVariable) -> Self {
        self.variables.push(variable);
        self
    }
}

/// Options for requests that are not scoped to a caller ruleset
#[derive(Clone)]
pub struct StoreRequestOptions<'a> {
    pub store: &'a dyn RecordStore,
    pub locale: Option<String>,
    pub unit_system: Option<UnitSystem>,
}

impl<'a> StoreRequestOptions<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            locale: None,
            unit_system: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_unit_system(mut self, unit_system: UnitSystem) -> Self {
        self.unit_system = Some(unit_system);
        self
    }
}

/// Ruleset and variables a hierarchy was (or is) built with
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyState {
    pub ruleset: RulesetOrId,
    /// `None` when the caller does not track variables for this state
    pub variables: Option<Vec<RulesetVariable>>,
}

impl HierarchyState {
    pub fn new(ruleset: impl Into<RulesetOrId>) -> Self {
        Self {
            ruleset: ruleset.into(),
            variables: None,
        }
    }

    pub fn with_variables(mut self, variables: Vec<RulesetVariable>) -> Self {
        self.variables = Some(variables);
        self
    }
}

/// Options of a hierarchy comparison
#[derive(Clone)]
pub struct HierarchyCompareOptions<'a> {
    pub store: &'a dyn RecordStore,
    pub prev: HierarchyState,
    pub curr: HierarchyState,
    pub locale: Option<String>,
    /// Nodes expanded in the caller's tree; their children are compared too
    pub expanded_node_keys: Option<Vec<NodeKey>>,
}

impl<'a> HierarchyCompareOptions<'a> {
    pub fn new(store: &'a dyn RecordStore, prev: HierarchyState, curr: HierarchyState) -> Self {
        Self {
            store,
            prev,
            curr,
            locale: None,
            expanded_node_keys: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_expanded_node_keys(mut self, keys: Vec<NodeKey>) -> Self {
        self.expanded_node_keys = Some(keys);
        self
    }
}
