//! Ruleset definitions
//!
//! A ruleset is a named JSON document driving rule evaluation. Its identity
//! for dispatch is the hash of its content, not its declared id, so two
//! rulesets with identical rules collapse to a single registration.
//!
//! # Example JSON
//!
//! ```json
//! {
//!   "id": "my-hierarchy",
//!   "rules": [
//!     { "ruleType": "RootNodes", "specifications": [] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Ruleset content with its declared id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Declared ruleset id
    pub id: String,
    /// Everything except the id
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

impl Ruleset {
    /// Create a ruleset from an id and a content object.
    ///
    /// A stray `id` member inside `content` is dropped; the declared id is
    /// always the `id` argument.
    pub fn new(id: impl Into<String>, mut content: Map<String, Value>) -> Self {
        content.remove("id");
        Self {
            id: id.into(),
            content,
        }
    }

    /// Parse a ruleset from its JSON document.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Hash of the ruleset content, excluding the declared id.
    ///
    /// Object keys are sorted at every level before hashing, so the hash
    /// does not depend on member order even when `serde_json` keeps
    /// insertion order. The result has the form `sha256:<hex>`.
    pub fn content_hash(&self) -> String {
        let canonical = canonicalize(&Value::Object(self.content.clone())).to_string();
        format!("sha256:{:x}", Sha256::digest(canonical.as_bytes()))
    }

    /// Serialize the full ruleset document for the engine.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Rebuild `value` with object members inserted in key order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(sorted.into_iter().map(|(k, v)| (k.clone(), v)).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Either a full ruleset or the id of one
#[derive(Debug, Clone, PartialEq)]
pub enum RulesetOrId {
    /// Ruleset content supplied by the caller
    Ruleset(Ruleset),
    /// Id of a registered ruleset or of one found in ruleset directories
    Id(String),
}

impl RulesetOrId {
    /// The declared ruleset id.
    pub fn declared_id(&self) -> &str {
        match self {
            RulesetOrId::Ruleset(ruleset) => &ruleset.id,
            RulesetOrId::Id(id) => id,
        }
    }
}

impl From<Ruleset> for RulesetOrId {
    fn from(value: Ruleset) -> Self {
        RulesetOrId::Ruleset(value)
    }
}

impl From<&str> for RulesetOrId {
    fn from(value: &str) -> Self {
        RulesetOrId::Id(value.to_string())
    }
}

impl From<String> for RulesetOrId {
    fn from(value: String) -> Self {
        RulesetOrId::Id(value)
    }
}
