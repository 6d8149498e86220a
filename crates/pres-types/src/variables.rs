//! Typed ruleset variables
//!
//! Variables parameterize rule evaluation without changing ruleset content.
//! On the wire a variable is `{ "id": ..., "type": ..., "value": ... }`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::keys::EntityId;

/// Value type of a ruleset variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableValueType {
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "int64")]
    Int64,
    #[serde(rename = "int[]")]
    IntArray,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "id64")]
    Id,
    #[serde(rename = "id64[]")]
    IdArray,
}

impl VariableValueType {
    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int64 => "int64",
            Self::IntArray => "int[]",
            Self::String => "string",
            Self::Id => "id64",
            Self::IdArray => "id64[]",
        }
    }
}

impl fmt::Display for VariableValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableValueType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bool" => Ok(Self::Bool),
            "int" => Ok(Self::Int),
            "int64" => Ok(Self::Int64),
            "int[]" => Ok(Self::IntArray),
            "string" => Ok(Self::String),
            "id64" => Ok(Self::Id),
            "id64[]" => Ok(Self::IdArray),
            _ => Err(Error::InvalidVariableType {
                value: s.to_string(),
            }),
        }
    }
}

/// A typed variable value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum VariableValue {
    #[serde(rename = "bool")]
    Bool(bool),
    #[serde(rename = "int")]
    Int(i32),
    #[serde(rename = "int64")]
    Int64(i64),
    #[serde(rename = "int[]")]
    IntArray(Vec<i64>),
    #[serde(rename = "string")]
    String(String),
    #[serde(rename = "id64")]
    Id(EntityId),
    #[serde(rename = "id64[]")]
    IdArray(Vec<EntityId>),
}

impl VariableValue {
    /// The type of this value.
    pub fn value_type(&self) -> VariableValueType {
        match self {
            Self::Bool(_) => VariableValueType::Bool,
            Self::Int(_) => VariableValueType::Int,
            Self::Int64(_) => VariableValueType::Int64,
            Self::IntArray(_) => VariableValueType::IntArray,
            Self::String(_) => VariableValueType::String,
            Self::Id(_) => VariableValueType::Id,
            Self::IdArray(_) => VariableValueType::IdArray,
        }
    }

    /// Value reported for a variable of `value_type` that has not been set.
    pub fn default_for(value_type: VariableValueType) -> Self {
        match value_type {
            VariableValueType::Bool => Self::Bool(false),
            VariableValueType::Int => Self::Int(0),
            VariableValueType::Int64 => Self::Int64(0),
            VariableValueType::IntArray => Self::IntArray(Vec::new()),
            VariableValueType::String => Self::String(String::new()),
            VariableValueType::Id => Self::Id(EntityId::invalid()),
            VariableValueType::IdArray => Self::IdArray(Vec::new()),
        }
    }
}

/// A named, typed variable scoped to one ruleset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetVariable {
    /// Variable id, unique within its ruleset
    pub id: String,
    /// Typed value, serialized as sibling `type` and `value` members
    #[serde(flatten)]
    pub value: VariableValue,
}

impl RulesetVariable {
    /// Create a variable.
    pub fn new(id: impl Into<String>, value: VariableValue) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}
