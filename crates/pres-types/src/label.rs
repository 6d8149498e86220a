//! Display label definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type name used for plain string labels
const STRING_TYPE_NAME: &str = "string";

/// A display label together with its raw value and value type.
///
/// The empty instance (all three members empty strings) is the well-defined
/// "no label available" value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDefinition {
    /// Formatted value shown to users
    pub display_value: String,
    /// Unformatted value
    pub raw_value: Value,
    /// Type of the raw value
    pub type_name: String,
}

impl LabelDefinition {
    /// The placeholder label: `{ displayValue: "", rawValue: "", typeName: "" }`.
    pub fn empty() -> Self {
        Self {
            display_value: String::new(),
            raw_value: Value::String(String::new()),
            type_name: String::new(),
        }
    }

    /// Create a plain string label.
    pub fn from_string(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            raw_value: Value::String(label.clone()),
            display_value: label,
            type_name: STRING_TYPE_NAME.to_string(),
        }
    }

    /// Check whether this is the placeholder label.
    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

impl Default for LabelDefinition {
    fn default() -> Self {
        Self::empty()
    }
}
