//! Value types for the presentation orchestration layer
//!
//! Everything a caller hands to, or receives from, the presentation manager
//! lives here: entity and node identity, rulesets and their variables,
//! content descriptors, hierarchy edit scripts and label definitions.
//!
//! All types serialize to the camelCase JSON shapes the native engine
//! expects, and polymorphic payloads (node keys, fields, type descriptions,
//! hierarchy modifications) are tagged enums decoded exhaustively.

pub mod content;
pub mod error;
pub mod hierarchy;
pub mod keys;
pub mod label;
pub mod node;
pub mod paging;
pub mod ruleset;
pub mod selection;
pub mod units;
pub mod variables;

pub use content::{
    ClassInfo, Content, ContentFlags, Descriptor, DescriptorOrOverrides, DescriptorOverrides,
    DisplayValueGroup, Field, FieldDescriptor, Item, NestedContentField, PropertiesField,
    PropertyInfo, PropertyRef, SelectionInfo, SimpleField, SortDirection, Sorting, StructMember,
    TypeDescription, display_types,
};
pub use error::{Error, Result};
pub use hierarchy::{PartialHierarchyModification, apply_to_level};
pub use keys::{EntityId, EntityKey, KeySet};
pub use label::LabelDefinition;
pub use node::{FilteringData, Node, NodeKey, NodePathElement};
pub use paging::{PageOptions, PagedResponse};
pub use ruleset::{Ruleset, RulesetOrId};
pub use selection::SelectionScope;
pub use units::UnitSystem;
pub use variables::{RulesetVariable, VariableValue, VariableValueType};
