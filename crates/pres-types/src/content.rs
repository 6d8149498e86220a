//! Content descriptors, fields and content sets
//!
//! A [`Descriptor`] describes the shape of content the engine computes for a
//! key set: display type, fields and flags. Requests never carry the full
//! descriptor; it is reduced to [`DescriptorOverrides`] first.

use std::collections::HashMap;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::keys::EntityKey;
use crate::label::LabelDefinition;

/// Well-known content display types
pub mod display_types {
    pub const UNDEFINED: &str = "Undefined";
    pub const GRID: &str = "Grid";
    pub const PROPERTY_PANE: &str = "PropertyPane";
    pub const LIST: &str = "List";
    pub const GRAPHICS: &str = "Graphics";
}

/// Bit set of flags controlling content computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentFlags(u32);

impl ContentFlags {
    pub const NONE: ContentFlags = ContentFlags(0);
    /// Only primary keys of content items
    pub const KEYS_ONLY: ContentFlags = ContentFlags(1);
    pub const SHOW_IMAGES: ContentFlags = ContentFlags(2);
    /// Compute item labels
    pub const SHOW_LABELS: ContentFlags = ContentFlags(4);
    pub const MERGE_RESULTS: ContentFlags = ContentFlags(8);
    pub const DISTINCT_VALUES: ContentFlags = ContentFlags(16);
    /// Skip field computation
    pub const NO_FIELDS: ContentFlags = ContentFlags(32);
    pub const INCLUDE_INPUT_KEYS: ContentFlags = ContentFlags(256);
    pub const DESCRIPTOR_ONLY: ContentFlags = ContentFlags(512);

    /// Create flags from raw bits.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Check whether all flags of `other` are set.
    pub fn contains(&self, other: ContentFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ContentFlags {
    type Output = ContentFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        ContentFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ContentFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Where a content request originated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionInfo {
    pub provider_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

/// Shape of a field value.
///
/// Tagged by `valueFormat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "valueFormat")]
pub enum TypeDescription {
    #[serde(rename_all = "camelCase")]
    Primitive { type_name: String },
    #[serde(rename_all = "camelCase")]
    Array {
        type_name: String,
        member_type: Box<TypeDescription>,
    },
    #[serde(rename_all = "camelCase")]
    Struct {
        type_name: String,
        members: Vec<StructMember>,
    },
}

impl TypeDescription {
    /// Name of the described type.
    pub fn type_name(&self) -> &str {
        match self {
            TypeDescription::Primitive { type_name }
            | TypeDescription::Array { type_name, .. }
            | TypeDescription::Struct { type_name, .. } => type_name,
        }
    }
}

/// Member of a struct type description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructMember {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub type_description: TypeDescription,
}

/// Property backing a properties field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    pub class_name: String,
    pub name: String,
    pub type_name: String,
}

/// Field not backed by a property (calculated, display label, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub type_description: TypeDescription,
    #[serde(default)]
    pub is_readonly: bool,
    #[serde(default)]
    pub priority: i32,
}

/// Field backed by one or more similar properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertiesField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub type_description: TypeDescription,
    #[serde(default)]
    pub is_readonly: bool,
    #[serde(default)]
    pub priority: i32,
    pub properties: Vec<PropertyInfo>,
}

/// Field holding content of related records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedContentField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub type_description: TypeDescription,
    #[serde(default)]
    pub is_readonly: bool,
    #[serde(default)]
    pub priority: i32,
    /// Class of the related records
    pub content_class_name: String,
    pub nested_fields: Vec<Field>,
}

/// A content field, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Field {
    Simple(SimpleField),
    Properties(PropertiesField),
    NestedContent(NestedContentField),
}

impl Field {
    /// Unique field name within its descriptor level.
    pub fn name(&self) -> &str {
        match self {
            Field::Simple(field) => &field.name,
            Field::Properties(field) => &field.name,
            Field::NestedContent(field) => &field.name,
        }
    }

    /// Display label.
    pub fn label(&self) -> &str {
        match self {
            Field::Simple(field) => &field.label,
            Field::Properties(field) => &field.label,
            Field::NestedContent(field) => &field.label,
        }
    }

    /// Value shape.
    pub fn type_description(&self) -> &TypeDescription {
        match self {
            Field::Simple(field) => &field.type_description,
            Field::Properties(field) => &field.type_description,
            Field::NestedContent(field) => &field.type_description,
        }
    }

    /// Nested fields of a nested content field; empty otherwise.
    pub fn nested_fields(&self) -> &[Field] {
        match self {
            Field::NestedContent(field) => &field.nested_fields,
            _ => &[],
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Content sorting instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sorting {
    pub field_name: String,
    pub direction: SortDirection,
}

/// Full content-shape descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub display_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_info: Option<SelectionInfo>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub content_flags: ContentFlags,
    /// Names of fields the caller chose to hide
    #[serde(default)]
    pub hidden_field_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorting: Option<Sorting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
}

impl Descriptor {
    /// Reduce the descriptor to the overrides sent with content requests.
    pub fn create_descriptor_overrides(&self) -> DescriptorOverrides {
        DescriptorOverrides {
            display_type: self.display_type.clone(),
            content_flags: self.content_flags,
            hidden_field_names: self.hidden_field_names.clone(),
            sorting: self.sorting.clone(),
            filter_expression: self.filter_expression.clone(),
        }
    }

    /// Find a field by name, optionally descending into nested content fields.
    pub fn field_by_name(&self, name: &str, recurse: bool) -> Option<&Field> {
        find_field(&self.fields, name, recurse)
    }
}

fn find_field<'a>(fields: &'a [Field], name: &str, recurse: bool) -> Option<&'a Field> {
    for field in fields {
        if field.name() == name {
            return Some(field);
        }
        if recurse && let Some(found) = find_field(field.nested_fields(), name, recurse) {
            return Some(found);
        }
    }
    None
}

/// Reduced descriptor carried by content requests
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorOverrides {
    pub display_type: String,
    #[serde(default)]
    pub content_flags: ContentFlags,
    #[serde(default)]
    pub hidden_field_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorting: Option<Sorting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
}

impl DescriptorOverrides {
    /// Overrides with only a display type and flags.
    pub fn new(display_type: impl Into<String>, content_flags: ContentFlags) -> Self {
        Self {
            display_type: display_type.into(),
            content_flags,
            ..Default::default()
        }
    }
}

/// Either a full descriptor or its reduced form
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorOrOverrides {
    Descriptor(Box<Descriptor>),
    Overrides(DescriptorOverrides),
}

impl DescriptorOrOverrides {
    /// The overrides to dispatch.
    pub fn to_overrides(&self) -> DescriptorOverrides {
        match self {
            DescriptorOrOverrides::Descriptor(descriptor) => {
                descriptor.create_descriptor_overrides()
            }
            DescriptorOrOverrides::Overrides(overrides) => overrides.clone(),
        }
    }
}

impl From<Descriptor> for DescriptorOrOverrides {
    fn from(value: Descriptor) -> Self {
        DescriptorOrOverrides::Descriptor(Box::new(value))
    }
}

impl From<DescriptorOverrides> for DescriptorOrOverrides {
    fn from(value: DescriptorOverrides) -> Self {
        DescriptorOrOverrides::Overrides(value)
    }
}

/// Class of a content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub label: String,
}

/// One row of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Records this item was created from
    #[serde(default)]
    pub primary_keys: Vec<EntityKey>,
    #[serde(default)]
    pub label: LabelDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_info: Option<ClassInfo>,
    #[serde(default)]
    pub values: HashMap<String, Value>,
    #[serde(default)]
    pub display_values: HashMap<String, Value>,
    #[serde(default)]
    pub merged_field_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_data: Option<Map<String, Value>>,
}

/// Descriptor plus the content set it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub descriptor: Descriptor,
    #[serde(default)]
    pub content_set: Vec<Item>,
}

/// Reference to a property by class and name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRef {
    pub class_name: String,
    pub name: String,
}

/// Reference to a field, used by distinct-value requests.
///
/// A non-empty `parent` names the nested content field the referenced field
/// lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldDescriptor {
    #[serde(rename_all = "camelCase")]
    Name {
        field_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Properties {
        properties: Vec<PropertyRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<String>,
    },
}

impl FieldDescriptor {
    /// Parent nested content field name, if any.
    pub fn parent(&self) -> Option<&str> {
        match self {
            FieldDescriptor::Name { parent, .. } | FieldDescriptor::Properties { parent, .. } => {
                parent.as_deref()
            }
        }
    }

    /// Check whether the field lives inside a nested content field.
    pub fn is_nested(&self) -> bool {
        self.parent().is_some_and(|parent| !parent.is_empty())
    }
}

/// Distinct display value with the raw values that format to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayValueGroup {
    pub display_value: Value,
    #[serde(default)]
    pub grouped_raw_values: Vec<Value>,
}
