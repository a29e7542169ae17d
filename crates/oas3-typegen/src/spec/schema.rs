use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A node that is either a `$ref` pointer or an inline object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectOrReference<T> {
  Ref {
    #[serde(rename = "$ref")]
    ref_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
  },
  Object(T),
}

impl<T> ObjectOrReference<T> {
  pub fn reference(ref_path: impl Into<String>) -> Self {
    Self::Ref {
      ref_path: ref_path.into(),
      summary: None,
      description: None,
    }
  }

  pub fn ref_path(&self) -> Option<&str> {
    match self {
      Self::Ref { ref_path, .. } => Some(ref_path),
      Self::Object(_) => None,
    }
  }

  pub fn as_object(&self) -> Option<&T> {
    match self {
      Self::Ref { .. } => None,
      Self::Object(object) => Some(object),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SchemaType {
  Boolean,
  Integer,
  Number,
  String,
  Array,
  Object,
  Null,
}

/// The `type` keyword: a single type, or a 3.1 type array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaTypeSet {
  Single(SchemaType),
  Multiple(Vec<SchemaType>),
}

impl SchemaTypeSet {
  pub fn contains(&self, schema_type: SchemaType) -> bool {
    match self {
      Self::Single(single) => *single == schema_type,
      Self::Multiple(types) => types.contains(&schema_type),
    }
  }

  pub fn types(&self) -> Vec<SchemaType> {
    match self {
      Self::Single(single) => vec![*single],
      Self::Multiple(types) => types.clone(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BooleanSchema(pub bool);

/// Positions that accept either a boolean schema or a schema object
/// (`items`, `additionalProperties`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schema {
  Boolean(BooleanSchema),
  Object(Box<ObjectOrReference<ObjectSchema>>),
}

impl Schema {
  pub fn as_schema(&self) -> Option<&ObjectOrReference<ObjectSchema>> {
    match self {
      Self::Boolean(_) => None,
      Self::Object(schema) => Some(schema),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
  pub property_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mapping: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSchema {
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub all_of: Vec<ObjectOrReference<ObjectSchema>>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub any_of: Vec<ObjectOrReference<ObjectSchema>>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub one_of: Vec<ObjectOrReference<ObjectSchema>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub not: Option<Box<ObjectOrReference<ObjectSchema>>>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub items: Option<Box<Schema>>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub properties: BTreeMap<String, ObjectOrReference<ObjectSchema>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub additional_properties: Option<Schema>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub required: Vec<String>,

  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub schema_type: Option<SchemaTypeSet>,
  #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
  pub enum_values: Vec<Value>,
  /// `Some(Value::Null)` when the document says `const: null`.
  #[serde(
    rename = "const",
    default,
    deserialize_with = "deserialize_present",
    skip_serializing_if = "Option::is_none"
  )]
  pub const_value: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub format: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub example: Option<Value>,

  /// OpenAPI 3.0 only; 3.1 expresses nullability through `type`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub nullable: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub read_only: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub write_only: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deprecated: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unique_items: Option<bool>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub minimum: Option<serde_json::Number>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub maximum: Option<serde_json::Number>,
  /// Boolean in 3.0, numeric bound in 3.1.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub exclusive_minimum: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub exclusive_maximum: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub multiple_of: Option<serde_json::Number>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_length: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_length: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pattern: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_items: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_items: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_properties: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_properties: Option<u64>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub discriminator: Option<Discriminator>,

  #[serde(flatten)]
  pub extensions: BTreeMap<String, Value>,
}

fn deserialize_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
  Value::deserialize(deserializer).map(Some)
}
