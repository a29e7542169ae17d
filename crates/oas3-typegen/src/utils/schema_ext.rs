use serde_json::Value;

use crate::spec::{ObjectSchema, SchemaType, SchemaTypeSet};

/// Extension methods for `ObjectSchema` to query its type properties conveniently.
pub trait SchemaExt {
  /// All declared types, empty when `type` is absent.
  fn declared_types(&self) -> Vec<SchemaType>;

  /// Returns true if `type` is present and includes `schema_type`.
  fn has_type(&self, schema_type: SchemaType) -> bool;

  /// Returns the single `SchemaType` if exactly one is defined, None otherwise.
  fn single_type(&self) -> Option<SchemaType>;

  /// Returns the non-null type from a two-type nullable set (e.g., `[string, null]` -> `string`).
  fn non_null_type(&self) -> Option<SchemaType>;

  /// Returns true if the schema is explicitly the null type.
  fn is_null(&self) -> bool;

  /// `oneOf` or `anyOf` present.
  fn has_union(&self) -> bool;

  /// `allOf` present.
  fn has_intersection(&self) -> bool;

  /// True for `{}` and schemas carrying only annotations.
  fn is_unconstrained(&self) -> bool;

  /// Enum values with any `null` entry removed; `const` counts as a one-value enum.
  fn non_null_enum_values(&self) -> Vec<Value>;
}

impl SchemaExt for ObjectSchema {
  fn declared_types(&self) -> Vec<SchemaType> {
    self.schema_type.as_ref().map(SchemaTypeSet::types).unwrap_or_default()
  }

  fn has_type(&self, schema_type: SchemaType) -> bool {
    self
      .schema_type
      .as_ref()
      .is_some_and(|types| types.contains(schema_type))
  }

  fn single_type(&self) -> Option<SchemaType> {
    match self.schema_type.as_ref()? {
      SchemaTypeSet::Single(single) => Some(*single),
      SchemaTypeSet::Multiple(types) if types.len() == 1 => types.first().copied(),
      SchemaTypeSet::Multiple(_) => None,
    }
  }

  fn non_null_type(&self) -> Option<SchemaType> {
    match self.schema_type.as_ref()? {
      SchemaTypeSet::Multiple(types) if types.len() == 2 && types.contains(&SchemaType::Null) => {
        types.iter().find(|t| **t != SchemaType::Null).copied()
      }
      _ => None,
    }
  }

  fn is_null(&self) -> bool {
    self.single_type() == Some(SchemaType::Null)
  }

  fn has_union(&self) -> bool {
    !self.one_of.is_empty() || !self.any_of.is_empty()
  }

  fn has_intersection(&self) -> bool {
    !self.all_of.is_empty()
  }

  fn is_unconstrained(&self) -> bool {
    self.schema_type.is_none()
      && self.enum_values.is_empty()
      && self.const_value.is_none()
      && self.properties.is_empty()
      && self.additional_properties.is_none()
      && self.items.is_none()
      && self.not.is_none()
      && !self.has_union()
      && !self.has_intersection()
  }

  fn non_null_enum_values(&self) -> Vec<Value> {
    self
      .enum_values
      .iter()
      .chain(self.const_value.iter())
      .filter(|value| !value.is_null())
      .cloned()
      .collect()
  }
}

/// Absent boolean keywords read as `false`.
pub fn flag(value: Option<bool>) -> bool {
  value.unwrap_or(false)
}
