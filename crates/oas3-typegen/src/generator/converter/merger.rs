//! Folding of composed sibling schemas into one synthetic schema.
//!
//! Permissive where a union cannot change meaning (`enum`, `required`,
//! `properties`), strict everywhere else: a conflicting `type`, `format`,
//! default, boolean flag or additional-properties schema is an error.

use std::collections::BTreeSet;

use serde_json::Value;
use strum::Display;

use crate::{
  spec::{ObjectOrReference, ObjectSchema, Schema, SchemaType, SpecBundle},
  utils::RefError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "camelCase")]
pub enum MergeKind {
  AllOf,
  OneOf,
  AnyOf,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MergeError {
  #[error("incompatible types: {left} and {right}")]
  IncompatibleTypes { left: String, right: String },
  #[error("incompatible formats: '{left}' and '{right}'")]
  IncompatibleFormats { left: String, right: String },
  #[error("merging two sets of defaults is undefined ({left} and {right})")]
  ConflictingDefaults { left: Value, right: Value },
  #[error("'{flag}' differs between siblings")]
  FlagMismatch { flag: &'static str },
  #[error("'{bound}' differs between siblings ({left} and {right})")]
  ConflictingExclusiveBound {
    bound: &'static str,
    left: Value,
    right: Value,
  },
  #[error("both siblings define additionalProperties")]
  ConflictingAdditionalProperties,
  #[error("both siblings define different items")]
  ConflictingItems,
  #[error("discriminator is not allowed in a {0} merge")]
  DiscriminatorNotAllowed(MergeKind),
  #[error("allOf cycle through '{0}'")]
  CyclicAllOf(String),
  #[error(transparent)]
  Reference(#[from] RefError),
}

/// Merges `siblings` into one schema.
///
/// References are resolved through the bundle (from `from_document`), nested
/// `allOf` lists are flattened first, then the siblings are folded left to
/// right. A single sibling comes back resolved and flattened.
pub fn merge_schemas(
  bundle: &SpecBundle,
  siblings: &[ObjectOrReference<ObjectSchema>],
  kind: MergeKind,
  from_document: Option<&str>,
) -> Result<ObjectSchema, MergeError> {
  let mut flat = Vec::with_capacity(siblings.len());
  let mut stack = BTreeSet::new();
  for sibling in siblings {
    flatten(bundle, sibling, from_document, &mut stack, &mut flat)?;
  }

  let mut schemas = flat.into_iter();
  let Some(first) = schemas.next() else {
    return Ok(ObjectSchema::default());
  };
  if kind != MergeKind::AllOf && first.discriminator.is_some() {
    return Err(MergeError::DiscriminatorNotAllowed(kind));
  }

  schemas.try_fold(first, |acc, next| {
    tracing::trace!(%kind, "merging sibling schema");
    merge_pair(acc, next, kind)
  })
}

/// Resolves `node` and appends it, preceded by its own `allOf` members, to `out`.
fn flatten(
  bundle: &SpecBundle,
  node: &ObjectOrReference<ObjectSchema>,
  from_document: Option<&str>,
  stack: &mut BTreeSet<String>,
  out: &mut Vec<ObjectSchema>,
) -> Result<(), MergeError> {
  let resolved = bundle.resolve_schema(node, from_document)?;
  let key = resolved.ref_path.as_ref().map(|ref_path| {
    let document = resolved.document.as_deref().unwrap_or_default();
    format!("{document}|{ref_path}")
  });

  if let Some(key) = &key
    && !stack.insert(key.clone())
  {
    return Err(MergeError::CyclicAllOf(node.ref_path().unwrap_or_default().to_string()));
  }

  let mut schema = resolved.schema;
  let nested = std::mem::take(&mut schema.all_of);
  for member in &nested {
    flatten(bundle, member, resolved.document.as_deref(), stack, out)?;
  }
  out.push(schema);

  if let Some(key) = &key {
    stack.remove(key);
  }
  Ok(())
}

fn merge_pair(mut acc: ObjectSchema, next: ObjectSchema, kind: MergeKind) -> Result<ObjectSchema, MergeError> {
  acc.schema_type = match (acc.schema_type.take(), next.schema_type) {
    (Some(left), Some(right)) => {
      let (left_types, right_types) = (normalized(&left.types()), normalized(&right.types()));
      if left_types != right_types {
        return Err(MergeError::IncompatibleTypes {
          left: describe(&left_types),
          right: describe(&right_types),
        });
      }
      Some(left)
    }
    (left, right) => left.or(right),
  };

  acc.format = match (acc.format.take(), next.format) {
    (Some(left), Some(right)) if left != right => return Err(MergeError::IncompatibleFormats { left, right }),
    (left, right) => left.or(right),
  };

  for value in next.enum_values {
    if !acc.enum_values.contains(&value) {
      acc.enum_values.push(value);
    }
  }
  if acc.const_value.is_none() {
    acc.const_value = next.const_value;
  }

  acc.default = match (acc.default.take(), next.default) {
    (Some(left), Some(right)) if left != right => return Err(MergeError::ConflictingDefaults { left, right }),
    (left, right) => left.or(right),
  };

  acc.unique_items = agree("uniqueItems", acc.unique_items, next.unique_items)?;
  acc.nullable = agree("nullable", acc.nullable, next.nullable)?;
  acc.read_only = agree("readOnly", acc.read_only, next.read_only)?;
  acc.write_only = agree("writeOnly", acc.write_only, next.write_only)?;
  acc.exclusive_minimum = exclusive_bound("exclusiveMinimum", acc.exclusive_minimum, next.exclusive_minimum)?;
  acc.exclusive_maximum = exclusive_bound("exclusiveMaximum", acc.exclusive_maximum, next.exclusive_maximum)?;

  for name in next.required {
    if !acc.required.contains(&name) {
      acc.required.push(name);
    }
  }
  acc.properties.extend(next.properties);

  acc.additional_properties = match (acc.additional_properties.take(), next.additional_properties) {
    (Some(Schema::Object(_)), Some(Schema::Object(_))) => return Err(MergeError::ConflictingAdditionalProperties),
    (Some(Schema::Boolean(left)), Some(Schema::Boolean(right))) if left != right => {
      return Err(MergeError::ConflictingAdditionalProperties);
    }
    (left, right) => left.or(right),
  };

  acc.items = match (acc.items.take(), next.items) {
    (Some(left), Some(right)) if left != right => return Err(MergeError::ConflictingItems),
    (left, right) => left.or(right),
  };

  if next.discriminator.is_some() && kind != MergeKind::AllOf {
    return Err(MergeError::DiscriminatorNotAllowed(kind));
  }
  if acc.discriminator.is_none() {
    acc.discriminator = next.discriminator;
  }

  acc.one_of.extend(next.one_of);
  acc.any_of.extend(next.any_of);
  if acc.not.is_none() {
    acc.not = next.not;
  }

  macro_rules! first_defined {
    ($($field:ident),+ $(,)?) => {
      $(if acc.$field.is_none() {
        acc.$field = next.$field;
      })+
    };
  }
  first_defined!(
    title,
    description,
    example,
    deprecated,
    minimum,
    maximum,
    multiple_of,
    min_length,
    max_length,
    pattern,
    min_items,
    max_items,
    min_properties,
    max_properties,
  );

  acc.extensions.extend(next.extensions);

  Ok(acc)
}

/// Sorted types with `null` kept, so `[string, null]` and `[null, string]` agree.
fn normalized(types: &[SchemaType]) -> Vec<SchemaType> {
  let set: BTreeSet<SchemaType> = types.iter().copied().collect();
  set.into_iter().collect()
}

fn describe(types: &[SchemaType]) -> String {
  types.iter().map(ToString::to_string).collect::<Vec<_>>().join("|")
}

/// Boolean keywords must agree; an absent keyword reads as `false`.
fn agree(flag: &'static str, left: Option<bool>, right: Option<bool>) -> Result<Option<bool>, MergeError> {
  if left.unwrap_or(false) != right.unwrap_or(false) {
    return Err(MergeError::FlagMismatch { flag });
  }
  Ok(left.or(right))
}

/// 3.0 boolean bounds must agree (absent reads as `false`); 3.1 numeric bounds
/// may be one-sided, but two different numbers conflict.
fn exclusive_bound(
  bound: &'static str,
  left: Option<Value>,
  right: Option<Value>,
) -> Result<Option<Value>, MergeError> {
  let conflict = |left: Value, right: Value| MergeError::ConflictingExclusiveBound { bound, left, right };

  match (left, right) {
    (None, None) => Ok(None),
    (Some(Value::Bool(left)), None) | (None, Some(Value::Bool(left))) => {
      if left {
        Err(conflict(Value::Bool(true), Value::Bool(false)))
      } else {
        Ok(Some(Value::Bool(false)))
      }
    }
    (Some(Value::Bool(left)), Some(Value::Bool(right))) => {
      if left == right {
        Ok(Some(Value::Bool(left)))
      } else {
        Err(conflict(Value::Bool(left), Value::Bool(right)))
      }
    }
    (Some(number @ Value::Number(_)), None) | (None, Some(number @ Value::Number(_))) => Ok(Some(number)),
    (Some(left), Some(right)) if left == right => Ok(Some(left)),
    (Some(left), Some(right)) => Err(conflict(left, right)),
    (Some(other), None) | (None, Some(other)) => Ok(Some(other)),
  }
}
