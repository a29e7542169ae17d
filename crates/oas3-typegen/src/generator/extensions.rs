//! Typed view over the `x-` extensions the generator honours.
//!
//! Extensions are read once per node into [`ExtensionOverrides`]; a present
//! extension of the wrong JSON type is a hard error.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::{generator::errors::GeneratorError, spec::DocumentPath};

pub const RUST_NAME: &str = "x-rust-name";
pub const RUST_TYPE: &str = "x-rust-type";
pub const RUST_TYPE_IMPORT: &str = "x-rust-type-import";
pub const RUST_SKIP_OPTIONAL: &str = "x-rust-skip-optional";
pub const RUST_FIELD_NAME: &str = "x-rust-field-name";
pub const ENUM_VARIANT_NAMES: &str = "x-enum-varnames";
pub const DEPRECATED_REASON: &str = "x-deprecated-reason";

/// Replaces the generated type with an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeOverride {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub import: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionOverrides {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub renamed_to: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub type_override: Option<TypeOverride>,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub skip_optional_wrap: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field_name: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub enum_variant_names: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub deprecated_reason: Option<String>,
}

impl ExtensionOverrides {
  pub fn extract(extensions: &BTreeMap<String, Value>, path: &DocumentPath) -> Result<Self, GeneratorError> {
    let reader = ExtensionReader { extensions, path };

    let type_name = reader.string(RUST_TYPE)?;
    let import = reader.string(RUST_TYPE_IMPORT)?;
    if import.is_some() && type_name.is_none() {
      return Err(reader.invalid(RUST_TYPE_IMPORT, format!("requires '{RUST_TYPE}'")));
    }

    Ok(Self {
      renamed_to: reader.string(RUST_NAME)?,
      type_override: type_name.map(|name| TypeOverride { name, import }),
      skip_optional_wrap: reader.boolean(RUST_SKIP_OPTIONAL)?.unwrap_or(false),
      field_name: reader.string(RUST_FIELD_NAME)?,
      enum_variant_names: reader.strings(ENUM_VARIANT_NAMES)?.unwrap_or_default(),
      deprecated_reason: reader.string(DEPRECATED_REASON)?,
    })
  }

  pub fn is_empty(&self) -> bool {
    *self == Self::default()
  }
}

struct ExtensionReader<'a> {
  extensions: &'a BTreeMap<String, Value>,
  path: &'a DocumentPath,
}

impl ExtensionReader<'_> {
  fn invalid(&self, key: &str, message: impl Into<String>) -> GeneratorError {
    GeneratorError::Extension {
      path: self.path.to_string(),
      key: key.to_string(),
      message: message.into(),
    }
  }

  fn string(&self, key: &str) -> Result<Option<String>, GeneratorError> {
    match self.extensions.get(key) {
      None => Ok(None),
      Some(Value::String(value)) if !value.trim().is_empty() => Ok(Some(value.trim().to_string())),
      Some(_) => Err(self.invalid(key, "must be a non-empty string")),
    }
  }

  fn boolean(&self, key: &str) -> Result<Option<bool>, GeneratorError> {
    match self.extensions.get(key) {
      None => Ok(None),
      Some(Value::Bool(value)) => Ok(Some(*value)),
      Some(_) => Err(self.invalid(key, "must be a boolean")),
    }
  }

  fn strings(&self, key: &str) -> Result<Option<Vec<String>>, GeneratorError> {
    match self.extensions.get(key) {
      None => Ok(None),
      Some(Value::Array(items)) => items
        .iter()
        .map(|item| {
          item
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| self.invalid(key, "must be an array of strings"))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some),
      Some(_) => Err(self.invalid(key, "must be an array of strings")),
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn extensions(value: Value) -> BTreeMap<String, Value> {
    serde_json::from_value(value).unwrap()
  }

  fn path() -> DocumentPath {
    DocumentPath::new(["components", "schemas", "Pet"])
  }

  #[test]
  fn test_extract_all_overrides() {
    let overrides = ExtensionOverrides::extract(
      &extensions(json!({
        "x-rust-name": "Animal",
        "x-rust-type": "chrono::Duration",
        "x-rust-type-import": "chrono",
        "x-rust-skip-optional": true,
        "x-rust-field-name": "kind",
        "x-enum-varnames": ["Low", "High"],
        "x-deprecated-reason": "use v2",
        "x-unrelated": 42
      })),
      &path(),
    )
    .unwrap();

    assert_eq!(overrides.renamed_to.as_deref(), Some("Animal"));
    assert_eq!(
      overrides.type_override,
      Some(TypeOverride {
        name: "chrono::Duration".to_string(),
        import: Some("chrono".to_string()),
      })
    );
    assert!(overrides.skip_optional_wrap);
    assert_eq!(overrides.field_name.as_deref(), Some("kind"));
    assert_eq!(overrides.enum_variant_names, vec!["Low", "High"]);
    assert_eq!(overrides.deprecated_reason.as_deref(), Some("use v2"));
  }

  #[test]
  fn test_no_extensions_is_empty() {
    let overrides = ExtensionOverrides::extract(&BTreeMap::new(), &path()).unwrap();
    assert!(overrides.is_empty());
  }

  #[test]
  fn test_wrong_types_are_errors() {
    let cases = [
      json!({"x-rust-skip-optional": "yes"}),
      json!({"x-rust-name": 7}),
      json!({"x-rust-name": "  "}),
      json!({"x-enum-varnames": ["A", 1]}),
      json!({"x-rust-type-import": "chrono"}),
    ];

    for case in cases {
      let result = ExtensionOverrides::extract(&extensions(case.clone()), &path());
      let Err(GeneratorError::Extension { path, .. }) = result else {
        panic!("expected extension error for {case}");
      };
      assert_eq!(path, "components/schemas/Pet");
    }
  }
}
