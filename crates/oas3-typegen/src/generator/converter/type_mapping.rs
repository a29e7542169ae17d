//! Primitive type table: `(type, format)` to a Rust type plus the import it needs.

use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::spec::SchemaType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleTypeSpec {
  #[serde(rename = "type")]
  pub type_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub import: Option<String>,
}

impl SimpleTypeSpec {
  pub fn new(type_name: impl Into<String>) -> Self {
    Self {
      type_name: type_name.into(),
      import: None,
    }
  }

  #[must_use]
  pub fn with_import(mut self, import: impl Into<String>) -> Self {
    self.import = Some(import.into());
    self
  }
}

/// Mapping for one base type: a default plus per-format entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatMapping {
  pub default: SimpleTypeSpec,
  #[serde(default)]
  pub formats: BTreeMap<String, SimpleTypeSpec>,
}

impl FormatMapping {
  fn new(default: SimpleTypeSpec) -> Self {
    Self {
      default,
      formats: BTreeMap::new(),
    }
  }

  #[must_use]
  fn format(mut self, format: &str, spec: SimpleTypeSpec) -> Self {
    self.formats.insert(format.to_string(), spec);
    self
  }

  fn lookup(&self, format: Option<&str>) -> &SimpleTypeSpec {
    format
      .and_then(|format| self.formats.get(format))
      .unwrap_or(&self.default)
  }

  fn apply(&mut self, overrides: &FormatMappingOverride) {
    if let Some(default) = &overrides.default {
      self.default = default.clone();
    }
    self
      .formats
      .extend(overrides.formats.iter().map(|(format, spec)| (format.clone(), spec.clone())));
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMapping {
  pub integer: FormatMapping,
  pub number: FormatMapping,
  pub boolean: FormatMapping,
  pub string: FormatMapping,
}

impl Default for TypeMapping {
  fn default() -> Self {
    let chrono = |name: &str| SimpleTypeSpec::new(format!("chrono::{name}")).with_import("chrono");

    Self {
      integer: FormatMapping::new(SimpleTypeSpec::new("i64"))
        .format("int8", SimpleTypeSpec::new("i8"))
        .format("int16", SimpleTypeSpec::new("i16"))
        .format("int32", SimpleTypeSpec::new("i32"))
        .format("int64", SimpleTypeSpec::new("i64"))
        .format("uint8", SimpleTypeSpec::new("u8"))
        .format("uint16", SimpleTypeSpec::new("u16"))
        .format("uint32", SimpleTypeSpec::new("u32"))
        .format("uint64", SimpleTypeSpec::new("u64")),
      number: FormatMapping::new(SimpleTypeSpec::new("f64"))
        .format("float", SimpleTypeSpec::new("f32"))
        .format("double", SimpleTypeSpec::new("f64")),
      boolean: FormatMapping::new(SimpleTypeSpec::new("bool")),
      string: FormatMapping::new(SimpleTypeSpec::new("String"))
        .format("byte", SimpleTypeSpec::new("Vec<u8>"))
        .format("binary", SimpleTypeSpec::new("Vec<u8>"))
        .format("date", chrono("NaiveDate"))
        .format("date-time", chrono("DateTime<chrono::Utc>"))
        .format("time", chrono("NaiveTime"))
        .format("uuid", SimpleTypeSpec::new("uuid::Uuid").with_import("uuid")),
    }
  }
}

impl TypeMapping {
  #[must_use]
  pub fn with_overrides(mut self, overrides: &TypeMappingOverrides) -> Self {
    self.integer.apply(&overrides.integer);
    self.number.apply(&overrides.number);
    self.boolean.apply(&overrides.boolean);
    self.string.apply(&overrides.string);
    self
  }

  /// `None` for the structural types (`array`, `object`, `null`).
  pub fn lookup(&self, schema_type: SchemaType, format: Option<&str>) -> Option<&SimpleTypeSpec> {
    let mapping = match schema_type {
      SchemaType::Integer => &self.integer,
      SchemaType::Number => &self.number,
      SchemaType::Boolean => &self.boolean,
      SchemaType::String => &self.string,
      SchemaType::Array | SchemaType::Object | SchemaType::Null => return None,
    };
    Some(mapping.lookup(format))
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatMappingOverride {
  pub default: Option<SimpleTypeSpec>,
  pub formats: BTreeMap<String, SimpleTypeSpec>,
}

impl FormatMappingOverride {
  fn is_empty(&self) -> bool {
    self.default.is_none() && self.formats.is_empty()
  }
}

/// Partial overrides layered over the built-in [`TypeMapping`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeMappingOverrides {
  #[serde(skip_serializing_if = "FormatMappingOverride::is_empty")]
  pub integer: FormatMappingOverride,
  #[serde(skip_serializing_if = "FormatMappingOverride::is_empty")]
  pub number: FormatMappingOverride,
  #[serde(skip_serializing_if = "FormatMappingOverride::is_empty")]
  pub boolean: FormatMappingOverride,
  #[serde(skip_serializing_if = "FormatMappingOverride::is_empty")]
  pub string: FormatMappingOverride,
}

impl TypeMappingOverrides {
  pub fn insert(&mut self, customization: TypeCustomization) {
    let target = match customization.schema_type {
      SchemaType::Integer => &mut self.integer,
      SchemaType::Number => &mut self.number,
      SchemaType::Boolean => &mut self.boolean,
      SchemaType::String => &mut self.string,
      SchemaType::Array | SchemaType::Object | SchemaType::Null => return,
    };
    match customization.format {
      Some(format) => {
        target.formats.insert(format, customization.spec);
      }
      None => target.default = Some(customization.spec),
    }
  }
}

/// One `type[.format]=path[@import]` override, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCustomization {
  pub schema_type: SchemaType,
  pub format: Option<String>,
  pub spec: SimpleTypeSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeCustomizationError {
  #[error("expected TYPE[.FORMAT]=RUST_TYPE, got '{0}'")]
  Syntax(String),
  #[error("'{0}' is not a primitive schema type (integer, number, boolean, string)")]
  NotPrimitive(String),
}

impl FromStr for TypeCustomization {
  type Err = TypeCustomizationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (key, target) = s
      .split_once('=')
      .filter(|(key, target)| !key.trim().is_empty() && !target.trim().is_empty())
      .ok_or_else(|| TypeCustomizationError::Syntax(s.to_string()))?;

    let (type_name, format) = match key.trim().split_once('.') {
      Some((type_name, format)) => (type_name.trim(), Some(format.trim().to_string())),
      None => (key.trim(), None),
    };
    let schema_type = match type_name {
      "integer" => SchemaType::Integer,
      "number" => SchemaType::Number,
      "boolean" => SchemaType::Boolean,
      "string" => SchemaType::String,
      other => return Err(TypeCustomizationError::NotPrimitive(other.to_string())),
    };

    let spec = match target.trim().split_once('@') {
      Some((type_path, import)) => SimpleTypeSpec::new(type_path.trim()).with_import(import.trim()),
      None => SimpleTypeSpec::new(target.trim()),
    };

    Ok(Self {
      schema_type,
      format,
      spec,
    })
  }
}
