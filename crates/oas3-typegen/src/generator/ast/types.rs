use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};
use serde_json::Value;
use strum::Display;

/// Rust primitive and standard library types
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RustPrimitive {
  I8,
  I16,
  I32,
  I64,
  I128,
  Isize,
  U8,
  U16,
  U32,
  U64,
  U128,
  Usize,
  F32,
  F64,
  Bool,
  #[default]
  String,
  Bytes,
  Date,
  DateTime,
  Time,
  Duration,
  Uuid,
  Value,
  Unit,
  Custom(String),
}

impl RustPrimitive {
  pub fn as_str(&self) -> &str {
    match self {
      Self::I8 => "i8",
      Self::I16 => "i16",
      Self::I32 => "i32",
      Self::I64 => "i64",
      Self::I128 => "i128",
      Self::Isize => "isize",
      Self::U8 => "u8",
      Self::U16 => "u16",
      Self::U32 => "u32",
      Self::U64 => "u64",
      Self::U128 => "u128",
      Self::Usize => "usize",
      Self::F32 => "f32",
      Self::F64 => "f64",
      Self::Bool => "bool",
      Self::String => "String",
      Self::Bytes => "Vec<u8>",
      Self::Date => "chrono::NaiveDate",
      Self::DateTime => "chrono::DateTime<chrono::Utc>",
      Self::Time => "chrono::NaiveTime",
      Self::Duration => "chrono::Duration",
      Self::Uuid => "uuid::Uuid",
      Self::Value => "serde_json::Value",
      Self::Unit => "()",
      Self::Custom(name) => name,
    }
  }

  pub fn is_float(&self) -> bool {
    matches!(self, RustPrimitive::F32 | RustPrimitive::F64)
  }

  pub fn is_integer(&self) -> bool {
    matches!(
      self,
      RustPrimitive::I8
        | RustPrimitive::I16
        | RustPrimitive::I32
        | RustPrimitive::I64
        | RustPrimitive::I128
        | RustPrimitive::Isize
        | RustPrimitive::U8
        | RustPrimitive::U16
        | RustPrimitive::U32
        | RustPrimitive::U64
        | RustPrimitive::U128
        | RustPrimitive::Usize
    )
  }
}

impl std::fmt::Display for RustPrimitive {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for RustPrimitive {
  type Err = std::convert::Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s {
      "i8" => RustPrimitive::I8,
      "i16" => RustPrimitive::I16,
      "i32" => RustPrimitive::I32,
      "i64" => RustPrimitive::I64,
      "i128" => RustPrimitive::I128,
      "isize" => RustPrimitive::Isize,
      "u8" => RustPrimitive::U8,
      "u16" => RustPrimitive::U16,
      "u32" => RustPrimitive::U32,
      "u64" => RustPrimitive::U64,
      "u128" => RustPrimitive::U128,
      "usize" => RustPrimitive::Usize,
      "f32" => RustPrimitive::F32,
      "f64" => RustPrimitive::F64,
      "bool" => RustPrimitive::Bool,
      "String" => RustPrimitive::String,
      "Vec<u8>" => RustPrimitive::Bytes,
      "chrono::NaiveDate" => RustPrimitive::Date,
      "chrono::DateTime<chrono::Utc>" => RustPrimitive::DateTime,
      "chrono::NaiveTime" => RustPrimitive::Time,
      "chrono::Duration" => RustPrimitive::Duration,
      "uuid::Uuid" => RustPrimitive::Uuid,
      "serde_json::Value" => RustPrimitive::Value,
      "()" => RustPrimitive::Unit,
      custom => RustPrimitive::Custom(custom.to_string()),
    })
  }
}

impl From<&str> for RustPrimitive {
  fn from(s: &str) -> Self {
    match s.parse() {
      Ok(primitive) => primitive,
      Err(infallible) => match infallible {},
    }
  }
}

impl Serialize for RustPrimitive {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum UnionKind {
  OneOf,
  AnyOf,
}

/// Shape of a translated schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "of", rename_all = "kebab-case")]
pub enum TypeKind {
  Primitive(RustPrimitive),
  /// Named type; the name is in [`TypeDescriptor::ref_type`].
  Reference,
  Array(Box<TypeDescriptor>),
  /// Open map from string keys to the inner type.
  Map(Box<TypeDescriptor>),
  Struct,
  Union {
    kind: UnionKind,
    variants: Vec<TypeDescriptor>,
  },
  Any,
}

impl TypeKind {
  pub const fn label(&self) -> &'static str {
    match self {
      Self::Primitive(_) => "primitive",
      Self::Reference => "reference",
      Self::Array(_) => "array",
      Self::Map(_) => "map",
      Self::Struct => "struct",
      Self::Union { .. } => "union",
      Self::Any => "any",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscriminatorDescriptor {
  pub property_name: String,
  /// Discriminator value to the resolved type name of the variant.
  pub mapping: BTreeMap<String, String>,
}

/// Emitter-facing description of one schema.
///
/// When `ref_type` is set the descriptor stands for that named type and
/// consumers render the name instead of the structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDescriptor {
  #[serde(flatten)]
  pub kind: TypeKind,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ref_type: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub properties: Vec<Property>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub additional_properties: Option<Box<TypeDescriptor>>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub enum_values: Vec<Value>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub enum_variant_names: Vec<String>,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub nullable: bool,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub skip_optional_wrap: bool,
  #[serde(skip_serializing_if = "BTreeSet::is_empty")]
  pub imports: BTreeSet<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub discriminator: Option<DiscriminatorDescriptor>,
}

impl TypeDescriptor {
  pub fn new(kind: TypeKind) -> Self {
    Self {
      kind,
      ref_type: None,
      properties: vec![],
      additional_properties: None,
      enum_values: vec![],
      enum_variant_names: vec![],
      nullable: false,
      skip_optional_wrap: false,
      imports: BTreeSet::new(),
      description: None,
      discriminator: None,
    }
  }

  pub fn primitive(primitive: impl Into<RustPrimitive>) -> Self {
    Self::new(TypeKind::Primitive(primitive.into()))
  }

  pub fn reference(name: impl Into<String>) -> Self {
    Self {
      ref_type: Some(name.into()),
      ..Self::new(TypeKind::Reference)
    }
  }

  /// Fully generic value; never wrapped in `Option` by consumers.
  pub fn any() -> Self {
    Self {
      skip_optional_wrap: true,
      ..Self::new(TypeKind::Any)
    }
  }

  pub fn array(items: TypeDescriptor) -> Self {
    Self::new(TypeKind::Array(Box::new(items)))
  }

  pub fn map(values: TypeDescriptor) -> Self {
    Self::new(TypeKind::Map(Box::new(values)))
  }

  #[must_use]
  pub fn with_nullable(mut self, nullable: bool) -> Self {
    self.nullable = nullable;
    self
  }

  #[must_use]
  pub fn with_import(mut self, import: impl Into<String>) -> Self {
    self.imports.insert(import.into());
    self
  }

  pub fn is_reference(&self) -> bool {
    self.ref_type.is_some()
  }

  /// Imports of this descriptor and everything nested in it.
  pub fn all_imports(&self) -> BTreeSet<String> {
    let mut imports = self.imports.clone();
    let nested = self
      .properties
      .iter()
      .map(|property| &property.schema)
      .chain(self.additional_properties.as_deref());
    for descriptor in nested {
      imports.extend(descriptor.all_imports());
    }
    match &self.kind {
      TypeKind::Array(inner) | TypeKind::Map(inner) => imports.extend(inner.all_imports()),
      TypeKind::Union { variants, .. } => {
        for variant in variants {
          imports.extend(variant.all_imports());
        }
      }
      TypeKind::Primitive(_) | TypeKind::Reference | TypeKind::Struct | TypeKind::Any => {}
    }
    imports
  }

  /// Rust type expression for this descriptor.
  ///
  /// Inline structs and unions have no name of their own and render as
  /// `serde_json::Value`; emitters that synthesize nested types name them.
  pub fn render(&self) -> String {
    if let Some(name) = &self.ref_type {
      return name.clone();
    }
    match &self.kind {
      TypeKind::Primitive(primitive) => primitive.to_string(),
      TypeKind::Array(items) => format!("Vec<{}>", items.render()),
      TypeKind::Map(values) => format!("std::collections::HashMap<String, {}>", values.render()),
      TypeKind::Reference | TypeKind::Struct | TypeKind::Union { .. } | TypeKind::Any => {
        RustPrimitive::Value.to_string()
      }
    }
  }
}

/// One field of a struct-like descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Property {
  /// Key as it appears in the document.
  pub name: String,
  pub field_name: String,
  pub schema: TypeDescriptor,
  pub required: bool,
  pub nullable: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub read_only: bool,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub write_only: bool,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub deprecated: bool,
}

impl Property {
  /// Whether the field type should be wrapped in `Option`.
  pub fn is_optional(&self) -> bool {
    (!self.required || self.nullable) && !self.schema.skip_optional_wrap
  }

  pub fn render_type(&self) -> String {
    let base = self.schema.render();
    if self.is_optional() {
      format!("Option<{base}>")
    } else {
      base
    }
  }
}
