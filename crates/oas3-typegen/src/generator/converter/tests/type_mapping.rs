use crate::{
  generator::converter::{
    TypeCustomization, TypeMapping, TypeMappingOverrides,
    type_mapping::{SimpleTypeSpec, TypeCustomizationError},
  },
  spec::SchemaType,
};

#[test]
fn test_default_mapping() {
  let mapping = TypeMapping::default();
  let cases = [
    (SchemaType::Integer, None, "i64", None),
    (SchemaType::Integer, Some("int32"), "i32", None),
    (SchemaType::Integer, Some("uint8"), "u8", None),
    (SchemaType::Integer, Some("unknown"), "i64", None),
    (SchemaType::Number, None, "f64", None),
    (SchemaType::Number, Some("float"), "f32", None),
    (SchemaType::Boolean, None, "bool", None),
    (SchemaType::String, None, "String", None),
    (SchemaType::String, Some("binary"), "Vec<u8>", None),
    (SchemaType::String, Some("date-time"), "chrono::DateTime<chrono::Utc>", Some("chrono")),
    (SchemaType::String, Some("date"), "chrono::NaiveDate", Some("chrono")),
    (SchemaType::String, Some("uuid"), "uuid::Uuid", Some("uuid")),
  ];

  for (schema_type, format, expected, import) in cases {
    let spec = mapping.lookup(schema_type, format).unwrap();
    assert_eq!(spec.type_name, expected, "{schema_type}/{format:?}");
    assert_eq!(spec.import.as_deref(), import, "{schema_type}/{format:?}");
  }

  for structural in [SchemaType::Array, SchemaType::Object, SchemaType::Null] {
    assert!(mapping.lookup(structural, None).is_none(), "{structural}");
  }
}

#[test]
fn test_overrides_layer_over_defaults() {
  let mut overrides = TypeMappingOverrides::default();
  overrides.insert("string.date-time=time::OffsetDateTime@time".parse().unwrap());
  overrides.insert("integer=i128".parse().unwrap());
  overrides.insert("string.email=Email".parse().unwrap());

  let mapping = TypeMapping::default().with_overrides(&overrides);

  assert_eq!(
    mapping.lookup(SchemaType::String, Some("date-time")),
    Some(&SimpleTypeSpec::new("time::OffsetDateTime").with_import("time"))
  );
  assert_eq!(mapping.lookup(SchemaType::Integer, None).unwrap().type_name, "i128");
  assert_eq!(mapping.lookup(SchemaType::Integer, Some("int32")).unwrap().type_name, "i32");
  assert_eq!(mapping.lookup(SchemaType::String, Some("email")).unwrap().type_name, "Email");
  assert_eq!(mapping.lookup(SchemaType::String, Some("date")).unwrap().type_name, "chrono::NaiveDate");
}

#[test]
fn test_overrides_deserialize_partially() {
  let overrides: TypeMappingOverrides = serde_json::from_value(serde_json::json!({
    "number": {"default": {"type": "rust_decimal::Decimal", "import": "rust_decimal"}}
  }))
  .unwrap();

  let mapping = TypeMapping::default().with_overrides(&overrides);
  let number = mapping.lookup(SchemaType::Number, None).unwrap();
  assert_eq!(number.type_name, "rust_decimal::Decimal");
  assert_eq!(number.import.as_deref(), Some("rust_decimal"));
  assert_eq!(mapping.lookup(SchemaType::Number, Some("float")).unwrap().type_name, "f32");
}

#[test]
fn test_parse_type_customization() {
  let parsed: TypeCustomization = " string.uuid = my::Id @ my ".parse().unwrap();
  assert_eq!(parsed.schema_type, SchemaType::String);
  assert_eq!(parsed.format.as_deref(), Some("uuid"));
  assert_eq!(parsed.spec, SimpleTypeSpec::new("my::Id").with_import("my"));

  let parsed: TypeCustomization = "boolean=MyBool".parse().unwrap();
  assert_eq!(parsed.schema_type, SchemaType::Boolean);
  assert_eq!(parsed.format, None);
  assert_eq!(parsed.spec, SimpleTypeSpec::new("MyBool"));

  let cases = [
    ("string", TypeCustomizationError::Syntax("string".to_string())),
    ("=Foo", TypeCustomizationError::Syntax("=Foo".to_string())),
    ("string=", TypeCustomizationError::Syntax("string=".to_string())),
    ("object=Map", TypeCustomizationError::NotPrimitive("object".to_string())),
    ("text.plain=String", TypeCustomizationError::NotPrimitive("text".to_string())),
  ];
  for (input, expected) in cases {
    assert_eq!(input.parse::<TypeCustomization>().unwrap_err(), expected, "{input}");
  }
}
