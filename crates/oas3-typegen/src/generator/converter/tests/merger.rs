use serde_json::json;

use super::support::{bundle, node, spec};
use crate::{
  generator::converter::{MergeError, MergeKind, merge_schemas},
  spec::{ObjectOrReference, SchemaType, SchemaTypeSet, SpecBundle},
};

#[test]
fn test_enum_union_preserves_order() {
  let merged = merge_schemas(
    &bundle(json!({})),
    &[node(json!({"enum": ["a", "b"]})), node(json!({})), node(json!({"enum": ["b", "c"]}))],
    MergeKind::AllOf,
    None,
  )
  .unwrap();

  assert_eq!(merged.enum_values, vec![json!("a"), json!("b"), json!("c")]);
}

#[test]
fn test_defaults() {
  let empty = bundle(json!({}));

  let merged = merge_schemas(
    &empty,
    &[node(json!({"default": 1})), node(json!({"type": "integer"}))],
    MergeKind::AllOf,
    None,
  )
  .unwrap();
  assert_eq!(merged.default, Some(json!(1)));

  let same = merge_schemas(
    &empty,
    &[node(json!({"default": 1})), node(json!({"default": 1}))],
    MergeKind::AllOf,
    None,
  )
  .unwrap();
  assert_eq!(same.default, Some(json!(1)));

  let err = merge_schemas(
    &empty,
    &[node(json!({"default": 1})), node(json!({"default": 2}))],
    MergeKind::AllOf,
    None,
  )
  .unwrap_err();
  assert!(matches!(err, MergeError::ConflictingDefaults { .. }), "got {err:?}");
}

#[test]
fn test_type_and_format_conflicts() {
  let empty = bundle(json!({}));
  let cases = [
    (json!({"type": "string"}), json!({"type": "integer"}), "types"),
    (json!({"format": "date"}), json!({"format": "date-time"}), "formats"),
  ];

  for (left, right, label) in cases {
    let err = merge_schemas(&empty, &[node(left), node(right)], MergeKind::AllOf, None).unwrap_err();
    assert!(err.to_string().contains(label), "{label}: {err}");
  }

  let merged = merge_schemas(
    &empty,
    &[node(json!({"type": ["string", "null"]})), node(json!({"type": ["null", "string"]}))],
    MergeKind::AllOf,
    None,
  )
  .unwrap();
  assert!(merged.schema_type.as_ref().is_some_and(|t| t.contains(SchemaType::Null)));
}

#[test]
fn test_flags_must_agree() {
  let empty = bundle(json!({}));
  let cases = [
    (json!({"nullable": true}), json!({}), "nullable"),
    (json!({"readOnly": true}), json!({"readOnly": false}), "readOnly"),
    (json!({"writeOnly": true}), json!({}), "writeOnly"),
    (json!({"uniqueItems": false}), json!({"uniqueItems": true}), "uniqueItems"),
  ];

  for (left, right, expected) in cases {
    let err = merge_schemas(&empty, &[node(left), node(right)], MergeKind::AllOf, None).unwrap_err();
    assert_eq!(err, MergeError::FlagMismatch { flag: expected });
  }

  let merged = merge_schemas(
    &empty,
    &[node(json!({"readOnly": false})), node(json!({}))],
    MergeKind::AllOf,
    None,
  )
  .unwrap();
  assert_eq!(merged.read_only, Some(false));
}

#[test]
fn test_exclusive_bounds() {
  let empty = bundle(json!({}));
  let merge = |left, right| merge_schemas(&empty, &[node(left), node(right)], MergeKind::AllOf, None);

  assert_eq!(
    merge(json!({"exclusiveMinimum": 5}), json!({})).unwrap().exclusive_minimum,
    Some(json!(5))
  );
  assert_eq!(
    merge(json!({"exclusiveMaximum": true}), json!({"exclusiveMaximum": true}))
      .unwrap()
      .exclusive_maximum,
    Some(json!(true))
  );
  assert!(matches!(
    merge(json!({"exclusiveMinimum": 1}), json!({"exclusiveMinimum": 2})),
    Err(MergeError::ConflictingExclusiveBound { .. })
  ));
  assert!(matches!(
    merge(json!({"exclusiveMaximum": true}), json!({})),
    Err(MergeError::ConflictingExclusiveBound { .. })
  ));
}

#[test]
fn test_properties_required_and_additional_properties() {
  let empty = bundle(json!({}));

  let merged = merge_schemas(
    &empty,
    &[
      node(json!({"properties": {"id": {"type": "string"}, "name": {"type": "string"}}, "required": ["id"]})),
      node(json!({"properties": {"name": {"type": "integer"}}, "required": ["name", "id"]})),
    ],
    MergeKind::AllOf,
    None,
  )
  .unwrap();
  assert_eq!(merged.required, vec!["id", "name"]);
  assert_eq!(merged.properties.len(), 2);
  let name = merged.properties["name"].as_object().unwrap();
  assert_eq!(name.schema_type, Some(SchemaTypeSet::Single(SchemaType::Integer)));

  let err = merge_schemas(
    &empty,
    &[
      node(json!({"additionalProperties": {"type": "string"}})),
      node(json!({"additionalProperties": {"type": "integer"}})),
    ],
    MergeKind::AllOf,
    None,
  )
  .unwrap_err();
  assert_eq!(err, MergeError::ConflictingAdditionalProperties);

  let err = merge_schemas(
    &empty,
    &[
      node(json!({"additionalProperties": true})),
      node(json!({"additionalProperties": false})),
    ],
    MergeKind::AllOf,
    None,
  )
  .unwrap_err();
  assert_eq!(err, MergeError::ConflictingAdditionalProperties);

  let merged = merge_schemas(
    &empty,
    &[node(json!({"additionalProperties": {"type": "string"}})), node(json!({}))],
    MergeKind::AllOf,
    None,
  )
  .unwrap();
  assert!(merged.additional_properties.is_some());
}

#[test]
fn test_discriminator_only_in_all_of() {
  let empty = bundle(json!({}));
  let siblings = [
    node(json!({"type": "object", "discriminator": {"propertyName": "kind"}})),
    node(json!({"type": "object"})),
  ];

  let merged = merge_schemas(&empty, &siblings, MergeKind::AllOf, None).unwrap();
  assert_eq!(merged.discriminator.unwrap().property_name, "kind");

  for kind in [MergeKind::OneOf, MergeKind::AnyOf] {
    let err = merge_schemas(&empty, &siblings, kind, None).unwrap_err();
    assert_eq!(err, MergeError::DiscriminatorNotAllowed(kind));
  }
}

#[test]
fn test_nested_all_of_is_flattened() {
  let bundle = bundle(json!({
    "Base": {"properties": {"id": {"type": "string"}}, "required": ["id"]},
    "Named": {"allOf": [{"$ref": "#/components/schemas/Base"}, {"properties": {"name": {"type": "string"}}}]}
  }));

  let merged = merge_schemas(
    &bundle,
    &[
      ObjectOrReference::reference("#/components/schemas/Named"),
      node(json!({"properties": {"age": {"type": "integer"}}})),
    ],
    MergeKind::AllOf,
    None,
  )
  .unwrap();

  let keys: Vec<&str> = merged.properties.keys().map(String::as_str).collect();
  assert_eq!(keys, vec!["age", "id", "name"]);
  assert_eq!(merged.required, vec!["id"]);
  assert!(merged.all_of.is_empty());
}

#[test]
fn test_cyclic_all_of_is_an_error() {
  let bundle = bundle(json!({
    "A": {"allOf": [{"$ref": "#/components/schemas/B"}]},
    "B": {"allOf": [{"$ref": "#/components/schemas/A"}]}
  }));

  let err = merge_schemas(
    &bundle,
    &[ObjectOrReference::reference("#/components/schemas/A")],
    MergeKind::AllOf,
    None,
  )
  .unwrap_err();
  assert!(matches!(err, MergeError::CyclicAllOf(_)), "got {err:?}");
}

#[test]
fn test_external_sibling_refs_are_qualified() {
  let root = spec("3.0.3", json!({}));
  let common = spec(
    "3.0.3",
    json!({
      "Audited": {"properties": {"author": {"$ref": "#/components/schemas/User"}}},
      "User": {"type": "object"}
    }),
  );
  let bundle = SpecBundle::new(root).with_external("common.yaml", common);

  let merged = merge_schemas(
    &bundle,
    &[
      ObjectOrReference::reference("common.yaml#/components/schemas/Audited"),
      node(json!({"properties": {"id": {"type": "string"}}})),
    ],
    MergeKind::AllOf,
    None,
  )
  .unwrap();

  assert_eq!(
    merged.properties["author"].ref_path(),
    Some("common.yaml#/components/schemas/User")
  );
}

#[test]
fn test_unresolved_sibling_is_reference_error() {
  let err = merge_schemas(
    &bundle(json!({})),
    &[ObjectOrReference::reference("#/components/schemas/Missing"), node(json!({}))],
    MergeKind::AllOf,
    None,
  )
  .unwrap_err();
  assert!(matches!(err, MergeError::Reference(_)), "got {err:?}");
}
