use serde_json::{Value, json};

use crate::spec::{ObjectOrReference, ObjectSchema, Spec, SpecBundle};

pub(super) fn schema(value: Value) -> ObjectSchema {
  serde_json::from_value(value).unwrap()
}

pub(super) fn node(value: Value) -> ObjectOrReference<ObjectSchema> {
  serde_json::from_value(value).unwrap()
}

pub(super) fn spec(openapi: &str, schemas: Value) -> Spec {
  serde_json::from_value(json!({
    "openapi": openapi,
    "info": {"title": "test", "version": "1"},
    "paths": {},
    "components": {"schemas": schemas}
  }))
  .unwrap()
}

pub(super) fn bundle(schemas: Value) -> SpecBundle {
  SpecBundle::new(spec("3.0.3", schemas))
}
