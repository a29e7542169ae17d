use serde_json::{Value, json};

use crate::{
  generator::{
    config::GeneratorConfig,
    orchestrator::{GenerationOutput, Orchestrator},
  },
  spec::{Spec, SpecBundle},
};

pub(super) fn spec(value: Value) -> Spec {
  serde_json::from_value(value).unwrap()
}

pub(super) fn bundle(value: Value) -> SpecBundle {
  SpecBundle::new(spec(value))
}

pub(super) fn document(paths: Value, components: Value) -> Value {
  json!({
    "openapi": "3.0.3",
    "info": {"title": "Test API", "version": "1.0.0"},
    "paths": paths,
    "components": components
  })
}

pub(super) fn generate(value: Value, config: GeneratorConfig) -> GenerationOutput {
  Orchestrator::new(bundle(value), config).generate().unwrap()
}

pub(super) fn schema_ref(name: &str) -> Value {
  json!({"$ref": format!("#/components/schemas/{name}")})
}

pub(super) fn json_content(schema: Value) -> Value {
  json!({"application/json": {"schema": schema}})
}

pub(super) fn component_schemas(spec: &Spec) -> Vec<&str> {
  spec
    .components
    .iter()
    .flat_map(|components| components.schemas.keys())
    .map(String::as_str)
    .collect()
}
