use serde_json::json;

use super::support::{bundle, document, json_content, schema_ref};
use crate::generator::{
  config::GeneratorConfig,
  errors::GeneratorError,
  gather::{GatherOutput, SchemaContext, gather},
  metrics::GenerationWarning,
};

fn gathered(value: serde_json::Value, config: &GeneratorConfig) -> GatherOutput {
  gather(&bundle(value), config).unwrap()
}

fn paths(output: &GatherOutput) -> Vec<String> {
  output.schemas.iter().map(|record| record.path.to_string()).collect()
}

fn store_document() -> serde_json::Value {
  document(
    json!({
      "/stores": {
        "post": {
          "operationId": "createStore",
          "requestBody": {"content": json_content(schema_ref("Store"))},
          "responses": {"201": {"description": "created", "content": json_content(schema_ref("Store"))}}
        },
        "get": {
          "operationId": "listStores",
          "parameters": [{"name": "limit", "in": "query", "schema": {"type": "integer"}}],
          "responses": {"200": {"description": "ok", "content": json_content(json!({"type": "array", "items": schema_ref("Store")}))}}
        }
      },
      "/health": {
        "get": {"responses": {"204": {"description": "empty"}}}
      }
    }),
    json!({
      "schemas": {"Store": {"type": "object"}, "Address": {"type": "object"}},
      "parameters": {"Page": {"name": "page", "in": "query", "schema": {"type": "integer"}}},
      "responses": {"NotFound": {"description": "missing", "content": json_content(schema_ref("Address"))}},
      "requestBodies": {"StoreBody": {"content": json_content(schema_ref("Store"))}},
      "headers": {"X-Rate-Limit": {"schema": {"type": "integer"}}}
    }),
  )
}

#[test]
fn test_gather_order() {
  let output = gathered(store_document(), &GeneratorConfig::builder().generate_client(true).build());

  assert_eq!(
    paths(&output),
    vec![
      "components/schemas/Address",
      "components/schemas/Store",
      "components/parameters/Page",
      "components/responses/NotFound/content/application/json",
      "components/requestBodies/StoreBody/content/application/json",
      "components/headers/X-Rate-Limit",
      "paths//stores/get/parameters/0",
      "paths//stores/get/responses/200/content/application/json",
      "paths//stores/post/requestBody/content/application/json",
      "paths//stores/post/responses/201/content/application/json",
      "paths//stores/post/x-client-response-wrapper",
      "paths//stores/get/x-client-response-wrapper",
    ]
  );

  let contexts: Vec<SchemaContext> = output.schemas.iter().map(|record| record.context).collect();
  assert_eq!(contexts[0], SchemaContext::ComponentSchema);
  assert_eq!(contexts[5], SchemaContext::ComponentHeader);
  assert_eq!(contexts[8], SchemaContext::OperationRequestBody);
  assert_eq!(contexts[11], SchemaContext::ClientResponseWrapper);
}

#[test]
fn test_gather_is_deterministic() {
  let config = GeneratorConfig::builder().generate_client(true).build();
  let first = gathered(store_document(), &config);
  let second = gathered(store_document(), &config);

  assert_eq!(first.schemas, second.schemas);
  assert_eq!(first.warnings, second.warnings);
}

#[test]
fn test_wrappers_require_client_and_operation_id() {
  let without_client = gathered(store_document(), &GeneratorConfig::default());
  assert!(
    without_client
      .schemas
      .iter()
      .all(|record| record.context != SchemaContext::ClientResponseWrapper)
  );
  assert!(without_client.warnings.is_empty());

  let with_client = gathered(store_document(), &GeneratorConfig::builder().generate_client(true).build());
  let wrapper_ids: Vec<&str> = with_client
    .schemas
    .iter()
    .filter(|record| record.context == SchemaContext::ClientResponseWrapper)
    .filter_map(|record| record.operation_id.as_deref())
    .collect();
  assert_eq!(wrapper_ids, vec!["createStore", "listStores"]);
  assert_eq!(
    with_client.warnings,
    vec![GenerationWarning::MissingOperationId {
      method: "GET".to_string(),
      path: "/health".to_string(),
    }]
  );
}

#[test]
fn test_only_json_media_types_are_gathered() {
  let output = gathered(
    document(
      json!({
        "/reports": {
          "get": {
            "operationId": "getReport",
            "responses": {
              "200": {
                "description": "report",
                "content": {
                  "application/json": {"schema": {"type": "object"}},
                  "application/vnd.api+json; charset=utf-8": {"schema": {"type": "object"}},
                  "text/csv": {"schema": {"type": "string"}}
                }
              }
            }
          }
        }
      }),
      json!({}),
    ),
    &GeneratorConfig::default(),
  );

  assert_eq!(
    paths(&output),
    vec![
      "paths//reports/get/responses/200/content/application/json",
      "paths//reports/get/responses/200/content/application/vnd.api+json; charset=utf-8",
    ]
  );
  assert_eq!(
    output.warnings,
    vec![GenerationWarning::NonJsonContent {
      path: "paths//reports/get/responses/200".to_string(),
      content_type: "text/csv".to_string(),
    }]
  );
  let record = &output.schemas[0];
  assert_eq!(record.status_code.as_deref(), Some("200"));
  assert_eq!(record.content_type.as_deref(), Some("application/json"));
  assert_eq!(record.operation_id.as_deref(), Some("getReport"));
  assert_eq!(record.method.as_deref(), Some("get"));
}

#[test]
fn test_path_level_parameters_have_no_method() {
  let output = gathered(
    document(
      json!({
        "/pets/{petId}": {
          "parameters": [
            {"name": "petId", "in": "path", "required": true, "schema": {"type": "string"}},
            {"name": "trace", "in": "header"}
          ],
          "get": {"operationId": "getPet"}
        }
      }),
      json!({}),
    ),
    &GeneratorConfig::default(),
  );

  assert_eq!(output.schemas.len(), 1);
  let record = &output.schemas[0];
  assert_eq!(record.path.to_string(), "paths//pets/{petId}/parameters/0");
  assert_eq!(record.context, SchemaContext::OperationParameter);
  assert_eq!(record.parameter_index, Some(0));
  assert_eq!(record.api_path.as_deref(), Some("/pets/{petId}"));
  assert_eq!(record.method, None);
  assert_eq!(record.operation_id, None);
  assert_eq!(
    output.warnings,
    vec![GenerationWarning::UntypedParameter {
      path: "paths//pets/{petId}/parameters/1".to_string(),
    }]
  );
}

#[test]
fn test_references_keep_ref_and_resolved_target() {
  let output = gathered(
    document(
      json!({
        "/users": {
          "get": {
            "operationId": "listUsers",
            "responses": {
              "200": {"description": "ok", "content": json_content(schema_ref("User"))},
              "default": {"description": "error", "content": json_content(json!({"$ref": "common.yaml#/components/schemas/Error"}))}
            }
          }
        }
      }),
      json!({"schemas": {"User": {"type": "object", "properties": {"id": {"type": "string"}}}}}),
    ),
    &GeneratorConfig::default(),
  );

  let local = &output.schemas[1];
  assert_eq!(local.ref_path.as_deref(), Some("#/components/schemas/User"));
  assert!(local.schema.as_ref().is_some_and(|schema| schema.properties.contains_key("id")));

  let external = &output.schemas[2];
  assert_eq!(external.ref_path.as_deref(), Some("common.yaml#/components/schemas/Error"));
  assert_eq!(external.schema, None);
}

#[test]
fn test_unresolved_local_reference_is_an_error() {
  let value = document(
    json!({
      "/users": {
        "get": {
          "operationId": "listUsers",
          "responses": {"200": {"description": "ok", "content": json_content(schema_ref("Missing"))}}
        }
      }
    }),
    json!({}),
  );

  let err = gather(&bundle(value), &GeneratorConfig::default()).unwrap_err();
  match err {
    GeneratorError::Reference { path, .. } => {
      assert_eq!(path, "paths//users/get/responses/200/content/application/json");
    }
    other => panic!("expected a reference error, got {other:?}"),
  }
}

#[test]
fn test_media_type_extensions_become_overrides() {
  let output = gathered(
    document(
      json!({
        "/files": {
          "post": {
            "operationId": "upload",
            "requestBody": {
              "content": {
                "application/json": {"schema": {"type": "object"}, "x-rust-type": "UploadRequest"}
              }
            }
          }
        }
      }),
      json!({}),
    ),
    &GeneratorConfig::default(),
  );

  let type_override = output.schemas[0].overrides.type_override.as_ref();
  assert_eq!(type_override.map(|o| o.name.as_str()), Some("UploadRequest"));
}
