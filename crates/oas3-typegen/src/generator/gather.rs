//! Discovery of every schema-bearing location in a document.
//!
//! The gatherer walks the document once and returns a flat list of
//! [`GatheredSchema`] records in a fixed order: component sections first
//! (schemas, parameters, responses, request bodies, headers), then inline
//! operation schemas in path order, then client response wrappers sorted by
//! operation id. Keys are always visited sorted, so the same document yields
//! the same list on every run.

use std::collections::BTreeMap;

use serde::Serialize;
use strum::Display;

use crate::{
  generator::{
    config::GeneratorConfig,
    errors::{GeneratorError, GeneratorResult},
    extensions::ExtensionOverrides,
    metrics::GenerationWarning,
    naming::content_types::is_json,
  },
  spec::{
    ComponentSection, DocumentPath, Header, MediaType, ObjectOrReference, ObjectSchema, Parameter, SpecBundle,
  },
};

pub const CLIENT_RESPONSE_WRAPPER_SEGMENT: &str = "x-client-response-wrapper";

/// Where a gathered schema came from; decides its collision suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SchemaContext {
  ComponentSchema,
  ComponentParameter,
  ComponentResponse,
  ComponentRequestBody,
  ComponentHeader,
  OperationParameter,
  OperationRequestBody,
  OperationResponse,
  ClientResponseWrapper,
}

impl SchemaContext {
  pub const fn collision_suffix(self) -> &'static str {
    match self {
      Self::ComponentSchema => "Schema",
      Self::ComponentParameter | Self::OperationParameter => "Parameter",
      Self::ComponentResponse | Self::OperationResponse | Self::ClientResponseWrapper => "Response",
      Self::ComponentRequestBody => "RequestBody",
      Self::ComponentHeader => "Header",
      Self::OperationRequestBody => "Body",
    }
  }

  /// Component schemas keep their bare name when they collide with anything else.
  pub const fn is_privileged(self) -> bool {
    matches!(self, Self::ComponentSchema)
  }

  pub const fn is_component(self) -> bool {
    matches!(
      self,
      Self::ComponentSchema
        | Self::ComponentParameter
        | Self::ComponentResponse
        | Self::ComponentRequestBody
        | Self::ComponentHeader
    )
  }
}

/// One schema-bearing location. Created by [`gather`] and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatheredSchema {
  pub path: DocumentPath,
  pub context: SchemaContext,
  /// The `$ref` string when the location points at another schema.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ref_path: Option<String>,
  /// Resolved schema; `None` for client response wrappers and for external
  /// references whose document was not loaded.
  #[serde(skip)]
  pub schema: Option<ObjectSchema>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub component_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub operation_id: Option<String>,
  /// API path and method of the owning operation, for operations without an id.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub api_path: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub method: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub content_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status_code: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parameter_index: Option<usize>,
  #[serde(skip_serializing_if = "ExtensionOverrides::is_empty")]
  pub overrides: ExtensionOverrides,
}

impl GatheredSchema {
  fn new(path: DocumentPath, context: SchemaContext) -> Self {
    Self {
      path,
      context,
      ref_path: None,
      schema: None,
      component_name: None,
      operation_id: None,
      api_path: None,
      method: None,
      content_type: None,
      status_code: None,
      parameter_index: None,
      overrides: ExtensionOverrides::default(),
    }
  }
}

#[derive(Debug, Default)]
pub struct GatherOutput {
  pub schemas: Vec<GatheredSchema>,
  pub warnings: Vec<GenerationWarning>,
}

/// Collects every schema-bearing location of the root document.
pub fn gather(bundle: &SpecBundle, config: &GeneratorConfig) -> GeneratorResult<GatherOutput> {
  let mut gatherer = Gatherer {
    bundle,
    output: GatherOutput::default(),
  };

  gatherer.components()?;
  gatherer.operations()?;
  if config.generate_client {
    gatherer.client_response_wrappers();
  }

  Ok(gatherer.output)
}

/// Owning operation of an operation-scoped record.
#[derive(Clone, Copy)]
struct OperationScope<'a> {
  api_path: &'a str,
  method: Option<&'a http::Method>,
  operation_id: Option<&'a str>,
}

struct Gatherer<'a> {
  bundle: &'a SpecBundle,
  output: GatherOutput,
}

impl Gatherer<'_> {
  fn push(&mut self, record: GatheredSchema) {
    tracing::trace!(path = %record.path, context = %record.context, "gathered schema");
    self.output.schemas.push(record);
  }

  /// Builds a record for a schema node: references keep their `$ref` string and
  /// carry the resolved target, inline schemas are cloned.
  fn schema_record(
    &self,
    path: DocumentPath,
    context: SchemaContext,
    node: &ObjectOrReference<ObjectSchema>,
    container_extensions: Option<&BTreeMap<String, serde_json::Value>>,
  ) -> GeneratorResult<GatheredSchema> {
    let mut record = GatheredSchema::new(path, context);

    match node {
      ObjectOrReference::Ref { ref_path, .. } => {
        record.schema = match self.bundle.resolve_schema_ref(ref_path, None) {
          Ok(resolved) => Some(resolved.schema),
          Err(_) if ref_path.split_once('#').is_some_and(|(document, _)| !document.is_empty()) => None,
          Err(err) => return Err(GeneratorError::reference(&record.path, err)),
        };
        record.ref_path = Some(ref_path.clone());
      }
      ObjectOrReference::Object(schema) => {
        record.overrides = ExtensionOverrides::extract(&schema.extensions, &record.path)?;
        record.schema = Some(schema.clone());
      }
    }

    if record.overrides.is_empty()
      && let Some(extensions) = container_extensions
    {
      record.overrides = ExtensionOverrides::extract(extensions, &record.path)?;
    }

    Ok(record)
  }

  fn components(&mut self) -> GeneratorResult<()> {
    let Some(components) = self.bundle.root().components.as_ref() else {
      return Ok(());
    };

    for (name, node) in &components.schemas {
      let path = DocumentPath::component(ComponentSection::Schemas, name);
      let mut record = self.schema_record(path, SchemaContext::ComponentSchema, node, None)?;
      record.component_name = Some(name.clone());
      self.push(record);
    }

    for (name, node) in &components.parameters {
      let ObjectOrReference::Object(parameter) = node else {
        continue;
      };
      let path = DocumentPath::component(ComponentSection::Parameters, name);
      if let Some(mut record) = self.parameter_record(path, SchemaContext::ComponentParameter, parameter)? {
        record.component_name = Some(name.clone());
        self.push(record);
      }
    }

    for (name, node) in &components.responses {
      let ObjectOrReference::Object(response) = node else {
        continue;
      };
      let path = DocumentPath::component(ComponentSection::Responses, name);
      for mut record in self.content_records(&path, SchemaContext::ComponentResponse, &response.content)? {
        record.component_name = Some(name.clone());
        self.push(record);
      }
    }

    for (name, node) in &components.request_bodies {
      let ObjectOrReference::Object(body) = node else {
        continue;
      };
      let path = DocumentPath::component(ComponentSection::RequestBodies, name);
      for mut record in self.content_records(&path, SchemaContext::ComponentRequestBody, &body.content)? {
        record.component_name = Some(name.clone());
        self.push(record);
      }
    }

    for (name, node) in &components.headers {
      let ObjectOrReference::Object(header) = node else {
        continue;
      };
      let path = DocumentPath::component(ComponentSection::Headers, name);
      if let Some(mut record) = self.header_record(path, header)? {
        record.component_name = Some(name.clone());
        self.push(record);
      }
    }

    Ok(())
  }

  /// One record per JSON media type of a content map, sorted by media type.
  fn content_records(
    &mut self,
    owner: &DocumentPath,
    context: SchemaContext,
    content: &BTreeMap<String, MediaType>,
  ) -> GeneratorResult<Vec<GatheredSchema>> {
    let mut records = Vec::new();

    for (content_type, media) in content {
      if !is_json(content_type) {
        self.output.warnings.push(GenerationWarning::NonJsonContent {
          path: owner.to_string(),
          content_type: content_type.clone(),
        });
        continue;
      }
      let Some(schema) = &media.schema else {
        continue;
      };

      let path = owner.join(["content", content_type.as_str()]);
      let mut record = self.schema_record(path, context, schema, Some(&media.extensions))?;
      record.content_type = Some(content_type.clone());
      records.push(record);
    }

    Ok(records)
  }

  /// The schema a parameter carries: its `schema`, or the first JSON `content` entry.
  fn parameter_record(
    &mut self,
    path: DocumentPath,
    context: SchemaContext,
    parameter: &Parameter,
  ) -> GeneratorResult<Option<GatheredSchema>> {
    let node = parameter.schema.as_ref().map(|schema| (schema, None)).or_else(|| {
      parameter
        .content
        .iter()
        .flatten()
        .find(|(content_type, media)| is_json(content_type) && media.schema.is_some())
        .and_then(|(content_type, media)| media.schema.as_ref().map(|schema| (schema, Some(content_type))))
    });

    let Some((schema, content_type)) = node else {
      self.output.warnings.push(GenerationWarning::UntypedParameter {
        path: path.to_string(),
      });
      return Ok(None);
    };

    let mut record = self.schema_record(path, context, schema, Some(&parameter.extensions))?;
    record.content_type = content_type.cloned();
    Ok(Some(record))
  }

  fn header_record(&mut self, path: DocumentPath, header: &Header) -> GeneratorResult<Option<GatheredSchema>> {
    let node = header.schema.as_ref().or_else(|| {
      header
        .content
        .iter()
        .flatten()
        .find(|(content_type, _)| is_json(content_type))
        .and_then(|(_, media)| media.schema.as_ref())
    });

    node
      .map(|schema| self.schema_record(path, SchemaContext::ComponentHeader, schema, Some(&header.extensions)))
      .transpose()
  }

  fn scoped(record: &mut GatheredSchema, scope: OperationScope<'_>) {
    record.api_path = Some(scope.api_path.to_string());
    record.method = scope.method.map(|method| method.as_str().to_ascii_lowercase());
    record.operation_id = scope.operation_id.map(ToString::to_string);
  }

  fn operations(&mut self) -> GeneratorResult<()> {
    let bundle = self.bundle;
    let Some(paths) = bundle.root().paths.as_ref() else {
      return Ok(());
    };

    for (api_path, item) in paths {
      let item_path = DocumentPath::new(["paths", api_path.as_str()]);
      let path_scope = OperationScope {
        api_path,
        method: None,
        operation_id: None,
      };

      for (index, node) in item.parameters.iter().enumerate() {
        let ObjectOrReference::Object(parameter) = node else {
          continue;
        };
        let path = item_path.join(["parameters".to_string(), index.to_string()]);
        if let Some(mut record) = self.parameter_record(path, SchemaContext::OperationParameter, parameter)? {
          Self::scoped(&mut record, path_scope);
          record.parameter_index = Some(index);
          self.push(record);
        }
      }

      for (method, operation) in item.methods() {
        let operation_path = DocumentPath::operation(api_path, &method);
        let scope = OperationScope {
          api_path,
          method: Some(&method),
          operation_id: operation.id(),
        };

        for (index, node) in operation.parameters.iter().enumerate() {
          let ObjectOrReference::Object(parameter) = node else {
            continue;
          };
          let path = operation_path.join(["parameters".to_string(), index.to_string()]);
          if let Some(mut record) = self.parameter_record(path, SchemaContext::OperationParameter, parameter)? {
            Self::scoped(&mut record, scope);
            record.parameter_index = Some(index);
            self.push(record);
          }
        }

        if let Some(ObjectOrReference::Object(body)) = &operation.request_body {
          let owner = operation_path.child("requestBody");
          for mut record in self.content_records(&owner, SchemaContext::OperationRequestBody, &body.content)? {
            Self::scoped(&mut record, scope);
            self.push(record);
          }
        }

        for (status, node) in operation.responses.iter().flatten() {
          let ObjectOrReference::Object(response) = node else {
            continue;
          };
          let owner = operation_path.join(["responses", status.as_str()]);
          for mut record in self.content_records(&owner, SchemaContext::OperationResponse, &response.content)? {
            Self::scoped(&mut record, scope);
            record.status_code = Some(status.clone());
            self.push(record);
          }
        }
      }
    }

    Ok(())
  }

  fn client_response_wrappers(&mut self) {
    let mut wrappers = Vec::new();

    for (api_path, method, operation) in self.bundle.root().operations() {
      let Some(operation_id) = operation.id() else {
        self.output.warnings.push(GenerationWarning::MissingOperationId {
          method: method.to_string(),
          path: api_path.to_string(),
        });
        continue;
      };

      let path = DocumentPath::operation(api_path, &method).child(CLIENT_RESPONSE_WRAPPER_SEGMENT);
      let mut record = GatheredSchema::new(path, SchemaContext::ClientResponseWrapper);
      Self::scoped(
        &mut record,
        OperationScope {
          api_path,
          method: Some(&method),
          operation_id: Some(operation_id),
        },
      );
      wrappers.push(record);
    }

    wrappers.sort_by(|a, b| a.operation_id.cmp(&b.operation_id).then_with(|| a.path.cmp(&b.path)));
    for record in wrappers {
      self.push(record);
    }
  }
}
