//! Per-operation descriptors: parameters, bodies and responses tied to their resolved type names.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
  generator::{
    ast::TypeDescriptor,
    errors::{GeneratorError, GeneratorResult},
    extensions::ExtensionOverrides,
    gather::CLIENT_RESPONSE_WRAPPER_SEGMENT,
    naming::{
      NameMap,
      identifiers::{fallback_operation_id, to_rust_field_name},
    },
    orchestrator::TranslatedType,
  },
  spec::{DocumentPath, MediaType, ObjectOrReference, Operation, Parameter, ParameterIn, PathItem, SpecBundle},
  utils::RefTarget,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescriptor {
  pub name: String,
  pub field_name: String,
  pub location: ParameterIn,
  pub required: bool,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub deprecated: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  /// `None` when the parameter has no schema or lives in an external document.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub type_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub schema: Option<TypeDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterGroups {
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub path: Vec<ParameterDescriptor>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub query: Vec<ParameterDescriptor>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub header: Vec<ParameterDescriptor>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub cookie: Vec<ParameterDescriptor>,
}

impl ParameterGroups {
  fn push(&mut self, parameter: ParameterDescriptor) {
    match parameter.location {
      ParameterIn::Path => self.path.push(parameter),
      ParameterIn::Query => self.query.push(parameter),
      ParameterIn::Header => self.header.push(parameter),
      ParameterIn::Cookie => self.cookie.push(parameter),
    }
  }

  pub fn len(&self) -> usize {
    self.path.len() + self.query.len() + self.header.len() + self.cookie.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn iter(&self) -> impl Iterator<Item = &ParameterDescriptor> {
    self.path.iter().chain(&self.query).chain(&self.header).chain(&self.cookie)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentVariant {
  pub content_type: String,
  /// Only JSON media types carry a generated type.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestBodyDescriptor {
  pub required: bool,
  pub variants: Vec<ContentVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseVariant {
  pub status_code: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub content_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDescriptor {
  /// Declared operation id, or the method/path fallback.
  pub operation_id: String,
  pub explicit_id: bool,
  pub method: String,
  pub path: String,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub tags: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub summary: Option<String>,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub deprecated: bool,
  pub parameters: ParameterGroups,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_body: Option<RequestBodyDescriptor>,
  pub responses: Vec<ResponseVariant>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub client_response_wrapper: Option<String>,
}

/// Describes every operation of the root document, paths sorted, methods in fixed order.
pub fn describe_operations(
  bundle: &SpecBundle,
  names: &NameMap,
  types: &IndexMap<String, TranslatedType>,
) -> GeneratorResult<Vec<OperationDescriptor>> {
  let describer = OperationDescriber { bundle, names, types };

  let mut descriptors = Vec::new();
  for (api_path, item) in bundle.root().paths.iter().flatten() {
    for (method, operation) in item.methods() {
      descriptors.push(describer.describe(api_path, item, &method, operation)?);
    }
  }
  Ok(descriptors)
}

struct OperationDescriber<'a> {
  bundle: &'a SpecBundle,
  names: &'a NameMap,
  types: &'a IndexMap<String, TranslatedType>,
}

impl<'a> OperationDescriber<'a> {
  fn describe(
    &self,
    api_path: &str,
    item: &'a PathItem,
    method: &http::Method,
    operation: &'a Operation,
  ) -> GeneratorResult<OperationDescriptor> {
    let operation_path = DocumentPath::operation(api_path, method);
    let item_path = DocumentPath::new(["paths", api_path]);

    let mut parameters = item
      .parameters
      .iter()
      .enumerate()
      .map(|(index, node)| self.parameter(&item_path, index, node))
      .collect::<GeneratorResult<Vec<_>>>()?;
    let overrides = operation
      .parameters
      .iter()
      .enumerate()
      .map(|(index, node)| self.parameter(&operation_path, index, node))
      .collect::<GeneratorResult<Vec<_>>>()?;

    parameters.retain(|(_, inherited)| {
      !overrides
        .iter()
        .any(|(_, own)| own.name == inherited.name && own.location == inherited.location)
    });
    parameters.extend(overrides);

    let mut groups = ParameterGroups::default();
    for (record, parameter) in parameters {
      groups.push(self.parameter_descriptor(record.as_ref(), parameter)?);
    }

    Ok(OperationDescriptor {
      operation_id: operation
        .id()
        .map_or_else(|| fallback_operation_id(method, api_path), ToString::to_string),
      explicit_id: operation.id().is_some(),
      method: method.to_string(),
      path: api_path.to_string(),
      tags: operation.tags.clone(),
      summary: operation.summary.clone(),
      deprecated: operation.deprecated.unwrap_or(false),
      parameters: groups,
      request_body: self.request_body(&operation_path, operation)?,
      responses: self.responses(&operation_path, operation)?,
      client_response_wrapper: self
        .names
        .get(&operation_path.child(CLIENT_RESPONSE_WRAPPER_SEGMENT))
        .map(ToString::to_string),
    })
  }

  /// The parameter plus the path of its gathered record, if it has one.
  fn parameter(
    &self,
    owner: &DocumentPath,
    index: usize,
    node: &'a ObjectOrReference<Parameter>,
  ) -> GeneratorResult<(Option<DocumentPath>, &'a Parameter)> {
    match node {
      ObjectOrReference::Object(parameter) => {
        let record = owner.join(["parameters".to_string(), index.to_string()]);
        Ok((Some(record), parameter))
      }
      ObjectOrReference::Ref { ref_path, .. } => {
        let target = parse_target(owner, ref_path)?;
        let parameter = self
          .bundle
          .resolve_parameter(&target)
          .map_err(|err| GeneratorError::reference(owner, err))?;
        Ok((local_record(&target), parameter))
      }
    }
  }

  fn parameter_descriptor(
    &self,
    record: Option<&DocumentPath>,
    parameter: &Parameter,
  ) -> GeneratorResult<ParameterDescriptor> {
    let overrides = match record {
      Some(record) => ExtensionOverrides::extract(&parameter.extensions, record)?,
      None => ExtensionOverrides::default(),
    };

    Ok(ParameterDescriptor {
      name: parameter.name.clone(),
      field_name: overrides
        .field_name
        .unwrap_or_else(|| to_rust_field_name(&parameter.name)),
      location: parameter.location,
      required: parameter
        .required
        .unwrap_or(parameter.location == ParameterIn::Path),
      deprecated: parameter.deprecated.unwrap_or(false),
      description: parameter.description.clone(),
      type_name: record.and_then(|record| self.names.get(record)).map(ToString::to_string),
      schema: record
        .and_then(|record| self.types.get(&record.to_string()))
        .map(|translated| translated.descriptor.clone()),
    })
  }

  fn request_body(
    &self,
    operation_path: &DocumentPath,
    operation: &'a Operation,
  ) -> GeneratorResult<Option<RequestBodyDescriptor>> {
    let Some(node) = &operation.request_body else {
      return Ok(None);
    };

    let (owner, body) = match node {
      ObjectOrReference::Object(body) => (Some(operation_path.child("requestBody")), body),
      ObjectOrReference::Ref { ref_path, .. } => {
        let target = parse_target(operation_path, ref_path)?;
        let body = self
          .bundle
          .resolve_request_body(&target)
          .map_err(|err| GeneratorError::reference(operation_path, err))?;
        (local_record(&target), body)
      }
    };

    Ok(Some(RequestBodyDescriptor {
      required: body.required.unwrap_or(false),
      variants: self.content_variants(owner.as_ref(), &body.content),
    }))
  }

  fn responses(&self, operation_path: &DocumentPath, operation: &'a Operation) -> GeneratorResult<Vec<ResponseVariant>> {
    let mut variants = Vec::new();

    for (status, node) in operation.responses.iter().flatten() {
      let (owner, response) = match node {
        ObjectOrReference::Object(response) => (Some(operation_path.join(["responses", status.as_str()])), response),
        ObjectOrReference::Ref { ref_path, .. } => {
          let target = parse_target(operation_path, ref_path)?;
          let response = self
            .bundle
            .resolve_response(&target)
            .map_err(|err| GeneratorError::reference(operation_path, err))?;
          (local_record(&target), response)
        }
      };

      if response.content.is_empty() {
        variants.push(ResponseVariant {
          status_code: status.clone(),
          content_type: None,
          type_name: None,
        });
        continue;
      }
      variants.extend(
        self
          .content_variants(owner.as_ref(), &response.content)
          .into_iter()
          .map(|variant| ResponseVariant {
            status_code: status.clone(),
            content_type: Some(variant.content_type),
            type_name: variant.type_name,
          }),
      );
    }

    Ok(variants)
  }

  fn content_variants(&self, owner: Option<&DocumentPath>, content: &BTreeMap<String, MediaType>) -> Vec<ContentVariant> {
    content
      .keys()
      .map(|content_type| ContentVariant {
        content_type: content_type.clone(),
        type_name: owner
          .and_then(|owner| self.names.get(&owner.join(["content", content_type.as_str()])))
          .map(ToString::to_string),
      })
      .collect()
  }
}

fn parse_target(owner: &DocumentPath, ref_path: &str) -> GeneratorResult<RefTarget> {
  ref_path
    .parse::<RefTarget>()
    .map_err(|err| GeneratorError::reference(owner, err))
}

/// Components of external documents are not gathered, so they have no record.
fn local_record(target: &RefTarget) -> Option<DocumentPath> {
  (!target.is_external()).then(|| target.document_path())
}
