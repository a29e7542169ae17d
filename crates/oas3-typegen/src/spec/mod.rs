//! Serde model for the subset of OpenAPI 3.0 / 3.1 the generator reads.
//!
//! Every object keeps unknown keys (including `x-` extensions) in a flattened
//! `extensions` map, so a document survives a load/prune/serialize cycle.

mod bundle;
mod path;
mod schema;

use std::collections::BTreeMap;

pub use bundle::{ResolvedSchema, SpecBundle, qualify_local_refs};
pub use path::DocumentPath;
pub use schema::{
  BooleanSchema, Discriminator, ObjectOrReference, ObjectSchema, Schema, SchemaType, SchemaTypeSet,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::generator::errors::GeneratorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display)]
pub enum SpecVersion {
  #[serde(rename = "3.0")]
  #[strum(to_string = "3.0")]
  V3_0,
  #[serde(rename = "3.1")]
  #[strum(to_string = "3.1")]
  V3_1,
}

impl SpecVersion {
  pub fn parse(openapi: &str) -> Result<Self, GeneratorError> {
    let mut parts = openapi.trim().split('.');
    match (parts.next(), parts.next()) {
      (Some("3"), Some("0")) => Ok(Self::V3_0),
      (Some("3"), Some("1")) => Ok(Self::V3_1),
      _ => Err(GeneratorError::UnsupportedVersion(openapi.to_string())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
  pub openapi: String,
  pub info: Info,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub paths: Option<BTreeMap<String, PathItem>>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub webhooks: BTreeMap<String, PathItem>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub components: Option<Components>,
  #[serde(flatten)]
  pub extensions: BTreeMap<String, Value>,
}

impl Spec {
  pub fn version(&self) -> Result<SpecVersion, GeneratorError> {
    SpecVersion::parse(&self.openapi)
  }

  /// Iterates `(path, method, operation)` in sorted path order and fixed method order.
  pub fn operations(&self) -> impl Iterator<Item = (&str, http::Method, &Operation)> {
    self
      .paths
      .iter()
      .flatten()
      .flat_map(|(path, item)| item.methods().map(move |(method, op)| (path.as_str(), method, op)))
  }

  pub fn schema(&self, name: &str) -> Option<&ObjectOrReference<ObjectSchema>> {
    self.components.as_ref().and_then(|components| components.schemas.get(name))
  }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub version: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(flatten)]
  pub extensions: BTreeMap<String, Value>,
}

/// Component sections addressable by `#/components/<section>/<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum ComponentSection {
  Schemas,
  Responses,
  Parameters,
  Examples,
  RequestBodies,
  Headers,
  SecuritySchemes,
  Links,
  Callbacks,
}

impl ComponentSection {
  /// Sections the pruner may shrink. Security schemes are referenced by name
  /// from security requirements, never by `$ref`, so they are always kept.
  pub const PRUNABLE: [Self; 8] = [
    Self::Schemas,
    Self::Responses,
    Self::Parameters,
    Self::Examples,
    Self::RequestBodies,
    Self::Headers,
    Self::Links,
    Self::Callbacks,
  ];
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub schemas: BTreeMap<String, ObjectOrReference<ObjectSchema>>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub responses: BTreeMap<String, ObjectOrReference<Response>>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub parameters: BTreeMap<String, ObjectOrReference<Parameter>>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub examples: BTreeMap<String, ObjectOrReference<Value>>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub request_bodies: BTreeMap<String, ObjectOrReference<RequestBody>>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub headers: BTreeMap<String, ObjectOrReference<Header>>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub security_schemes: BTreeMap<String, Value>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub links: BTreeMap<String, ObjectOrReference<Value>>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub callbacks: BTreeMap<String, ObjectOrReference<Callback>>,
  #[serde(flatten)]
  pub extensions: BTreeMap<String, Value>,
}

impl Components {
  pub fn keys(&self, section: ComponentSection) -> Vec<String> {
    fn collect<T>(map: &BTreeMap<String, T>) -> Vec<String> {
      map.keys().cloned().collect()
    }

    match section {
      ComponentSection::Schemas => collect(&self.schemas),
      ComponentSection::Responses => collect(&self.responses),
      ComponentSection::Parameters => collect(&self.parameters),
      ComponentSection::Examples => collect(&self.examples),
      ComponentSection::RequestBodies => collect(&self.request_bodies),
      ComponentSection::Headers => collect(&self.headers),
      ComponentSection::SecuritySchemes => collect(&self.security_schemes),
      ComponentSection::Links => collect(&self.links),
      ComponentSection::Callbacks => collect(&self.callbacks),
    }
  }

  /// Removes a single entry, returning whether it existed.
  pub fn remove(&mut self, section: ComponentSection, name: &str) -> bool {
    match section {
      ComponentSection::Schemas => self.schemas.remove(name).is_some(),
      ComponentSection::Responses => self.responses.remove(name).is_some(),
      ComponentSection::Parameters => self.parameters.remove(name).is_some(),
      ComponentSection::Examples => self.examples.remove(name).is_some(),
      ComponentSection::RequestBodies => self.request_bodies.remove(name).is_some(),
      ComponentSection::Headers => self.headers.remove(name).is_some(),
      ComponentSection::SecuritySchemes => self.security_schemes.remove(name).is_some(),
      ComponentSection::Links => self.links.remove(name).is_some(),
      ComponentSection::Callbacks => self.callbacks.remove(name).is_some(),
    }
  }
}

/// Runtime expression to path item.
pub type Callback = BTreeMap<String, PathItem>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathItem {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub summary: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub get: Option<Operation>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub put: Option<Operation>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub post: Option<Operation>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub delete: Option<Operation>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub options: Option<Operation>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub head: Option<Operation>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub patch: Option<Operation>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub trace: Option<Operation>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub parameters: Vec<ObjectOrReference<Parameter>>,
  #[serde(flatten)]
  pub extensions: BTreeMap<String, Value>,
}

impl PathItem {
  pub fn methods(&self) -> impl Iterator<Item = (http::Method, &Operation)> {
    [
      (http::Method::GET, &self.get),
      (http::Method::PUT, &self.put),
      (http::Method::POST, &self.post),
      (http::Method::DELETE, &self.delete),
      (http::Method::OPTIONS, &self.options),
      (http::Method::HEAD, &self.head),
      (http::Method::PATCH, &self.patch),
      (http::Method::TRACE, &self.trace),
    ]
    .into_iter()
    .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
  }

  pub fn slots_mut(&mut self) -> [&mut Option<Operation>; 8] {
    [
      &mut self.get,
      &mut self.put,
      &mut self.post,
      &mut self.delete,
      &mut self.options,
      &mut self.head,
      &mut self.patch,
      &mut self.trace,
    ]
  }

  pub fn has_operations(&self) -> bool {
    self.methods().next().is_some()
  }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub tags: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub summary: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub operation_id: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub parameters: Vec<ObjectOrReference<Parameter>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub request_body: Option<ObjectOrReference<RequestBody>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub responses: Option<BTreeMap<String, ObjectOrReference<Response>>>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub callbacks: BTreeMap<String, ObjectOrReference<Callback>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deprecated: Option<bool>,
  #[serde(flatten)]
  pub extensions: BTreeMap<String, Value>,
}

impl Operation {
  /// The declared operation id, treating an empty string as absent.
  pub fn id(&self) -> Option<&str> {
    self.operation_id.as_deref().filter(|id| !id.trim().is_empty())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParameterIn {
  Path,
  Query,
  Header,
  Cookie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
  pub name: String,
  #[serde(rename = "in")]
  pub location: ParameterIn,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub required: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deprecated: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub schema: Option<ObjectOrReference<ObjectSchema>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content: Option<BTreeMap<String, MediaType>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub style: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub explode: Option<bool>,
  #[serde(flatten)]
  pub extensions: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default)]
  pub content: BTreeMap<String, MediaType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub required: Option<bool>,
  #[serde(flatten)]
  pub extensions: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub headers: BTreeMap<String, ObjectOrReference<Header>>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub content: BTreeMap<String, MediaType>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub links: BTreeMap<String, ObjectOrReference<Value>>,
  #[serde(flatten)]
  pub extensions: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub required: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deprecated: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub schema: Option<ObjectOrReference<ObjectSchema>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content: Option<BTreeMap<String, MediaType>>,
  #[serde(flatten)]
  pub extensions: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaType {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub schema: Option<ObjectOrReference<ObjectSchema>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub example: Option<Value>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub examples: BTreeMap<String, ObjectOrReference<Value>>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub encoding: BTreeMap<String, Value>,
  #[serde(flatten)]
  pub extensions: BTreeMap<String, Value>,
}
