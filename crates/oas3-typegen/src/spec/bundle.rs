use std::collections::{BTreeMap, BTreeSet};

use super::{ComponentSection, ObjectOrReference, ObjectSchema, Parameter, RequestBody, Response, Schema, Spec};
use crate::utils::refs::{RefError, RefTarget};

/// Follows `$ref` alias chains at most this far before giving up.
const MAX_ALIAS_DEPTH: usize = 32;

/// The root document plus every external document its references reach,
/// keyed by the document string exactly as it appears in `$ref`.
#[derive(Debug, Clone, Default)]
pub struct SpecBundle {
  root: Spec,
  external: BTreeMap<String, Spec>,
}

/// A schema with its references rewritten so they resolve from the root.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
  pub schema: ObjectSchema,
  /// Document the schema was found in; `None` for the root document.
  pub document: Option<String>,
  /// Reference string that led here, if any.
  pub ref_path: Option<String>,
}

impl SpecBundle {
  pub fn new(root: Spec) -> Self {
    Self {
      root,
      external: BTreeMap::new(),
    }
  }

  #[must_use]
  pub fn with_external(mut self, document: impl Into<String>, spec: Spec) -> Self {
    self.external.insert(document.into(), spec);
    self
  }

  pub fn insert_external(&mut self, document: impl Into<String>, spec: Spec) {
    self.external.insert(document.into(), spec);
  }

  pub fn root(&self) -> &Spec {
    &self.root
  }

  pub fn root_mut(&mut self) -> &mut Spec {
    &mut self.root
  }

  pub fn into_root(self) -> Spec {
    self.root
  }

  pub fn external_documents(&self) -> impl Iterator<Item = &str> {
    self.external.keys().map(String::as_str)
  }

  pub fn document(&self, document: Option<&str>) -> Option<&Spec> {
    match document {
      None => Some(&self.root),
      Some(name) => self.external.get(name),
    }
  }

  fn component<'a, T>(
    &'a self,
    target: &RefTarget,
    expected: ComponentSection,
    select: impl FnOnce(&'a super::Components) -> &'a BTreeMap<String, T>,
  ) -> Result<&'a T, RefError> {
    if target.section != expected {
      return Err(RefError::UnsupportedShape(target.to_string()));
    }
    self
      .document(target.document.as_deref())
      .and_then(|spec| spec.components.as_ref())
      .and_then(|components| select(components).get(&target.name))
      .ok_or_else(|| RefError::Unresolved(target.to_string()))
  }

  /// Resolves a schema reference, following alias chains (`A: {$ref: B}`).
  ///
  /// `from_document` is the document containing the reference; local
  /// references inside an external document stay inside that document, and
  /// every local reference in the returned schema is rewritten to point back
  /// into it.
  pub fn resolve_schema_ref(&self, ref_path: &str, from_document: Option<&str>) -> Result<ResolvedSchema, RefError> {
    let mut seen = BTreeSet::new();
    let mut target = ref_path.parse::<RefTarget>()?.within(from_document);

    for _ in 0..MAX_ALIAS_DEPTH {
      if !seen.insert(target.clone()) {
        return Err(RefError::Unresolved(format!("{ref_path} (reference cycle)")));
      }
      match self.component(&target, ComponentSection::Schemas, |c| &c.schemas)? {
        ObjectOrReference::Ref { ref_path: next, .. } => {
          target = next.parse::<RefTarget>()?.within(target.document.as_deref());
        }
        ObjectOrReference::Object(schema) => {
          let mut schema = schema.clone();
          if let Some(document) = target.document.as_deref() {
            qualify_local_refs(&mut schema, document);
          }
          return Ok(ResolvedSchema {
            schema,
            document: target.document,
            ref_path: Some(ref_path.to_string()),
          });
        }
      }
    }

    Err(RefError::Unresolved(format!("{ref_path} (alias chain too deep)")))
  }

  /// Resolves a schema node: inline schemas are returned as-is, references are followed.
  pub fn resolve_schema(
    &self,
    node: &ObjectOrReference<ObjectSchema>,
    from_document: Option<&str>,
  ) -> Result<ResolvedSchema, RefError> {
    match node {
      ObjectOrReference::Ref { ref_path, .. } => self.resolve_schema_ref(ref_path, from_document),
      ObjectOrReference::Object(schema) => Ok(ResolvedSchema {
        schema: schema.clone(),
        document: from_document.map(ToString::to_string),
        ref_path: None,
      }),
    }
  }

  pub fn resolve_parameter(&self, target: &RefTarget) -> Result<&Parameter, RefError> {
    match self.component(target, ComponentSection::Parameters, |c| &c.parameters)? {
      ObjectOrReference::Object(parameter) => Ok(parameter),
      ObjectOrReference::Ref { ref_path, .. } => Err(RefError::UnsupportedShape(ref_path.clone())),
    }
  }

  pub fn resolve_request_body(&self, target: &RefTarget) -> Result<&RequestBody, RefError> {
    match self.component(target, ComponentSection::RequestBodies, |c| &c.request_bodies)? {
      ObjectOrReference::Object(body) => Ok(body),
      ObjectOrReference::Ref { ref_path, .. } => Err(RefError::UnsupportedShape(ref_path.clone())),
    }
  }

  pub fn resolve_response(&self, target: &RefTarget) -> Result<&Response, RefError> {
    match self.component(target, ComponentSection::Responses, |c| &c.responses)? {
      ObjectOrReference::Object(response) => Ok(response),
      ObjectOrReference::Ref { ref_path, .. } => Err(RefError::UnsupportedShape(ref_path.clone())),
    }
  }
}

/// Rewrites every local `#/...` reference (and bare discriminator mapping
/// name) inside `schema` to `<document>#/...`.
pub fn qualify_local_refs(schema: &mut ObjectSchema, document: &str) {
  fn qualify_node(node: &mut ObjectOrReference<ObjectSchema>, document: &str) {
    match node {
      ObjectOrReference::Ref { ref_path, .. } => {
        if ref_path.starts_with('#') {
          *ref_path = format!("{document}{ref_path}");
        }
      }
      ObjectOrReference::Object(schema) => qualify_local_refs(schema, document),
    }
  }

  fn qualify_boolean_or_schema(schema: &mut Schema, document: &str) {
    if let Schema::Object(node) = schema {
      qualify_node(node, document);
    }
  }

  for branch in schema
    .all_of
    .iter_mut()
    .chain(schema.one_of.iter_mut())
    .chain(schema.any_of.iter_mut())
  {
    qualify_node(branch, document);
  }
  if let Some(not) = schema.not.as_deref_mut() {
    qualify_node(not, document);
  }
  if let Some(items) = schema.items.as_deref_mut() {
    qualify_boolean_or_schema(items, document);
  }
  for property in schema.properties.values_mut() {
    qualify_node(property, document);
  }
  if let Some(additional) = schema.additional_properties.as_mut() {
    qualify_boolean_or_schema(additional, document);
  }
  if let Some(mapping) = schema.discriminator.as_mut().and_then(|d| d.mapping.as_mut()) {
    for value in mapping.values_mut() {
      if value.starts_with('#') {
        *value = format!("{document}{value}");
      } else if !value.contains('#') {
        *value = format!("{document}#/components/schemas/{value}");
      }
    }
  }
}
