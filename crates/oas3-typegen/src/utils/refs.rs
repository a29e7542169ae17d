use std::{collections::BTreeSet, fmt, str::FromStr};

use percent_encoding::percent_decode_str;

use crate::spec::{
  Callback, ComponentSection, Components, DocumentPath, Header, MediaType, ObjectOrReference, ObjectSchema, Operation,
  Parameter, PathItem, RequestBody, Response, Schema,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefError {
  #[error("malformed reference '{ref_path}': {reason}")]
  Malformed { ref_path: String, reason: String },
  #[error("unsupported reference '{0}': only [document]#/components/<section>/<name> is supported")]
  UnsupportedShape(String),
  #[error("reference '{0}' does not resolve to a known component")]
  Unresolved(String),
  #[error("external reference '{ref_path}' has no import mapping for document '{document}'")]
  UnmappedExternal { document: String, ref_path: String },
}

/// A parsed `$ref` to a component, optionally inside another document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefTarget {
  pub document: Option<String>,
  pub section: ComponentSection,
  pub name: String,
}

impl RefTarget {
  pub fn local(section: ComponentSection, name: impl Into<String>) -> Self {
    Self {
      document: None,
      section,
      name: name.into(),
    }
  }

  pub fn is_external(&self) -> bool {
    self.document.is_some()
  }

  /// Document path of the component inside whichever document owns it.
  pub fn document_path(&self) -> DocumentPath {
    DocumentPath::component(self.section, &self.name)
  }

  /// Re-targets a local reference into `document`. External references are left alone.
  #[must_use]
  pub fn within(mut self, document: Option<&str>) -> Self {
    if self.document.is_none() {
      self.document = document.map(ToString::to_string);
    }
    self
  }

  /// Discriminator mappings hold either a full reference or a bare schema name.
  pub fn from_mapping_value(value: &str) -> Result<Self, RefError> {
    if value.contains('#') {
      value.parse()
    } else {
      Ok(Self::local(ComponentSection::Schemas, value))
    }
  }
}

impl FromStr for RefTarget {
  type Err = RefError;

  fn from_str(ref_path: &str) -> Result<Self, Self::Err> {
    let malformed = |reason: &str| RefError::Malformed {
      ref_path: ref_path.to_string(),
      reason: reason.to_string(),
    };

    let (document, fragment) = ref_path
      .split_once('#')
      .ok_or_else(|| malformed("missing '#' fragment"))?;
    let pointer = fragment
      .strip_prefix('/')
      .ok_or_else(|| malformed("fragment is not a JSON pointer"))?;

    let segments = pointer
      .split('/')
      .map(|segment| {
        percent_decode_str(segment)
          .decode_utf8()
          .map(|decoded| decoded.replace("~1", "/").replace("~0", "~"))
          .map_err(|_| malformed("invalid percent-encoding"))
      })
      .collect::<Result<Vec<_>, _>>()?;

    let [root, section, name] = segments.as_slice() else {
      return Err(RefError::UnsupportedShape(ref_path.to_string()));
    };
    if root != "components" || name.is_empty() {
      return Err(RefError::UnsupportedShape(ref_path.to_string()));
    }
    let section = section
      .parse::<ComponentSection>()
      .map_err(|_| RefError::UnsupportedShape(ref_path.to_string()))?;

    Ok(Self {
      document: (!document.is_empty()).then(|| document.to_string()),
      section,
      name: name.clone(),
    })
  }
}

impl fmt::Display for RefTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = self.name.replace('~', "~0").replace('/', "~1");
    write!(
      f,
      "{}#/components/{}/{name}",
      self.document.as_deref().unwrap_or_default(),
      self.section
    )
  }
}

/// Collects every `$ref` reachable from the visited nodes.
///
/// Unparseable references are skipped: they cannot keep a component alive.
#[derive(Debug, Default)]
pub struct RefCollector {
  refs: BTreeSet<RefTarget>,
}

impl RefCollector {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn into_refs(self) -> BTreeSet<RefTarget> {
    self.refs
  }

  fn record(&mut self, ref_path: &str) {
    match ref_path.parse::<RefTarget>() {
      Ok(target) => {
        self.refs.insert(target);
      }
      Err(err) => tracing::debug!(ref_path, %err, "skipping unparseable reference"),
    }
  }

  fn visit_ref_or<T>(&mut self, node: &ObjectOrReference<T>, visit: impl FnOnce(&mut Self, &T)) {
    match node {
      ObjectOrReference::Ref { ref_path, .. } => self.record(ref_path),
      ObjectOrReference::Object(object) => visit(self, object),
    }
  }

  pub fn visit_schema_ref(&mut self, node: &ObjectOrReference<ObjectSchema>) {
    self.visit_ref_or(node, Self::visit_schema);
  }

  pub fn visit_schema(&mut self, schema: &ObjectSchema) {
    for branch in schema.all_of.iter().chain(&schema.one_of).chain(&schema.any_of) {
      self.visit_schema_ref(branch);
    }
    if let Some(not) = &schema.not {
      self.visit_schema_ref(not);
    }
    if let Some(items) = &schema.items {
      self.visit_boolean_or_schema(items);
    }
    for property in schema.properties.values() {
      self.visit_schema_ref(property);
    }
    if let Some(additional) = &schema.additional_properties {
      self.visit_boolean_or_schema(additional);
    }
    if let Some(mapping) = schema.discriminator.as_ref().and_then(|d| d.mapping.as_ref()) {
      for value in mapping.values() {
        match RefTarget::from_mapping_value(value) {
          Ok(target) => {
            self.refs.insert(target);
          }
          Err(err) => tracing::debug!(%value, %err, "skipping unparseable discriminator mapping"),
        }
      }
    }
  }

  fn visit_boolean_or_schema(&mut self, schema: &Schema) {
    if let Schema::Object(node) = schema {
      self.visit_schema_ref(node);
    }
  }

  pub fn visit_media_types<'a>(&mut self, content: impl IntoIterator<Item = &'a MediaType>) {
    for media in content {
      if let Some(schema) = &media.schema {
        self.visit_schema_ref(schema);
      }
      for example in media.examples.values() {
        self.visit_ref_or(example, |_, _| {});
      }
    }
  }

  pub fn visit_parameter_ref(&mut self, node: &ObjectOrReference<Parameter>) {
    self.visit_ref_or(node, Self::visit_parameter);
  }

  pub fn visit_parameter(&mut self, parameter: &Parameter) {
    if let Some(schema) = &parameter.schema {
      self.visit_schema_ref(schema);
    }
    if let Some(content) = &parameter.content {
      self.visit_media_types(content.values());
    }
  }

  pub fn visit_header_ref(&mut self, node: &ObjectOrReference<Header>) {
    self.visit_ref_or(node, Self::visit_header);
  }

  pub fn visit_header(&mut self, header: &Header) {
    if let Some(schema) = &header.schema {
      self.visit_schema_ref(schema);
    }
    if let Some(content) = &header.content {
      self.visit_media_types(content.values());
    }
  }

  pub fn visit_request_body_ref(&mut self, node: &ObjectOrReference<RequestBody>) {
    self.visit_ref_or(node, Self::visit_request_body);
  }

  pub fn visit_request_body(&mut self, body: &RequestBody) {
    self.visit_media_types(body.content.values());
  }

  pub fn visit_response_ref(&mut self, node: &ObjectOrReference<Response>) {
    self.visit_ref_or(node, Self::visit_response);
  }

  pub fn visit_response(&mut self, response: &Response) {
    for header in response.headers.values() {
      self.visit_header_ref(header);
    }
    self.visit_media_types(response.content.values());
    for link in response.links.values() {
      self.visit_ref_or(link, |_, _| {});
    }
  }

  pub fn visit_callback_ref(&mut self, node: &ObjectOrReference<Callback>) {
    self.visit_ref_or(node, Self::visit_callback);
  }

  pub fn visit_callback(&mut self, callback: &Callback) {
    for item in callback.values() {
      self.visit_path_item(item);
    }
  }

  pub fn visit_path_item(&mut self, item: &PathItem) {
    for parameter in &item.parameters {
      self.visit_parameter_ref(parameter);
    }
    for (_, operation) in item.methods() {
      self.visit_operation(operation);
    }
  }

  pub fn visit_operation(&mut self, operation: &Operation) {
    for parameter in &operation.parameters {
      self.visit_parameter_ref(parameter);
    }
    if let Some(body) = &operation.request_body {
      self.visit_request_body_ref(body);
    }
    for response in operation.responses.iter().flat_map(|responses| responses.values()) {
      self.visit_response_ref(response);
    }
    for callback in operation.callbacks.values() {
      self.visit_callback_ref(callback);
    }
  }

  /// Visits every entry of every component section.
  pub fn visit_components(&mut self, components: &Components) {
    for schema in components.schemas.values() {
      self.visit_schema_ref(schema);
    }
    for response in components.responses.values() {
      self.visit_response_ref(response);
    }
    for parameter in components.parameters.values() {
      self.visit_parameter_ref(parameter);
    }
    for example in components.examples.values() {
      self.visit_ref_or(example, |_, _| {});
    }
    for body in components.request_bodies.values() {
      self.visit_request_body_ref(body);
    }
    for header in components.headers.values() {
      self.visit_header_ref(header);
    }
    for link in components.links.values() {
      self.visit_ref_or(link, |_, _| {});
    }
    for callback in components.callbacks.values() {
      self.visit_callback_ref(callback);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_local_refs() {
    let cases = [
      ("#/components/schemas/Pet", ComponentSection::Schemas, "Pet"),
      ("#/components/requestBodies/NewPet", ComponentSection::RequestBodies, "NewPet"),
      ("#/components/schemas/a~1b", ComponentSection::Schemas, "a/b"),
      ("#/components/schemas/a~0b", ComponentSection::Schemas, "a~b"),
      ("#/components/schemas/Pet%20Food", ComponentSection::Schemas, "Pet Food"),
    ];

    for (input, section, name) in cases {
      let target: RefTarget = input.parse().unwrap();
      assert_eq!(target.document, None, "document for {input}");
      assert_eq!(target.section, section, "section for {input}");
      assert_eq!(target.name, name, "name for {input}");
    }
  }

  #[test]
  fn test_parse_external_ref() {
    let target: RefTarget = "common.yaml#/components/schemas/Error".parse().unwrap();
    assert_eq!(target.document.as_deref(), Some("common.yaml"));
    assert!(target.is_external());
    assert_eq!(target.to_string(), "common.yaml#/components/schemas/Error");
  }

  #[test]
  fn test_parse_rejects_unsupported_shapes() {
    for input in [
      "#/components/schemas/Pet/properties/name",
      "#/definitions/Pet",
      "#/components/widgets/Pet",
      "#/components/schemas/",
    ] {
      assert!(
        matches!(input.parse::<RefTarget>(), Err(RefError::UnsupportedShape(_))),
        "{input} should be unsupported"
      );
    }
    assert!(matches!(
      "Pet".parse::<RefTarget>(),
      Err(RefError::Malformed { .. })
    ));
  }

  #[test]
  fn test_mapping_value_accepts_bare_names() {
    let target = RefTarget::from_mapping_value("Cat").unwrap();
    assert_eq!(target, RefTarget::local(ComponentSection::Schemas, "Cat"));
  }

  #[test]
  fn test_within_only_retargets_local_refs() {
    let local = RefTarget::local(ComponentSection::Schemas, "Pet").within(Some("other.yaml"));
    assert_eq!(local.document.as_deref(), Some("other.yaml"));

    let external: RefTarget = "a.yaml#/components/schemas/Pet".parse().unwrap();
    assert_eq!(external.within(Some("b.yaml")).document.as_deref(), Some("a.yaml"));
  }
}
