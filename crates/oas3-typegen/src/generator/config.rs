//! Generation options, threaded explicitly through every pipeline stage.

use std::collections::{BTreeMap, BTreeSet};

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{
  generator::{
    converter::type_mapping::{TypeMapping, TypeMappingOverrides},
    naming::identifiers::fallback_operation_id,
  },
  spec::Operation,
};

pub const DEFAULT_RESPONSE_TYPE_SUFFIX: &str = "Response";
pub const DEFAULT_PACKAGE_NAME: &str = "api";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
  /// Module name recorded in the manifest for emitters.
  #[builder(into, default = DEFAULT_PACKAGE_NAME.to_string())]
  pub package_name: String,
  /// Synthesize client-response wrapper types, one per operation.
  #[builder(default)]
  pub generate_client: bool,
  #[builder(default)]
  pub filter: OperationFilter,
  #[builder(default)]
  pub naming: NamingOptions,
  #[builder(default)]
  pub type_mapping: TypeMappingOverrides,
  /// External document (as written in `$ref`) to the module path its types live in.
  #[builder(default)]
  pub import_mapping: BTreeMap<String, String>,
  #[builder(default)]
  pub compatibility: CompatibilityOptions,
  /// Keep unreferenced components.
  #[builder(default)]
  pub skip_prune: bool,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self::builder().build()
  }
}

impl GeneratorConfig {
  /// Built-in type mapping with the configured overrides applied.
  pub fn effective_type_mapping(&self) -> TypeMapping {
    TypeMapping::default().with_overrides(&self.type_mapping)
  }
}

/// Operation selection, applied before reachability pruning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(default, rename_all = "kebab-case")]
pub struct OperationFilter {
  #[builder(default)]
  pub include_tags: BTreeSet<String>,
  #[builder(default)]
  pub exclude_tags: BTreeSet<String>,
  #[builder(default)]
  pub include_operation_ids: BTreeSet<String>,
  #[builder(default)]
  pub exclude_operation_ids: BTreeSet<String>,
}

impl OperationFilter {
  pub fn is_empty(&self) -> bool {
    self.include_tags.is_empty()
      && self.exclude_tags.is_empty()
      && self.include_operation_ids.is_empty()
      && self.exclude_operation_ids.is_empty()
  }

  /// Operations without an id are matched by their method/path fallback id.
  pub fn allows(&self, operation: &Operation, method: &http::Method, path: &str) -> bool {
    let tagged = |tags: &BTreeSet<String>| operation.tags.iter().any(|tag| tags.contains(tag));
    if !self.include_tags.is_empty() && !tagged(&self.include_tags) {
      return false;
    }
    if tagged(&self.exclude_tags) {
      return false;
    }

    let id = operation
      .id()
      .map_or_else(|| fallback_operation_id(method, path), ToString::to_string);
    if !self.include_operation_ids.is_empty() && !self.include_operation_ids.contains(&id) {
      return false;
    }
    !self.exclude_operation_ids.contains(&id)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NamingOptions {
  /// Appended to the operation id to name client response wrappers.
  pub response_type_suffix: String,
}

impl Default for NamingOptions {
  fn default() -> Self {
    Self {
      response_type_suffix: DEFAULT_RESPONSE_TYPE_SUFFIX.to_string(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompatibilityOptions {
  /// Single-pass naming: first come keeps the name, later ones get `2`, `3`, ...
  pub legacy_name_resolution: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn operation(id: Option<&str>, tags: &[&str]) -> Operation {
    Operation {
      operation_id: id.map(ToString::to_string),
      tags: tags.iter().map(ToString::to_string).collect(),
      ..Default::default()
    }
  }

  #[test]
  fn test_default_config() {
    let config = GeneratorConfig::default();
    assert_eq!(config.package_name, "api");
    assert_eq!(config.naming.response_type_suffix, "Response");
    assert!(!config.generate_client);
    assert!(!config.compatibility.legacy_name_resolution);
    assert!(config.filter.is_empty());
  }

  #[test]
  fn test_config_deserializes_kebab_case() {
    let yaml = r"
package-name: petstore
generate-client: true
filter:
  exclude-tags: [internal]
naming:
  response-type-suffix: Reply
import-mapping:
  common.yaml: crate::common
compatibility:
  legacy-name-resolution: true
";
    let config: GeneratorConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.package_name, "petstore");
    assert!(config.generate_client);
    assert!(config.filter.exclude_tags.contains("internal"));
    assert_eq!(config.naming.response_type_suffix, "Reply");
    assert_eq!(
      config.import_mapping.get("common.yaml").map(String::as_str),
      Some("crate::common")
    );
    assert!(config.compatibility.legacy_name_resolution);
    assert!(!config.skip_prune);
  }

  #[test]
  fn test_filter_by_tags() {
    let filter = OperationFilter::builder()
      .include_tags(BTreeSet::from(["pets".to_string()]))
      .exclude_tags(BTreeSet::from(["internal".to_string()]))
      .build();
    let get = http::Method::GET;

    assert!(filter.allows(&operation(Some("a"), &["pets"]), &get, "/pets"));
    assert!(!filter.allows(&operation(Some("b"), &["stores"]), &get, "/stores"));
    assert!(!filter.allows(&operation(Some("c"), &["pets", "internal"]), &get, "/pets"));
    assert!(!filter.allows(&operation(Some("d"), &[]), &get, "/untagged"));
  }

  #[test]
  fn test_filter_by_operation_id_uses_fallback() {
    let filter = OperationFilter::builder()
      .exclude_operation_ids(BTreeSet::from(["get_pets_by_id".to_string()]))
      .build();

    assert!(!filter.allows(&operation(None, &[]), &http::Method::GET, "/pets/{id}"));
    assert!(filter.allows(&operation(None, &[]), &http::Method::GET, "/pets"));
  }
}
