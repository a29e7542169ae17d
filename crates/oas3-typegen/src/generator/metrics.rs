use serde::Serialize;
use strum::Display;

use crate::generator::{ast::TypeKind, gather::SchemaContext};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GenerationStats {
  pub operations_filtered: usize,
  pub components_pruned: usize,
  pub schemas_gathered: usize,
  pub component_schemas: usize,
  pub operation_schemas: usize,
  pub client_wrappers: usize,
  pub names_disambiguated: usize,
  pub types_translated: usize,
  pub structs: usize,
  pub unions: usize,
  pub references: usize,
  pub operations_described: usize,
  pub cycles_detected: usize,
  pub cycle_details: Vec<Vec<String>>,
  pub warnings: Vec<GenerationWarning>,
}

impl GenerationStats {
  pub fn record_gathered(&mut self, context: SchemaContext) {
    self.schemas_gathered += 1;
    match context {
      SchemaContext::ComponentSchema => self.component_schemas += 1,
      SchemaContext::ClientResponseWrapper => self.client_wrappers += 1,
      SchemaContext::OperationParameter | SchemaContext::OperationRequestBody | SchemaContext::OperationResponse => {
        self.operation_schemas += 1;
      }
      SchemaContext::ComponentParameter
      | SchemaContext::ComponentResponse
      | SchemaContext::ComponentRequestBody
      | SchemaContext::ComponentHeader => {}
    }
  }

  pub fn record_translated(&mut self, kind: &TypeKind) {
    self.types_translated += 1;
    match kind {
      TypeKind::Struct => self.structs += 1,
      TypeKind::Union { .. } => self.unions += 1,
      TypeKind::Reference => self.references += 1,
      TypeKind::Primitive(_) | TypeKind::Array(_) | TypeKind::Map(_) | TypeKind::Any => {}
    }
  }

  pub fn record_cycles(&mut self, cycles: Vec<Vec<String>>) {
    self.cycles_detected += cycles.len();
    self.cycle_details.extend(cycles);
  }

  pub fn record_warning(&mut self, warning: GenerationWarning) {
    tracing::warn!("{warning}");
    self.warnings.push(warning);
  }

  pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = GenerationWarning>) {
    for warning in warnings {
      self.record_warning(warning);
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum GenerationWarning {
  #[strum(to_string = "{method} {path} has no operationId; no client response wrapper generated")]
  MissingOperationId { method: String, path: String },
  #[strum(to_string = "{path}: media type '{content_type}' is not JSON and produces no type")]
  NonJsonContent { path: String, content_type: String },
  #[strum(to_string = "{path}: parameter has neither a schema nor JSON content")]
  UntypedParameter { path: String },
}

impl GenerationWarning {
  pub fn is_skipped_item(&self) -> bool {
    matches!(self, Self::MissingOperationId { .. } | Self::UntypedParameter { .. })
  }
}
