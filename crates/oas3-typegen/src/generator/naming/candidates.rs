use std::collections::BTreeMap;

use super::{
  content_types::content_type_tag,
  identifiers::{fallback_operation_id, path_template_name, status_code_name, to_rust_type_name},
};
use crate::generator::{
  config::NamingOptions,
  gather::{GatheredSchema, SchemaContext},
};

const PARAMETER_SUFFIX: &str = "Parameter";
const REQUEST_SUFFIX: &str = "Request";
const RESPONSE_SUFFIX: &str = "Response";

/// Initial name for every record, in record order.
///
/// Request and response candidates carry a content-type tag only when the same
/// body (or the same status code) was gathered under more than one media type.
pub(crate) fn initial_candidates(records: &[GatheredSchema], naming: &NamingOptions) -> Vec<String> {
  let media_counts = media_type_counts(records);

  records
    .iter()
    .map(|record| {
      if let Some(renamed) = &record.overrides.renamed_to {
        return renamed.clone();
      }

      let tag = || {
        let multiple = media_counts.get(&media_group(record)).is_some_and(|count| *count > 1);
        match (&record.content_type, multiple) {
          (Some(content_type), true) => content_type_tag(content_type),
          _ => String::new(),
        }
      };

      match record.context {
        SchemaContext::ComponentSchema
        | SchemaContext::ComponentParameter
        | SchemaContext::ComponentResponse
        | SchemaContext::ComponentRequestBody
        | SchemaContext::ComponentHeader => to_rust_type_name(record.component_name.as_deref().unwrap_or_default()),
        SchemaContext::ClientResponseWrapper => {
          format!("{}{}", operation_type_name(record), naming.response_type_suffix)
        }
        SchemaContext::OperationParameter if record.method.is_none() => {
          let api_path = record.api_path.as_deref().unwrap_or_default();
          format!("{}{PARAMETER_SUFFIX}", path_template_name(api_path))
        }
        SchemaContext::OperationParameter => format!("{}{PARAMETER_SUFFIX}", operation_type_name(record)),
        SchemaContext::OperationRequestBody => {
          format!("{}{}{REQUEST_SUFFIX}", operation_type_name(record), tag())
        }
        SchemaContext::OperationResponse => {
          let status = record.status_code.as_deref().map(status_code_name).unwrap_or_default();
          format!("{}{status}{}{RESPONSE_SUFFIX}", operation_type_name(record), tag())
        }
      }
    })
    .collect()
}

/// Type-cased operation id, or the method/path fallback when none was declared.
pub(crate) fn operation_type_name(record: &GatheredSchema) -> String {
  let id = match (&record.operation_id, &record.method, &record.api_path) {
    (Some(id), _, _) => id.clone(),
    (None, Some(method), Some(api_path)) => match method.to_ascii_uppercase().parse::<http::Method>() {
      Ok(method) => fallback_operation_id(&method, api_path),
      Err(_) => format!("{method}{api_path}"),
    },
    _ => record.path.to_string(),
  };
  to_rust_type_name(&id)
}

/// Records sharing a body (or a status code) but differing in media type.
fn media_group(record: &GatheredSchema) -> (String, Option<String>) {
  let owner = record
    .path
    .segments()
    .iter()
    .take_while(|segment| *segment != "content")
    .cloned()
    .collect::<Vec<_>>()
    .join("/");
  (owner, record.status_code.clone())
}

fn media_type_counts(records: &[GatheredSchema]) -> BTreeMap<(String, Option<String>), usize> {
  let mut counts = BTreeMap::new();
  for record in records.iter().filter(|record| {
    matches!(
      record.context,
      SchemaContext::OperationRequestBody | SchemaContext::OperationResponse
    )
  }) {
    *counts.entry(media_group(record)).or_insert(0) += 1;
  }
  counts
}
