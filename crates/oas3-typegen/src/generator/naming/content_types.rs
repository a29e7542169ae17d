use mediatype::MediaType;

use super::identifiers::to_rust_type_name;

/// Media type without parameters, lowercased (`application/json; charset=utf-8` -> `application/json`).
pub fn essence(content_type: &str) -> String {
  content_type
    .split(';')
    .next()
    .unwrap_or_default()
    .trim()
    .to_ascii_lowercase()
}

/// JSON family: `application/json`, any `+json` suffix, and `*/json` subtypes.
pub fn is_json(content_type: &str) -> bool {
  let essence = essence(content_type);
  let Ok(media) = MediaType::parse(&essence) else {
    return essence.ends_with("json");
  };

  let suffix = media.suffix.as_ref().map(mediatype::Name::as_str);
  matches!((media.subty.as_str(), suffix), ("json", _) | (_, Some("json")))
}

/// Short tag used to tell apart types that differ only by content type.
pub fn content_type_tag(content_type: &str) -> String {
  let essence = essence(content_type);
  let tag = match essence.as_str() {
    "application/json" => "JSON",
    "application/xml" | "text/xml" => "XML",
    "application/x-www-form-urlencoded" | "multipart/form-data" => "Form",
    "text/plain" => "Text",
    "application/octet-stream" => "Binary",
    "application/yaml" | "application/x-yaml" | "text/yaml" => "YAML",
    _ => return to_rust_type_name(&essence),
  };
  tag.to_string()
}
