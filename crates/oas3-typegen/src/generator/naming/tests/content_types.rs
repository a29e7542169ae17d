use crate::generator::naming::content_types::{content_type_tag, essence, is_json};

#[test]
fn test_essence_drops_parameters() {
  assert_eq!(essence("application/json; charset=utf-8"), "application/json");
  assert_eq!(essence(" Application/JSON "), "application/json");
}

#[test]
fn test_json_family() {
  let cases = [
    ("application/json", true),
    ("application/json; charset=utf-8", true),
    ("application/problem+json", true),
    ("application/vnd.api+json", true),
    ("text/json", true),
    ("application/xml", false),
    ("text/plain", false),
    ("multipart/form-data", false),
    ("application/octet-stream", false),
  ];
  for (content_type, expected) in cases {
    assert_eq!(is_json(content_type), expected, "failed for {content_type}");
  }
}

#[test]
fn test_content_type_tags() {
  let cases = [
    ("application/json", "JSON"),
    ("application/xml", "XML"),
    ("text/xml", "XML"),
    ("application/x-www-form-urlencoded", "Form"),
    ("multipart/form-data", "Form"),
    ("text/plain; charset=utf-8", "Text"),
    ("application/octet-stream", "Binary"),
    ("application/x-yaml", "YAML"),
    ("application/problem+json", "ApplicationProblemJson"),
  ];
  for (content_type, expected) in cases {
    assert_eq!(content_type_tag(content_type), expected, "failed for {content_type}");
  }
}
