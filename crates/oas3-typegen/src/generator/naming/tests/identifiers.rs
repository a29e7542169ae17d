use std::collections::BTreeSet;

use crate::generator::naming::identifiers::{
  ensure_unique, fallback_operation_id, path_template_name, sanitize, status_code_name, to_rust_field_name,
  to_rust_type_name,
};

#[test]
fn test_field_names() {
  let cases = [
    ("foo-bar", "foo_bar"),
    ("fooBar", "foo_bar"),
    ("match", "r#match"),
    ("type", "r#type"),
    ("self", "self_"),
    ("123name", "_123name"),
    ("", "_"),
    ("  ", "_"),
    ("-created-date", "negative_created_date"),
    ("-", "_"),
    ("café", "cafe"),
  ];
  for (input, expected) in cases {
    assert_eq!(to_rust_field_name(input), expected, "failed for input {input:?}");
  }
}

#[test]
fn test_type_names() {
  let cases = [
    ("oAuth", "OAuth"),
    ("-INF", "NegativeInf"),
    ("123Response", "T123Response"),
    ("", "Unnamed"),
    ("  ", "Unnamed"),
    ("BetaResponseMCPToolUseBlock", "BetaResponseMCPToolUseBlock"),
    ("XMLHttpRequest", "XMLHttpRequest"),
    ("xmlHttpRequest", "XmlHttpRequest"),
    ("beta_response_mcp_tool_use_block", "BetaResponseMcpToolUseBlock"),
    ("beta-response-mcp-tool-use-block", "BetaResponseMcpToolUseBlock"),
    ("beta_ResponseMCP", "BetaResponseMcp"),
    ("Beta-Response-MCP", "BetaResponseMcp"),
    ("NOT_FORCED", "NotForced"),
    ("ADD", "Add"),
    ("pet", "Pet"),
    ("createChatCompletion", "CreateChatCompletion"),
    ("get_pets_by_id", "GetPetsById"),
    ("pet.v1.Dog", "PetV1Dog"),
    ("application/problem+json", "ApplicationProblemJson"),
    ("String", "StringType"),
    ("option", "OptionType"),
    ("Self", "SelfType"),
  ];
  for (input, expected) in cases {
    assert_eq!(to_rust_type_name(input), expected, "failed for input {input:?}");
  }
}

#[test]
fn test_sanitize() {
  let cases = [
    ("hello world", "hello_world"),
    ("__a--b__", "a_b"),
    ("naïve", "naive"),
    ("", ""),
    ("$$$", ""),
  ];
  for (input, expected) in cases {
    assert_eq!(sanitize(input), expected, "failed for input {input:?}");
  }
}

#[test]
fn test_ensure_unique() {
  let used = BTreeSet::from(["Pet".to_string(), "Pet2".to_string()]);
  assert_eq!(ensure_unique("Pet", &used), "Pet3");
  assert_eq!(ensure_unique("Owner", &used), "Owner");
}

#[test]
fn test_fallback_operation_id() {
  let cases = [
    (http::Method::GET, "/pets/{petId}", "get_pets_by_id"),
    (http::Method::POST, "/pets", "post_pets"),
    (http::Method::DELETE, "/", "delete"),
    (http::Method::PUT, "/stores/{storeId}/pets/{petId}", "put_stores_by_id_pets_by_id"),
  ];
  for (method, path, expected) in cases {
    assert_eq!(fallback_operation_id(&method, path), expected, "failed for {method} {path}");
  }
}

#[test]
fn test_path_template_name() {
  let cases = [
    ("/pets/{petId}/toys", "PetsPetIdToys"),
    ("/v1/chat/completions", "V1ChatCompletions"),
    ("/", "Root"),
    ("", "Root"),
  ];
  for (input, expected) in cases {
    assert_eq!(path_template_name(input), expected, "failed for input {input:?}");
  }
}

#[test]
fn test_status_code_name() {
  let cases = [("200", "200"), ("2XX", "2XX"), ("2xx", "2XX"), ("default", "Default")];
  for (input, expected) in cases {
    assert_eq!(status_code_name(input), expected, "failed for input {input:?}");
  }
}
