use std::collections::BTreeSet;

use serde_json::json;

use super::support::{document, schema_ref, spec};
use crate::generator::schema_graph::SchemaGraph;

#[test]
fn test_detects_mutual_and_self_cycles() {
  let spec = spec(document(
    json!({}),
    json!({
      "schemas": {
        "Node": {"type": "object", "properties": {"children": {"type": "array", "items": schema_ref("Node")}}},
        "Employee": {"type": "object", "properties": {"team": schema_ref("Team")}},
        "Team": {"type": "object", "properties": {"lead": schema_ref("Employee"), "office": schema_ref("Office")}},
        "Office": {"type": "object", "properties": {"city": {"type": "string"}}}
      }
    }),
  ));

  let graph = SchemaGraph::new(&spec);

  assert_eq!(
    graph.cycles(),
    &[
      vec!["Employee".to_string(), "Team".to_string()],
      vec!["Node".to_string()],
    ]
  );
  assert!(graph.is_cyclic("Team"));
  assert!(!graph.is_cyclic("Office"));
  assert_eq!(
    graph.dependencies("Team"),
    Some(&BTreeSet::from(["Employee".to_string(), "Office".to_string()]))
  );
}

#[test]
fn test_acyclic_graph_and_non_schema_edges() {
  let spec = spec(document(
    json!({}),
    json!({
      "schemas": {
        "Order": {
          "allOf": [schema_ref("Base")],
          "properties": {
            "customer": {"$ref": "common.yaml#/components/schemas/Customer"},
            "page": {"$ref": "#/components/parameters/Page"}
          }
        },
        "Base": {"type": "object"}
      }
    }),
  ));

  let graph = SchemaGraph::new(&spec);

  assert!(graph.cycles().is_empty());
  assert_eq!(graph.dependencies("Order"), Some(&BTreeSet::from(["Base".to_string()])));
  assert_eq!(graph.dependencies("Missing"), None);
}
