use std::collections::{BTreeMap, BTreeSet};

use petgraph::{algo::kosaraju_scc, graphmap::DiGraphMap};

use crate::{
  spec::{ComponentSection, Spec},
  utils::RefCollector,
};

/// Reference graph between the component schemas of one document.
///
/// Only local schema references are edges. Cycles are legal (references are
/// opaque to the translator) and are reported, not rejected.
#[derive(Debug, Default)]
pub struct SchemaGraph {
  /// schema name -> schemas it references
  dependencies: BTreeMap<String, BTreeSet<String>>,
  cycles: Vec<Vec<String>>,
  cyclic_schemas: BTreeSet<String>,
}

impl SchemaGraph {
  pub fn new(spec: &Spec) -> Self {
    let mut dependencies = BTreeMap::new();

    for (name, node) in spec.components.iter().flat_map(|components| &components.schemas) {
      let mut collector = RefCollector::new();
      collector.visit_schema_ref(node);
      let deps = collector
        .into_refs()
        .into_iter()
        .filter(|target| !target.is_external() && target.section == ComponentSection::Schemas)
        .map(|target| target.name)
        .collect();
      dependencies.insert(name.clone(), deps);
    }

    let cycles = detect_cycles(&dependencies);
    let cyclic_schemas = cycles.iter().flatten().cloned().collect();

    Self {
      dependencies,
      cycles,
      cyclic_schemas,
    }
  }

  pub fn dependencies(&self, schema_name: &str) -> Option<&BTreeSet<String>> {
    self.dependencies.get(schema_name)
  }

  /// Each cycle is sorted, and cycles are ordered by their first member.
  pub fn cycles(&self) -> &[Vec<String>] {
    &self.cycles
  }

  pub fn is_cyclic(&self, schema_name: &str) -> bool {
    self.cyclic_schemas.contains(schema_name)
  }

  pub fn into_cycles(self) -> Vec<Vec<String>> {
    self.cycles
  }
}

fn detect_cycles(dependencies: &BTreeMap<String, BTreeSet<String>>) -> Vec<Vec<String>> {
  let mut graph = DiGraphMap::<&str, ()>::new();
  for (node, deps) in dependencies {
    graph.add_node(node.as_str());
    for dep in deps {
      graph.add_edge(node.as_str(), dep.as_str(), ());
    }
  }

  let mut cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
    .into_iter()
    .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
    .map(|scc| {
      let mut members: Vec<String> = scc.into_iter().map(String::from).collect();
      members.sort();
      members
    })
    .collect();
  cycles.sort();
  cycles
}
