//! Operation filtering and unreachable-component removal.

use std::collections::BTreeSet;

use crate::{
  generator::config::OperationFilter,
  spec::{ComponentSection, Spec},
  utils::RefCollector,
};

/// Filters operations, then removes every component no operation (transitively) reaches.
///
/// Returns the number of components removed. The filter always runs; a
/// document without `paths` or `components` keeps its components.
pub fn prune(spec: &mut Spec, filter: &OperationFilter) -> usize {
  filter_operations(spec, filter);
  if spec.paths.is_none() || spec.components.is_none() {
    return 0;
  }
  prune_unreachable(spec)
}

/// Drops operations the filter rejects, and path items left without operations.
/// Returns the number of operations removed.
pub fn filter_operations(spec: &mut Spec, filter: &OperationFilter) -> usize {
  if filter.is_empty() {
    return 0;
  }
  let Some(paths) = spec.paths.as_mut() else {
    return 0;
  };

  let mut removed = 0;
  for (path, item) in paths.iter_mut() {
    let had_operations = item.has_operations();
    for (method, slot) in methods_in_order().into_iter().zip(item.slots_mut()) {
      if let Some(operation) = slot.as_ref()
        && !filter.allows(operation, &method, path)
      {
        tracing::debug!(%method, path, "operation filtered out");
        *slot = None;
        removed += 1;
      }
    }
    if had_operations && !item.has_operations() {
      item.parameters.clear();
    }
  }
  paths.retain(|_, item| item.has_operations() || !item.parameters.is_empty());

  removed
}

fn methods_in_order() -> [http::Method; 8] {
  [
    http::Method::GET,
    http::Method::PUT,
    http::Method::POST,
    http::Method::DELETE,
    http::Method::OPTIONS,
    http::Method::HEAD,
    http::Method::PATCH,
    http::Method::TRACE,
  ]
}

/// Removes unreferenced components until a fixed point. Security schemes are never removed.
pub fn prune_unreachable(spec: &mut Spec) -> usize {
  let mut removed = 0;

  loop {
    let reachable = collect_reachable(spec);
    let Some(components) = spec.components.as_mut() else {
      return removed;
    };

    let mut removed_this_pass = 0;
    for section in ComponentSection::PRUNABLE {
      for name in components.keys(section) {
        if !reachable.contains(&(section, name.clone())) && components.remove(section, &name) {
          tracing::debug!(%section, name, "pruned unreferenced component");
          removed_this_pass += 1;
        }
      }
    }

    if removed_this_pass == 0 {
      break;
    }
    removed += removed_this_pass;
  }

  removed
}

/// Local component keys referenced from operations, webhooks and the remaining components.
fn collect_reachable(spec: &Spec) -> BTreeSet<(ComponentSection, String)> {
  let mut collector = RefCollector::new();

  for item in spec.paths.iter().flat_map(|paths| paths.values()).chain(spec.webhooks.values()) {
    collector.visit_path_item(item);
  }
  if let Some(components) = &spec.components {
    collector.visit_components(components);
  }

  collector
    .into_refs()
    .into_iter()
    .filter(|target| !target.is_external())
    .map(|target| (target.section, target.name))
    .collect()
}
