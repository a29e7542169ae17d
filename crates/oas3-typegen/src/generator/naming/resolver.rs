//! Assigns every gathered schema a unique output type name.
//!
//! Names start from [`initial_candidates`] and are refined pass by pass until no
//! two records share a name. Each pass groups records by their current name and
//! applies, per colliding group, the first strategy that changes something:
//!
//! 1. context suffix (`Schema`, `Parameter`, `Body`, ...), with component
//!    schemas keeping their bare name;
//! 2. a per-schema discriminator (content-type tag, then status code, then
//!    parameter index);
//! 3. a numeric suffix.
//!
//! Every mutation is recorded in the decision log.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use strum::Display;

use super::{
  candidates::initial_candidates,
  content_types::content_type_tag,
  identifiers::{ensure_unique, status_code_name},
};
use crate::{
  generator::{
    config::GeneratorConfig,
    errors::{GeneratorError, GeneratorResult},
    gather::GatheredSchema,
  },
  spec::DocumentPath,
};

pub const MAX_RESOLUTION_PASSES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum NamingStrategy {
  ContextSuffix,
  ContentType,
  StatusCode,
  ParameterIndex,
  NumericSuffix,
  Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameDecision {
  pub path: DocumentPath,
  pub from: String,
  pub to: String,
  pub strategy: NamingStrategy,
}

/// Final document path to type name assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NameMap(BTreeMap<DocumentPath, String>);

impl NameMap {
  pub fn get(&self, path: &DocumentPath) -> Option<&str> {
    self.0.get(path).map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&DocumentPath, &str)> {
    self.0.iter().map(|(path, name)| (path, name.as_str()))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn names(&self) -> BTreeSet<&str> {
    self.0.values().map(String::as_str).collect()
  }
}

impl FromIterator<(DocumentPath, String)> for NameMap {
  fn from_iter<T: IntoIterator<Item = (DocumentPath, String)>>(iter: T) -> Self {
    Self(iter.into_iter().collect())
  }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NameResolution {
  pub names: NameMap,
  pub decisions: Vec<NameDecision>,
}

pub fn resolve_names(records: &[GatheredSchema], config: &GeneratorConfig) -> GeneratorResult<NameResolution> {
  resolve_names_within(records, config, MAX_RESOLUTION_PASSES)
}

pub(super) fn resolve_names_within(
  records: &[GatheredSchema],
  config: &GeneratorConfig,
  max_passes: usize,
) -> GeneratorResult<NameResolution> {
  let candidates = initial_candidates(records, &config.naming);
  let mut resolver = NameResolver {
    records,
    names: candidates,
    decisions: vec![],
  };

  if config.compatibility.legacy_name_resolution {
    resolver.resolve_legacy();
  } else {
    resolver.resolve(max_passes)?;
  }

  Ok(resolver.finish())
}

struct NameResolver<'a> {
  records: &'a [GatheredSchema],
  names: Vec<String>,
  decisions: Vec<NameDecision>,
}

impl NameResolver<'_> {
  fn finish(self) -> NameResolution {
    let names = self
      .records
      .iter()
      .zip(self.names)
      .map(|(record, name)| (record.path.clone(), name))
      .collect();
    NameResolution {
      names,
      decisions: self.decisions,
    }
  }

  fn rename(&mut self, index: usize, to: String, strategy: NamingStrategy) {
    let from = std::mem::replace(&mut self.names[index], to.clone());
    let path = self.records[index].path.clone();
    tracing::debug!(%path, %from, %to, %strategy, "renamed colliding type");
    self.decisions.push(NameDecision {
      path,
      from,
      to,
      strategy,
    });
  }

  /// Groups of record indices sharing a name, in name order.
  fn collisions(&self) -> BTreeMap<String, Vec<usize>> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, name) in self.names.iter().enumerate() {
      groups.entry(name.clone()).or_default().push(index);
    }
    groups.retain(|_, members| members.len() > 1);
    groups
  }

  fn resolve(&mut self, max_passes: usize) -> GeneratorResult<()> {
    for pass in 0..max_passes {
      let collisions = self.collisions();
      if collisions.is_empty() {
        tracing::debug!(passes = pass, "type names resolved");
        return Ok(());
      }

      for members in collisions.into_values() {
        if !self.apply_context_suffix(&members) && !self.apply_per_schema(&members) {
          self.apply_numeric_suffix(&members);
        }
      }
    }

    let remaining = self.collisions();
    if remaining.is_empty() {
      return Ok(());
    }
    Err(GeneratorError::NameResolutionDiverged {
      iterations: max_passes,
      collisions: remaining.into_keys().collect(),
    })
  }

  fn apply_context_suffix(&mut self, members: &[usize]) -> bool {
    let suffixes: BTreeSet<&str> = members
      .iter()
      .map(|&index| self.records[index].context.collision_suffix())
      .collect();
    if suffixes.len() < 2 {
      return false;
    }

    let privileged: Vec<usize> = members
      .iter()
      .copied()
      .filter(|&index| self.records[index].context.is_privileged())
      .collect();
    let keeper = match privileged.as_slice() {
      [only] => Some(*only),
      _ => None,
    };

    let mut changed = false;
    for &index in members {
      if Some(index) == keeper {
        continue;
      }
      let suffix = self.records[index].context.collision_suffix();
      if self.names[index].ends_with(suffix) {
        continue;
      }
      let renamed = format!("{}{suffix}", self.names[index]);
      self.rename(index, renamed, NamingStrategy::ContextSuffix);
      changed = true;
    }
    changed
  }

  fn apply_per_schema(&mut self, members: &[usize]) -> bool {
    let strategies: [(NamingStrategy, fn(&GatheredSchema) -> Option<String>); 3] = [
      (NamingStrategy::ContentType, |record| {
        record.content_type.as_deref().map(content_type_tag)
      }),
      (NamingStrategy::StatusCode, |record| {
        record.status_code.as_deref().map(status_code_name)
      }),
      (NamingStrategy::ParameterIndex, |record| {
        record.parameter_index.map(|index| index.to_string())
      }),
    ];

    for (strategy, discriminator) in strategies {
      let values: Vec<Option<String>> = members
        .iter()
        .map(|&index| discriminator(&self.records[index]))
        .collect();
      let distinct: BTreeSet<&String> = values.iter().flatten().collect();
      if distinct.len() < 2 {
        continue;
      }

      let mut changed = false;
      for (&index, value) in members.iter().zip(values) {
        let Some(value) = value else {
          continue;
        };
        if self.names[index].ends_with(&value) {
          continue;
        }
        let renamed = format!("{}{value}", self.names[index]);
        self.rename(index, renamed, strategy);
        changed = true;
      }
      if changed {
        return true;
      }
    }
    false
  }

  fn apply_numeric_suffix(&mut self, members: &[usize]) {
    let mut ordered = members.to_vec();
    ordered.sort_by(|&a, &b| {
      let (a, b) = (&self.records[a], &self.records[b]);
      (!a.context.is_privileged(), a.path.to_string()).cmp(&(!b.context.is_privileged(), b.path.to_string()))
    });

    let mut used: BTreeSet<String> = self.names.iter().cloned().collect();
    for &index in ordered.iter().skip(1) {
      let renamed = ensure_unique(&self.names[index], &used);
      used.insert(renamed.clone());
      self.rename(index, renamed, NamingStrategy::NumericSuffix);
    }
  }

  /// First come keeps the name, later duplicates take the next free numeric suffix.
  fn resolve_legacy(&mut self) {
    let mut used = BTreeSet::new();
    for index in 0..self.names.len() {
      let unique = ensure_unique(&self.names[index], &used);
      if unique != self.names[index] {
        self.rename(index, unique.clone(), NamingStrategy::Legacy);
      }
      used.insert(unique);
    }
  }
}
