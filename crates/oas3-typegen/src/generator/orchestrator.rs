//! Orchestration for the OpenAPI schema resolution pipeline.
//!
//! The `Orchestrator` runs every stage with one explicit configuration value
//! and returns the emitter input as a single [`GenerationOutput`].
//!
//! ## Usage
//!
//! ```no_run
//! use oas3_typegen::{
//!   generator::{config::GeneratorConfig, orchestrator::Orchestrator},
//!   utils::spec::SpecLoader,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let bundle = SpecLoader::load_bundle("openapi.yaml".as_ref()).await?;
//! let output = Orchestrator::new(bundle, GeneratorConfig::default()).generate()?;
//!
//! println!("{} types, {} warnings", output.types.len(), output.stats.warnings.len());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;

use anyhow::Context;
use indexmap::IndexMap;
use serde::Serialize;

use crate::{
  generator::{
    ast::TypeDescriptor,
    config::GeneratorConfig,
    converter::Translator,
    gather::{SchemaContext, gather},
    metrics::GenerationStats,
    naming::{NameDecision, NameMap, resolve_names},
    operations::{OperationDescriptor, describe_operations},
    prune::{filter_operations, prune},
    schema_graph::SchemaGraph,
  },
  spec::{Spec, SpecBundle, SpecVersion},
};

pub struct Orchestrator {
  bundle: SpecBundle,
  config: GeneratorConfig,
}

/// Metadata about the API, taken from the `info` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiMetadata {
  pub title: String,
  pub version: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

/// One translated schema-bearing location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslatedType {
  pub name: String,
  pub context: SchemaContext,
  pub descriptor: TypeDescriptor,
}

/// Everything emitters consume. Serializes to the JSON manifest.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutput {
  pub package_name: String,
  pub openapi_version: SpecVersion,
  pub api: ApiMetadata,
  pub names: NameMap,
  pub decisions: Vec<NameDecision>,
  /// Keyed by document path, in gather order.
  pub types: IndexMap<String, TranslatedType>,
  pub operations: Vec<OperationDescriptor>,
  pub stats: GenerationStats,
  /// The document after pruning.
  #[serde(skip)]
  pub spec: Spec,
}

impl Orchestrator {
  pub fn new(bundle: SpecBundle, config: GeneratorConfig) -> Self {
    Self { bundle, config }
  }

  pub fn metadata(&self) -> ApiMetadata {
    let info = &self.bundle.root().info;
    ApiMetadata {
      title: info.title.clone(),
      version: info.version.clone(),
      description: info.description.clone(),
    }
  }

  /// Runs the pipeline:
  /// 1. version check
  /// 2. operation filtering and unreachable-component pruning
  /// 3. schema cycle detection
  /// 4. gathering
  /// 5. name resolution
  /// 6. translation of every gathered record
  /// 7. operation descriptors
  ///
  /// Any error aborts the run; there is no partial output.
  pub fn generate(&self) -> anyhow::Result<GenerationOutput> {
    let version = self.bundle.root().version()?;
    let mut bundle = self.bundle.clone();
    let mut stats = GenerationStats::default();

    let operations_before = bundle.root().operations().count();
    if self.config.skip_prune {
      filter_operations(bundle.root_mut(), &self.config.filter);
    } else {
      stats.components_pruned = prune(bundle.root_mut(), &self.config.filter);
    }
    stats.operations_filtered = operations_before - bundle.root().operations().count();
    tracing::info!(
      filtered = stats.operations_filtered,
      pruned = stats.components_pruned,
      "pruned document"
    );

    stats.record_cycles(SchemaGraph::new(bundle.root()).into_cycles());

    let gathered = gather(&bundle, &self.config).context("failed to gather schemas")?;
    stats.record_warnings(gathered.warnings);
    for record in &gathered.schemas {
      stats.record_gathered(record.context);
    }

    let resolution = resolve_names(&gathered.schemas, &self.config).context("failed to resolve type names")?;
    stats.names_disambiguated = resolution
      .decisions
      .iter()
      .map(|decision| &decision.path)
      .collect::<BTreeSet<_>>()
      .len();
    tracing::info!(
      schemas = stats.schemas_gathered,
      renamed = stats.names_disambiguated,
      "resolved type names"
    );

    let translator = Translator::new(&bundle, &resolution.names, &self.config, version);
    let mut types = IndexMap::with_capacity(gathered.schemas.len());
    for record in &gathered.schemas {
      let name = resolution
        .names
        .get(&record.path)
        .with_context(|| format!("no type name assigned to {}", record.path))?
        .to_string();
      let descriptor = translator
        .translate_gathered(record)
        .with_context(|| format!("failed to translate {}", record.path))?;
      stats.record_translated(&descriptor.kind);
      types.insert(
        record.path.to_string(),
        TranslatedType {
          name,
          context: record.context,
          descriptor,
        },
      );
    }

    let operations =
      describe_operations(&bundle, &resolution.names, &types).context("failed to describe operations")?;
    stats.operations_described = operations.len();

    Ok(GenerationOutput {
      package_name: self.config.package_name.clone(),
      openapi_version: version,
      api: self.metadata(),
      names: resolution.names,
      decisions: resolution.decisions,
      types,
      operations,
      stats,
      spec: bundle.into_root(),
    })
  }
}
