use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Context;
use chrono::{Local, Timelike};
use crossterm::style::Stylize;
use itertools::Itertools;

use crate::{
  generator::{
    config::GeneratorConfig,
    converter::TypeCustomization,
    metrics::GenerationStats,
    orchestrator::{GenerationOutput, Orchestrator},
  },
  ui::{Colors, GenerateCommand},
  utils::spec::SpecLoader,
};

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
  pub input: PathBuf,
  pub output: PathBuf,
  pub verbose: bool,
  pub quiet: bool,
  pub generator: GeneratorConfig,
}

impl GenerateConfig {
  /// Reads `--config` when given, then lets the flags override it.
  pub async fn from_command(command: GenerateCommand) -> anyhow::Result<Self> {
    let mut generator = match &command.config {
      Some(path) => {
        let text = tokio::fs::read_to_string(path)
          .await
          .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_yaml::from_str::<GeneratorConfig>(&text)
          .with_context(|| format!("invalid generator config {}", path.display()))?
      }
      None => GeneratorConfig::default(),
    };
    apply_command(&mut generator, &command)?;

    let GenerateCommand {
      input,
      output,
      verbose,
      quiet,
      ..
    } = command;

    Ok(Self {
      input,
      output,
      verbose,
      quiet,
      generator,
    })
  }

  async fn write_manifest(&self, output: &GenerationOutput) -> anyhow::Result<()> {
    let manifest = serde_json::to_string_pretty(output)?;
    if let Some(parent) = self.output.parent()
      && !parent.as_os_str().is_empty()
    {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&self.output, manifest)
      .await
      .with_context(|| format!("failed to write {}", self.output.display()))
  }
}

/// Flags only ever add to (or switch on) what the config file set.
fn apply_command(config: &mut GeneratorConfig, command: &GenerateCommand) -> anyhow::Result<()> {
  config.generate_client |= command.client;
  config.skip_prune |= command.skip_prune;
  config.compatibility.legacy_name_resolution |= command.legacy_names;
  if let Some(suffix) = &command.response_type_suffix {
    config.naming.response_type_suffix.clone_from(suffix);
  }

  let filter = &mut config.filter;
  filter.include_tags.extend(command.include_tags.iter().flatten().cloned());
  filter.exclude_tags.extend(command.exclude_tags.iter().flatten().cloned());
  filter.include_operation_ids.extend(command.only.iter().flatten().cloned());
  filter.exclude_operation_ids.extend(command.exclude.iter().flatten().cloned());

  for entry in command.customize.iter().flatten() {
    let customization = entry
      .parse::<TypeCustomization>()
      .with_context(|| format!("invalid --customize '{entry}'"))?;
    config.type_mapping.insert(customization);
  }
  config
    .import_mapping
    .extend(parse_import_mappings(command.import_mapping.as_deref())?);

  Ok(())
}

fn parse_import_mappings(entries: Option<&[String]>) -> anyhow::Result<BTreeMap<String, String>> {
  let Some(entries) = entries else {
    return Ok(BTreeMap::new());
  };

  let mut map = BTreeMap::new();
  for entry in entries {
    let (document, module) = entry
      .split_once('=')
      .map(|(document, module)| (document.trim(), module.trim()))
      .filter(|(document, module)| !document.is_empty() && !module.is_empty())
      .ok_or_else(|| {
        anyhow::anyhow!("Invalid import mapping '{entry}': expected DOCUMENT=MODULE (e.g., common.yaml=crate::common)")
      })?;
    map.insert(document.to_string(), module.to_string());
  }
  Ok(map)
}

struct GenerateLogger<'a> {
  config: &'a GenerateConfig,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  fn new(config: &'a GenerateConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!("{} {message}", format_timestamp().with(self.colors.timestamp()));
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      );
    }
  }

  fn log_loading(&self) {
    self.info(
      &format!("Loading OpenAPI document from: {}", self.config.input.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_resolving(&self, output_kind: &str) {
    self.info(&format!("Resolving {output_kind}...").with(self.colors.primary()).to_string());
  }

  fn print_statistics(&self, stats: &GenerationStats) {
    if self.config.quiet {
      return;
    }

    if stats.operations_filtered > 0 {
      self.stat("Operations filtered:", stats.operations_filtered.to_string());
    }
    self.stat("Components pruned:", stats.components_pruned.to_string());
    self.stat("Schemas gathered:", stats.schemas_gathered.to_string());
    self.stat("", format!("{} component schemas", stats.component_schemas));
    self.stat("", format!("{} operation schemas", stats.operation_schemas));
    if stats.client_wrappers > 0 {
      self.stat("", format!("{} client wrappers", stats.client_wrappers));
    }
    self.stat("Names disambiguated:", stats.names_disambiguated.to_string());
    self.stat("Types translated:", stats.types_translated.to_string());
    self.stat(
      "",
      format!(
        "{} structs, {} unions, {} references",
        stats.structs, stats.unions, stats.references
      ),
    );
    self.stat("Operations described:", stats.operations_described.to_string());
    if !stats.warnings.is_empty() {
      self.stat("Warnings:", stats.warnings.len().to_string());
    }

    self.print_cycles(stats);
    self.print_warnings(stats);
  }

  fn print_cycles(&self, stats: &GenerationStats) {
    if stats.cycles_detected == 0 {
      return;
    }

    self.stat("Cycles:", stats.cycles_detected.to_string());

    if self.config.verbose {
      for (i, cycle) in stats.cycle_details.iter().enumerate() {
        println!(
          "              {}: {}",
          format!("Cycle {}", i + 1).with(self.colors.accent()),
          cycle.iter().join(" -> ").with(self.colors.timestamp())
        );
      }
    }
  }

  fn print_warnings(&self, stats: &GenerationStats) {
    let mut printed_header = false;
    for warning in &stats.warnings {
      if !warning.is_skipped_item() && !self.config.verbose {
        continue;
      }

      if !printed_header {
        println!();
        printed_header = true;
      }

      let label = if warning.is_skipped_item() { "Skipped:" } else { "Warning:" };
      eprintln!(
        "{} {}",
        label.with(self.colors.accent()),
        warning.to_string().with(self.colors.primary())
      );
    }
  }

  fn log_writing(&self) {
    self.info(
      &format!("Writing manifest to: {}", self.config.output.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_success(&self, output: &GenerationOutput) {
    if !self.config.quiet {
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        format!(
          "Resolved {} types for {} {}",
          output.types.len(),
          output.api.title,
          output.api.version
        )
        .with(self.colors.success())
      );
    }
  }
}

pub async fn generate_code(config: GenerateConfig, colors: &Colors) -> anyhow::Result<()> {
  let logger = GenerateLogger::new(&config, colors);

  logger.log_loading();
  let bundle = SpecLoader::load_bundle(&config.input).await?;

  let output_kind = if config.generator.generate_client {
    "types and client wrappers"
  } else {
    "types"
  };
  logger.log_resolving(output_kind);
  let output = Orchestrator::new(bundle, config.generator.clone()).generate()?;
  logger.print_statistics(&output.stats);

  logger.log_writing();
  config.write_manifest(&output).await?;

  logger.log_success(&output);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn command() -> GenerateCommand {
    GenerateCommand {
      input: PathBuf::from("openapi.yaml"),
      output: PathBuf::from("out/types.json"),
      ..Default::default()
    }
  }

  #[test]
  fn test_parse_import_mappings_none() {
    assert!(parse_import_mappings(None).unwrap().is_empty());
  }

  #[test]
  fn test_parse_import_mappings_entries() {
    let entries = vec![
      "common.yaml=crate::common".to_string(),
      " shared/errors.json = crate::errors ".to_string(),
    ];
    let result = parse_import_mappings(Some(&entries)).unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.get("common.yaml").map(String::as_str), Some("crate::common"));
    assert_eq!(result.get("shared/errors.json").map(String::as_str), Some("crate::errors"));
  }

  #[test]
  fn test_parse_import_mappings_invalid() {
    for entry in ["common.yaml", "=crate::common", "common.yaml="] {
      let err = parse_import_mappings(Some(&[entry.to_string()])).unwrap_err();
      assert!(err.to_string().contains("Invalid import mapping"), "failed for {entry:?}");
    }
  }

  #[test]
  fn test_flags_override_config() {
    let mut config = GeneratorConfig::builder().package_name("petstore").build();
    config.filter.exclude_tags.insert("internal".to_string());

    let command = GenerateCommand {
      client: true,
      legacy_names: true,
      exclude_tags: Some(vec!["beta".to_string()]),
      only: Some(vec!["listPets".to_string()]),
      customize: Some(vec!["string.uuid=Uuid@uuid::Uuid".to_string()]),
      import_mapping: Some(vec!["common.yaml=crate::common".to_string()]),
      response_type_suffix: Some("Reply".to_string()),
      ..command()
    };
    apply_command(&mut config, &command).unwrap();

    assert_eq!(config.package_name, "petstore");
    assert!(config.generate_client);
    assert!(config.compatibility.legacy_name_resolution);
    assert!(!config.skip_prune);
    assert_eq!(config.filter.exclude_tags.len(), 2);
    assert!(config.filter.include_operation_ids.contains("listPets"));
    assert_eq!(config.naming.response_type_suffix, "Reply");
    assert_eq!(
      config.import_mapping.get("common.yaml").map(String::as_str),
      Some("crate::common")
    );

    let uuid = config
      .effective_type_mapping()
      .lookup(crate::spec::SchemaType::String, Some("uuid"))
      .cloned();
    assert_eq!(uuid.map(|spec| spec.type_name), Some("Uuid".to_string()));
  }

  #[test]
  fn test_invalid_customization_is_rejected() {
    let command = GenerateCommand {
      customize: Some(vec!["object=Thing".to_string()]),
      ..command()
    };
    let err = apply_command(&mut GeneratorConfig::default(), &command).unwrap_err();
    assert!(err.to_string().contains("invalid --customize 'object=Thing'"));
  }

  #[tokio::test]
  async fn test_from_command_reads_config_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    std::io::Write::write_all(&mut file, b"package-name: store\nskip-prune: true\n").unwrap();

    let config = GenerateConfig::from_command(GenerateCommand {
      config: Some(file.path().to_path_buf()),
      client: true,
      ..command()
    })
    .await
    .unwrap();

    assert_eq!(config.generator.package_name, "store");
    assert!(config.generator.skip_prune);
    assert!(config.generator.generate_client);
    assert_eq!(config.output, PathBuf::from("out/types.json"));
  }
}
