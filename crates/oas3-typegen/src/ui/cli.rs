use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, Colors, ThemeMode};

#[derive(Parser, Debug)]
#[command(name = "oas3-typegen")]
#[command(author, version, about = "Resolve OpenAPI schemas into named Rust type descriptors")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List information from an OpenAPI document
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Resolve every schema of an OpenAPI document and write the type manifest
  Generate(GenerateCommand),
}

#[derive(Args, Debug, Default)]
pub struct GenerateCommand {
  /// Path to the OpenAPI document (JSON or YAML)
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Path where the JSON manifest will be written
  #[arg(short, long, value_name = "FILE")]
  pub output: PathBuf,

  /// Generator configuration file (YAML or JSON); flags override its values
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Synthesize one client response wrapper type per operation
  #[arg(long, default_value_t = false)]
  pub client: bool,

  /// Include only operations carrying one of these tags (comma-separated)
  #[arg(long, value_name = "TAGS", value_delimiter = ',')]
  pub include_tags: Option<Vec<String>>,

  /// Exclude operations carrying one of these tags (comma-separated)
  #[arg(long, value_name = "TAGS", value_delimiter = ',')]
  pub exclude_tags: Option<Vec<String>>,

  /// Include only specific operations (comma-separated operation ids)
  #[arg(long, value_name = "IDS", value_delimiter = ',')]
  pub only: Option<Vec<String>>,

  /// Exclude specific operations (comma-separated operation ids)
  #[arg(long, value_name = "IDS", value_delimiter = ',')]
  pub exclude: Option<Vec<String>>,

  /// Override a primitive mapping, e.g. `string.uuid=Uuid@uuid::Uuid` (repeatable)
  #[arg(long, value_name = "TYPE[.FORMAT]=RUST_TYPE")]
  pub customize: Option<Vec<String>>,

  /// Map an external document to a module path, e.g. `common.yaml=crate::common` (repeatable)
  #[arg(long, value_name = "DOCUMENT=MODULE")]
  pub import_mapping: Option<Vec<String>>,

  /// Suffix for client response wrapper names
  #[arg(long, value_name = "SUFFIX")]
  pub response_type_suffix: Option<String>,

  /// Use single-pass first-come naming with numeric suffixes
  #[arg(long, default_value_t = false)]
  pub legacy_names: bool,

  /// Keep components no operation references
  #[arg(long, default_value_t = false)]
  pub skip_prune: bool,

  /// Enable verbose output with detailed progress information
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List all operations defined in the OpenAPI document
  Operations {
    /// Path to the OpenAPI document (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
  /// List the resolved type name of every schema-bearing location
  Names {
    /// Path to the OpenAPI document (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Include client response wrappers
    #[arg(long, default_value_t = false)]
    client: bool,
  },
}

impl Cli {
  /// `tracing` filter directive for the selected verbosity.
  pub fn log_directive(&self) -> &'static str {
    match &self.command {
      Commands::Generate(command) if command.verbose => "oas3_typegen=debug",
      Commands::Generate(command) if command.quiet => "error",
      _ => "warn",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_generate_command() {
    let cli = Cli::try_parse_from([
      "oas3-typegen",
      "generate",
      "-i",
      "openapi.yaml",
      "-o",
      "types.json",
      "--client",
      "--exclude-tags",
      "internal,beta",
      "--customize",
      "string.uuid=Uuid@uuid::Uuid",
      "--customize",
      "integer=i32",
      "-v",
    ])
    .unwrap();

    assert_eq!(cli.log_directive(), "oas3_typegen=debug");
    let Commands::Generate(command) = cli.command else {
      panic!("expected the generate command");
    };
    assert!(command.client);
    assert_eq!(
      command.exclude_tags,
      Some(vec!["internal".to_string(), "beta".to_string()])
    );
    assert_eq!(command.customize.map(|entries| entries.len()), Some(2));
    assert_eq!(command.input, PathBuf::from("openapi.yaml"));
  }

  #[test]
  fn test_parse_list_names() {
    let cli = Cli::try_parse_from(["oas3-typegen", "list", "names", "-i", "spec.json", "--client", "--color", "never"])
      .unwrap();

    assert!(matches!(cli.color, ColorMode::Never));
    assert_eq!(cli.log_directive(), "warn");
    assert!(matches!(
      cli.command,
      Commands::List {
        list_command: ListCommands::Names { client: true, .. }
      }
    ));
  }
}
