use std::path::Path;

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};

use crate::{
  generator::{
    config::GeneratorConfig,
    naming::identifiers::{fallback_operation_id, to_rust_field_name},
    orchestrator::Orchestrator,
  },
  ui::{Colors, colors::comfy, term_width},
  utils::spec::SpecLoader,
};

fn table(colors: &Colors, headers: &[&str]) -> Table {
  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut row = Row::new();
  for header in headers {
    row.add_cell(Cell::new(header).fg(comfy(colors.label())));
  }
  table.set_header(row);
  table
}

pub async fn list_operations(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let spec = SpecLoader::open(input).await?.parse()?;

  let mut operations: Vec<(String, String, String)> = spec
    .operations()
    .map(|(path, method, operation)| {
      let id = operation
        .id()
        .map_or_else(|| fallback_operation_id(&method, path), ToString::to_string);
      (to_rust_field_name(&id), method.to_string(), path.to_string())
    })
    .collect();
  operations.sort_by(|a, b| a.0.cmp(&b.0));

  let mut table = table(colors, &["OPERATION ID", "METHOD", "PATH"]);
  for (operation_id, method, path) in operations {
    let mut row = Row::new();
    row.add_cell(
      Cell::new(operation_id)
        .fg(comfy(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(
      Cell::new(method)
        .fg(comfy(colors.accent()))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(Cell::new(path).fg(comfy(colors.primary())));
    table.add_row(row);
  }

  println!("{table}");

  Ok(())
}

/// Runs the pipeline and prints every resolved name next to its location.
pub async fn list_names(input: &Path, client: bool, colors: &Colors) -> anyhow::Result<()> {
  let bundle = SpecLoader::load_bundle(input).await?;
  let config = GeneratorConfig::builder().generate_client(client).build();
  let output = Orchestrator::new(bundle, config).generate()?;

  let mut table = table(colors, &["TYPE", "KIND", "CONTEXT", "LOCATION"]);
  for (path, translated) in &output.types {
    let mut row = Row::new();
    row.add_cell(
      Cell::new(&translated.name)
        .fg(comfy(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(Cell::new(translated.descriptor.kind.label()).fg(comfy(colors.accent())));
    row.add_cell(Cell::new(translated.context.to_string()).fg(comfy(colors.success())));
    row.add_cell(Cell::new(path).fg(comfy(colors.primary())));
    table.add_row(row);
  }

  println!("{table}");

  for decision in &output.decisions {
    tracing::debug!(
      path = %decision.path,
      from = %decision.from,
      to = %decision.to,
      strategy = %decision.strategy,
      "renamed"
    );
  }
  if !output.stats.warnings.is_empty() {
    eprintln!("{} warnings; rerun generate -v for details", output.stats.warnings.len());
  }

  Ok(())
}
