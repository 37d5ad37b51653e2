use std::path::Path;

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};
use oas3_graph::generator::derived_method_name;

use crate::{
  ui::{Colors, colors::IntoComfyColor, term_width},
  utils::spec::SpecLoader,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct OperationRow {
  id: String,
  method: String,
  path: String,
  tags: String,
}

fn collect_operations(spec: &oas3::Spec) -> Vec<OperationRow> {
  let mut operations: Vec<_> = spec
    .operations()
    .map(|(path, method, operation)| OperationRow {
      id: operation
        .operation_id
        .clone()
        .unwrap_or_else(|| derived_method_name(&method, &path)),
      method: method.as_str().to_string(),
      tags: operation.tags.join(", "),
      path,
    })
    .collect();

  operations.sort_by(|a, b| a.id.cmp(&b.id));
  operations
}

pub async fn list_operations(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let document = SpecLoader::open(input).await?.parse()?;
  let spec: oas3::Spec = serde_json::from_value(document)?;

  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut row = Row::new();
  for header in ["OPERATION ID", "METHOD", "PATH", "TAGS"] {
    row.add_cell(Cell::new(header).fg(IntoComfyColor::into(colors.label())));
  }
  table.set_header(row);

  for operation in collect_operations(&spec) {
    let mut row = Row::new();
    row.add_cell(
      Cell::new(operation.id)
        .fg(IntoComfyColor::into(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(
      Cell::new(operation.method)
        .fg(IntoComfyColor::into(colors.accent()))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(Cell::new(operation.path).fg(IntoComfyColor::into(colors.primary())));
    row.add_cell(Cell::new(operation.tags).fg(IntoComfyColor::into(colors.info())));
    table.add_row(row);
  }

  println!("{table}");

  Ok(())
}
