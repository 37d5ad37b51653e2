use std::{collections::HashMap, path::PathBuf};

use anyhow::Context;
use chrono::{Local, Timelike};
use crossterm::style::Stylize;
use oas3_graph::{
  generator::{GenerationStats, GeneratorConfig, Orchestrator},
  walker::ComponentSchemas,
};
use serde_json::Value;

use crate::{
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
  pub component_schemas: ComponentSchemas,
  pub media_types: Vec<String>,
  pub typed_formats: HashMap<String, String>,
  pub default_api: String,
}

impl GenerateConfig {
  pub fn from_command(command: GenerateCommand) -> anyhow::Result<Self> {
    let GenerateCommand {
      input,
      output,
      paths_first,
      reachable_only,
      media_types,
      customize,
      default_api,
      verbose,
      quiet,
    } = command;

    let component_schemas = match (reachable_only, paths_first) {
      (true, _) => ComponentSchemas::Skip,
      (false, true) => ComponentSchemas::Last,
      (false, false) => ComponentSchemas::First,
    };
    anyhow::ensure!(!default_api.trim().is_empty(), "default api name must not be empty");

    Ok(Self {
      input,
      output,
      verbose,
      quiet,
      component_schemas,
      media_types,
      typed_formats: parse_customizations(&customize)?,
      default_api,
    })
  }

  async fn load_document(&self) -> anyhow::Result<Value> {
    SpecLoader::open(&self.input).await?.parse()
  }

  fn generator_config(&self) -> GeneratorConfig {
    let mut config = GeneratorConfig::builder()
      .component_schemas(self.component_schemas)
      .typed_formats(self.typed_formats.clone())
      .default_api_name(self.default_api.clone())
      .build();
    if !self.media_types.is_empty() {
      config.media_type_preferences.clone_from(&self.media_types);
    }
    config
  }

  async fn write_output(&self, rendered: &Value) -> anyhow::Result<()> {
    let mut json = serde_json::to_string_pretty(rendered)?;
    json.push('\n');
    if let Some(parent) = self.output.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&self.output, json)
      .await
      .with_context(|| format!("failed to write {}", self.output.display()))?;
    Ok(())
  }
}

fn parse_customizations(customize: &[String]) -> anyhow::Result<HashMap<String, String>> {
  let mut map = HashMap::new();
  for entry in customize {
    let (format, type_name) = entry
      .split_once('=')
      .filter(|(format, type_name)| !format.is_empty() && !type_name.is_empty())
      .ok_or_else(|| anyhow::anyhow!("Invalid customize format '{entry}': expected FORMAT=TYPE (e.g., date-time=DateTime)"))?;
    map.insert(format.to_string(), type_name.to_string());
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
      &format!("Loading OpenAPI spec from: {}", self.config.input.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_generating(&self) {
    self.info(&"Compiling model graph...".with(self.colors.primary()).to_string());
  }

  fn print_statistics(&self, stats: &GenerationStats) {
    if self.config.quiet {
      return;
    }

    self.stat("Models compiled:", stats.models_generated.to_string());
    self.stat("", format!("{} records", stats.records_generated));
    self.stat("", format!("{} unions", stats.unions_generated));
    self.stat("", format!("{} arrays", stats.arrays_generated));
    self.stat("", format!("{} primitives", stats.primitives_generated));
    if stats.typed_generated > 0 {
      self.stat("", format!("{} typed", stats.typed_generated));
    }
    self.stat("Apis:", stats.apis_generated.to_string());
    self.stat("Methods:", stats.methods_generated.to_string());
    self.stat(
      "",
      format!(
        "{} parameters, {} bodies, {} responses",
        stats.parameters_generated, stats.body_parameters_generated, stats.responses_generated
      ),
    );
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
          cycle.join(" -> ").with(self.colors.info())
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
      &format!("Writing to: {}", self.config.output.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_success(&self) {
    if !self.config.quiet {
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        "Successfully compiled model graph".with(self.colors.success())
      );
    }
  }
}

pub async fn generate_graph(config: GenerateConfig, colors: &Colors) -> anyhow::Result<GenerationStats> {
  let logger = GenerateLogger::new(&config, colors);

  logger.log_loading();
  let document = config.load_document().await?;

  logger.log_generating();
  let orchestrator = Orchestrator::new(document, config.generator_config());
  let (graph, stats) = orchestrator.generate()?;
  tracing::debug!(
    models = stats.models_generated,
    methods = stats.methods_generated,
    warnings = stats.warnings.len(),
    "compiled model graph"
  );
  logger.print_statistics(&stats);

  logger.log_writing();
  config.write_output(&orchestrator.render(&graph)).await?;

  logger.log_success();
  Ok(stats)
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;
  use crate::ui::colors::Theme;

  fn command(input: PathBuf, output: PathBuf) -> GenerateCommand {
    GenerateCommand {
      input,
      output,
      paths_first: false,
      reachable_only: false,
      media_types: vec![],
      customize: vec![],
      default_api: "default".to_string(),
      verbose: false,
      quiet: true,
    }
  }

  #[test]
  fn test_parse_customizations_empty() {
    assert!(parse_customizations(&[]).unwrap().is_empty());
  }

  #[test]
  fn test_parse_customizations_multiple_entries() {
    let result = parse_customizations(&["date-time=DateTime".to_string(), "uuid=Uuid".to_string()]).unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.get("date-time"), Some(&"DateTime".to_string()));
    assert_eq!(result.get("uuid"), Some(&"Uuid".to_string()));
  }

  #[test]
  fn test_parse_customizations_with_equals_in_value() {
    let result = parse_customizations(&["date=chrono::NaiveDate=x".to_string()]).unwrap();
    assert_eq!(result.get("date"), Some(&"chrono::NaiveDate=x".to_string()));
  }

  #[test]
  fn test_parse_customizations_invalid_format() {
    for entry in ["date-time", "=DateTime", "date-time="] {
      let err = parse_customizations(&[entry.to_string()]).unwrap_err();
      assert!(err.to_string().contains("Invalid customize format"), "{entry}");
    }
  }

  #[test]
  fn test_from_command_maps_schema_order() {
    let mut cmd = command("in.json".into(), "out.json".into());
    assert_eq!(
      GenerateConfig::from_command(cmd.clone()).unwrap().component_schemas,
      ComponentSchemas::First
    );

    cmd.paths_first = true;
    assert_eq!(
      GenerateConfig::from_command(cmd.clone()).unwrap().component_schemas,
      ComponentSchemas::Last
    );

    cmd.paths_first = false;
    cmd.reachable_only = true;
    assert_eq!(
      GenerateConfig::from_command(cmd).unwrap().component_schemas,
      ComponentSchemas::Skip
    );
  }

  #[test]
  fn test_generator_config_keeps_default_preferences() {
    let config = GenerateConfig::from_command(command("in.json".into(), "out.json".into())).unwrap();
    assert_eq!(
      config.generator_config().media_type_preferences,
      GeneratorConfig::default().media_type_preferences
    );

    let mut cmd = command("in.json".into(), "out.json".into());
    cmd.media_types = vec!["text/plain".to_string()];
    cmd.default_api = "misc".to_string();
    let generator_config = GenerateConfig::from_command(cmd).unwrap().generator_config();
    assert_eq!(generator_config.media_type_preferences, vec!["text/plain"]);
    assert_eq!(generator_config.default_api_name, "misc");
  }

  #[tokio::test]
  async fn test_generate_graph_writes_rendered_document() {
    let mut input = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    input
      .write_all(
        br"openapi: 3.1.0
info:
  title: Petstore
  version: 1.0.0
paths:
  /pets:
    get:
      operationId: listPets
      tags: [pets]
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: '#/components/schemas/Pet'
components:
  schemas:
    Pet:
      type: object
      required: [name]
      properties:
        name:
          type: string
",
      )
      .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("nested").join("graph.json");

    let config = GenerateConfig::from_command(command(input.path().to_path_buf(), output.clone())).unwrap();
    let stats = generate_graph(config, &Colors::new(false, Theme::Dark)).await.unwrap();
    assert_eq!(stats.methods_generated, 1);
    assert!(stats.warnings.is_empty(), "{:?}", stats.warnings);

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["info"]["title"], "Petstore");
    assert_eq!(written["apis"][0]["name"], "pets");
    assert_eq!(written["apis"][0]["methods"][0]["name"], "listPets");
  }
}
