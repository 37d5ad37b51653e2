//! Orchestration of one generation pass.
//!
//! The [`Orchestrator`] owns the input document and configuration, runs the
//! [`Generator`], and performs the post-pass analysis the compiler itself does
//! not: reference cycles between models, derived names shared by several
//! locations, and the document version check.
//!
//! ## Usage
//!
//! ```no_run
//! use oas3_graph::generator::{GeneratorConfig, Orchestrator};
//!
//! # fn example() -> anyhow::Result<()> {
//! let document: serde_json::Value = serde_json::from_str(&std::fs::read_to_string("openapi.json")?)?;
//!
//! let orchestrator = Orchestrator::new(document, GeneratorConfig::default());
//! let (graph, stats) = orchestrator.generate()?;
//!
//! println!("Compiled {} models with {} warnings", stats.models_generated, stats.warnings.len());
//! std::fs::write("graph.json", serde_json::to_string_pretty(&orchestrator.render(&graph))?)?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use anyhow::Context;
use itertools::Itertools;
use petgraph::{algo::kosaraju_scc, graphmap::DiGraphMap};
use serde::Serialize;
use serde_json::Value;

use super::{GenerationStats, GenerationWarning, Generator, GeneratorConfig};
use crate::model::{ModelGraph, ModelId, ModelRegistry};

const SUPPORTED_VERSION_PREFIX: &str = "3.1.";

/// `info` of the input document, carried into the rendered graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphMetadata {
  pub title: String,
  pub version: String,
  pub openapi: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

pub struct Orchestrator {
  document: Value,
  config: GeneratorConfig,
}

impl Orchestrator {
  #[must_use]
  pub fn new(document: Value, config: GeneratorConfig) -> Self {
    Self { document, config }
  }

  #[must_use]
  pub fn metadata(&self) -> GraphMetadata {
    let text = |pointer: &str| {
      self
        .document
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(String::from)
    };
    GraphMetadata {
      title: text("/info/title").unwrap_or_default(),
      version: text("/info/version").unwrap_or_default(),
      openapi: text("/openapi").unwrap_or_default(),
      description: text("/info/description"),
    }
  }

  /// Compiles the document and collects statistics and warnings.
  ///
  /// # Errors
  ///
  /// Returns an error if the media type preferences do not compile or the
  /// document contains a schema or content shape that cannot be modeled.
  pub fn generate(&self) -> anyhow::Result<(ModelGraph, GenerationStats)> {
    let mut stats = GenerationStats::default();

    let openapi = self.metadata().openapi;
    if !openapi.starts_with(SUPPORTED_VERSION_PREFIX) {
      stats.record_warning(GenerationWarning::UnsupportedVersion { version: openapi });
    }

    let generator = Generator::new(self.config.clone()).context("invalid generator configuration")?;
    let output = generator
      .generate(&self.document)
      .context("failed to compile the OpenAPI document into a model graph")?;

    stats.record_graph(&output.graph);
    stats.record_warnings(output.warnings);
    stats.record_cycles(detect_cycles(&output.graph.models));
    stats.record_warnings(duplicate_names(&output.graph.models));

    Ok((output.graph, stats))
  }

  /// The document written for downstream emitters: `{info, models, apis}`.
  #[must_use]
  pub fn render(&self, graph: &ModelGraph) -> Value {
    serde_json::json!({
      "info": self.metadata(),
      "models": graph.models,
      "apis": graph.apis,
    })
  }
}

fn display_name(models: &ModelRegistry, id: ModelId) -> String {
  let model = &models[id];
  model.name.clone().unwrap_or_else(|| model.location.clone())
}

/// Strongly connected components of the model reference graph, self-loops
/// included. Each cycle is reported by model name, or location when unnamed.
fn detect_cycles(models: &ModelRegistry) -> Vec<Vec<String>> {
  let mut graph = DiGraphMap::<ModelId, ()>::new();
  for model in models.compiled() {
    graph.add_node(model.id);
    for child in model.kind.children() {
      if !child.is_singleton() {
        graph.add_edge(model.id, child, ());
      }
    }
  }

  kosaraju_scc(&graph)
    .into_iter()
    .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
    .map(|scc| {
      scc
        .into_iter()
        .sorted()
        .map(|id| display_name(models, id))
        .collect()
    })
    .sorted()
    .collect()
}

/// Derived names used by models at more than one location.
fn duplicate_names(models: &ModelRegistry) -> Vec<GenerationWarning> {
  let mut by_name: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
  for model in models.compiled() {
    if let Some(name) = model.name.as_deref() {
      by_name.entry(name).or_default().push(&model.location);
    }
  }

  by_name
    .into_iter()
    .filter(|(_, locations)| locations.len() > 1)
    .map(|(name, locations)| GenerationWarning::DuplicateModelName {
      name: name.to_string(),
      locations: locations.join(", "),
    })
    .collect()
}
