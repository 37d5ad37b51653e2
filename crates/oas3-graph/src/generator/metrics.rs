use strum::Display;

use crate::model::{ModelGraph, ModelKindTag, Parameter};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationStats {
  pub models_generated: usize,
  pub primitives_generated: usize,
  pub arrays_generated: usize,
  pub records_generated: usize,
  pub unions_generated: usize,
  pub typed_generated: usize,
  pub apis_generated: usize,
  pub methods_generated: usize,
  pub parameters_generated: usize,
  pub body_parameters_generated: usize,
  pub responses_generated: usize,
  pub cycles_detected: usize,
  pub cycle_details: Vec<Vec<String>>,
  pub warnings: Vec<GenerationWarning>,
}

impl GenerationStats {
  pub fn record_model(&mut self, tag: ModelKindTag) {
    self.models_generated += 1;
    match tag {
      ModelKindTag::Primitive => self.primitives_generated += 1,
      ModelKindTag::Array => self.arrays_generated += 1,
      ModelKindTag::Record => self.records_generated += 1,
      ModelKindTag::Union => self.unions_generated += 1,
      ModelKindTag::Typed => self.typed_generated += 1,
    }
  }

  pub fn record_parameter(&mut self, parameter: &Parameter) {
    self.parameters_generated += 1;
    if parameter.is_body() {
      self.body_parameters_generated += 1;
    }
  }

  /// Counts every compiled model, api, method, parameter and response.
  pub fn record_graph(&mut self, graph: &ModelGraph) {
    for model in graph.models.compiled() {
      self.record_model(model.tag());
    }
    self.apis_generated += graph.apis.len();
    for method in graph.methods() {
      self.methods_generated += 1;
      self.responses_generated += method.responses.len();
      for parameter in &method.parameters {
        self.record_parameter(parameter);
      }
    }
  }

  pub fn record_cycle(&mut self, cycle: Vec<String>) {
    self.cycles_detected += 1;
    self.cycle_details.push(cycle);
  }

  pub fn record_cycles(&mut self, cycles: Vec<Vec<String>>) {
    for cycle in cycles {
      self.record_cycle(cycle);
    }
  }

  pub fn record_warning(&mut self, warning: GenerationWarning) {
    self.warnings.push(warning);
  }

  pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = GenerationWarning>) {
    self.warnings.extend(warnings);
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerationWarning {
  #[strum(to_string = "Unresolved reference '{reference}' at {location}, branch skipped")]
  UnresolvedReference { reference: String, location: String },
  #[strum(to_string = "No preferred media type among [{media_types}] at {location}, using 'any'")]
  NoPreferredMediaType { location: String, media_types: String },
  #[strum(to_string = "Parameter '{name}' in {location} has no encoding for style '{style}' with explode={explode}")]
  InvalidParameterEncoding {
    name: String,
    location: String,
    style: String,
    explode: bool,
  },
  #[strum(to_string = "Webhook '{name}' skipped, webhooks are not compiled into apis")]
  SkippedWebhook { name: String },
  #[strum(to_string = "Model name '{name}' is derived at several locations: {locations}")]
  DuplicateModelName { name: String, locations: String },
  #[strum(to_string = "OpenAPI version '{version}' is not 3.1.x, output may be incomplete")]
  UnsupportedVersion { version: String },
}

impl GenerationWarning {
  /// Warnings for parts of the document that produced no output at all.
  pub fn is_skipped_item(&self) -> bool {
    matches!(self, Self::UnresolvedReference { .. } | Self::SkippedWebhook { .. })
  }
}
