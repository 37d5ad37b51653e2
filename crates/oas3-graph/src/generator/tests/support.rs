use serde_json::{Value, json};

use crate::{
  generator::{Generator, GeneratorConfig, GeneratorError, GeneratorOutput},
  model::{Method, Model, ModelGraph, ModelId},
};

pub(super) fn document(paths: Value, schemas: Value) -> Value {
  json!({
    "openapi": "3.1.0",
    "info": { "title": "Test", "version": "1.0.0" },
    "paths": paths,
    "components": { "schemas": schemas }
  })
}

pub(super) fn try_generate(document: &Value, config: GeneratorConfig) -> Result<GeneratorOutput, GeneratorError> {
  Generator::new(config)?.generate(document)
}

pub(super) fn generate(document: &Value) -> GeneratorOutput {
  try_generate(document, GeneratorConfig::default()).expect("generation should succeed")
}

pub(super) fn named<'a>(graph: &'a ModelGraph, name: &str) -> &'a Model {
  let mut found = graph.models.find_by_name(name);
  let model = found.next().unwrap_or_else(|| panic!("no model named {name}"));
  assert!(found.next().is_none(), "more than one model named {name}");
  model
}

pub(super) fn model(graph: &ModelGraph, id: ModelId) -> &Model {
  &graph.models[id]
}

pub(super) fn method<'a>(graph: &'a ModelGraph, name: &str) -> &'a Method {
  graph
    .methods()
    .find(|method| method.name == name)
    .unwrap_or_else(|| panic!("no method named {name}"))
}
