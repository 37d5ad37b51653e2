use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::{ModelId, Parameter};

fn serialize_http_method<S: Serializer>(method: &http::Method, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_str(method.as_str())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
  /// Literal status code, a class wildcard such as `2XX`, or `default`.
  pub http_status_key: String,
  pub model: ModelId,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub media_types: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
  pub name: String,
  #[serde(serialize_with = "serialize_http_method")]
  pub http_method: http::Method,
  /// URI template, e.g. `/pets/{id}`.
  pub path_pattern: String,
  pub parameters: Vec<Parameter>,
  pub responses: IndexMap<String, Response>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub summary: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub deprecated: bool,
}

impl Method {
  #[must_use]
  pub fn parameter(&self, name: &str) -> Option<&Parameter> {
    self.parameters.iter().find(|parameter| parameter.name() == name)
  }

  pub fn response_keys(&self) -> impl Iterator<Item = &str> {
    self.responses.keys().map(String::as_str)
  }
}

/// One group of methods, created per tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Api {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub methods: Vec<Method>,
}

impl Api {
  #[must_use]
  pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
    Self {
      name: name.into(),
      description,
      methods: vec![],
    }
  }

  pub fn add_method(&mut self, method: Method) {
    self.methods.push(method);
  }

  #[must_use]
  pub fn method(&self, name: &str) -> Option<&Method> {
    self.methods.iter().find(|method| method.name == name)
  }
}
