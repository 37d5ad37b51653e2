use serde::Serialize;

use super::ModelId;
use crate::generator::GeneratorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParameterLocation {
  Query,
  Header,
  Path,
  Cookie,
}

impl ParameterLocation {
  /// Style used when the parameter declares none.
  #[must_use]
  pub fn default_style(self) -> ParameterStyle {
    match self {
      Self::Query | Self::Cookie => ParameterStyle::Form,
      Self::Header | Self::Path => ParameterStyle::Simple,
    }
  }
}

/// Serialization style of a named parameter.
///
/// Styles outside the OpenAPI set are kept verbatim so the failure can name them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, strum::EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ParameterStyle {
  Matrix,
  Label,
  Form,
  Simple,
  SpaceDelimited,
  PipeDelimited,
  DeepObject,
  #[strum(default)]
  #[serde(untagged)]
  Other(String),
}

impl ParameterStyle {
  #[must_use]
  pub fn as_str(&self) -> &str {
    match self {
      Self::Matrix => "matrix",
      Self::Label => "label",
      Self::Form => "form",
      Self::Simple => "simple",
      Self::SpaceDelimited => "spaceDelimited",
      Self::PipeDelimited => "pipeDelimited",
      Self::DeepObject => "deepObject",
      Self::Other(style) => style,
    }
  }

  /// OpenAPI default for `explode`: true only for `form`.
  #[must_use]
  pub fn default_explode(&self) -> bool {
    matches!(self, Self::Form)
  }
}

/// Short code naming the downstream encoding algorithm for a named parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SerializerKey {
  S,
  Se,
  L,
  Le,
  M,
  Me,
  F,
  Fe,
  Sd,
  Pd,
  Do,
}

impl SerializerKey {
  /// Derives the key for a style/explode pair, or `None` if the combination has
  /// no defined encoding.
  #[must_use]
  pub fn derive(style: &ParameterStyle, explode: bool) -> Option<Self> {
    match (style, explode) {
      (ParameterStyle::Simple, false) => Some(Self::S),
      (ParameterStyle::Simple, true) => Some(Self::Se),
      (ParameterStyle::Label, false) => Some(Self::L),
      (ParameterStyle::Label, true) => Some(Self::Le),
      (ParameterStyle::Matrix, false) => Some(Self::M),
      (ParameterStyle::Matrix, true) => Some(Self::Me),
      (ParameterStyle::Form, false) => Some(Self::F),
      (ParameterStyle::Form, true) => Some(Self::Fe),
      (ParameterStyle::SpaceDelimited, false) => Some(Self::Sd),
      (ParameterStyle::PipeDelimited, false) => Some(Self::Pd),
      (ParameterStyle::DeepObject, true) => Some(Self::Do),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedParameter {
  pub name: String,
  #[serde(rename = "in")]
  pub location: ParameterLocation,
  pub required: bool,
  pub model: ModelId,
  pub style: ParameterStyle,
  pub explode: bool,
  pub serializer_key: Option<SerializerKey>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub deprecated: bool,
}

impl NamedParameter {
  /// Returns the derived serializer key, failing for a style/explode pair that
  /// has no defined encoding.
  pub fn serializer_key(&self) -> Result<SerializerKey, GeneratorError> {
    self.serializer_key.ok_or_else(|| GeneratorError::InvalidParameterEncoding {
      name: self.name.clone(),
      location: self.location,
      style: self.style.as_str().to_string(),
      explode: self.explode,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyParameter {
  pub name: String,
  pub required: bool,
  pub model: ModelId,
  /// Accepted media types, most preferred first.
  pub media_types: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Parameter {
  Named(NamedParameter),
  Body(BodyParameter),
}

impl Parameter {
  #[must_use]
  pub fn name(&self) -> &str {
    match self {
      Self::Named(parameter) => &parameter.name,
      Self::Body(parameter) => &parameter.name,
    }
  }

  #[must_use]
  pub fn required(&self) -> bool {
    match self {
      Self::Named(parameter) => parameter.required,
      Self::Body(parameter) => parameter.required,
    }
  }

  #[must_use]
  pub fn model(&self) -> ModelId {
    match self {
      Self::Named(parameter) => parameter.model,
      Self::Body(parameter) => parameter.model,
    }
  }

  #[must_use]
  pub fn is_body(&self) -> bool {
    matches!(self, Self::Body(_))
  }

  /// Sort key placing required parameters first and the body last within its group.
  #[must_use]
  pub fn ordering_key(&self) -> (bool, bool) {
    (!self.required(), self.is_body())
  }
}
