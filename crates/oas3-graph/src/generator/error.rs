use thiserror::Error;

use crate::model::ParameterLocation;

/// Fatal compilation failures. A pass that returns one of these yields no graph.
#[derive(Debug, Error)]
pub enum GeneratorError {
  #[error("unsupported schema at {location}: {reason}")]
  UnsupportedSchema { location: String, reason: String },

  #[error("content at {location} resolves to more than one model ({})", .media_types.join(", "))]
  AmbiguousContent { location: String, media_types: Vec<String> },

  #[error("parameter '{name}' in {location} has no encoding for style '{style}' with explode={explode}")]
  InvalidParameterEncoding {
    name: String,
    location: ParameterLocation,
    style: String,
    explode: bool,
  },

  #[error("invalid document at {location}: {message}")]
  InvalidDocument { location: String, message: String },

  #[error("invalid media type pattern '{pattern}'")]
  InvalidMediaTypePattern {
    pattern: String,
    #[source]
    source: regex::Error,
  },
}

impl GeneratorError {
  pub(crate) fn unsupported(location: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::UnsupportedSchema {
      location: location.into(),
      reason: reason.into(),
    }
  }

  pub(crate) fn invalid_document(location: impl Into<String>, message: impl Into<String>) -> Self {
    Self::InvalidDocument {
      location: location.into(),
      message: message.into(),
    }
  }
}
