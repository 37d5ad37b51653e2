use std::collections::HashMap;

use crate::walker::ComponentSchemas;

pub const DEFAULT_API_NAME: &str = "default";

/// Media types accepted for bodies and responses, most preferred first.
///
/// An entry is either a literal media type or a `pattern flags` pair matched
/// case-insensitively against the lower-cased media type.
pub const DEFAULT_MEDIA_TYPE_PREFERENCES: &[&str] = &[
  "application/json",
  r"^application/[^;]+\+json i",
  "text/plain",
  "multipart/form-data",
  "application/x-www-form-urlencoded",
  "application/octet-stream",
  r"^text/ i",
];

pub const DEFAULT_BODY_PARAMETER_NAMES: &[&str] = &["body", "payload", "requestBody", "content"];

fn to_strings(values: &[&str]) -> Vec<String> {
  values.iter().map(ToString::to_string).collect()
}

/// Inputs of one generation pass. Nothing is read from ambient state, so a pass
/// is reproducible from the document and this value alone.
#[derive(Debug, Clone, bon::Builder)]
pub struct GeneratorConfig {
  #[builder(default = to_strings(DEFAULT_MEDIA_TYPE_PREFERENCES))]
  pub media_type_preferences: Vec<String>,
  #[builder(default = to_strings(DEFAULT_BODY_PARAMETER_NAMES))]
  pub body_parameter_names: Vec<String>,
  #[builder(default)]
  pub component_schemas: ComponentSchemas,
  /// Schema `format` to external type name. Matching schemas compile to typed models.
  #[builder(default)]
  pub typed_formats: HashMap<String, String>,
  #[builder(into, default = DEFAULT_API_NAME.to_string())]
  pub default_api_name: String,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self::builder().build()
  }
}
