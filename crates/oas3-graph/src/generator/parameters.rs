use std::str::FromStr;

use serde_json::Value;

use super::GeneratorError;
use crate::model::{BodyParameter, ModelId, NamedParameter, Parameter, ParameterLocation, ParameterStyle, SerializerKey};

/// A parameter object read before its schema has been compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawParameter {
  pub(crate) name: String,
  pub(crate) location: ParameterLocation,
  pub(crate) required: bool,
  pub(crate) style: ParameterStyle,
  pub(crate) explode: bool,
  pub(crate) description: Option<String>,
  pub(crate) deprecated: bool,
  /// Declared on the operation rather than on the path item.
  pub(crate) in_operation: bool,
}

impl RawParameter {
  pub(crate) fn parse(node: &Value, location: &str, in_operation: bool) -> Result<Self, GeneratorError> {
    let name = node
      .get("name")
      .and_then(Value::as_str)
      .ok_or_else(|| GeneratorError::invalid_document(location, "parameter has no name"))?;
    let declared_in = node
      .get("in")
      .and_then(Value::as_str)
      .ok_or_else(|| GeneratorError::invalid_document(location, format!("parameter '{name}' has no location")))?;
    let parameter_location = ParameterLocation::from_str(declared_in).map_err(|_| {
      GeneratorError::invalid_document(location, format!("parameter '{name}' has unknown location '{declared_in}'"))
    })?;

    let style = match node.get("style").and_then(Value::as_str) {
      Some(style) => ParameterStyle::from_str(style).unwrap_or_else(|_| ParameterStyle::Other(style.to_string())),
      None => parameter_location.default_style(),
    };
    let explode = node
      .get("explode")
      .and_then(Value::as_bool)
      .unwrap_or_else(|| style.default_explode());
    let required = parameter_location == ParameterLocation::Path
      || node.get("required").and_then(Value::as_bool).unwrap_or(false);

    Ok(Self {
      name: name.to_string(),
      location: parameter_location,
      required,
      style,
      explode,
      description: node.get("description").and_then(Value::as_str).map(String::from),
      deprecated: node.get("deprecated").and_then(Value::as_bool).unwrap_or(false),
      in_operation,
    })
  }

  pub(crate) fn into_named(self, model: ModelId) -> NamedParameter {
    let serializer_key = SerializerKey::derive(&self.style, self.explode);
    NamedParameter {
      name: self.name,
      location: self.location,
      required: self.required,
      model,
      style: self.style,
      explode: self.explode,
      serializer_key,
      description: self.description,
      deprecated: self.deprecated,
    }
  }
}

/// Path-level parameters followed by operation-level ones; an operation-level
/// parameter replaces the path-level one with the same name and location in place.
pub(crate) fn merge_parameters(path_level: &[NamedParameter], operation_level: Vec<NamedParameter>) -> Vec<NamedParameter> {
  let mut merged = path_level.to_vec();
  for parameter in operation_level {
    match merged
      .iter_mut()
      .find(|existing| existing.name == parameter.name && existing.location == parameter.location)
    {
      Some(existing) => *existing = parameter,
      None => merged.push(parameter),
    }
  }
  merged
}

/// Picks the body parameter name: the explicit annotation, else the first
/// preferred name no sibling uses, else `body<N>`.
pub(crate) fn body_parameter_name(explicit: Option<&str>, siblings: &[NamedParameter], preferred: &[String]) -> String {
  if let Some(name) = explicit {
    return name.to_string();
  }
  let taken = |candidate: &str| siblings.iter().any(|parameter| parameter.name == candidate);

  if let Some(name) = preferred.iter().find(|name| !taken(name)) {
    return name.clone();
  }
  (1..)
    .map(|index| format!("body{index}"))
    .find(|name| !taken(name))
    .unwrap_or_default()
}

/// Stable sort: required before optional, the body last within its group.
pub(crate) fn order_parameters(named: Vec<NamedParameter>, body: Option<BodyParameter>) -> Vec<Parameter> {
  let mut parameters: Vec<Parameter> = named
    .into_iter()
    .map(Parameter::Named)
    .chain(body.map(Parameter::Body))
    .collect();
  parameters.sort_by_key(Parameter::ordering_key);
  parameters
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn named(name: &str, location: ParameterLocation, required: bool) -> NamedParameter {
    RawParameter {
      name: name.to_string(),
      location,
      required,
      style: location.default_style(),
      explode: location.default_style().default_explode(),
      description: None,
      deprecated: false,
      in_operation: true,
    }
    .into_named(ModelId::ANY)
  }

  #[test]
  fn test_parse_applies_openapi_defaults() {
    let query = RawParameter::parse(&json!({ "name": "q", "in": "query" }), "#/p", true).unwrap();
    assert_eq!(query.style, ParameterStyle::Form);
    assert!(query.explode);
    assert!(!query.required);

    let path = RawParameter::parse(&json!({ "name": "id", "in": "path" }), "#/p", false).unwrap();
    assert_eq!(path.style, ParameterStyle::Simple);
    assert!(!path.explode);
    assert!(path.required);

    let header = RawParameter::parse(
      &json!({ "name": "X-Ids", "in": "header", "style": "simple", "explode": true }),
      "#/p",
      true,
    )
    .unwrap();
    assert_eq!(header.into_named(ModelId::ANY).serializer_key, Some(SerializerKey::Se));
  }

  #[test]
  fn test_parse_rejects_incomplete_parameters() {
    assert!(matches!(
      RawParameter::parse(&json!({ "in": "query" }), "#/p", true),
      Err(GeneratorError::InvalidDocument { .. })
    ));
    assert!(matches!(
      RawParameter::parse(&json!({ "name": "x", "in": "body" }), "#/p", true),
      Err(GeneratorError::InvalidDocument { .. })
    ));
  }

  #[test]
  fn test_unknown_style_has_no_serializer_key() {
    let raw = RawParameter::parse(&json!({ "name": "x", "in": "query", "style": "tabDelimited" }), "#/p", true).unwrap();
    assert_eq!(raw.style, ParameterStyle::Other("tabDelimited".to_string()));
    assert!(!raw.explode);
    assert!(raw.into_named(ModelId::ANY).serializer_key().is_err());
  }

  #[test]
  fn test_operation_parameters_override_path_parameters() {
    let path_level = vec![
      named("id", ParameterLocation::Path, true),
      named("trace", ParameterLocation::Header, false),
    ];
    let mut overriding = named("trace", ParameterLocation::Header, true);
    overriding.description = Some("override".to_string());
    let merged = merge_parameters(
      &path_level,
      vec![overriding, named("trace", ParameterLocation::Query, false)],
    );

    assert_eq!(merged.len(), 3);
    assert_eq!(merged[1].description.as_deref(), Some("override"));
    assert_eq!(merged[2].location, ParameterLocation::Query);
  }

  #[test]
  fn test_body_name_avoids_siblings() {
    let preferred = vec!["body".to_string(), "payload".to_string()];
    let siblings = vec![named("body", ParameterLocation::Query, false)];
    assert_eq!(body_parameter_name(None, &siblings, &preferred), "payload");
    assert_eq!(body_parameter_name(Some("pet"), &siblings, &preferred), "pet");

    let crowded = vec![
      named("body", ParameterLocation::Query, false),
      named("payload", ParameterLocation::Query, false),
      named("body1", ParameterLocation::Query, false),
    ];
    assert_eq!(body_parameter_name(None, &crowded, &preferred), "body2");
  }

  #[test]
  fn test_required_first_body_last() {
    let body = BodyParameter {
      name: "body".to_string(),
      required: true,
      model: ModelId::ANY,
      media_types: vec!["application/json".to_string()],
      description: None,
    };
    let ordered = order_parameters(
      vec![
        named("optionalQuery", ParameterLocation::Query, false),
        named("requiredPath", ParameterLocation::Path, true),
      ],
      Some(body),
    );
    let names: Vec<_> = ordered.iter().map(Parameter::name).collect();
    assert_eq!(names, vec!["requiredPath", "body", "optionalQuery"]);
  }
}
