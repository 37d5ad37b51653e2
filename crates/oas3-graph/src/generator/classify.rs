//! Decides the [`ModelKind`] of a schema once its children have been compiled.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::{GeneratorError, context::SchemaFrame};
use crate::model::{
  AdditionalProperties, ModelId, ModelKind, PrimitiveModel, PrimitiveType, Property, RecordModel, UnionKind,
  UnionModel,
};

const STRUCTURAL_SEGMENTS: &[&str] = &["schema", "items", "additionalProperties", "not", "type"];
const SCALAR_TYPES: &[&str] = &["string", "number", "integer", "boolean"];

/// Model name: `title`, then `x-name`, then the last segment of the defining
/// location unless that segment is structural or an index.
#[must_use]
pub(super) fn derive_name(schema: &Value, location: &str) -> Option<String> {
  let annotated = ["title", "x-name"]
    .iter()
    .find_map(|key| schema.get(*key).and_then(Value::as_str))
    .filter(|name| !name.is_empty());
  if let Some(name) = annotated {
    return Some(name.to_string());
  }

  let (_, segment) = location.rsplit_once('/')?;
  let segment = crate::walker::unescape_segment(segment);
  let structural = STRUCTURAL_SEGMENTS.contains(&segment.as_str())
    || segment.is_empty()
    || segment.chars().all(|c| c.is_ascii_digit());
  (!structural).then_some(segment)
}

/// Non-null members of a schema's `type`, and whether `null` was among them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct TypeSet {
  pub(super) types: Vec<String>,
  pub(super) nullable: bool,
  pub(super) is_array_form: bool,
}

impl TypeSet {
  #[must_use]
  pub(super) fn of(schema: &Map<String, Value>) -> Self {
    match schema.get("type") {
      Some(Value::String(ty)) => Self {
        types: vec![ty.clone()],
        nullable: false,
        is_array_form: false,
      },
      Some(Value::Array(members)) => {
        let mut set = Self {
          is_array_form: true,
          ..Self::default()
        };
        for member in members.iter().filter_map(Value::as_str) {
          if member == "null" {
            set.nullable = true;
          } else if !set.types.iter().any(|ty| ty == member) {
            set.types.push(member.to_string());
          }
        }
        set
      }
      _ => Self::default(),
    }
  }

  /// An array-form `type` that reduces to at most one non-null member.
  #[must_use]
  pub(super) fn collapses(&self) -> bool {
    self.is_array_form && self.types.len() <= 1
  }

  fn single(&self) -> Option<&str> {
    match self.types.as_slice() {
      [ty] => Some(ty),
      [] if self.nullable => Some("null"),
      _ => None,
    }
  }
}

#[derive(Debug)]
pub(super) struct Classified {
  pub(super) kind: ModelKind,
  pub(super) nullable: bool,
}

fn has_record_keywords(schema: &Map<String, Value>) -> bool {
  ["properties", "additionalProperties", "allOf"]
    .iter()
    .any(|key| schema.contains_key(*key))
}

fn record(schema: &Map<String, Value>, frame: &SchemaFrame) -> RecordModel {
  let required: Vec<&str> = schema
    .get("required")
    .and_then(Value::as_array)
    .map(|names| names.iter().filter_map(Value::as_str).collect())
    .unwrap_or_default();

  let properties: IndexMap<String, Property> = schema
    .get("properties")
    .and_then(Value::as_object)
    .map(|declared| {
      declared
        .keys()
        .map(|name| {
          let model = frame.properties.get(name).copied().unwrap_or(ModelId::ANY);
          let required = required.contains(&name.as_str());
          (name.clone(), Property { model, required })
        })
        .collect()
    })
    .unwrap_or_default();

  let additional_properties = match schema.get("additionalProperties") {
    Some(Value::Bool(false)) => Some(AdditionalProperties::Forbidden),
    Some(Value::Bool(true)) => Some(AdditionalProperties::Model(ModelId::ANY)),
    Some(Value::Object(_)) => Some(AdditionalProperties::Model(
      frame.additional_properties.unwrap_or(ModelId::ANY),
    )),
    _ => None,
  };

  RecordModel {
    properties,
    additional_properties,
    extends_from: frame.all_of.clone(),
    union_of: frame.one_of.iter().chain(&frame.any_of).copied().collect(),
  }
}

fn primitive(ty: PrimitiveType, schema: &Map<String, Value>) -> ModelKind {
  ModelKind::Primitive(PrimitiveModel {
    ty,
    format: schema.get("format").and_then(Value::as_str).map(String::from),
    enum_values: vec![],
  })
}

/// Applies the classification order: typed, enum, pure union, record, type
/// array, array, scalar, any.
pub(super) fn classify(
  schema: &Map<String, Value>,
  frame: &SchemaFrame,
  typed_formats: &HashMap<String, String>,
  location: &str,
) -> Result<Classified, GeneratorError> {
  let types = TypeSet::of(schema);
  let nullable = types.nullable || schema.get("nullable").and_then(Value::as_bool).unwrap_or(false);
  let classified = |kind| Ok(Classified { kind, nullable });

  let typed = schema.get("x-type").and_then(Value::as_str).map(String::from).or_else(|| {
    schema
      .get("format")
      .and_then(Value::as_str)
      .and_then(|format| typed_formats.get(format))
      .cloned()
  });
  if let Some(type_name) = typed {
    return classified(ModelKind::Typed { type_name });
  }

  let enum_values = match (schema.get("enum"), schema.get("const")) {
    (Some(Value::Array(values)), _) => Some(values.clone()),
    (None, Some(value)) => Some(vec![value.clone()]),
    _ => None,
  };
  if let Some(enum_values) = enum_values {
    return classified(ModelKind::Primitive(PrimitiveModel {
      ty: PrimitiveType::Enum,
      format: schema.get("format").and_then(Value::as_str).map(String::from),
      enum_values,
    }));
  }

  let has_one_of = schema.contains_key("oneOf");
  let has_any_of = schema.contains_key("anyOf");
  if (has_one_of || has_any_of) && !has_record_keywords(schema) {
    if has_one_of && has_any_of {
      return Err(GeneratorError::unsupported(
        location,
        "oneOf and anyOf cannot be combined without properties",
      ));
    }
    let (variants, composition) = if has_one_of {
      (frame.one_of.clone(), UnionKind::OneOf)
    } else {
      (frame.any_of.clone(), UnionKind::AnyOf)
    };
    return classified(ModelKind::Union(UnionModel { variants, composition }));
  }

  let single = types.single();
  if has_record_keywords(schema) || single == Some("object") {
    return classified(ModelKind::Record(record(schema, frame)));
  }

  if types.types.len() > 1 {
    if types.types.iter().all(|ty| SCALAR_TYPES.contains(&ty.as_str())) {
      return classified(ModelKind::Union(UnionModel {
        variants: frame.type_variants.clone(),
        composition: UnionKind::Types,
      }));
    }
    return Err(GeneratorError::unsupported(
      location,
      format!("type array [{}] mixes structural types", types.types.join(", ")),
    ));
  }

  if single == Some("array") || (single.is_none() && schema.contains_key("items")) {
    return classified(ModelKind::Array {
      items: frame.items.unwrap_or(ModelId::ANY),
    });
  }

  match single {
    Some(ty) => match PrimitiveType::from_schema_type(ty) {
      Some(primitive_type) => classified(primitive(primitive_type, schema)),
      None => Err(GeneratorError::unsupported(location, format!("unknown type '{ty}'"))),
    },
    None => classified(ModelKind::primitive(PrimitiveType::Any)),
  }
}
