//! Language-neutral output graph.
//!
//! Every [`Model`] lives exactly once in a [`ModelRegistry`]; everything else
//! (record properties, array items, parameters, responses) links to it by
//! [`ModelId`]. Self-referential schemas therefore need no special ownership: the
//! registry entry exists before its own children are filled in.

mod api;
mod parameter;

use std::{fmt, ops::Index};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

pub use self::{
  api::{Api, Method, Response},
  parameter::{BodyParameter, NamedParameter, Parameter, ParameterLocation, ParameterStyle, SerializerKey},
};

/// Non-owning handle into a [`ModelRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModelId(usize);

impl ModelId {
  /// The universal "any" model.
  pub const ANY: Self = Self(0);
  /// The universal "void" model, used for responses without content.
  pub const VOID: Self = Self(1);

  #[must_use]
  pub const fn index(self) -> usize {
    self.0
  }

  #[must_use]
  pub const fn is_singleton(self) -> bool {
    self.0 <= Self::VOID.0
  }
}

impl fmt::Display for ModelId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveType {
  String,
  Number,
  Integer,
  Boolean,
  Null,
  Enum,
  Any,
  Void,
}

impl PrimitiveType {
  /// Maps a JSON Schema scalar `type` keyword to its primitive.
  #[must_use]
  pub fn from_schema_type(ty: &str) -> Option<Self> {
    match ty {
      "string" => Some(Self::String),
      "number" => Some(Self::Number),
      "integer" => Some(Self::Integer),
      "boolean" => Some(Self::Boolean),
      "null" => Some(Self::Null),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveModel {
  #[serde(rename = "type")]
  pub ty: PrimitiveType,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub format: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub enum_values: Vec<Value>,
}

impl PrimitiveModel {
  #[must_use]
  pub fn new(ty: PrimitiveType) -> Self {
    Self {
      ty,
      format: None,
      enum_values: vec![],
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
  pub model: ModelId,
  pub required: bool,
}

/// `additionalProperties` of a record: either explicitly forbidden or typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionalProperties {
  Forbidden,
  Model(ModelId),
}

impl Serialize for AdditionalProperties {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Self::Forbidden => serializer.serialize_bool(false),
      Self::Model(id) => id.serialize(serializer),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordModel {
  pub properties: IndexMap<String, Property>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub additional_properties: Option<AdditionalProperties>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub extends_from: Vec<ModelId>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub union_of: Vec<ModelId>,
}

/// Which construct produced a union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum UnionKind {
  OneOf,
  AnyOf,
  /// A `type` array with several scalar members.
  Types,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionModel {
  pub variants: Vec<ModelId>,
  pub composition: UnionKind,
}

/// Variant of a [`ModelKind`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ModelKindTag {
  Primitive,
  Array,
  Record,
  Union,
  Typed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ModelKind {
  Primitive(PrimitiveModel),
  Array {
    items: ModelId,
  },
  Record(RecordModel),
  Union(UnionModel),
  /// An opaque, externally named type.
  #[serde(rename_all = "camelCase")]
  Typed {
    type_name: String,
  },
}

impl ModelKind {
  #[must_use]
  pub fn primitive(ty: PrimitiveType) -> Self {
    Self::Primitive(PrimitiveModel::new(ty))
  }

  #[must_use]
  pub fn tag(&self) -> ModelKindTag {
    match self {
      Self::Primitive(_) => ModelKindTag::Primitive,
      Self::Array { .. } => ModelKindTag::Array,
      Self::Record(_) => ModelKindTag::Record,
      Self::Union(_) => ModelKindTag::Union,
      Self::Typed { .. } => ModelKindTag::Typed,
    }
  }

  /// Every model this kind links to, in declaration order.
  #[must_use]
  pub fn children(&self) -> Vec<ModelId> {
    match self {
      Self::Primitive(_) | Self::Typed { .. } => vec![],
      Self::Array { items } => vec![*items],
      Self::Record(record) => {
        let mut children: Vec<ModelId> = record.properties.values().map(|property| property.model).collect();
        if let Some(AdditionalProperties::Model(id)) = record.additional_properties {
          children.push(id);
        }
        children.extend(&record.extends_from);
        children.extend(&record.union_of);
        children
      }
      Self::Union(union) => union.variants.clone(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
  pub id: ModelId,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  pub location: String,
  #[serde(flatten)]
  pub kind: ModelKind,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub nullable: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub deprecated: bool,
}

impl Model {
  #[must_use]
  pub fn tag(&self) -> ModelKindTag {
    self.kind.tag()
  }
}

/// Flat arena owning every model produced by one generation pass.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ModelRegistry {
  models: Vec<Model>,
}

impl Default for ModelRegistry {
  fn default() -> Self {
    let singleton = |id: ModelId, ty: PrimitiveType| Model {
      id,
      name: None,
      location: String::new(),
      kind: ModelKind::primitive(ty),
      nullable: false,
      description: None,
      deprecated: false,
    };
    Self {
      models: vec![
        singleton(ModelId::ANY, PrimitiveType::Any),
        singleton(ModelId::VOID, PrimitiveType::Void),
      ],
    }
  }
}

impl ModelRegistry {
  /// Allocates an entry whose kind is filled in once its subtree has been walked.
  pub fn reserve(&mut self, name: Option<String>, location: String) -> ModelId {
    let id = ModelId(self.models.len());
    self.models.push(Model {
      id,
      name,
      location,
      kind: ModelKind::primitive(PrimitiveType::Any),
      nullable: false,
      description: None,
      deprecated: false,
    });
    id
  }

  #[must_use]
  pub fn get(&self, id: ModelId) -> Option<&Model> {
    self.models.get(id.0)
  }

  pub fn get_mut(&mut self, id: ModelId) -> Option<&mut Model> {
    self.models.get_mut(id.0)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.models.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.models.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Model> {
    self.models.iter()
  }

  /// Models produced from the document, excluding the two singletons.
  pub fn compiled(&self) -> impl Iterator<Item = &Model> {
    self.models.iter().filter(|model| !model.id.is_singleton())
  }

  pub fn find_by_name(&self, name: &str) -> impl Iterator<Item = &Model> {
    self.compiled().filter(move |model| model.name.as_deref() == Some(name))
  }
}

impl Index<ModelId> for ModelRegistry {
  type Output = Model;

  fn index(&self, id: ModelId) -> &Self::Output {
    &self.models[id.0]
  }
}

/// The finished output of one generation pass.
#[derive(Debug, Clone, Serialize)]
pub struct ModelGraph {
  pub models: ModelRegistry,
  pub apis: Vec<Api>,
}

impl ModelGraph {
  #[must_use]
  pub fn api(&self, name: &str) -> Option<&Api> {
    self.apis.iter().find(|api| api.name == name)
  }

  pub fn methods(&self) -> impl Iterator<Item = &Method> {
    self.apis.iter().flat_map(|api| api.methods.iter())
  }
}
