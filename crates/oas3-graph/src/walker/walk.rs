//! Default traversal below each node kind.
//!
//! Each function visits the children of one node in document order and stops as
//! soon as a child visit returns `Break`.

use http::Method;
use serde_json::{Map, Value};

use super::{ComponentSchemas, SchemaEdge, SchemaJoins, VisitResult, Visitor, Walker, proceed, try_visit};

/// HTTP methods a path item may carry, in walk order.
const OPERATION_METHODS: [(&str, Method); 8] = [
  ("get", Method::GET),
  ("put", Method::PUT),
  ("post", Method::POST),
  ("delete", Method::DELETE),
  ("options", Method::OPTIONS),
  ("head", Method::HEAD),
  ("patch", Method::PATCH),
  ("trace", Method::TRACE),
];

fn object_field<'a>(node: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
  node.get(key).and_then(Value::as_object)
}

fn array_field<'a>(node: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
  node.get(key).and_then(Value::as_array)
}

pub fn walk_document<V>(visitor: &mut V, walker: &mut Walker<'_>, document: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  if let Some(tags) = array_field(document, "tags") {
    try_visit!(walker.scoped("tags", |walker| {
      for (index, tag) in tags.iter().enumerate() {
        try_visit!(walker.scoped(index, |walker| visitor.visit_tag(walker, tag)));
      }
      proceed()
    }));
  }

  let components = document.get("components").filter(|components| components.is_object());
  let order = walker.component_schemas();

  if order != ComponentSchemas::Last
    && let Some(components) = components
  {
    try_visit!(walker.scoped("components", |walker| walk_components(visitor, walker, components)));
  }

  if let Some(paths) = object_field(document, "paths") {
    try_visit!(walker.scoped("paths", |walker| {
      for (path, item) in paths {
        try_visit!(walker.scoped(path.as_str(), |walker| walker.inspect_path_item(visitor, path, item)));
      }
      proceed()
    }));
  }

  if let Some(webhooks) = object_field(document, "webhooks") {
    try_visit!(walker.scoped("webhooks", |walker| {
      for (name, item) in webhooks {
        try_visit!(walker.scoped(name.as_str(), |walker| {
          walker.inspect(visitor, item, |visitor, walker, item| visitor.visit_webhook(walker, name, item))
        }));
      }
      proceed()
    }));
  }

  if order == ComponentSchemas::Last
    && let Some(components) = components
  {
    try_visit!(walker.scoped("components", |walker| walk_components(visitor, walker, components)));
  }

  proceed()
}

/// Walks named schemas (unless skipped) and security schemes.
pub fn walk_components<V>(visitor: &mut V, walker: &mut Walker<'_>, components: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  if walker.component_schemas() != ComponentSchemas::Skip
    && let Some(schemas) = object_field(components, "schemas")
  {
    try_visit!(walker.scoped("schemas", |walker| {
      for (name, schema) in schemas {
        try_visit!(walker.scoped(name.as_str(), |walker| {
          walker.inspect_schema(visitor, SchemaEdge::Root, schema)
        }));
      }
      proceed()
    }));
  }

  if let Some(schemes) = object_field(components, "securitySchemes") {
    try_visit!(walker.scoped("securitySchemes", |walker| {
      for (name, scheme) in schemes {
        try_visit!(walker.scoped(name.as_str(), |walker| {
          walker.inspect_security_scheme(visitor, name, scheme)
        }));
      }
      proceed()
    }));
  }

  proceed()
}

fn walk_parameter_list<V>(visitor: &mut V, walker: &mut Walker<'_>, node: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  let Some(parameters) = array_field(node, "parameters") else {
    return proceed();
  };
  walker.scoped("parameters", |walker| {
    for (index, parameter) in parameters.iter().enumerate() {
      try_visit!(walker.scoped(index, |walker| walker.inspect_parameter(visitor, parameter)));
    }
    proceed()
  })
}

/// Walks path-level parameters, then each operation in [`OPERATION_METHODS`] order.
pub fn walk_path_item<V>(visitor: &mut V, walker: &mut Walker<'_>, item: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  try_visit!(walk_parameter_list(visitor, walker, item));

  for (key, method) in &OPERATION_METHODS {
    if let Some(operation) = item.get(*key).filter(|operation| operation.is_object()) {
      try_visit!(walker.scoped(*key, |walker| visitor.visit_operation(walker, method, operation)));
    }
  }

  proceed()
}

pub fn walk_operation<V>(visitor: &mut V, walker: &mut Walker<'_>, operation: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  try_visit!(walk_parameter_list(visitor, walker, operation));

  if let Some(body) = operation.get("requestBody").filter(|body| body.is_object()) {
    try_visit!(walker.scoped("requestBody", |walker| walker.inspect_request_body(visitor, body)));
  }

  if let Some(responses) = object_field(operation, "responses") {
    try_visit!(walker.scoped("responses", |walker| {
      for (status, response) in responses {
        try_visit!(walker.scoped(status.as_str(), |walker| {
          walker.inspect_response(visitor, status, response)
        }));
      }
      proceed()
    }));
  }

  proceed()
}

/// Parameters and headers carry either a `schema` or a `content` map. The first
/// one present wins.
fn walk_schema_or_content<V>(visitor: &mut V, walker: &mut Walker<'_>, node: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  if let Some(schema) = node.get("schema").filter(|schema| schema.is_object()) {
    return walker.scoped("schema", |walker| walker.inspect_schema(visitor, SchemaEdge::Root, schema));
  }
  walk_content(visitor, walker, node)
}

fn walk_content<V>(visitor: &mut V, walker: &mut Walker<'_>, node: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  let Some(content) = object_field(node, "content").filter(|content| !content.is_empty()) else {
    return proceed();
  };
  walker.scoped("content", |walker| {
    for (media_type, media) in content {
      try_visit!(walker.scoped(media_type.as_str(), |walker| {
        visitor.visit_media_type(walker, media_type, media)
      }));
    }
    proceed()
  })
}

fn walk_headers<V>(visitor: &mut V, walker: &mut Walker<'_>, node: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  let Some(headers) = object_field(node, "headers") else {
    return proceed();
  };
  walker.scoped("headers", |walker| {
    for (name, header) in headers {
      try_visit!(walker.scoped(name.as_str(), |walker| walker.inspect_header(visitor, name, header)));
    }
    proceed()
  })
}

pub fn walk_parameter<V>(visitor: &mut V, walker: &mut Walker<'_>, parameter: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  walk_schema_or_content(visitor, walker, parameter)
}

pub fn walk_request_body<V>(visitor: &mut V, walker: &mut Walker<'_>, request_body: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  walk_content(visitor, walker, request_body)
}

pub fn walk_response<V>(visitor: &mut V, walker: &mut Walker<'_>, response: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  try_visit!(walk_content(visitor, walker, response));
  walk_headers(visitor, walker, response)
}

pub fn walk_media_type<V>(visitor: &mut V, walker: &mut Walker<'_>, media: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  if let Some(schema) = media.get("schema").filter(|schema| schema.is_object()) {
    try_visit!(walker.scoped("schema", |walker| walker.inspect_schema(visitor, SchemaEdge::Root, schema)));
  }

  if let Some(encodings) = object_field(media, "encoding") {
    try_visit!(walker.scoped("encoding", |walker| {
      for (property, encoding) in encodings {
        try_visit!(walker.scoped(property.as_str(), |walker| {
          visitor.visit_encoding(walker, property, encoding)
        }));
      }
      proceed()
    }));
  }

  proceed()
}

pub fn walk_encoding<V>(visitor: &mut V, walker: &mut Walker<'_>, encoding: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  walk_headers(visitor, walker, encoding)
}

pub fn walk_header<V>(visitor: &mut V, walker: &mut Walker<'_>, header: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  walk_schema_or_content(visitor, walker, header)
}

/// Builds the single-type schema for one entry of a `type` array.
#[must_use]
pub fn type_variant(schema: &Map<String, Value>, ty: &Value) -> Value {
  let mut variant = Map::new();
  variant.insert("type".to_string(), ty.clone());
  if let Some(format) = schema.get("format") {
    variant.insert("format".to_string(), format.clone());
  }
  Value::Object(variant)
}

fn walk_subschemas<V>(
  visitor: &mut V,
  walker: &mut Walker<'_>,
  keyword: &str,
  schemas: &[Value],
  edge: fn(usize) -> SchemaEdge,
) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  walker.scoped(keyword, |walker| {
    for (index, schema) in schemas.iter().enumerate() {
      try_visit!(walker.scoped(index, |walker| walker.inspect_schema(visitor, edge(index), schema)));
    }
    proceed()
  })
}

/// Walks every subschema of `schema`, then fires
/// [`Visitor::process_schema_joins`].
///
/// Does nothing while the walker is re-entering a reference that is already on
/// the stack, which is what terminates recursive schemas.
pub fn walk_schema<V>(visitor: &mut V, walker: &mut Walker<'_>, schema: &Value) -> VisitResult<V::Error>
where
  V: Visitor + ?Sized,
{
  if walker.is_reentrant() {
    return proceed();
  }
  let Some(object) = schema.as_object() else {
    return proceed();
  };

  if let Some(types) = object.get("type").and_then(Value::as_array) {
    try_visit!(walker.scoped("type", |walker| {
      for (index, ty) in types.iter().enumerate() {
        let variant = type_variant(object, ty);
        try_visit!(walker.scoped(index, |walker| {
          walker.inspect_schema(visitor, SchemaEdge::TypeVariant(index), &variant)
        }));
      }
      proceed()
    }));
  }

  if let Some(properties) = object.get("properties").and_then(Value::as_object) {
    try_visit!(walker.scoped("properties", |walker| {
      for (name, property) in properties {
        try_visit!(walker.scoped(name.as_str(), |walker| {
          walker.inspect_schema(visitor, SchemaEdge::Property(name.clone()), property)
        }));
      }
      proceed()
    }));
  }

  if let Some(additional) = object.get("additionalProperties").filter(|additional| additional.is_object()) {
    try_visit!(walker.scoped("additionalProperties", |walker| {
      walker.inspect_schema(visitor, SchemaEdge::AdditionalProperties, additional)
    }));
  }

  if let Some(items) = object.get("items").filter(|items| items.is_object()) {
    try_visit!(walker.scoped("items", |walker| walker.inspect_schema(visitor, SchemaEdge::Items, items)));
  }

  let mut joins = SchemaJoins::default();
  if let Some(all_of) = object.get("allOf").and_then(Value::as_array) {
    try_visit!(walk_subschemas(visitor, walker, "allOf", all_of, SchemaEdge::AllOf));
    joins.all_of = all_of;
  }
  if let Some(one_of) = object.get("oneOf").and_then(Value::as_array) {
    try_visit!(walk_subschemas(visitor, walker, "oneOf", one_of, SchemaEdge::OneOf));
    joins.one_of = one_of;
  }
  if let Some(any_of) = object.get("anyOf").and_then(Value::as_array) {
    try_visit!(walk_subschemas(visitor, walker, "anyOf", any_of, SchemaEdge::AnyOf));
    joins.any_of = any_of;
  }
  if let Some(not) = object.get("not").filter(|not| not.is_object()) {
    try_visit!(walker.scoped("not", |walker| walker.inspect_schema(visitor, SchemaEdge::Not, not)));
    joins.not = Some(not);
  }

  visitor.process_schema_joins(walker, schema, &joins)
}
