use std::collections::HashMap;

use serde_json::json;

use super::support::{document, generate, model, named, try_generate};
use crate::{
  generator::{GenerationWarning, GeneratorConfig, GeneratorError},
  model::{AdditionalProperties, ModelId, ModelKind, PrimitiveType, UnionKind, UnionModel},
  walker::ComponentSchemas,
};

fn tree_schemas() -> serde_json::Value {
  json!({
    "Tree": {
      "type": "object",
      "required": ["value"],
      "properties": {
        "value": { "type": "integer" },
        "children": { "type": "array", "items": { "$ref": "#/components/schemas/Tree" } }
      }
    }
  })
}

#[test]
fn test_self_referential_record_links_back_to_itself() {
  let output = generate(&document(json!({}), tree_schemas()));
  let graph = &output.graph;

  let tree = named(graph, "Tree");
  let ModelKind::Record(record) = &tree.kind else {
    panic!("expected Tree to be a record, got {:?}", tree.kind);
  };
  assert!(record.properties["value"].required);
  assert!(!record.properties["children"].required);

  let children = model(graph, record.properties["children"].model);
  assert_eq!(children.kind, ModelKind::Array { items: tree.id });
  assert_eq!(graph.models.compiled().count(), 3);
}

#[test]
fn test_cycle_reached_only_through_operations() {
  let paths = json!({
    "/trees": {
      "get": {
        "responses": {
          "200": {
            "description": "ok",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Tree" } } }
          }
        }
      }
    }
  });
  let config = GeneratorConfig::builder()
    .component_schemas(ComponentSchemas::Skip)
    .build();
  let output = try_generate(&document(paths, tree_schemas()), config).unwrap();
  let graph = &output.graph;

  let tree = named(graph, "Tree");
  assert_eq!(tree.location, "#/components/schemas/Tree");
  let response = &graph.methods().next().unwrap().responses["200"];
  assert_eq!(response.model, tree.id);

  let children = named(graph, "children");
  assert_eq!(children.location, "#/components/schemas/Tree/properties/children");
  assert_eq!(children.kind, ModelKind::Array { items: tree.id });
}

#[test]
fn test_skip_compiles_only_reachable_schemas() {
  let paths = json!({
    "/pets": {
      "get": {
        "responses": {
          "200": {
            "description": "ok",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } }
          }
        }
      }
    }
  });
  let schemas = json!({
    "Pet": { "type": "object", "properties": { "tag": { "type": "string" } } },
    "Unused": { "type": "object", "properties": { "note": { "type": "string" } } }
  });
  let config = GeneratorConfig::builder()
    .component_schemas(ComponentSchemas::Skip)
    .build();
  let output = try_generate(&document(paths, schemas), config).unwrap();

  assert_eq!(output.graph.models.find_by_name("Unused").count(), 0);
  let tag = named(&output.graph, "tag");
  assert_eq!(tag.location, "#/components/schemas/Pet/properties/tag");
}

#[test]
fn test_inline_response_schema_location() {
  let paths = json!({
    "/pets": {
      "get": {
        "responses": {
          "200": {
            "description": "ok",
            "content": { "application/json": { "schema": { "type": "array", "items": { "type": "string" } } } }
          }
        }
      }
    }
  });
  let output = generate(&document(paths, json!({})));
  let graph = &output.graph;

  let response = &graph.methods().next().unwrap().responses["200"];
  let list = model(graph, response.model);
  assert_eq!(
    list.location,
    "#/paths/~1pets/get/responses/200/content/application~1json/schema"
  );
  assert_eq!(list.name, None);

  let ModelKind::Array { items } = list.kind else {
    panic!("expected array");
  };
  assert_eq!(
    model(graph, items).location,
    "#/paths/~1pets/get/responses/200/content/application~1json/schema/items"
  );
}

#[test]
fn test_names_are_gated_on_deduplication() {
  let schemas = json!({
    "Celsius": { "type": "number", "format": "double" },
    "Fahrenheit": { "type": "number", "format": "double" }
  });
  let output = generate(&document(json!({}), schemas));
  assert_ne!(
    named(&output.graph, "Celsius").id,
    named(&output.graph, "Fahrenheit").id
  );
}

#[test]
fn test_composition_builds_unions_and_extensions() {
  let schemas = json!({
    "Shape": {
      "oneOf": [{ "$ref": "#/components/schemas/Circle" }, { "$ref": "#/components/schemas/Square" }]
    },
    "Circle": { "type": "object", "properties": { "radius": { "type": "number" } } },
    "Square": { "type": "object", "properties": { "side": { "type": "number" } } },
    "Tile": {
      "allOf": [
        { "$ref": "#/components/schemas/Square" },
        { "type": "object", "properties": { "glazed": { "type": "boolean" } } }
      ]
    }
  });
  let output = generate(&document(json!({}), schemas));
  let graph = &output.graph;
  let circle = named(graph, "Circle").id;
  let square = named(graph, "Square").id;

  assert_eq!(
    named(graph, "Shape").kind,
    ModelKind::Union(UnionModel {
      variants: vec![circle, square],
      composition: UnionKind::OneOf,
    })
  );

  let ModelKind::Record(tile) = &named(graph, "Tile").kind else {
    panic!("expected Tile to be a record");
  };
  assert_eq!(tile.extends_from.len(), 2);
  assert_eq!(tile.extends_from[0], square);
  assert_eq!(
    model(graph, tile.extends_from[1]).location,
    "#/components/schemas/Tile/allOf/1"
  );
}

#[test]
fn test_type_arrays() {
  let schemas = json!({
    "Maybe": { "type": ["string", "null"] },
    "Mixed": { "type": ["string", "integer", "null"], "description": "string or integer" }
  });
  let output = generate(&document(json!({}), schemas));
  let graph = &output.graph;

  let maybe = named(graph, "Maybe");
  assert!(maybe.nullable);
  assert_eq!(maybe.kind, ModelKind::primitive(PrimitiveType::String));

  let mixed = named(graph, "Mixed");
  assert!(mixed.nullable);
  assert_eq!(mixed.description.as_deref(), Some("string or integer"));
  let ModelKind::Union(union) = &mixed.kind else {
    panic!("expected union");
  };
  assert_eq!(union.composition, UnionKind::Types);
  let variants: Vec<_> = union.variants.iter().map(|id| model(graph, *id).kind.clone()).collect();
  assert_eq!(
    variants,
    vec![
      ModelKind::primitive(PrimitiveType::String),
      ModelKind::primitive(PrimitiveType::Integer)
    ]
  );
  assert_eq!(graph.models.compiled().count(), 4);
}

#[test]
fn test_typed_formats_and_dictionaries() {
  let schemas = json!({
    "Event": {
      "type": "object",
      "properties": {
        "at": { "type": "string", "format": "date-time" },
        "labels": { "type": "object", "additionalProperties": { "type": "string" } },
        "sealed": { "type": "object", "additionalProperties": false }
      }
    }
  });
  let config = GeneratorConfig::builder()
    .typed_formats(HashMap::from([("date-time".to_string(), "DateTime".to_string())]))
    .build();
  let output = try_generate(&document(json!({}), schemas), config).unwrap();
  let graph = &output.graph;

  assert_eq!(
    named(graph, "at").kind,
    ModelKind::Typed {
      type_name: "DateTime".to_string()
    }
  );

  let ModelKind::Record(labels) = &named(graph, "labels").kind else {
    panic!("expected record");
  };
  let Some(AdditionalProperties::Model(values)) = labels.additional_properties else {
    panic!("expected typed additional properties");
  };
  assert_eq!(model(graph, values).kind, ModelKind::primitive(PrimitiveType::String));

  let ModelKind::Record(sealed) = &named(graph, "sealed").kind else {
    panic!("expected record");
  };
  assert_eq!(sealed.additional_properties, Some(AdditionalProperties::Forbidden));
}

#[test]
fn test_not_is_rejected() {
  let schemas = json!({ "NotString": { "not": { "type": "string" } } });
  let error = try_generate(&document(json!({}), schemas), GeneratorConfig::default()).unwrap_err();
  assert!(
    matches!(&error, GeneratorError::UnsupportedSchema { location, .. } if location == "#/components/schemas/NotString"),
    "{error}"
  );
}

#[test]
fn test_one_of_with_any_of_is_rejected() {
  let schemas = json!({ "Both": { "oneOf": [{ "type": "string" }], "anyOf": [{ "type": "integer" }] } });
  let error = try_generate(&document(json!({}), schemas), GeneratorConfig::default()).unwrap_err();
  assert!(matches!(error, GeneratorError::UnsupportedSchema { .. }), "{error}");
}

#[test]
fn test_unresolved_reference_is_a_warning() {
  let schemas = json!({
    "Owner": { "type": "object", "properties": { "pet": { "$ref": "#/components/schemas/Missing" } } }
  });
  let output = generate(&document(json!({}), schemas));

  let ModelKind::Record(owner) = &named(&output.graph, "Owner").kind else {
    panic!("expected record");
  };
  assert_eq!(owner.properties["pet"].model, ModelId::ANY);
  assert_eq!(
    output.warnings,
    vec![GenerationWarning::UnresolvedReference {
      reference: "#/components/schemas/Missing".to_string(),
      location: "#/components/schemas/Owner/properties/pet".to_string(),
    }]
  );
}

#[test]
fn test_webhooks_are_skipped() {
  let mut document = document(json!({}), json!({}));
  document["webhooks"] = json!({
    "newPet": {
      "post": {
        "requestBody": { "content": { "application/json": { "schema": { "type": "object" } } } },
        "responses": { "200": { "description": "ok" } }
      }
    }
  });
  let output = generate(&document);

  assert!(output.graph.apis.is_empty());
  assert_eq!(output.graph.models.compiled().count(), 0);
  assert_eq!(
    output.warnings,
    vec![GenerationWarning::SkippedWebhook {
      name: "newPet".to_string()
    }]
  );
}

#[test]
fn test_non_object_document_is_invalid() {
  let error = try_generate(&json!([]), GeneratorConfig::default()).unwrap_err();
  assert!(matches!(error, GeneratorError::InvalidDocument { .. }));
}
