
use std::convert::Infallible;

use http::Method;
use serde_json::Value;

use super::{
  ComponentSchemas, DocumentResolver, SchemaEdge, SchemaJoins, VisitResult, Visitor, Walker, abort, proceed, walk,
};

/// Records one line per hook so tests can assert on traversal order.
#[derive(Default)]
pub(super) struct Recorder {
  pub(super) events: Vec<String>,
  pub(super) edges: Vec<(String, SchemaEdge)>,
  pub(super) unresolved: Vec<String>,
  pub(super) stop_at_operation: Option<Method>,
}

impl Recorder {
  pub(super) fn walk(mut self, document: &Value, order: ComponentSchemas) -> (Self, bool) {
    let resolver = DocumentResolver::new(document);
    let mut walker = Walker::new(&resolver, order);
    let completed = match walker.visit(&mut self, document) {
      Ok(flow) => flow.is_continue(),
      Err(never) => match never {},
    };
    (self, completed)
  }
}

impl Visitor for Recorder {
  type Error = Infallible;

  fn visit_tag(&mut self, _walker: &mut Walker<'_>, tag: &Value) -> VisitResult<Self::Error> {
    self
      .events
      .push(format!("tag {}", tag.get("name").and_then(Value::as_str).unwrap_or_default()));
    proceed()
  }

  fn visit_path_item(&mut self, walker: &mut Walker<'_>, path: &str, item: &Value) -> VisitResult<Self::Error> {
    self.events.push(format!("path {path}"));
    walk::walk_path_item(self, walker, item)
  }

  fn visit_webhook(&mut self, walker: &mut Walker<'_>, name: &str, item: &Value) -> VisitResult<Self::Error> {
    self.events.push(format!("webhook {name}"));
    walk::walk_path_item(self, walker, item)
  }

  fn visit_operation(
    &mut self,
    walker: &mut Walker<'_>,
    method: &Method,
    operation: &Value,
  ) -> VisitResult<Self::Error> {
    self
      .events
      .push(format!("operation {method} {}", walker.active_location()));
    if self.stop_at_operation.as_ref() == Some(method) {
      return abort();
    }
    walk::walk_operation(self, walker, operation)
  }

  fn visit_parameter(&mut self, walker: &mut Walker<'_>, parameter: &Value) -> VisitResult<Self::Error> {
    self.events.push(format!(
      "parameter {}",
      parameter.get("name").and_then(Value::as_str).unwrap_or_default()
    ));
    walk::walk_parameter(self, walker, parameter)
  }

  fn visit_request_body(&mut self, walker: &mut Walker<'_>, request_body: &Value) -> VisitResult<Self::Error> {
    self.events.push("requestBody".to_string());
    walk::walk_request_body(self, walker, request_body)
  }

  fn visit_response(&mut self, walker: &mut Walker<'_>, status: &str, response: &Value) -> VisitResult<Self::Error> {
    self.events.push(format!("response {status}"));
    walk::walk_response(self, walker, response)
  }

  fn visit_media_type(
    &mut self,
    walker: &mut Walker<'_>,
    media_type: &str,
    node: &Value,
  ) -> VisitResult<Self::Error> {
    self.events.push(format!("media {media_type}"));
    walk::walk_media_type(self, walker, node)
  }

  fn visit_header(&mut self, walker: &mut Walker<'_>, name: &str, header: &Value) -> VisitResult<Self::Error> {
    self.events.push(format!("header {name}"));
    walk::walk_header(self, walker, header)
  }

  fn visit_security_scheme(
    &mut self,
    _walker: &mut Walker<'_>,
    name: &str,
    _scheme: &Value,
  ) -> VisitResult<Self::Error> {
    self.events.push(format!("security {name}"));
    proceed()
  }

  fn visit_schema(&mut self, walker: &mut Walker<'_>, schema: &Value) -> VisitResult<Self::Error> {
    let location = walker.active_location();
    if walker.is_reentrant() {
      self.events.push(format!("schema {location} (reentrant)"));
    } else {
      self.events.push(format!("schema {location}"));
    }
    if let Some(edge) = walker.schema_edge() {
      self.edges.push((location, edge.clone()));
    }
    walk::walk_schema(self, walker, schema)
  }

  fn process_schema_joins(
    &mut self,
    walker: &mut Walker<'_>,
    _parent: &Value,
    joins: &SchemaJoins<'_>,
  ) -> VisitResult<Self::Error> {
    if !joins.is_empty() {
      self.events.push(format!(
        "joins {} allOf={} oneOf={} anyOf={} not={}",
        walker.active_location(),
        joins.all_of.len(),
        joins.one_of.len(),
        joins.any_of.len(),
        joins.not.is_some()
      ));
    }
    proceed()
  }

  fn visit_unresolved_reference(&mut self, _walker: &mut Walker<'_>, reference: &str) -> Result<(), Self::Error> {
    self.unresolved.push(reference.to_string());
    Ok(())
  }
}
