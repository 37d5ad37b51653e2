//! Reference-aware, depth-first traversal of an OpenAPI document.
//!
//! The [`Walker`] owns the traversal state (location stack, schema edges,
//! reference resolution) while a [`Visitor`] supplies the hooks. Every hook has a
//! default implementation that delegates to the matching `walk_*` function in
//! [`walk`], so an implementor overrides only the node kinds it cares about and
//! calls back into `walk_*` to continue below that node.
//!
//! Hooks return [`VisitResult`]: `Continue` moves on to the next sibling, `Break`
//! aborts the whole traversal from any depth, and `Err` is fatal.

pub mod location;
pub mod resolver;
pub mod walk;

#[cfg(test)]
mod tests;

use std::ops::ControlFlow;

use http::Method;
use serde_json::Value;

pub use self::{
  location::{LocationStack, Segment, escape_segment, unescape_segment},
  resolver::{DocumentResolver, NoResolver, Resolver, reference_token},
};

pub type VisitResult<E> = Result<ControlFlow<()>, E>;

/// Propagates a `Break` from a nested visit as an immediate return.
macro_rules! try_visit {
  ($visit:expr) => {
    match $visit {
      Ok(::std::ops::ControlFlow::Continue(())) => {}
      Ok(::std::ops::ControlFlow::Break(())) => return Ok(::std::ops::ControlFlow::Break(())),
      Err(error) => return Err(error),
    }
  };
}
pub(crate) use try_visit;

#[must_use]
pub fn proceed<E>() -> VisitResult<E> {
  Ok(ControlFlow::Continue(()))
}

#[must_use]
pub fn abort<E>() -> VisitResult<E> {
  Ok(ControlFlow::Break(()))
}

/// Where named component schemas are walked relative to path items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComponentSchemas {
  /// Components before paths.
  #[default]
  First,
  /// Paths before components.
  Last,
  /// Named schemas are only reached through references from path items.
  Skip,
}

/// The edge that led from a parent node into the schema being visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaEdge {
  /// Schema of a parameter, header, media type or named component.
  Root,
  TypeVariant(usize),
  Property(String),
  AdditionalProperties,
  Items,
  AllOf(usize),
  OneOf(usize),
  AnyOf(usize),
  Not,
}

/// Composition children of a schema, handed to
/// [`Visitor::process_schema_joins`] once all of them have been visited.
///
/// Entries are the raw children and may still be references; use
/// [`Walker::resolve_node`] to look through them.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaJoins<'a> {
  pub all_of: &'a [Value],
  pub one_of: &'a [Value],
  pub any_of: &'a [Value],
  pub not: Option<&'a Value>,
}

impl SchemaJoins<'_> {
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.all_of.is_empty() && self.one_of.is_empty() && self.any_of.is_empty() && self.not.is_none()
  }
}

/// Traversal hooks. See the module documentation for the control-flow contract.
#[allow(unused_variables)]
pub trait Visitor {
  type Error;

  fn visit_document(&mut self, walker: &mut Walker<'_>, document: &Value) -> VisitResult<Self::Error> {
    walk::walk_document(self, walker, document)
  }

  fn visit_tag(&mut self, walker: &mut Walker<'_>, tag: &Value) -> VisitResult<Self::Error> {
    proceed()
  }

  fn visit_path_item(&mut self, walker: &mut Walker<'_>, path: &str, item: &Value) -> VisitResult<Self::Error> {
    walk::walk_path_item(self, walker, item)
  }

  fn visit_webhook(&mut self, walker: &mut Walker<'_>, name: &str, item: &Value) -> VisitResult<Self::Error> {
    walk::walk_path_item(self, walker, item)
  }

  fn visit_operation(
    &mut self,
    walker: &mut Walker<'_>,
    method: &Method,
    operation: &Value,
  ) -> VisitResult<Self::Error> {
    walk::walk_operation(self, walker, operation)
  }

  fn visit_parameter(&mut self, walker: &mut Walker<'_>, parameter: &Value) -> VisitResult<Self::Error> {
    walk::walk_parameter(self, walker, parameter)
  }

  fn visit_request_body(&mut self, walker: &mut Walker<'_>, request_body: &Value) -> VisitResult<Self::Error> {
    walk::walk_request_body(self, walker, request_body)
  }

  fn visit_response(&mut self, walker: &mut Walker<'_>, status: &str, response: &Value) -> VisitResult<Self::Error> {
    walk::walk_response(self, walker, response)
  }

  fn visit_media_type(
    &mut self,
    walker: &mut Walker<'_>,
    media_type: &str,
    node: &Value,
  ) -> VisitResult<Self::Error> {
    walk::walk_media_type(self, walker, node)
  }

  fn visit_encoding(&mut self, walker: &mut Walker<'_>, property: &str, encoding: &Value) -> VisitResult<Self::Error> {
    walk::walk_encoding(self, walker, encoding)
  }

  fn visit_header(&mut self, walker: &mut Walker<'_>, name: &str, header: &Value) -> VisitResult<Self::Error> {
    walk::walk_header(self, walker, header)
  }

  fn visit_security_scheme(
    &mut self,
    walker: &mut Walker<'_>,
    name: &str,
    scheme: &Value,
  ) -> VisitResult<Self::Error> {
    proceed()
  }

  fn visit_schema(&mut self, walker: &mut Walker<'_>, schema: &Value) -> VisitResult<Self::Error> {
    walk::walk_schema(self, walker, schema)
  }

  /// Fires after every child of `parent` has been visited. The walker applies no
  /// composition semantics of its own.
  fn process_schema_joins(
    &mut self,
    walker: &mut Walker<'_>,
    parent: &Value,
    joins: &SchemaJoins<'_>,
  ) -> VisitResult<Self::Error> {
    proceed()
  }

  /// Called for a reference the resolver could not resolve, just before the
  /// branch is pruned.
  fn visit_unresolved_reference(&mut self, walker: &mut Walker<'_>, reference: &str) -> Result<(), Self::Error> {
    Ok(())
  }
}

/// Traversal state shared by all hooks of one walk.
pub struct Walker<'doc> {
  resolver: &'doc dyn Resolver,
  location: LocationStack,
  edges: Vec<SchemaEdge>,
  component_schemas: ComponentSchemas,
}

impl<'doc> Walker<'doc> {
  #[must_use]
  pub fn new(resolver: &'doc dyn Resolver, component_schemas: ComponentSchemas) -> Self {
    Self {
      resolver,
      location: LocationStack::default(),
      edges: Vec::new(),
      component_schemas,
    }
  }

  /// Walks `document`, returning `Break` if a hook aborted the traversal.
  pub fn visit<V>(&mut self, visitor: &mut V, document: &Value) -> VisitResult<V::Error>
  where
    V: Visitor + ?Sized,
  {
    self.location.reset();
    self.edges.clear();
    visitor.visit_document(self, document)
  }

  #[must_use]
  pub fn active_location(&self) -> String {
    self.location.active_location()
  }

  #[must_use]
  pub fn location(&self) -> &LocationStack {
    &self.location
  }

  /// The edge into the schema currently being visited, if any.
  #[must_use]
  pub fn schema_edge(&self) -> Option<&SchemaEdge> {
    self.edges.last()
  }

  #[must_use]
  pub fn component_schemas(&self) -> ComponentSchemas {
    self.component_schemas
  }

  /// True while visiting the target of a reference that is already being walked
  /// further up the stack.
  #[must_use]
  pub fn is_reentrant(&self) -> bool {
    self.location.is_reentrant()
  }

  /// Runs `f` with `segment` pushed onto the location stack. The segment is popped
  /// on every exit path of `f`.
  pub fn scoped<T>(&mut self, segment: impl Into<Segment>, f: impl FnOnce(&mut Self) -> T) -> T {
    self.location.push(segment.into());
    let result = f(self);
    self.location.pop();
    result
  }

  /// Follows a reference chain starting at `node` without visiting anything.
  #[must_use]
  pub fn resolve_node<'a>(&'a self, node: &'a Value) -> Option<&'a Value> {
    let resolver = self.resolver;
    let mut seen = Vec::new();
    let mut target = node;
    while let Some(token) = reference_token(target) {
      if seen.contains(&token) {
        return None;
      }
      seen.push(token);
      target = resolver.resolve(token)?;
    }
    Some(target)
  }

  /// Resolves `node` if it is a reference, then hands the target to `visit`.
  ///
  /// While `visit` runs, one reference snapshot per followed token sits on the
  /// location stack. Unresolved references and reference chains that loop back
  /// on themselves prune the branch.
  pub fn inspect<V, F>(&mut self, visitor: &mut V, node: &Value, visit: F) -> VisitResult<V::Error>
  where
    V: Visitor + ?Sized,
    F: FnOnce(&mut V, &mut Self, &Value) -> VisitResult<V::Error>,
  {
    let resolver = self.resolver;
    let mut tokens: Vec<&str> = Vec::new();
    let mut target: &Value = node;

    while let Some(token) = reference_token(target) {
      let next = if tokens.contains(&token) {
        None
      } else {
        resolver.resolve(token)
      };

      let Some(next) = next else {
        tracing::debug!(reference = token, location = %self.active_location(), "pruning unresolved reference");
        visitor.visit_unresolved_reference(self, token)?;
        return proceed();
      };

      tracing::trace!(reference = token, "following reference");
      tokens.push(token);
      target = next;
    }

    for token in &tokens {
      self.location.push_reference(token);
    }
    let result = visit(visitor, self, target);
    for _ in &tokens {
      self.location.pop();
    }
    result
  }

  pub fn inspect_schema<V>(&mut self, visitor: &mut V, edge: SchemaEdge, node: &Value) -> VisitResult<V::Error>
  where
    V: Visitor + ?Sized,
  {
    self.edges.push(edge);
    let result = self.inspect(visitor, node, |visitor, walker, schema| visitor.visit_schema(walker, schema));
    self.edges.pop();
    result
  }

  pub fn inspect_path_item<V>(&mut self, visitor: &mut V, path: &str, node: &Value) -> VisitResult<V::Error>
  where
    V: Visitor + ?Sized,
  {
    self.inspect(visitor, node, |visitor, walker, item| visitor.visit_path_item(walker, path, item))
  }

  pub fn inspect_parameter<V>(&mut self, visitor: &mut V, node: &Value) -> VisitResult<V::Error>
  where
    V: Visitor + ?Sized,
  {
    self.inspect(visitor, node, |visitor, walker, parameter| {
      visitor.visit_parameter(walker, parameter)
    })
  }

  pub fn inspect_request_body<V>(&mut self, visitor: &mut V, node: &Value) -> VisitResult<V::Error>
  where
    V: Visitor + ?Sized,
  {
    self.inspect(visitor, node, |visitor, walker, body| visitor.visit_request_body(walker, body))
  }

  pub fn inspect_response<V>(&mut self, visitor: &mut V, status: &str, node: &Value) -> VisitResult<V::Error>
  where
    V: Visitor + ?Sized,
  {
    self.inspect(visitor, node, |visitor, walker, response| {
      visitor.visit_response(walker, status, response)
    })
  }

  pub fn inspect_header<V>(&mut self, visitor: &mut V, name: &str, node: &Value) -> VisitResult<V::Error>
  where
    V: Visitor + ?Sized,
  {
    self.inspect(visitor, node, |visitor, walker, header| visitor.visit_header(walker, name, header))
  }

  pub fn inspect_security_scheme<V>(&mut self, visitor: &mut V, name: &str, node: &Value) -> VisitResult<V::Error>
  where
    V: Visitor + ?Sized,
  {
    self.inspect(visitor, node, |visitor, walker, scheme| {
      visitor.visit_security_scheme(walker, name, scheme)
    })
  }
}
