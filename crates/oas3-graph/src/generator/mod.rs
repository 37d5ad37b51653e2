//! Schema-to-model compiler.
//!
//! [`Generator`] is a [`Visitor`] that builds the [`ModelGraph`] while the
//! walker traverses the document. Which container a root schema belongs to is
//! decided by an explicit [`FrameStack`](context::FrameStack) rather than by
//! visit order, and each schema collects its child models in a
//! [`SchemaFrame`](context::SchemaFrame) that is classified once the subtree has
//! been walked.

mod classify;
pub mod config;
mod context;
pub mod error;
pub mod fingerprint;
pub mod matching;
pub mod media_types;
pub mod metrics;
pub mod orchestrator;
mod parameters;
pub mod status_codes;

#[cfg(test)]
mod tests;

use std::{collections::HashMap, ptr};

use indexmap::IndexMap;
use serde_json::{Map, Value};

pub use self::{
  config::GeneratorConfig,
  error::GeneratorError,
  metrics::{GenerationStats, GenerationWarning},
  orchestrator::{GraphMetadata, Orchestrator},
};
use self::{
  classify::TypeSet,
  context::{
    ContentSlot, Frame, FrameStack, OperationFrame, ParameterFrame, PathItemFrame, RequestBodyFrame, ResponseFrame,
    SchemaFrame,
  },
  fingerprint::CanonicalSchema,
  matching::schemas_match,
  media_types::MediaTypeRanker,
  parameters::{RawParameter, body_parameter_name, merge_parameters, order_parameters},
  status_codes::preferred_response_codes,
};
use crate::{
  model::{Api, BodyParameter, Method, ModelGraph, ModelId, ModelRegistry, NamedParameter, Response},
  walker::{
    DocumentResolver, Resolver, SchemaEdge, SchemaJoins, VisitResult, Visitor, Walker, abort, proceed, walk,
  },
};

/// Result of one generation pass.
#[derive(Debug)]
pub struct GeneratorOutput {
  pub graph: ModelGraph,
  pub warnings: Vec<GenerationWarning>,
}

/// Compiles one document. Every pass needs a fresh instance.
pub struct Generator {
  config: GeneratorConfig,
  ranker: MediaTypeRanker,
  registry: ModelRegistry,
  apis: IndexMap<String, Api>,
  frames: FrameStack,
  schemas: Vec<SchemaFrame>,
  by_identity: HashMap<usize, ModelId>,
  by_location: HashMap<String, ModelId>,
  buckets: HashMap<CanonicalSchema, Vec<ModelId>>,
  fingerprints: HashMap<ModelId, CanonicalSchema>,
  sources: HashMap<ModelId, Value>,
  warnings: Vec<GenerationWarning>,
}

impl Generator {
  pub fn new(config: GeneratorConfig) -> Result<Self, GeneratorError> {
    let ranker = MediaTypeRanker::new(&config.media_type_preferences)?;
    Ok(Self {
      config,
      ranker,
      registry: ModelRegistry::default(),
      apis: IndexMap::new(),
      frames: FrameStack::default(),
      schemas: vec![],
      by_identity: HashMap::new(),
      by_location: HashMap::new(),
      buckets: HashMap::new(),
      fingerprints: HashMap::new(),
      sources: HashMap::new(),
      warnings: vec![],
    })
  }

  /// Compiles a self-contained document, resolving `#/...` references against it.
  pub fn generate(self, document: &Value) -> Result<GeneratorOutput, GeneratorError> {
    let resolver = DocumentResolver::new(document);
    self.run(document, &resolver)
  }

  pub fn run(mut self, document: &Value, resolver: &dyn Resolver) -> Result<GeneratorOutput, GeneratorError> {
    if !document.is_object() {
      return Err(GeneratorError::invalid_document("#", "document root is not an object"));
    }

    let mut walker = Walker::new(resolver, self.config.component_schemas);
    if walker.visit(&mut self, document)?.is_break() {
      tracing::debug!("traversal stopped early");
    }

    tracing::debug!(
      models = self.registry.len(),
      apis = self.apis.len(),
      warnings = self.warnings.len(),
      "generation pass complete"
    );
    Ok(GeneratorOutput {
      graph: ModelGraph {
        models: self.registry,
        apis: self.apis.into_values().collect(),
      },
      warnings: self.warnings,
    })
  }

  fn known_model(&self, identity: Option<usize>, location: &str) -> Option<ModelId> {
    identity
      .and_then(|identity| self.by_identity.get(&identity))
      .or_else(|| self.by_location.get(location))
      .copied()
  }

  fn remember(&mut self, identity: Option<usize>, location: String, id: ModelId) {
    if let Some(identity) = identity {
      self.by_identity.insert(identity, id);
    }
    self.by_location.insert(location, id);
  }

  /// An already-built model with the same derived name whose schema matches.
  fn find_match(&self, name: Option<&str>, fingerprint: Option<&CanonicalSchema>, schema: &Value) -> Option<ModelId> {
    let candidates = self.buckets.get(fingerprint?)?;
    candidates.iter().copied().find(|candidate| {
      self.registry[*candidate].name.as_deref() == name
        && self
          .sources
          .get(candidate)
          .is_some_and(|source| schemas_match(source, schema))
    })
  }

  fn models_match(&self, a: ModelId, b: ModelId) -> bool {
    if a == b {
      return true;
    }
    let same_fingerprint = matches!(
      (self.fingerprints.get(&a), self.fingerprints.get(&b)),
      (Some(left), Some(right)) if left == right
    );
    same_fingerprint
      && matches!(
        (self.sources.get(&a), self.sources.get(&b)),
        (Some(left), Some(right)) if schemas_match(left, right)
      )
  }

  /// Hands a finished schema model to its parent schema, or to the innermost
  /// container frame when it is a root schema.
  fn report(&mut self, edge: &SchemaEdge, id: ModelId) {
    match self.schemas.last_mut() {
      Some(parent) => parent.record(edge, id),
      None => {
        if *edge == SchemaEdge::Root {
          self.frames.attach_root_model(id);
        }
      }
    }
  }

  /// Picks the model of a content map: a single entry is used as is, otherwise
  /// the preferred media types are ranked and structurally equal candidates
  /// collapse into one. Returns the model and the accepted media types.
  fn resolve_content(&mut self, location: &str, content: &ContentSlot) -> Result<(ModelId, Vec<String>), GeneratorError> {
    let entries = content.media_models();
    if let [(media_type, model)] = entries.as_slice() {
      return Ok((*model, vec![(*media_type).to_string()]));
    }

    let ranked = self.ranker.rank(entries.iter().map(|(media_type, _)| *media_type));
    if ranked.is_empty() {
      let declared: Vec<String> = entries.iter().map(|(media_type, _)| (*media_type).to_string()).collect();
      self.warnings.push(GenerationWarning::NoPreferredMediaType {
        location: location.to_string(),
        media_types: declared.join(", "),
      });
      return Ok((ModelId::ANY, declared));
    }

    let mut survivors: Vec<(&str, ModelId)> = vec![];
    for media_type in ranked.iter().copied() {
      let Some(model) = entries
        .iter()
        .find(|(candidate, _)| *candidate == media_type)
        .map(|(_, model)| *model)
      else {
        continue;
      };
      if !survivors.iter().any(|(_, kept)| self.models_match(*kept, model)) {
        survivors.push((media_type, model));
      }
    }

    match survivors.as_slice() {
      [(_, model)] => Ok((*model, ranked.iter().map(ToString::to_string).collect())),
      _ => Err(GeneratorError::AmbiguousContent {
        location: location.to_string(),
        media_types: survivors.iter().map(|(media_type, _)| (*media_type).to_string()).collect(),
      }),
    }
  }

  fn body_parameter(
    &mut self,
    body: RequestBodyFrame,
    siblings: &[NamedParameter],
  ) -> Result<BodyParameter, GeneratorError> {
    let (model, media_types) = if body.content.media.is_empty() {
      (ModelId::ANY, vec![])
    } else {
      self.resolve_content(&body.location, &body.content)?
    };
    Ok(BodyParameter {
      name: body_parameter_name(body.name.as_deref(), siblings, &self.config.body_parameter_names),
      required: body.required,
      model,
      media_types,
      description: body.description,
    })
  }

  fn response(&mut self, response: ResponseFrame) -> Result<Response, GeneratorError> {
    let (model, media_types) = if response.content.media.is_empty() {
      (ModelId::VOID, vec![])
    } else {
      self.resolve_content(&response.location, &response.content)?
    };
    Ok(Response {
      http_status_key: response.status,
      model,
      media_types,
      description: response.description,
    })
  }

  fn assemble_method(
    &mut self,
    http_method: &http::Method,
    operation: &Value,
    frame: OperationFrame,
  ) -> Result<Method, GeneratorError> {
    let path = self.frames.path().unwrap_or_default().to_string();
    let named = merge_parameters(self.frames.path_parameters(), frame.parameters);
    let body = match frame.body {
      Some(body) => Some(self.body_parameter(body, &named)?),
      None => None,
    };
    let parameters = order_parameters(named, body);

    let order: Vec<String> = preferred_response_codes(http_method, frame.responses.iter().map(|r| r.status.as_str()))
      .into_iter()
      .map(String::from)
      .collect();
    let mut pending = frame.responses;
    let mut responses = IndexMap::with_capacity(order.len());
    for code in order {
      let Some(index) = pending.iter().position(|response| response.status == code) else {
        continue;
      };
      let response = self.response(pending.swap_remove(index))?;
      responses.insert(code, response);
    }

    let name = text_field(operation, "operationId").unwrap_or_else(|| derived_method_name(http_method, &path));
    tracing::debug!(method = %name, http_method = %http_method, path = %path, "assembled method");

    Ok(Method {
      name,
      http_method: http_method.clone(),
      path_pattern: path,
      parameters,
      responses,
      summary: text_field(operation, "summary"),
      description: text_field(operation, "description"),
      deprecated: operation.get("deprecated").and_then(Value::as_bool).unwrap_or(false),
    })
  }

  /// Adds `method` to the api of each of its tags, or to the default api.
  fn add_method(&mut self, operation: &Value, method: Method) {
    let mut tags: Vec<&str> = operation
      .get("tags")
      .and_then(Value::as_array)
      .map(|tags| tags.iter().filter_map(Value::as_str).collect())
      .unwrap_or_default();
    if tags.is_empty() {
      tags.push(&self.config.default_api_name);
    }

    for tag in tags {
      self
        .apis
        .entry(tag.to_string())
        .or_insert_with(|| Api::new(tag, None))
        .add_method(method.clone());
    }
  }

  fn top_content(&mut self) -> Option<&mut ContentSlot> {
    self.frames.top_mut().and_then(Frame::content_mut)
  }
}

/// Method name for an operation without `operationId`, e.g. `get_pets_petId_photos`.
#[must_use]
pub fn derived_method_name(http_method: &http::Method, path: &str) -> String {
  let mut name = http_method.as_str().to_ascii_lowercase();
  for word in path.split(|c: char| !c.is_ascii_alphanumeric()).filter(|word| !word.is_empty()) {
    name.push('_');
    name.push_str(word);
  }
  name
}

fn text_field(node: &Value, key: &str) -> Option<String> {
  node.get(key).and_then(Value::as_str).map(String::from)
}

impl Visitor for Generator {
  type Error = GeneratorError;

  fn visit_tag(&mut self, walker: &mut Walker<'_>, tag: &Value) -> VisitResult<Self::Error> {
    let Some(name) = tag.get("name").and_then(Value::as_str) else {
      return Err(GeneratorError::invalid_document(walker.active_location(), "tag has no name"));
    };
    self
      .apis
      .entry(name.to_string())
      .or_insert_with(|| Api::new(name, text_field(tag, "description")));
    proceed()
  }

  fn visit_path_item(&mut self, walker: &mut Walker<'_>, path: &str, item: &Value) -> VisitResult<Self::Error> {
    self.frames.push(Frame::PathItem(PathItemFrame {
      path: path.to_string(),
      parameters: vec![],
    }));
    let flow = walk::walk_path_item(self, walker, item);
    self.frames.pop();
    flow
  }

  fn visit_webhook(&mut self, walker: &mut Walker<'_>, name: &str, _item: &Value) -> VisitResult<Self::Error> {
    tracing::debug!(webhook = name, location = %walker.active_location(), "skipping webhook");
    self.warnings.push(GenerationWarning::SkippedWebhook { name: name.to_string() });
    proceed()
  }

  fn visit_operation(
    &mut self,
    walker: &mut Walker<'_>,
    method: &http::Method,
    operation: &Value,
  ) -> VisitResult<Self::Error> {
    self.frames.push(Frame::Operation(OperationFrame::default()));
    let flow = walk::walk_operation(self, walker, operation);
    let frame = self.frames.pop();
    if flow?.is_break() {
      return abort();
    }

    let Some(Frame::Operation(frame)) = frame else {
      return proceed();
    };
    let method = self.assemble_method(method, operation, frame)?;
    self.add_method(operation, method);
    proceed()
  }

  fn visit_parameter(&mut self, walker: &mut Walker<'_>, parameter: &Value) -> VisitResult<Self::Error> {
    let location = walker.active_location();
    let in_operation = matches!(self.frames.top_mut(), Some(Frame::Operation(_)));
    let raw = RawParameter::parse(parameter, &location, in_operation)?;

    self.frames.push(Frame::Parameter(ParameterFrame {
      raw,
      content: ContentSlot::default(),
    }));
    let flow = walk::walk_parameter(self, walker, parameter);
    let frame = self.frames.pop();
    if flow?.is_break() {
      return abort();
    }

    let Some(Frame::Parameter(ParameterFrame { raw, content })) = frame else {
      return proceed();
    };
    let model = content
      .schema
      .or_else(|| content.media_models().first().map(|(_, model)| *model))
      .unwrap_or(ModelId::ANY);
    let named = raw.into_named(model);

    if named.serializer_key.is_none() {
      self.warnings.push(GenerationWarning::InvalidParameterEncoding {
        name: named.name.clone(),
        location: named.location.to_string(),
        style: named.style.as_str().to_string(),
        explode: named.explode,
      });
    }

    match self.frames.top_mut() {
      Some(Frame::Operation(operation)) => operation.parameters.push(named),
      Some(Frame::PathItem(item)) => item.parameters.push(named),
      _ => tracing::trace!(parameter = %named.name, %location, "parameter outside of a path item"),
    }
    proceed()
  }

  fn visit_request_body(&mut self, walker: &mut Walker<'_>, request_body: &Value) -> VisitResult<Self::Error> {
    self.frames.push(Frame::RequestBody(RequestBodyFrame {
      location: walker.active_location(),
      required: request_body.get("required").and_then(Value::as_bool).unwrap_or(false),
      name: text_field(request_body, "x-name"),
      description: text_field(request_body, "description"),
      content: ContentSlot::default(),
    }));
    let flow = walk::walk_request_body(self, walker, request_body);
    let frame = self.frames.pop();
    if flow?.is_break() {
      return abort();
    }

    if let (Some(Frame::RequestBody(body)), Some(Frame::Operation(operation))) = (frame, self.frames.top_mut()) {
      operation.body = Some(body);
    }
    proceed()
  }

  fn visit_response(&mut self, walker: &mut Walker<'_>, status: &str, response: &Value) -> VisitResult<Self::Error> {
    self.frames.push(Frame::Response(ResponseFrame {
      status: status.to_string(),
      location: walker.active_location(),
      description: text_field(response, "description"),
      content: ContentSlot::default(),
    }));
    let flow = walk::walk_response(self, walker, response);
    let frame = self.frames.pop();
    if flow?.is_break() {
      return abort();
    }

    if let (Some(Frame::Response(response)), Some(Frame::Operation(operation))) = (frame, self.frames.top_mut()) {
      operation.responses.push(response);
    }
    proceed()
  }

  fn visit_media_type(&mut self, walker: &mut Walker<'_>, media_type: &str, node: &Value) -> VisitResult<Self::Error> {
    if let Some(content) = self.top_content() {
      content.enter_media(media_type);
    }
    let flow = walk::walk_media_type(self, walker, node);
    if let Some(content) = self.top_content() {
      content.leave_media();
    }
    flow
  }

  fn visit_header(&mut self, walker: &mut Walker<'_>, _name: &str, header: &Value) -> VisitResult<Self::Error> {
    self.frames.push(Frame::Detached);
    let flow = walk::walk_header(self, walker, header);
    self.frames.pop();
    flow
  }

  fn visit_schema(&mut self, walker: &mut Walker<'_>, schema: &Value) -> VisitResult<Self::Error> {
    let edge = walker.schema_edge().cloned().unwrap_or(SchemaEdge::Root);
    let synthesized = matches!(edge, SchemaEdge::TypeVariant(_));
    if synthesized {
      let collapsed = self.schemas.last().is_some_and(|parent| parent.collapse_type_variants);
      if collapsed || schema.get("type").and_then(Value::as_str) == Some("null") {
        return proceed();
      }
    }

    let location = walker.active_location();
    // Variants are rebuilt on every walk, so their addresses say nothing.
    let identity = (!synthesized).then(|| ptr::from_ref(schema) as usize);
    if let Some(id) = self.known_model(identity, &location) {
      self.report(&edge, id);
      return proceed();
    }

    let name = classify::derive_name(schema, &location);
    let fingerprint = CanonicalSchema::from_schema(schema);
    if let Some(id) = self.find_match(name.as_deref(), fingerprint.as_ref(), schema) {
      tracing::trace!(model = %id, %location, "reusing structurally equal model");
      self.remember(identity, location, id);
      self.report(&edge, id);
      return proceed();
    }

    let id = self.registry.reserve(name, location.clone());
    tracing::debug!(model = %id, %location, "reserved model");
    self.remember(identity, location.clone(), id);
    if let Some(fingerprint) = fingerprint {
      self.buckets.entry(fingerprint.clone()).or_default().push(id);
      self.fingerprints.insert(id, fingerprint);
    }
    self.sources.insert(id, schema.clone());

    let empty = Map::new();
    let object = schema.as_object().unwrap_or(&empty);
    let collapse = TypeSet::of(object).collapses();

    self.schemas.push(SchemaFrame::new(id, collapse));
    let flow = walk::walk_schema(self, walker, schema);
    let frame = self.schemas.pop().unwrap_or_else(|| SchemaFrame::new(id, collapse));
    if flow?.is_break() {
      return abort();
    }

    let classified = classify::classify(object, &frame, &self.config.typed_formats, &location)?;
    if let Some(model) = self.registry.get_mut(id) {
      model.kind = classified.kind;
      model.nullable = classified.nullable;
      model.description = text_field(schema, "description");
      model.deprecated = schema.get("deprecated").and_then(Value::as_bool).unwrap_or(false);
    }

    self.report(&edge, id);
    proceed()
  }

  fn process_schema_joins(
    &mut self,
    walker: &mut Walker<'_>,
    _parent: &Value,
    joins: &SchemaJoins<'_>,
  ) -> VisitResult<Self::Error> {
    if joins.not.is_some() {
      return Err(GeneratorError::unsupported(
        walker.active_location(),
        "'not' schemas are not supported",
      ));
    }
    proceed()
  }

  fn visit_unresolved_reference(&mut self, walker: &mut Walker<'_>, reference: &str) -> Result<(), Self::Error> {
    self.warnings.push(GenerationWarning::UnresolvedReference {
      reference: reference.to_string(),
      location: walker.active_location(),
    });
    Ok(())
  }
}
