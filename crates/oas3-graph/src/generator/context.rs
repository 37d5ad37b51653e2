//! Typed frame stack that tells the generator which container a freshly built
//! root schema model belongs to.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::{
  model::{ModelId, NamedParameter},
  walker::SchemaEdge,
};

use super::parameters::RawParameter;

/// Schema models of one schema-or-content container, keyed by media type.
#[derive(Debug, Default)]
pub(super) struct ContentSlot {
  pub(super) schema: Option<ModelId>,
  pub(super) media: IndexMap<String, Option<ModelId>>,
  current: Option<String>,
}

impl ContentSlot {
  pub(super) fn record(&mut self, id: ModelId) {
    match &self.current {
      Some(media_type) => {
        if let Some(slot) = self.media.get_mut(media_type) {
          *slot = Some(id);
        }
      }
      None => self.schema = Some(id),
    }
  }

  pub(super) fn enter_media(&mut self, media_type: &str) {
    self.media.insert(media_type.to_string(), None);
    self.current = Some(media_type.to_string());
  }

  pub(super) fn leave_media(&mut self) {
    self.current = None;
  }

  /// Models per declared media type; a media type without a schema maps to "any".
  pub(super) fn media_models(&self) -> Vec<(&str, ModelId)> {
    self
      .media
      .iter()
      .map(|(media_type, model)| (media_type.as_str(), model.unwrap_or(ModelId::ANY)))
      .collect()
  }
}

#[derive(Debug)]
pub(super) struct PathItemFrame {
  pub(super) path: String,
  pub(super) parameters: Vec<NamedParameter>,
}

#[derive(Debug, Default)]
pub(super) struct OperationFrame {
  pub(super) parameters: Vec<NamedParameter>,
  pub(super) body: Option<RequestBodyFrame>,
  pub(super) responses: Vec<ResponseFrame>,
}

#[derive(Debug)]
pub(super) struct ParameterFrame {
  pub(super) raw: RawParameter,
  pub(super) content: ContentSlot,
}

#[derive(Debug)]
pub(super) struct RequestBodyFrame {
  pub(super) location: String,
  pub(super) required: bool,
  pub(super) name: Option<String>,
  pub(super) description: Option<String>,
  pub(super) content: ContentSlot,
}

#[derive(Debug)]
pub(super) struct ResponseFrame {
  pub(super) status: String,
  pub(super) location: String,
  pub(super) description: Option<String>,
  pub(super) content: ContentSlot,
}

#[derive(Debug)]
pub(super) enum Frame {
  PathItem(PathItemFrame),
  Operation(OperationFrame),
  Parameter(ParameterFrame),
  RequestBody(RequestBodyFrame),
  Response(ResponseFrame),
  /// Headers: their schemas are compiled but belong to no parameter or response.
  Detached,
}

impl Frame {
  pub(super) fn content_mut(&mut self) -> Option<&mut ContentSlot> {
    match self {
      Self::Parameter(frame) => Some(&mut frame.content),
      Self::RequestBody(frame) => Some(&mut frame.content),
      Self::Response(frame) => Some(&mut frame.content),
      Self::PathItem(_) | Self::Operation(_) | Self::Detached => None,
    }
  }

  /// Attach priority of a root schema model; higher wins.
  fn attach_rank(&self) -> Option<u8> {
    match self {
      Self::Response(_) => Some(3),
      Self::RequestBody(_) => Some(2),
      Self::Parameter(frame) if frame.raw.in_operation => Some(1),
      Self::Parameter(_) => Some(0),
      Self::PathItem(_) | Self::Operation(_) | Self::Detached => None,
    }
  }
}

#[derive(Debug, Default)]
pub(super) struct FrameStack {
  frames: Vec<Frame>,
}

impl FrameStack {
  pub(super) fn push(&mut self, frame: Frame) {
    self.frames.push(frame);
  }

  pub(super) fn pop(&mut self) -> Option<Frame> {
    self.frames.pop()
  }

  pub(super) fn top_mut(&mut self) -> Option<&mut Frame> {
    self.frames.last_mut()
  }

  pub(super) fn path(&self) -> Option<&str> {
    self.frames.iter().rev().find_map(|frame| match frame {
      Frame::PathItem(item) => Some(item.path.as_str()),
      _ => None,
    })
  }

  pub(super) fn path_parameters(&self) -> &[NamedParameter] {
    self
      .frames
      .iter()
      .rev()
      .find_map(|frame| match frame {
        Frame::PathItem(item) => Some(item.parameters.as_slice()),
        _ => None,
      })
      .unwrap_or_default()
  }

  /// Gives a root schema model to the highest-ranked container frame above the
  /// innermost detached frame, if any.
  pub(super) fn attach_root_model(&mut self, id: ModelId) -> bool {
    let start = self
      .frames
      .iter()
      .rposition(|frame| matches!(frame, Frame::Detached))
      .map_or(0, |index| index + 1);

    let target = self.frames[start..]
      .iter_mut()
      .filter_map(|frame| frame.attach_rank().map(|rank| (rank, frame)))
      .max_by_key(|(rank, _)| *rank);

    match target.and_then(|(_, frame)| frame.content_mut()) {
      Some(content) => {
        content.record(id);
        true
      }
      None => false,
    }
  }
}

/// Child models collected while one schema's subtree is walked.
#[derive(Debug)]
pub(super) struct SchemaFrame {
  pub(super) id: ModelId,
  /// The schema's `type` array reduces to at most one non-null member, so its
  /// synthesized variants are not compiled.
  pub(super) collapse_type_variants: bool,
  pub(super) type_variants: Vec<ModelId>,
  pub(super) properties: HashMap<String, ModelId>,
  pub(super) additional_properties: Option<ModelId>,
  pub(super) items: Option<ModelId>,
  pub(super) all_of: Vec<ModelId>,
  pub(super) one_of: Vec<ModelId>,
  pub(super) any_of: Vec<ModelId>,
}

impl SchemaFrame {
  pub(super) fn new(id: ModelId, collapse_type_variants: bool) -> Self {
    Self {
      id,
      collapse_type_variants,
      type_variants: vec![],
      properties: HashMap::new(),
      additional_properties: None,
      items: None,
      all_of: vec![],
      one_of: vec![],
      any_of: vec![],
    }
  }

  pub(super) fn record(&mut self, edge: &SchemaEdge, id: ModelId) {
    match edge {
      SchemaEdge::TypeVariant(_) => self.type_variants.push(id),
      SchemaEdge::Property(name) => {
        self.properties.insert(name.clone(), id);
      }
      SchemaEdge::AdditionalProperties => self.additional_properties = Some(id),
      SchemaEdge::Items => self.items = Some(id),
      SchemaEdge::AllOf(_) => self.all_of.push(id),
      SchemaEdge::OneOf(_) => self.one_of.push(id),
      SchemaEdge::AnyOf(_) => self.any_of.push(id),
      SchemaEdge::Root | SchemaEdge::Not => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{ParameterLocation, ParameterStyle};

  fn raw_parameter(in_operation: bool) -> RawParameter {
    RawParameter {
      name: "id".to_string(),
      location: ParameterLocation::Path,
      required: true,
      style: ParameterStyle::Simple,
      explode: false,
      description: None,
      deprecated: false,
      in_operation,
    }
  }

  fn response_frame() -> Frame {
    Frame::Response(ResponseFrame {
      status: "200".to_string(),
      location: "#/paths/~1a/get/responses/200".to_string(),
      description: None,
      content: ContentSlot::default(),
    })
  }

  #[test]
  fn test_response_takes_precedence_over_parameters() {
    let mut stack = FrameStack::default();
    stack.push(Frame::Parameter(ParameterFrame {
      raw: raw_parameter(false),
      content: ContentSlot::default(),
    }));
    stack.push(response_frame());

    assert!(stack.attach_root_model(ModelId::VOID));
    let Some(Frame::Response(response)) = stack.pop() else {
      panic!("expected response frame");
    };
    assert_eq!(response.content.schema, Some(ModelId::VOID));
  }

  #[test]
  fn test_detached_frames_swallow_models() {
    let mut stack = FrameStack::default();
    stack.push(response_frame());
    stack.push(Frame::Detached);

    assert!(!stack.attach_root_model(ModelId::ANY));
    stack.pop();
    let Some(Frame::Response(response)) = stack.pop() else {
      panic!("expected response frame");
    };
    assert_eq!(response.content.schema, None);
  }

  #[test]
  fn test_media_models_default_to_any() {
    let mut slot = ContentSlot::default();
    slot.enter_media("application/json");
    slot.record(ModelId::VOID);
    slot.leave_media();
    slot.enter_media("text/plain");
    slot.leave_media();

    assert_eq!(
      slot.media_models(),
      vec![("application/json", ModelId::VOID), ("text/plain", ModelId::ANY)]
    );
  }
}
