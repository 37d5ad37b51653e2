use std::{fmt::Write as _, sync::Arc};

pub(crate) const ROOT_SEGMENT: &str = "#";

/// One entry of the location stack.
///
/// A `Reference` is a frozen snapshot of the `$ref` token that was followed to
/// reach the subtree currently being walked. Every location computed while the
/// snapshot is on the stack is expressed relative to that token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  Path(String),
  Reference { token: Arc<str>, reentrant: bool },
}

impl From<&str> for Segment {
  fn from(value: &str) -> Self {
    Segment::Path(value.to_string())
  }
}

impl From<String> for Segment {
  fn from(value: String) -> Self {
    Segment::Path(value)
  }
}

impl From<usize> for Segment {
  fn from(value: usize) -> Self {
    Segment::Path(value.to_string())
  }
}

/// Escapes a single JSON Pointer reference token (RFC 6901).
///
/// `~` must be escaped before `/` so that a literal `~1` in the input is not
/// mistaken for an escaped slash on the way back.
#[must_use]
pub fn escape_segment(segment: &str) -> String {
  segment.replace('~', "~0").replace('/', "~1")
}

/// Reverses [`escape_segment`].
#[must_use]
pub fn unescape_segment(segment: &str) -> String {
  segment.replace("~1", "/").replace("~0", "~")
}

/// Path stack maintained by the walker.
///
/// The active location is computed on demand from the stack rather than kept
/// incrementally, so a query never observes a segment that was already popped.
#[derive(Debug, Clone)]
pub struct LocationStack {
  entries: Vec<Segment>,
}

impl Default for LocationStack {
  fn default() -> Self {
    Self {
      entries: vec![Segment::Path(ROOT_SEGMENT.to_string())],
    }
  }
}

impl LocationStack {
  pub fn reset(&mut self) {
    self.entries.clear();
    self.entries.push(Segment::Path(ROOT_SEGMENT.to_string()));
  }

  pub fn push(&mut self, segment: Segment) {
    self.entries.push(segment);
  }

  pub fn push_reference(&mut self, token: &str) {
    let reentrant = self.contains_reference(token);
    self.entries.push(Segment::Reference {
      token: Arc::from(token),
      reentrant,
    });
  }

  /// Pops the most recent entry. The root entry is never removed.
  pub fn pop(&mut self) -> Option<Segment> {
    if self.entries.len() > 1 { self.entries.pop() } else { None }
  }

  #[must_use]
  pub fn depth(&self) -> usize {
    self.entries.len()
  }

  #[must_use]
  pub fn entries(&self) -> &[Segment] {
    &self.entries
  }

  #[must_use]
  pub fn contains_reference(&self, token: &str) -> bool {
    self
      .entries
      .iter()
      .any(|entry| matches!(entry, Segment::Reference { token: t, .. } if &**t == token))
  }

  /// Returns true when the innermost reference snapshot re-enters a reference
  /// that is already being walked further up the stack.
  #[must_use]
  pub fn is_reentrant(&self) -> bool {
    self.entries.iter().rev().find_map(|entry| match entry {
      Segment::Reference { reentrant, .. } => Some(*reentrant),
      Segment::Path(_) => None,
    }) == Some(true)
  }

  /// Computes the JSON-Pointer style location of the node being visited.
  ///
  /// Without a reference on the stack this is `#` followed by every escaped path
  /// segment. Otherwise it is the innermost reference token followed by the
  /// segments pushed after it.
  #[must_use]
  pub fn active_location(&self) -> String {
    let last_reference = self
      .entries
      .iter()
      .rposition(|entry| matches!(entry, Segment::Reference { .. }));

    let (mut location, rest) = match last_reference {
      Some(index) => {
        let Segment::Reference { token, .. } = &self.entries[index] else {
          unreachable!("rposition matched a reference entry");
        };
        (token.to_string(), &self.entries[index + 1..])
      }
      None => (ROOT_SEGMENT.to_string(), &self.entries[1..]),
    };

    for entry in rest {
      if let Segment::Path(segment) = entry {
        let _ = write!(location, "/{}", escape_segment(segment));
      }
    }
    location
  }

  /// Returns the last plain path segment, if the innermost entry is one.
  #[must_use]
  pub fn last_segment(&self) -> Option<&str> {
    match self.entries.last() {
      Some(Segment::Path(segment)) if self.entries.len() > 1 => Some(segment),
      _ => None,
    }
  }
}
