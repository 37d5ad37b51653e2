use serde_json::Value;

pub(crate) const REF_KEY: &str = "$ref";

/// Maps a reference token to its target node.
///
/// Returning `None` marks the reference as unresolved; the walker prunes that
/// branch instead of failing.
pub trait Resolver {
  fn resolve(&self, reference: &str) -> Option<&Value>;
}

/// Resolves same-document references (`#/...`) by JSON Pointer lookup.
///
/// Tokens that point outside the document are left unresolved. Bundling external
/// documents happens before the walk.
#[derive(Debug, Clone, Copy)]
pub struct DocumentResolver<'a> {
  document: &'a Value,
}

impl<'a> DocumentResolver<'a> {
  #[must_use]
  pub const fn new(document: &'a Value) -> Self {
    Self { document }
  }
}

impl Resolver for DocumentResolver<'_> {
  fn resolve(&self, reference: &str) -> Option<&Value> {
    let pointer = reference.strip_prefix('#')?;
    if pointer.is_empty() {
      return Some(self.document);
    }
    self.document.pointer(pointer)
  }
}

/// A resolver that never resolves anything, for documents known to be fully
/// dereferenced.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl Resolver for NoResolver {
  fn resolve(&self, _reference: &str) -> Option<&Value> {
    None
  }
}

/// Returns the `$ref` token of a reference object.
#[must_use]
pub fn reference_token(node: &Value) -> Option<&str> {
  node.as_object()?.get(REF_KEY)?.as_str()
}
