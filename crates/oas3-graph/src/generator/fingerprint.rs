use std::{cmp::Ordering, hash::Hash};

use json_canon::to_string as to_canonical_json;
use serde_json::Value;

use super::matching::is_annotation_key;

/// Opaque canonical form of a schema, used to bucket deduplication candidates.
///
/// Annotation keys are dropped and order-independent arrays (`required`, `type`,
/// `enum`) are sorted before the value is rendered as RFC 8785 canonical JSON, so
/// every pair of schemas that [`schemas_match`](super::matching::schemas_match)
/// shares a fingerprint. The converse does not hold; a bucket hit is confirmed
/// with the structural match.
#[derive(Debug, Clone, Eq)]
pub struct CanonicalSchema(String);

impl CanonicalSchema {
  pub fn from_schema(schema: &Value) -> Option<Self> {
    let mut value = schema.clone();
    normalize_schema_semantics(&mut value);

    match to_canonical_json(&value) {
      Ok(canonical) => Some(Self(canonical)),
      Err(error) => {
        tracing::debug!(%error, "schema has no canonical form");
        None
      }
    }
  }
}

impl PartialEq for CanonicalSchema {
  fn eq(&self, other: &Self) -> bool {
    self.0 == other.0
  }
}

impl PartialOrd for CanonicalSchema {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for CanonicalSchema {
  fn cmp(&self, other: &Self) -> Ordering {
    self.0.cmp(&other.0)
  }
}

impl Hash for CanonicalSchema {
  /// Feeds the BLAKE3 digest of the canonical JSON to the hasher.
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    let hash = blake3::hash(self.0.as_bytes());
    hash.as_bytes().hash(state);
  }
}

fn normalize_schema_semantics(value: &mut Value) {
  match value {
    Value::Object(map) => {
      map.retain(|key, _| !is_annotation_key(key));

      for key in ["required", "type", "enum"] {
        if let Some(Value::Array(arr)) = map.get_mut(key) {
          sort_string_array_in_place(arr);
        }
      }

      for value in map.values_mut() {
        normalize_schema_semantics(value);
      }
    }
    Value::Array(arr) => {
      for item in arr {
        normalize_schema_semantics(item);
      }
    }
    _ => {}
  }
}

/// Sorts and dedups the array if every element is a string; mixed arrays keep their order.
fn sort_string_array_in_place(arr: &mut Vec<Value>) {
  let mut strings: Vec<String> = arr.iter().filter_map(|v| v.as_str().map(String::from)).collect();

  if strings.len() == arr.len() {
    strings.sort_unstable();
    strings.dedup();
    *arr = strings.into_iter().map(Value::String).collect();
  }
}
