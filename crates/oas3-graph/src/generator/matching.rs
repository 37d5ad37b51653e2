use serde_json::{Map, Value};

use crate::walker::resolver::REF_KEY;

/// True for `$`-prefixed keywords that annotate a schema without changing its
/// shape (`$id`, `$comment`, `$schema`, `$anchor`, ...). `$ref` is not one of them:
/// the walker keeps references in place, so two otherwise equal schemas pointing
/// at different targets are different.
#[must_use]
pub fn is_annotation_key(key: &str) -> bool {
  key.starts_with('$') && key != REF_KEY
}

fn type_set(schema: &Map<String, Value>) -> Option<Vec<&str>> {
  let types = schema.get("type")?.as_array()?;
  let mut set: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
  set.sort_unstable();
  set.dedup();
  Some(set)
}

fn values_match(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::Object(a), Value::Object(b)) => objects_match(a, b),
    (Value::Array(a), Value::Array(b)) => a.len() == b.len() && a.iter().zip(b).all(|(a, b)| values_match(a, b)),
    _ => a == b,
  }
}

fn objects_match(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
  let significant = |map: &Map<String, Value>| map.keys().filter(|key| !is_annotation_key(key)).count();
  if significant(a) != significant(b) {
    return false;
  }
  a.iter()
    .filter(|(key, _)| !is_annotation_key(key))
    .all(|(key, value)| b.get(key).is_some_and(|other| values_match(value, other)))
}

/// Structural equivalence used for model deduplication.
///
/// Identical nodes always match. Two `type` arrays compare as sets; otherwise
/// `type` and `format` must be identical and every remaining keyword must be
/// deep-equal, with annotation keys ignored at every depth.
#[must_use]
pub fn schemas_match(a: &Value, b: &Value) -> bool {
  if std::ptr::eq(a, b) {
    return true;
  }
  let (Some(a), Some(b)) = (a.as_object(), b.as_object()) else {
    return a == b;
  };

  match (type_set(a), type_set(b)) {
    (Some(a_types), Some(b_types)) => {
      if a_types != b_types {
        return false;
      }
    }
    _ => {
      if a.get("type") != b.get("type") {
        return false;
      }
    }
  }
  if a.get("format") != b.get("format") {
    return false;
  }

  let rest = |map: &Map<String, Value>| -> Map<String, Value> {
    map
      .iter()
      .filter(|(key, _)| *key != "type" && *key != "format")
      .map(|(key, value)| (key.clone(), value.clone()))
      .collect()
  };
  objects_match(&rest(a), &rest(b))
}
