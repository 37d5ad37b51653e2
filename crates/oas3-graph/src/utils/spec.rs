use std::{ffi::OsStr, path::Path};

use anyhow::Context;
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecFormat {
  #[default]
  Json,
  Yaml,
}

impl SpecFormat {
  #[must_use]
  pub fn from_extension(ext: &str) -> Self {
    match ext.to_ascii_lowercase().as_str() {
      "yaml" | "yml" => Self::Yaml,
      _ => Self::Json,
    }
  }
}

/// Memory-mapped OpenAPI document, parsed into an order-preserving JSON tree.
pub struct SpecLoader {
  file: AsyncMmapFile,
  format: SpecFormat,
}

impl SpecLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    let format = path
      .extension()
      .and_then(OsStr::to_str)
      .map_or(SpecFormat::default(), SpecFormat::from_extension);

    let file = AsyncMmapFile::open(path)
      .await
      .with_context(|| format!("failed to open {}", path.display()))?;

    Ok(Self { file, format })
  }

  pub fn parse(&self) -> anyhow::Result<Value> {
    parse_document(self.file.as_slice(), self.format)
  }
}

fn parse_document(bytes: &[u8], format: SpecFormat) -> anyhow::Result<Value> {
  let document: Value = match format {
    SpecFormat::Json => serde_json::from_slice(bytes).context("invalid JSON document")?,
    SpecFormat::Yaml => yaml_to_json(serde_yaml::from_slice(bytes).context("invalid YAML document")?)?,
  };
  anyhow::ensure!(document.is_object(), "OpenAPI document root must be an object");
  Ok(document)
}

/// Converts a YAML tree, stringifying scalar mapping keys such as unquoted status codes.
fn yaml_to_json(value: serde_yaml::Value) -> anyhow::Result<Value> {
  use serde_yaml::Value as Yaml;

  Ok(match value {
    Yaml::Null => Value::Null,
    Yaml::Bool(value) => Value::Bool(value),
    Yaml::Number(number) => {
      if let Some(value) = number.as_i64() {
        Value::from(value)
      } else if let Some(value) = number.as_u64() {
        Value::from(value)
      } else {
        number
          .as_f64()
          .and_then(serde_json::Number::from_f64)
          .map_or(Value::Null, Value::Number)
      }
    }
    Yaml::String(value) => Value::String(value),
    Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect::<anyhow::Result<_>>()?),
    Yaml::Mapping(mapping) => {
      let mut object = serde_json::Map::with_capacity(mapping.len());
      for (key, value) in mapping {
        let key = match key {
          Yaml::String(key) => key,
          Yaml::Number(key) => key.to_string(),
          Yaml::Bool(key) => key.to_string(),
          other => anyhow::bail!("unsupported YAML mapping key: {other:?}"),
        };
        object.insert(key, yaml_to_json(value)?);
      }
      Value::Object(object)
    }
    Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
  })
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn test_format_from_extension() {
    assert_eq!(SpecFormat::from_extension("yaml"), SpecFormat::Yaml);
    assert_eq!(SpecFormat::from_extension("YML"), SpecFormat::Yaml);
    assert_eq!(SpecFormat::from_extension("json"), SpecFormat::Json);
  }

  #[test]
  fn test_yaml_keeps_document_order() {
    let yaml = b"openapi: 3.1.0\ninfo:\n  title: Ordered\n  version: '1'\npaths:\n  /b: {}\n  /a: {}\n";
    let document = parse_document(yaml, SpecFormat::Yaml).unwrap();
    let paths: Vec<_> = document["paths"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(paths, vec!["/b", "/a"]);
  }

  #[test]
  fn test_yaml_numeric_keys_become_strings() {
    let yaml = b"paths:\n  /pets:\n    get:\n      responses:\n        200:\n          description: ok\n";
    let document = parse_document(yaml, SpecFormat::Yaml).unwrap();
    assert_eq!(
      document.pointer("/paths/~1pets/get/responses/200/description"),
      Some(&Value::String("ok".to_string()))
    );
  }

  #[test]
  fn test_non_object_root_is_rejected() {
    assert!(parse_document(b"[1, 2]", SpecFormat::Json).is_err());
  }

  #[tokio::test]
  async fn test_loads_json_from_disk() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file
      .write_all(br#"{"openapi":"3.1.0","info":{"title":"Disk","version":"1"}}"#)
      .unwrap();

    let document = SpecLoader::open(file.path()).await.unwrap().parse().unwrap();
    assert_eq!(document["info"]["title"], "Disk");
  }
}
