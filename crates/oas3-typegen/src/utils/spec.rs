use std::{
  collections::BTreeSet,
  ffi::OsStr,
  path::{Path, PathBuf},
};

use anyhow::Context;
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::spec::{Components, Spec, SpecBundle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecFormat {
  #[default]
  Json,
  Yaml,
}

impl SpecFormat {
  #[must_use]
  pub fn from_extension(ext: &str) -> Self {
    match ext {
      "yaml" | "yml" => Self::Yaml,
      _ => Self::Json,
    }
  }

  #[must_use]
  pub fn from_path(path: &Path) -> Self {
    path
      .extension()
      .and_then(OsStr::to_str)
      .map_or(Self::default(), Self::from_extension)
  }
}

pub struct SpecLoader {
  file: AsyncMmapFile,
  format: SpecFormat,
  path: PathBuf,
}

impl SpecLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    let file = AsyncMmapFile::open(path)
      .await
      .with_context(|| format!("failed to open {}", path.display()))?;

    Ok(Self {
      file,
      format: SpecFormat::from_path(path),
      path: path.to_path_buf(),
    })
  }

  /// Parses the raw document tree without interpreting it.
  pub fn parse_value(&self) -> anyhow::Result<Value> {
    let bytes = self.file.as_slice();
    let value = match self.format {
      SpecFormat::Json => serde_json::from_slice::<Value>(bytes)?,
      SpecFormat::Yaml => serde_yaml::from_slice::<Value>(bytes)?,
    };
    Ok(value)
  }

  pub fn parse(&self) -> anyhow::Result<Spec> {
    let value = self.parse_value()?;
    parse_document(value).with_context(|| format!("invalid OpenAPI document {}", self.path.display()))
  }

  /// Loads the document plus every external document its `$ref`s name.
  ///
  /// Only one hop is followed: references inside external documents to yet
  /// other documents are left unresolved. Remote (`http`) documents are not
  /// fetched.
  pub async fn load_bundle(path: &Path) -> anyhow::Result<SpecBundle> {
    let loader = Self::open(path).await?;
    let value = loader.parse_value()?;
    let documents = external_documents(&value);
    let root = parse_document(value).with_context(|| format!("invalid OpenAPI document {}", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let mut bundle = SpecBundle::new(root);
    for document in documents {
      if document.starts_with("http://") || document.starts_with("https://") {
        tracing::warn!(%document, "remote documents are not fetched");
        continue;
      }
      let external_path = base.join(&document);
      let value = Self::open(&external_path).await?.parse_value()?;
      let external =
        parse_fragment(value).with_context(|| format!("invalid external document {}", external_path.display()))?;
      tracing::debug!(%document, "loaded external document");
      bundle.insert_external(document, external);
    }

    Ok(bundle)
  }
}

/// Deserializes a document tree, naming the failing JSON path on error.
pub fn parse_document(value: Value) -> anyhow::Result<Spec> {
  deserialize_at_path(value)
}

/// Deserializes an external document. Only its components are ever referenced,
/// so `openapi`, `info` and `paths` may be missing.
pub fn parse_fragment(value: Value) -> anyhow::Result<Spec> {
  #[derive(Deserialize)]
  struct Fragment {
    #[serde(default)]
    components: Option<Components>,
  }

  let fragment: Fragment = deserialize_at_path(value)?;
  Ok(Spec {
    components: fragment.components,
    ..Spec::default()
  })
}

fn deserialize_at_path<T: DeserializeOwned>(value: Value) -> anyhow::Result<T> {
  serde_path_to_error::deserialize(value).map_err(|err| {
    let path = err.path().to_string();
    anyhow::anyhow!("at '{path}': {}", err.into_inner())
  })
}

/// Document parts of every `$ref` in the tree, e.g. `common.yaml` for
/// `common.yaml#/components/schemas/Error`.
pub fn external_documents(value: &Value) -> BTreeSet<String> {
  let mut documents = BTreeSet::new();
  let mut stack = vec![value];

  while let Some(node) = stack.pop() {
    match node {
      Value::Object(map) => {
        if let Some(Value::String(ref_path)) = map.get("$ref")
          && let Some((document, _)) = ref_path.split_once('#')
          && !document.is_empty()
        {
          documents.insert(document.to_string());
        }
        stack.extend(map.values());
      }
      Value::Array(items) => stack.extend(items),
      _ => {}
    }
  }

  documents
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use serde_json::json;

  use super::*;

  const ROOT_YAML: &str = r"
openapi: 3.0.3
info:
  title: Pets
  version: 1.0.0
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        200:
          description: ok
          content:
            application/json:
              schema:
                $ref: 'common.yaml#/components/schemas/Pet'
";

  const COMMON_YAML: &str = r"
components:
  schemas:
    Pet:
      type: object
      properties:
        name:
          type: string
";

  #[test]
  fn test_format_from_extension() {
    assert_eq!(SpecFormat::from_path(Path::new("api.yaml")), SpecFormat::Yaml);
    assert_eq!(SpecFormat::from_path(Path::new("api.yml")), SpecFormat::Yaml);
    assert_eq!(SpecFormat::from_path(Path::new("api.json")), SpecFormat::Json);
    assert_eq!(SpecFormat::from_path(Path::new("api")), SpecFormat::Json);
  }

  #[test]
  fn test_external_documents_collects_document_parts() {
    let value = json!({
      "a": {"$ref": "#/components/schemas/Local"},
      "b": [{"$ref": "common.yaml#/components/schemas/Pet"}],
      "c": {"nested": {"$ref": "other.json#/components/schemas/Other"}}
    });
    let documents = external_documents(&value);
    assert_eq!(
      documents.into_iter().collect::<Vec<_>>(),
      vec!["common.yaml".to_string(), "other.json".to_string()]
    );
  }

  #[test]
  fn test_parse_document_reports_path() {
    let value = json!({
      "openapi": "3.1.0",
      "info": {"title": "x", "version": "1"},
      "paths": {"/a": {"get": {"parameters": [{"name": "id", "in": "body"}]}}}
    });
    let err = parse_document(value).unwrap_err().to_string();
    assert!(err.contains("parameters"), "unexpected error: {err}");
  }

  #[tokio::test]
  async fn test_load_bundle_with_external_document() {
    let dir = tempfile::tempdir().unwrap();
    let root_path = dir.path().join("api.yaml");
    std::fs::File::create(&root_path)
      .unwrap()
      .write_all(ROOT_YAML.as_bytes())
      .unwrap();
    std::fs::File::create(dir.path().join("common.yaml"))
      .unwrap()
      .write_all(COMMON_YAML.as_bytes())
      .unwrap();

    let bundle = SpecLoader::load_bundle(&root_path).await.unwrap();
    assert_eq!(bundle.root().info.title, "Pets");
    assert_eq!(bundle.external_documents().collect::<Vec<_>>(), vec!["common.yaml"]);

    let resolved = bundle
      .resolve_schema_ref("common.yaml#/components/schemas/Pet", None)
      .unwrap();
    assert_eq!(resolved.document.as_deref(), Some("common.yaml"));
    assert!(resolved.schema.properties.contains_key("name"));
  }

  #[test]
  fn test_parse_fragment_keeps_only_components() {
    let value = json!({"components": {"schemas": {"Error": {"type": "object"}}}});
    let fragment = parse_fragment(value).unwrap();
    assert!(fragment.components.unwrap().schemas.contains_key("Error"));

    let full = json!({
      "openapi": "3.0.3",
      "info": {"title": "Common", "version": "1"},
      "paths": {},
      "components": {"schemas": {"Pet": {"type": "object"}}}
    });
    assert!(parse_fragment(full).unwrap().components.unwrap().schemas.contains_key("Pet"));
  }

  #[test]
  fn test_parse_fragment_reports_path() {
    let value = json!({"components": {"schemas": {"Broken": {"type": 42}}}});
    let err = parse_fragment(value).unwrap_err().to_string();
    assert!(err.contains("Broken"), "unexpected error: {err}");
  }

  #[tokio::test]
  async fn test_load_json_document() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    let body = json!({"openapi": "3.1.0", "info": {"title": "Json", "version": "2"}});
    file.write_all(body.to_string().as_bytes()).unwrap();

    let spec = SpecLoader::open(file.path()).await.unwrap().parse().unwrap();
    assert_eq!(spec.info.version, "2");
    assert!(spec.paths.is_none());
  }
}
