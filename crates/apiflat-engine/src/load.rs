//! Source document loading (JSON or YAML)

use std::path::{Path, PathBuf};

use crate::source::Document;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Read and parse a source document.
///
/// # Errors
///
/// Returns error if the file cannot be read or is not a valid document.
pub fn load(path: &Path) -> Result<Document, LoadError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| LoadError::Io(path.to_path_buf(), e.to_string()))?;
    parse(path, &content)
}

/// Parse a source document from JSON or YAML.
///
/// Detection strategy: try extension first (`.yaml`/`.yml`/`.json`), then fall
/// back to content sniffing (leading `{` → JSON, otherwise YAML).
///
/// # Errors
///
/// Returns error if the content is not valid JSON/YAML or does not describe a document.
pub fn parse(path: &Path, content: &str) -> Result<Document, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw: serde_json::Value = match ext.as_str() {
        "yaml" | "yml" => parse_yaml(content)?,
        "json" => parse_json(content)?,
        _ => {
            if content.trim_start().starts_with('{') {
                parse_json(content)?
            } else {
                parse_yaml(content)?
            }
        }
    };

    // YAML reads an unquoted `version: 1.0` as a number
    if raw.pointer("/info/version").is_some_and(serde_json::Value::is_number) {
        return Err(LoadError::Parse(
            "Invalid document: info.version must be a string (quote it, e.g. \"1.0\")"
                .to_string(),
        ));
    }

    serde_json::from_value(raw).map_err(|e| LoadError::Parse(format!("Invalid document: {e}")))
}

fn parse_json(content: &str) -> Result<serde_json::Value, LoadError> {
    serde_json::from_str(content).map_err(|e| LoadError::Parse(format!("Invalid JSON: {e}")))
}

fn parse_yaml(content: &str) -> Result<serde_json::Value, LoadError> {
    serde_yml::from_str(content).map_err(|e| LoadError::Parse(format!("Invalid YAML: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
openapi: 3.0.3
info:
  title: Pets
  version: "1.0"
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        "200":
          description: OK
"#;

    const JSON: &str = r#"{
  "openapi": "3.0.3",
  "info": {"title": "Pets", "version": "1.0"},
  "paths": {"/pets": {"get": {"responses": {"200": {"description": "OK"}}}}}
}"#;

    #[test]
    fn parse_yaml_by_extension() {
        let doc = parse(Path::new("api.yaml"), YAML).unwrap();
        assert_eq!(doc.info.title, "Pets");
        let get = doc.paths["/pets"].get.as_ref().unwrap();
        assert_eq!(get.operation_id.as_deref(), Some("listPets"));
        assert!(get.responses.contains_key("200"));
    }

    #[test]
    fn parse_json_by_extension() {
        let doc = parse(Path::new("api.json"), JSON).unwrap();
        assert_eq!(doc.openapi, "3.0.3");
    }

    #[test]
    fn sniff_without_extension() {
        assert!(parse(Path::new("spec"), JSON).is_ok());
        assert!(parse(Path::new("spec"), YAML).is_ok());
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = parse(Path::new("api.json"), "{ nope").unwrap_err();
        assert!(matches!(err, LoadError::Parse(msg) if msg.starts_with("Invalid JSON")));
    }

    #[test]
    fn missing_info_is_parse_error() {
        let err = parse(Path::new("api.json"), r#"{"openapi": "3.0.3", "paths": {}}"#)
            .unwrap_err();
        assert!(matches!(err, LoadError::Parse(msg) if msg.starts_with("Invalid document")));
    }

    #[test]
    fn numeric_info_version_names_the_field() {
        let yaml = "openapi: 3.0.3\ninfo:\n  title: Pets\n  version: 1.0\npaths: {}\n";
        let err = parse(Path::new("api.yaml"), yaml).unwrap_err();
        assert!(
            matches!(err, LoadError::Parse(ref msg) if msg.contains("info.version must be a string")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openapi.yml");
        std::fs::write(&path, YAML).unwrap();

        let doc = load(&path).unwrap();
        assert!(doc.paths.contains_key("/pets"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load(Path::new("/nonexistent/openapi.yaml")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_, _)));
    }
}
