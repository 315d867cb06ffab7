//! Tree documents on disk
//!
//! Configuration trees are authored as TOML (blocks as arrays of tables),
//! JSON, or YAML. All three normalize to the same JSON tree.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Supported tree document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeFormat {
    Toml,
    Json,
    Yaml,
}

impl TreeFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Detect format from a file path, defaulting to TOML.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(Self::Toml)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }

    /// Parse document text into a tree.
    pub fn parse(&self, source: &str) -> Result<Value> {
        let tree: Value = match self {
            Self::Toml => {
                let table: toml::Table =
                    toml::from_str(source).map_err(|e| Error::parse("TOML", e.to_string()))?;
                serde_json::to_value(table).map_err(|e| Error::parse("TOML", e.to_string()))?
            }
            Self::Json => {
                serde_json::from_str(source).map_err(|e| Error::parse("JSON", e.to_string()))?
            }
            Self::Yaml => {
                serde_yaml::from_str(source).map_err(|e| Error::parse("YAML", e.to_string()))?
            }
        };
        if !tree.is_object() {
            return Err(Error::parse(self.name(), "document root must be a table"));
        }
        Ok(tree)
    }

    /// Render a tree as document text.
    pub fn render(&self, tree: &Value) -> Result<String> {
        match self {
            Self::Toml => {
                let value = json_to_toml(tree)?;
                toml::to_string_pretty(&value).map_err(|e| Error::render("TOML", e.to_string()))
            }
            Self::Json => Ok(serde_json::to_string_pretty(tree)?),
            Self::Yaml => {
                serde_yaml::to_string(tree).map_err(|e| Error::render("YAML", e.to_string()))
            }
        }
    }
}

/// Read a tree document, detecting format from the extension.
pub fn load_tree(path: &Path) -> Result<Value> {
    let source = std::fs::read_to_string(path)?;
    TreeFormat::from_path(path).parse(&source)
}

/// Write a tree document, detecting format from the extension.
pub fn save_tree(path: &Path, tree: &Value) -> Result<()> {
    let content = TreeFormat::from_path(path).render(tree)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Convert a JSON tree to a TOML value. Trees never carry nulls.
fn json_to_toml(json: &Value) -> Result<toml::Value> {
    match json {
        Value::Null => Err(Error::render("TOML", "TOML does not support null values")),
        Value::Bool(b) => Ok(toml::Value::Boolean(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(toml::Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(toml::Value::Float(f))
            } else {
                Err(Error::render("TOML", "Invalid number"))
            }
        }
        Value::String(s) => Ok(toml::Value::String(s.clone())),
        Value::Array(arr) => {
            let items: Result<Vec<toml::Value>> = arr.iter().map(json_to_toml).collect();
            Ok(toml::Value::Array(items?))
        }
        Value::Object(obj) => {
            let mut table = toml::map::Map::new();
            for (k, v) in obj {
                table.insert(k.clone(), json_to_toml(v)?);
            }
            Ok(toml::Value::Table(table))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const DISKS_TOML: &str = r#"
[[space]]
percentage = 10

[[speed]]
milliseconds = 200
"#;

    #[test]
    fn test_toml_blocks_become_lists() {
        let tree = TreeFormat::Toml.parse(DISKS_TOML).unwrap();
        assert_eq!(
            tree,
            json!({"space": [{"percentage": 10}], "speed": [{"milliseconds": 200}]})
        );
    }

    #[test]
    fn test_formats_normalize_identically() {
        let toml = TreeFormat::Toml.parse(DISKS_TOML).unwrap();
        let yaml = TreeFormat::Yaml
            .parse("space:\n  - percentage: 10\nspeed:\n  - milliseconds: 200\n")
            .unwrap();
        let json = TreeFormat::Json
            .parse(r#"{"speed": [{"milliseconds": 200}], "space": [{"percentage": 10}]}"#)
            .unwrap();
        assert_eq!(toml, yaml);
        assert_eq!(toml, json);
    }

    #[test]
    fn test_render_then_parse_toml() {
        let tree = json!({"name": "prod", "rules": [{"delay": 5, "level": "ERROR"}]});
        let text = TreeFormat::Toml.render(&tree).unwrap();
        assert!(text.contains("[[rules]]"));
        assert_eq!(TreeFormat::Toml.parse(&text).unwrap(), tree);
    }

    #[test]
    fn test_non_table_root_rejected() {
        let err = TreeFormat::Json.parse("[1, 2]").unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(TreeFormat::from_extension("YML"), Some(TreeFormat::Yaml));
        assert_eq!(TreeFormat::from_extension("hcl"), None);
        assert_eq!(TreeFormat::from_path(Path::new("a/b.json")), TreeFormat::Json);
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disks.yaml");
        let tree = json!({"space": [{"percentage": 10}]});
        save_tree(&path, &tree).unwrap();
        assert_eq!(load_tree(&path).unwrap(), tree);
    }
}
