//! Serialisable records read from the configuration file.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single entry of `module.rules`, in the shape bundler configuration files use.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RuleRecord {
  /// Matcher tested against the asset path.
  pub test: String,
  /// Shorthand for a single transform.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub loader: Option<String>,
  /// Options for the `loader` shorthand.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub options: Option<Map<String, Value>>,
  /// Ordered transforms, either bare names or `{loader, options}` objects.
  #[serde(
    default,
    rename = "use",
    deserialize_with = "one_or_many",
    skip_serializing_if = "Vec::is_empty"
  )]
  pub use_entries: Vec<UseEntry>,
  /// Include filters; a single pattern or a list.
  #[serde(
    default,
    deserialize_with = "one_or_many",
    skip_serializing_if = "Vec::is_empty"
  )]
  pub include: Vec<String>,
  /// Exclude filters; a single pattern or a list.
  #[serde(
    default,
    deserialize_with = "one_or_many",
    skip_serializing_if = "Vec::is_empty"
  )]
  pub exclude: Vec<String>,
}

/// One element of a rule's `use` list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum UseEntry {
  /// Transform referenced by name only.
  Name(String),
  /// Transform with options.
  Loader {
    /// Transform name.
    loader: String,
    /// Options handed to the transform.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    options: Map<String, Value>,
  },
}

/// Settings for the HTML generation plugin, invoked once per build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HtmlPluginConfig {
  /// Document title written into `<title>`.
  #[serde(default)]
  pub title: String,
  /// Template path relative to the project root.
  pub template: String,
  /// Whether the bundle script tag is injected into the document.
  #[serde(default = "default_inject")]
  pub inject: bool,
}

fn default_inject() -> bool {
  true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
  // Lists first: a struct variant would otherwise accept a short list positionally.
  Many(Vec<T>),
  One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Ok(match OneOrMany::deserialize(deserializer)? {
    OneOrMany::One(value) => vec![value],
    OneOrMany::Many(values) => values,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn accepts_single_patterns_and_lists() {
    let record: RuleRecord = serde_json::from_value(json!({
      "test": "*.svg",
      "use": "file-loader",
      "include": "assets/**",
      "exclude": ["fonts/**", "legacy/**"]
    }))
    .unwrap();

    assert_eq!(record.use_entries, vec![UseEntry::Name("file-loader".into())]);
    assert_eq!(record.include, vec!["assets/**".to_string()]);
    assert_eq!(record.exclude.len(), 2);
  }

  #[test]
  fn parses_loader_objects_with_options() {
    let record: RuleRecord = serde_json::from_value(json!({
      "test": "*.png",
      "use": [{ "loader": "url-loader", "options": { "limit": 8192 } }, "image-webpack-loader"]
    }))
    .unwrap();

    match &record.use_entries[0] {
      UseEntry::Loader { loader, options } => {
        assert_eq!(loader, "url-loader");
        assert_eq!(options.get("limit"), Some(&json!(8192)));
      }
      other => panic!("unexpected entry: {other:?}"),
    }
    assert_eq!(record.use_entries[1], UseEntry::Name("image-webpack-loader".into()));
  }

  #[test]
  fn html_plugin_injects_by_default() {
    let config: HtmlPluginConfig =
      serde_json::from_value(json!({ "template": "src/index.html" })).unwrap();
    assert!(config.inject);
    assert!(config.title.is_empty());
  }
}
