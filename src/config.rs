//! Build configuration loader: entry, output, loader rules and the HTML plugin.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{HtmlPluginConfig, RuleRecord};
use crate::rules::{ConfigError, RuleSet};

/// File names searched, in order, by [`BundleConfig::discover`].
pub const CONFIG_FILE_NAMES: [&str; 3] = ["asset-rules.json", "asset-rules.yaml", "asset-rules.yml"];

/// Complete build configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BundleConfig {
  /// Entry module relative to the project root. Its directory is scanned for assets.
  pub entry: String,
  /// Output location.
  pub output: OutputConfig,
  /// Loader rules.
  pub module: ModuleConfig,
  /// Build plugins.
  pub plugins: PluginsConfig,
}

impl Default for BundleConfig {
  fn default() -> Self {
    Self {
      entry: "./src/index.js".into(),
      output: OutputConfig::default(),
      module: ModuleConfig::default(),
      plugins: PluginsConfig::default(),
    }
  }
}

/// Where build artifacts are written.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
  /// Output directory relative to the project root.
  pub path: String,
  /// File name of the bundled entry script.
  pub filename: String,
  /// File name of the serialised build plan written next to the bundle.
  pub manifest: String,
}

impl Default for OutputConfig {
  fn default() -> Self {
    Self {
      path: "dist".into(),
      filename: "main.js".into(),
      manifest: "asset-plan.json".into(),
    }
  }
}

/// Module section holding the ordered rule list.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ModuleConfig {
  /// Rules in declaration order.
  pub rules: Vec<RuleRecord>,
}

/// Optional plugins invoked once per build.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PluginsConfig {
  /// HTML generation plugin.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub html: Option<HtmlPluginConfig>,
}

impl BundleConfig {
  /// Look for a configuration file in `project_root`.
  ///
  /// Missing files fall back to defaults; a file that exists but fails to parse is an error.
  pub fn discover(project_root: &Path) -> Result<Self> {
    for name in CONFIG_FILE_NAMES {
      let candidate = project_root.join(name);
      if candidate.is_file() {
        debug!(path = %candidate.display(), "found configuration file");
        return Self::from_path(&candidate);
      }
    }

    debug!(root = %project_root.display(), "no configuration file, using defaults");
    Ok(Self::default())
  }

  /// Load `explicit` when given, otherwise [`discover`](Self::discover) in `project_root`.
  ///
  /// A relative explicit path is taken relative to `project_root`.
  pub fn load(project_root: &Path, explicit: Option<&Path>) -> Result<Self> {
    match explicit {
      Some(path) if path.is_relative() => Self::from_path(&project_root.join(path)),
      Some(path) => Self::from_path(path),
      None => Self::discover(project_root),
    }
  }

  /// Read configuration from a JSON or YAML file, chosen by extension.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content =
      fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let is_yaml = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let config: Self = if is_yaml {
      serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?
    } else {
      serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?
    };
    Ok(config)
  }

  /// Compile the declared rules.
  pub fn rule_set(&self) -> Result<RuleSet, ConfigError> {
    RuleSet::from_records(&self.module.rules)
  }

  /// Directory holding the entry module, relative to the project root.
  pub fn source_dir(&self) -> String {
    let entry = self.entry.replace('\\', "/");
    let entry = entry.trim_start_matches("./");
    match entry.rsplit_once('/') {
      Some((dir, _)) => dir.to_string(),
      None => String::new(),
    }
  }

  /// Absolute output directory for the given project root.
  pub fn output_dir(&self, project_root: &Path) -> PathBuf {
    project_root.join(&self.output.path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  const JSON_CONFIG: &str = r#"{
    "entry": "./src/index.js",
    "output": { "path": "dist", "filename": "main.js" },
    "module": {
      "rules": [
        { "test": "/\\.jsx?$/", "loader": "babel-loader", "include": "/src/", "options": { "presets": ["env"] } },
        { "test": "/\\.css$/", "use": ["style-loader", "css-loader"] }
      ]
    },
    "plugins": { "html": { "title": "My App", "template": "src/index.html", "inject": false } }
  }"#;

  const YAML_CONFIG: &str = r#"
entry: ./app/main.js
output:
  path: build
module:
  rules:
    - test: "*.{png,jpg,jpeg,gif}"
      use:
        - loader: url-loader
          options:
            limit: 8192
            name: "[path]/[name].[ext]"
"#;

  #[test]
  fn parses_json_configuration() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("asset-rules.json");
    fs::write(&path, JSON_CONFIG).unwrap();

    let config = BundleConfig::from_path(&path).unwrap();
    assert_eq!(config.module.rules.len(), 2);
    assert_eq!(config.output.manifest, "asset-plan.json");
    let html = config.plugins.html.as_ref().unwrap();
    assert_eq!(html.title, "My App");
    assert!(!html.inject);
    assert_eq!(config.rule_set().unwrap().len(), 2);
  }

  #[test]
  fn parses_yaml_configuration_with_partial_output() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("asset-rules.yaml");
    fs::write(&path, YAML_CONFIG).unwrap();

    let config = BundleConfig::from_path(&path).unwrap();
    assert_eq!(config.output.path, "build");
    assert_eq!(config.output.filename, "main.js");
    assert_eq!(config.source_dir(), "app");
    assert!(config.plugins.html.is_none());
  }

  #[test]
  fn discover_falls_back_to_defaults() {
    let temp = tempdir().unwrap();
    let config = BundleConfig::discover(temp.path()).unwrap();
    assert_eq!(config.entry, "./src/index.js");
    assert_eq!(config.source_dir(), "src");
    assert_eq!(config.output_dir(temp.path()), temp.path().join("dist"));
    assert!(config.rule_set().unwrap().is_empty());
  }

  #[test]
  fn discover_reports_unparseable_files() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("asset-rules.json"), "{ not json").unwrap();

    let err = BundleConfig::discover(temp.path()).unwrap_err();
    assert!(err.to_string().contains("failed to parse"));
  }

  #[test]
  fn load_resolves_relative_config_against_project_root() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("config")).unwrap();
    fs::write(temp.path().join("config/rules.yml"), YAML_CONFIG).unwrap();

    let config = BundleConfig::load(temp.path(), Some(Path::new("config/rules.yml"))).unwrap();
    assert_eq!(config.output.path, "build");

    let absolute = temp.path().join("config/rules.yml");
    let config = BundleConfig::load(Path::new("unused"), Some(&absolute)).unwrap();
    assert_eq!(config.source_dir(), "app");
  }

  #[test]
  fn load_without_explicit_path_discovers() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("asset-rules.json"), JSON_CONFIG).unwrap();

    let config = BundleConfig::load(temp.path(), None).unwrap();
    assert_eq!(config.module.rules.len(), 2);
  }

  #[test]
  fn entry_at_project_root_has_empty_source_dir() {
    let config = BundleConfig {
      entry: "index.js".into(),
      ..BundleConfig::default()
    };
    assert_eq!(config.source_dir(), "");
  }
}
