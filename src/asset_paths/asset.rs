use std::fmt;
use std::path::Path;

use serde::Serialize;

/// A build input identified by its forward-slash path relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Asset {
  path: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  extension: Option<String>,
}

impl Asset {
  /// Create an asset, normalising separators and stripping leading `./` segments.
  pub fn new(path: impl AsRef<str>) -> Self {
    let path = normalise_asset_path(path.as_ref());
    let extension = extension_of(&path).map(str::to_string);
    Self { path, extension }
  }

  /// Create an asset from a native relative path.
  pub fn from_path(path: &Path) -> Self {
    Self::new(path.to_string_lossy())
  }

  /// Normalised path used for matching.
  pub fn path(&self) -> &str {
    &self.path
  }

  /// Extension of the final path segment, without the dot.
  pub fn extension(&self) -> Option<&str> {
    self.extension.as_deref()
  }

  /// Final path segment.
  pub fn file_name(&self) -> &str {
    self
      .path
      .rsplit_once('/')
      .map_or(self.path.as_str(), |(_, name)| name)
  }
}

impl fmt::Display for Asset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.path)
  }
}

fn normalise_asset_path(raw: &str) -> String {
  let mut path = raw.trim().replace('\\', "/");
  while path.contains("//") {
    path = path.replace("//", "/");
  }

  let mut trimmed = path.as_str();
  while let Some(rest) = trimmed.strip_prefix("./") {
    trimmed = rest;
  }
  trimmed.to_string()
}

fn extension_of(path: &str) -> Option<&str> {
  let name = path.rsplit('/').next().unwrap_or(path);
  match name.rfind('.') {
    Some(0) | None => None,
    Some(dot) if dot + 1 == name.len() => None,
    Some(dot) => Some(&name[dot + 1..]),
  }
}
