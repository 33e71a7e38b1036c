//! Directory scanning for build inputs.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::trace;

use crate::asset_paths::Asset;

/// Walk `source_dir` and return every file as an [`Asset`] relative to `project_root`.
///
/// Hidden entries (leading `.`) are skipped, as is anything under one of the `skip` directories.
/// The result is sorted so repeated scans produce identical plans.
pub fn scan_sources(project_root: &Path, source_dir: &Path, skip: &[PathBuf]) -> Result<Vec<Asset>> {
  let mut found = BTreeSet::new();
  if source_dir.is_dir() {
    collect_sources_recursively(project_root, source_dir, skip, &mut found)?;
  }
  Ok(found.into_iter().collect())
}

fn collect_sources_recursively(
  project_root: &Path,
  dir: &Path,
  skip: &[PathBuf],
  found: &mut BTreeSet<Asset>,
) -> Result<()> {
  let entries =
    fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?;

  for entry in entries {
    let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
    let file_name = entry.file_name();
    if file_name.to_string_lossy().starts_with('.') {
      continue;
    }

    let path = entry.path();
    if skip.iter().any(|skipped| path.starts_with(skipped)) {
      trace!(path = %path.display(), "skipping excluded directory");
      continue;
    }

    let file_type = entry
      .file_type()
      .with_context(|| format!("failed to inspect {}", path.display()))?;
    if file_type.is_dir() {
      collect_sources_recursively(project_root, &path, skip, found)?;
    } else if file_type.is_file() {
      let relative = path.strip_prefix(project_root).unwrap_or(&path);
      found.insert(Asset::from_path(relative));
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn collects_files_relative_to_project_root() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src/components")).unwrap();
    fs::create_dir_all(root.join("src/.cache")).unwrap();
    fs::write(root.join("src/index.js"), "import './App';").unwrap();
    fs::write(root.join("src/components/App.jsx"), "export default 1;").unwrap();
    fs::write(root.join("src/.cache/stale.js"), "").unwrap();
    fs::write(root.join("src/.eslintrc"), "{}").unwrap();

    let assets = scan_sources(root, &root.join("src"), &[]).unwrap();
    let paths: Vec<&str> = assets.iter().map(Asset::path).collect();
    assert_eq!(paths, vec!["src/components/App.jsx", "src/index.js"]);
  }

  #[test]
  fn skips_output_directory_when_scanning_project_root() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("dist")).unwrap();
    fs::write(root.join("index.js"), "").unwrap();
    fs::write(root.join("dist/main.js"), "").unwrap();

    let assets = scan_sources(root, root, &[root.join("dist")]).unwrap();
    assert_eq!(assets, vec![Asset::new("index.js")]);
  }

  #[test]
  fn missing_source_directory_yields_no_assets() {
    let dir = tempdir().unwrap();
    let assets = scan_sources(dir.path(), &dir.path().join("src"), &[]).unwrap();
    assert!(assets.is_empty());
  }
}
