//! Writes planning artifacts and mirrors pass-through assets into the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use same_file::is_same_file;
use tracing::{debug, info, warn};

use crate::builder::{AssetPipeline, BuildArtifacts};

/// Write the plan manifest and copy every pass-through asset unmodified.
///
/// Pass-through assets whose output would land on the manifest or the generated HTML document are
/// skipped with a warning.
pub fn write_artifacts(pipeline: &AssetPipeline<'_>, artifacts: &BuildArtifacts) -> Result<()> {
  let project_root = pipeline.project_root();
  let output_dir = pipeline.output_dir();
  fs::create_dir_all(&output_dir)
    .with_context(|| format!("failed to create {}", output_dir.display()))?;

  let manifest_path = output_dir.join(&pipeline.config().output.manifest);
  fs::write(&manifest_path, &artifacts.manifest_json)
    .with_context(|| format!("failed to write {}", manifest_path.display()))?;

  let generated: Vec<PathBuf> = std::iter::once(manifest_path.clone())
    .chain(artifacts.html_document.clone())
    .collect();

  let mut mirrored = 0;
  for asset in &artifacts.plan.pass_through {
    let source = project_root.join(asset.path());
    let destination = project_root.join(pipeline.pass_through_output(asset));
    if is_generated(&destination, &generated)? {
      warn!(
        source = %asset,
        destination = %destination.display(),
        "pass-through asset collides with a generated file, skipping"
      );
      continue;
    }
    if let Some(parent) = destination.parent() {
      fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    install_pass_through(&source, &destination).with_context(|| {
      format!(
        "failed to copy {} to {}",
        source.display(),
        destination.display()
      )
    })?;
    debug!(source = %asset, destination = %destination.display(), "mirrored pass-through asset");
    mirrored += 1;
  }

  info!(
    manifest = %manifest_path.display(),
    mirrored,
    "wrote build artifacts"
  );
  Ok(())
}

fn is_generated(destination: &Path, generated: &[PathBuf]) -> std::io::Result<bool> {
  if !destination.exists() {
    return Ok(false);
  }
  for path in generated {
    if path.exists() && is_same_file(destination, path)? {
      return Ok(true);
    }
  }
  Ok(false)
}

/// Never links, so writes under the output directory cannot reach the source tree.
fn install_pass_through(source: &Path, destination: &Path) -> std::io::Result<()> {
  if destination.exists() {
    if fs::canonicalize(source)? == fs::canonicalize(destination)? {
      return Ok(());
    }
    // Unlinking first detaches links left behind by earlier builds.
    fs::remove_file(destination)?;
  }

  fs::copy(source, destination).map(|_| ())
}
