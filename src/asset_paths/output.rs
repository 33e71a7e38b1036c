use crate::asset_paths::Asset;

/// Produce the output path for an asset that is carried into the build output unmodified.
///
/// The asset keeps its location relative to `source_root`; assets outside the source root keep
/// their full project-relative path. The result always uses forward slashes.
pub fn make_output_path(output_dir: &str, source_root: &str, asset: &Asset) -> String {
  let source_root = source_root.trim_matches('/');
  let relative = if source_root.is_empty() || source_root == "." {
    asset.path()
  } else {
    asset
      .path()
      .strip_prefix(source_root)
      .and_then(|rest| rest.strip_prefix('/'))
      .unwrap_or(asset.path())
  };

  let output_dir = output_dir.trim_end_matches('/');
  if output_dir.is_empty() {
    relative.to_string()
  } else {
    format!("{output_dir}/{relative}").replace('\\', "/")
  }
}
