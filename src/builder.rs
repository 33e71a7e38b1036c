//! Build planning harness: scan the sources, resolve every asset and invoke the HTML plugin.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::asset_paths::{Asset, make_output_path};
use crate::config::BundleConfig;
use crate::html::{HtmlContext, HtmlPlugin};
use crate::resolver::{ResolvedPlan, Resolution, resolve};
use crate::rules::{ConfigError, RuleSet};
use crate::scanning::scan_sources;

/// Resolution results for a batch of assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildPlan {
  /// Assets with at least one applying rule, in input order.
  pub resolved: Vec<ResolvedPlan>,
  /// Assets no rule applied to; carried into the output unmodified.
  pub pass_through: Vec<Asset>,
}

impl BuildPlan {
  /// Plans where overlapping rules replaced a transform's options.
  pub fn conflicted(&self) -> impl Iterator<Item = &ResolvedPlan> {
    self.resolved.iter().filter(|plan| plan.has_conflicts())
  }
}

/// Everything produced by [`AssetPipeline::build`].
#[derive(Debug, Clone)]
pub struct BuildArtifacts {
  /// Per-asset resolution results.
  pub plan: BuildPlan,
  /// Build plan serialised as prettified JSON.
  pub manifest_json: String,
  /// Document written by the HTML plugin, when one is configured.
  pub html_document: Option<PathBuf>,
}

/// Serialised form of a build plan written next to the bundle.
#[derive(Debug, Serialize)]
struct PlanManifest<'a> {
  entry: &'a str,
  bundle: String,
  resolved: &'a [ResolvedPlan],
  pass_through: Vec<PassThroughEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct PassThroughEntry<'a> {
  source: &'a str,
  output: String,
}

/// High-level helper tying configuration, rules and the HTML plugin together.
pub struct AssetPipeline<'a> {
  config: &'a BundleConfig,
  project_root: &'a Path,
  rules: RuleSet,
}

impl<'a> AssetPipeline<'a> {
  /// Compile the configured rules. Invalid rules abort before any asset is resolved.
  pub fn new(config: &'a BundleConfig, project_root: &'a Path) -> Result<Self, ConfigError> {
    Ok(Self {
      config,
      project_root,
      rules: config.rule_set()?,
    })
  }

  /// Configuration the pipeline was built from.
  pub fn config(&self) -> &BundleConfig {
    self.config
  }

  /// Project root all asset paths are relative to.
  pub fn project_root(&self) -> &Path {
    self.project_root
  }

  /// Compiled rules shared by every resolution.
  pub fn rules(&self) -> &RuleSet {
    &self.rules
  }

  /// Resolve a batch of assets.
  pub fn plan<I>(&self, assets: I) -> BuildPlan
  where
    I: IntoIterator<Item = Asset>,
  {
    let mut plan = BuildPlan::default();
    for asset in assets {
      match resolve(&asset, &self.rules) {
        Resolution::Plan(resolved) => plan.resolved.push(resolved),
        Resolution::NoMatch if self.is_html_template(&asset) => {
          debug!(asset = %asset, "HTML template is consumed by the plugin, not mirrored");
        }
        Resolution::NoMatch => plan.pass_through.push(asset),
      }
    }

    for conflicted in plan.conflicted() {
      for replaced in &conflicted.overrides {
        warn!(
          asset = %conflicted.asset,
          transform = %replaced.transform,
          replaced_rule = replaced.replaced_rule,
          winning_rule = replaced.winning_rule,
          "overlapping rules disagree on transform options"
        );
      }
    }

    plan
  }

  /// Scan the entry's directory for build inputs.
  pub fn scan(&self) -> Result<Vec<Asset>> {
    let source_dir = self.project_root.join(self.config.source_dir());
    let skip = vec![self.config.output_dir(self.project_root)];
    scan_sources(self.project_root, &source_dir, &skip)
  }

  /// Scan, plan and run the HTML plugin once, returning the resulting artifacts.
  pub fn build<H: HtmlPlugin>(&self, html: &H) -> Result<BuildArtifacts> {
    let assets = self.scan()?;
    let plan = self.plan(assets);

    info!(
      resolved = plan.resolved.len(),
      pass_through = plan.pass_through.len(),
      conflicted = plan.conflicted().count(),
      "planned build"
    );

    let html_document = match &self.config.plugins.html {
      Some(html_config) => Some(html.generate(html_config, &HtmlContext {
        project_root: self.project_root.to_path_buf(),
        output_dir: self.output_dir(),
        bundle_filename: self.config.output.filename.clone(),
      })?),
      None => None,
    };

    let manifest_json = self.render_manifest(&plan)?;

    Ok(BuildArtifacts {
      plan,
      manifest_json,
      html_document,
    })
  }

  /// Absolute output directory.
  pub fn output_dir(&self) -> PathBuf {
    self.config.output_dir(self.project_root)
  }

  /// Output path, relative to the project root, of a pass-through asset.
  pub fn pass_through_output(&self, asset: &Asset) -> String {
    make_output_path(&self.config.output.path, &self.config.source_dir(), asset)
  }

  fn is_html_template(&self, asset: &Asset) -> bool {
    self
      .config
      .plugins
      .html
      .as_ref()
      .is_some_and(|html| Asset::new(&html.template).path() == asset.path())
  }

  fn render_manifest(&self, plan: &BuildPlan) -> Result<String> {
    let manifest = PlanManifest {
      entry: &self.config.entry,
      bundle: format!(
        "{}/{}",
        self.config.output.path.trim_end_matches('/'),
        self.config.output.filename
      ),
      resolved: &plan.resolved,
      pass_through: plan
        .pass_through
        .iter()
        .map(|asset| PassThroughEntry {
          source: asset.path(),
          output: self.pass_through_output(asset),
        })
        .collect(),
    };

    Ok(serde_json::to_string_pretty(&manifest)?)
  }
}
