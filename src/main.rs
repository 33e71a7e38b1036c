//! Command line harness around the asset rule resolver.

use std::path::PathBuf;

use anyhow::{Context, Result};
use asset_rules::emit::write_artifacts;
use asset_rules::{Asset, AssetPipeline, BundleConfig, Resolution, TemplateHtmlPlugin};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "asset-rules", version, about = "Resolve loader rules for build assets")]
struct Cli {
  /// Project root that asset paths and the configuration are relative to.
  #[arg(long, default_value = ".")]
  root: PathBuf,

  /// Explicit configuration file, relative to `--root`; otherwise `asset-rules.{json,yaml,yml}`
  /// is discovered.
  #[arg(long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Print the resolution for each given asset path.
  Resolve {
    /// Asset paths relative to the project root.
    #[arg(required = true)]
    paths: Vec<String>,
  },
  /// Scan the entry directory and print the build plan.
  Plan,
  /// Scan, plan, run the HTML plugin and write artifacts to the output directory.
  Build,
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
  asset: &'a str,
  resolution: &'a Resolution,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let config = BundleConfig::load(&cli.root, cli.config.as_deref())?;
  debug!(rules = config.module.rules.len(), "loaded configuration");

  let pipeline = AssetPipeline::new(&config, &cli.root).context("invalid loader rules")?;

  match cli.command {
    Command::Resolve { paths } => {
      for path in paths {
        let asset = Asset::new(&path);
        let resolution = pipeline.rules().resolve(&asset);
        let output = ResolveOutput {
          asset: asset.path(),
          resolution: &resolution,
        };
        println!("{}", serde_json::to_string(&output)?);
      }
    }
    Command::Plan => {
      let plan = pipeline.plan(pipeline.scan()?);
      println!("{}", serde_json::to_string_pretty(&plan)?);
    }
    Command::Build => {
      let artifacts = pipeline.build(&TemplateHtmlPlugin::default())?;
      write_artifacts(&pipeline, &artifacts)?;
      println!(
        "{} resolved, {} passed through, {} with conflicting options",
        artifacts.plan.resolved.len(),
        artifacts.plan.pass_through.len(),
        artifacts.plan.conflicted().count()
      );
    }
  }

  Ok(())
}
