#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod config;
pub mod emit;
pub mod html;
pub mod models;
pub mod resolver;
pub mod rules;
pub mod scanning;

pub use asset_paths::Asset;
pub use builder::{AssetPipeline, BuildArtifacts, BuildPlan};
pub use config::BundleConfig;
pub use html::{HtmlContext, HtmlPlugin, TemplateHtmlPlugin};
pub use resolver::{OptionOverride, ResolvedPlan, Resolution, resolve};
pub use rules::{ConfigError, RuleDefinition, RuleSet, TransformStep};
