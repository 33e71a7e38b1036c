//! HTML generation plugin boundary.
//!
//! The pipeline invokes the configured [`HtmlPlugin`] exactly once per full build and ignores
//! everything about it except success or failure.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::{NoExpand, Regex};

use crate::models::HtmlPluginConfig;

/// Paths an HTML plugin needs to locate its template and write the document.
#[derive(Debug, Clone)]
pub struct HtmlContext {
  /// Project root the template path is relative to.
  pub project_root: PathBuf,
  /// Directory the generated document is written into.
  pub output_dir: PathBuf,
  /// File name of the bundled entry script.
  pub bundle_filename: String,
}

/// Generates the HTML document for a build.
pub trait HtmlPlugin {
  /// Produce the document described by `config`, returning the path written.
  fn generate(&self, config: &HtmlPluginConfig, context: &HtmlContext) -> Result<PathBuf>;
}

/// Default plugin: fill in the template's title and optionally inject the bundle script.
#[derive(Debug, Clone)]
pub struct TemplateHtmlPlugin {
  output_file: String,
}

impl Default for TemplateHtmlPlugin {
  fn default() -> Self {
    Self {
      output_file: "index.html".into(),
    }
  }
}

impl TemplateHtmlPlugin {
  /// Plugin writing to a custom file name inside the output directory.
  pub fn with_output_file(output_file: impl Into<String>) -> Self {
    Self {
      output_file: output_file.into(),
    }
  }
}

impl HtmlPlugin for TemplateHtmlPlugin {
  fn generate(&self, config: &HtmlPluginConfig, context: &HtmlContext) -> Result<PathBuf> {
    let template_path = context.project_root.join(&config.template);
    let template = fs::read_to_string(&template_path)
      .with_context(|| format!("failed to read HTML template {}", template_path.display()))?;

    let mut html = apply_title(&template, &config.title);
    if config.inject {
      html = inject_script(&html, &context.bundle_filename);
    }

    fs::create_dir_all(&context.output_dir)
      .with_context(|| format!("failed to create {}", context.output_dir.display()))?;
    let target = context.output_dir.join(&self.output_file);
    write_document(&target, &html)?;
    Ok(target)
  }
}

fn write_document(target: &Path, html: &str) -> Result<()> {
  fs::write(target, html).with_context(|| format!("failed to write {}", target.display()))
}

fn title_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?is)<title[^>]*>.*?</title>").expect("invalid title regex"))
}

fn head_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").expect("invalid head regex"))
}

fn body_close_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?i)</body\s*>").expect("invalid body regex"))
}

fn apply_title(template: &str, title: &str) -> String {
  if title.is_empty() {
    return template.to_string();
  }

  let element = format!("<title>{}</title>", escape_text(title));
  if title_pattern().is_match(template) {
    return title_pattern()
      .replace(template, NoExpand(&element))
      .into_owned();
  }

  match head_pattern().find(template) {
    Some(head) => format!(
      "{}\n    {}{}",
      &template[..head.end()],
      element,
      &template[head.end()..]
    ),
    None => format!("{element}\n{template}"),
  }
}

fn inject_script(html: &str, bundle_filename: &str) -> String {
  let tag = format!(
    "<script defer src=\"{}\"></script>",
    escape_text(bundle_filename)
  );

  // Before the final closing body tag.
  match body_close_pattern().find_iter(html).last() {
    Some(close) => format!(
      "{}  {}\n{}",
      &html[..close.start()],
      tag,
      &html[close.start()..]
    ),
    None => format!("{html}\n{tag}\n"),
  }
}

fn escape_text(value: &str) -> String {
  value
    .replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
}
