//! Compiled rules and the include/exclude scope filter attached to each of them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::asset_paths::Asset;
use crate::rules::pattern::PathPattern;

/// Free-form options handed to a transform.
pub type TransformOptions = Map<String, Value>;

/// One named processing step, such as a loader, together with its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformStep {
  /// Transform identifier understood by the bundler engine.
  pub name: String,
  /// Options passed verbatim to the transform.
  #[serde(default, skip_serializing_if = "Map::is_empty")]
  pub options: TransformOptions,
}

impl TransformStep {
  /// Step without options.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      options: TransformOptions::new(),
    }
  }

  /// Step carrying the provided options.
  pub fn with_options(name: impl Into<String>, options: TransformOptions) -> Self {
    Self {
      name: name.into(),
      options,
    }
  }
}

/// Normalised rule description accepted by [`crate::RuleSet::new`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleDefinition {
  /// Pattern the asset path has to satisfy.
  pub test: String,
  /// Transforms applied, in order, to matching assets.
  pub transforms: Vec<TransformStep>,
  /// Optional include filters. Empty means "everything the matcher accepts".
  pub include: Vec<String>,
  /// Exclude filters. Any hit removes the asset from the rule.
  pub exclude: Vec<String>,
}

impl RuleDefinition {
  /// Start a definition for the given matcher.
  pub fn new(test: impl Into<String>) -> Self {
    Self {
      test: test.into(),
      ..Self::default()
    }
  }

  /// Append a transform to the chain.
  pub fn transform(mut self, step: TransformStep) -> Self {
    self.transforms.push(step);
    self
  }

  /// Add an include filter.
  pub fn include(mut self, pattern: impl Into<String>) -> Self {
    self.include.push(pattern.into());
    self
  }

  /// Add an exclude filter.
  pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
    self.exclude.push(pattern.into());
    self
  }
}

/// Include/exclude filters scoping a rule to part of the source tree.
///
/// Exclusion always wins: an asset hit by any exclude filter is rejected even when an include
/// filter also accepts it.
#[derive(Debug, Clone, Default)]
pub struct ScopeFilter {
  include: Option<Vec<PathPattern>>,
  exclude: Vec<PathPattern>,
}

impl ScopeFilter {
  pub(crate) fn new(include: Vec<PathPattern>, exclude: Vec<PathPattern>) -> Self {
    Self {
      include: (!include.is_empty()).then_some(include),
      exclude,
    }
  }

  /// Determine whether the path falls inside the scope.
  pub fn allows(&self, path: &str) -> bool {
    if self.exclude.iter().any(|pattern| pattern.is_match(path)) {
      return false;
    }

    match &self.include {
      Some(include) => include.iter().any(|pattern| pattern.is_match(path)),
      None => true,
    }
  }

  /// Include filters, empty when the rule is unrestricted.
  pub fn include(&self) -> &[PathPattern] {
    self.include.as_deref().unwrap_or_default()
  }

  /// Exclude filters.
  pub fn exclude(&self) -> &[PathPattern] {
    &self.exclude
  }
}

/// A validated rule inside a [`crate::RuleSet`].
#[derive(Debug, Clone)]
pub struct Rule {
  pub(crate) index: usize,
  pub(crate) matcher: PathPattern,
  pub(crate) chain: Vec<TransformStep>,
  pub(crate) scope: ScopeFilter,
}

impl Rule {
  /// Position of the rule in declaration order.
  pub fn index(&self) -> usize {
    self.index
  }

  /// Pattern the asset path has to satisfy.
  pub fn matcher(&self) -> &PathPattern {
    &self.matcher
  }

  /// Transform chain contributed by this rule.
  pub fn chain(&self) -> &[TransformStep] {
    &self.chain
  }

  /// Include/exclude filters of this rule.
  pub fn scope(&self) -> &ScopeFilter {
    &self.scope
  }

  /// Returns `true` when the rule applies to the asset.
  pub fn applies_to(&self, asset: &Asset) -> bool {
    self.matcher.is_match(asset.path()) && self.scope.allows(asset.path())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn patterns(values: &[&str]) -> Vec<PathPattern> {
    values
      .iter()
      .map(|value| PathPattern::parse(value).expect("pattern should compile"))
      .collect()
  }

  #[test]
  fn unrestricted_scope_allows_everything() {
    let scope = ScopeFilter::default();
    assert!(scope.allows("src/App.js"));
    assert!(scope.include().is_empty());
  }

  #[test]
  fn exclusion_wins_over_inclusion() {
    let scope = ScopeFilter::new(patterns(&["src/**"]), patterns(&["src/vendor/**"]));
    assert!(scope.allows("src/App.js"));
    assert!(!scope.allows("src/vendor/lib.js"));
    assert!(!scope.allows("lib/App.js"));
  }

  #[test]
  fn empty_include_list_means_no_include_filter() {
    let scope = ScopeFilter::new(Vec::new(), patterns(&["node_modules/**"]));
    assert!(scope.allows("lib/App.js"));
    assert!(!scope.allows("node_modules/react/index.js"));
  }
}
