//! Construction and validation of the immutable rule set.

use std::slice;

use tracing::debug;

use crate::models::{RuleRecord, UseEntry};
use crate::rules::pattern::{PathPattern, PatternError};
use crate::rules::rule::{Rule, RuleDefinition, ScopeFilter, TransformStep};

/// Errors raised while building a [`RuleSet`]. Rule indices are 0-based declaration positions.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// A matcher or filter pattern failed to compile.
  #[error("rule {rule}: invalid pattern `{pattern}`: {source}")]
  InvalidPattern {
    /// Offending rule.
    rule: usize,
    /// Pattern text as written.
    pattern: String,
    /// Compilation failure.
    source: PatternError,
  },
  /// The rule declared no transforms.
  #[error("rule {rule}: transform chain is empty")]
  EmptyChain {
    /// Offending rule.
    rule: usize,
  },
  /// A transform in the chain has a blank name.
  #[error("rule {rule}: transform {position} has an empty name")]
  EmptyTransformName {
    /// Offending rule.
    rule: usize,
    /// Position of the transform within the rule's chain.
    position: usize,
  },
  /// `loader` and `use` were both given.
  #[error("rule {rule}: `loader` and `use` cannot be combined")]
  LoaderWithUse {
    /// Offending rule.
    rule: usize,
  },
  /// `options` was given without a single `loader` to attach it to.
  #[error("rule {rule}: `options` requires `loader`")]
  OptionsWithoutLoader {
    /// Offending rule.
    rule: usize,
  },
  /// The rule's own filters can never let an asset through.
  #[error("rule {rule}: filters can never be satisfied: {reason}")]
  ContradictoryFilters {
    /// Offending rule.
    rule: usize,
    /// Which filters contradict each other.
    reason: String,
  },
}

/// Ordered, immutable collection of rules. Declaration order is application order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
  rules: Vec<Rule>,
}

impl RuleSet {
  /// Validate and compile the definitions, failing on the first invalid rule.
  pub fn new(definitions: impl IntoIterator<Item = RuleDefinition>) -> Result<Self, ConfigError> {
    let rules = definitions
      .into_iter()
      .enumerate()
      .map(|(index, definition)| compile_rule(index, definition))
      .collect::<Result<Vec<_>, _>>()?;

    debug!(rules = rules.len(), "compiled rule set");
    Ok(Self { rules })
  }

  /// Build a rule set from bundler-style configuration records.
  pub fn from_records(records: &[RuleRecord]) -> Result<Self, ConfigError> {
    let definitions = records
      .iter()
      .enumerate()
      .map(|(index, record)| record_to_definition(index, record))
      .collect::<Result<Vec<_>, _>>()?;
    Self::new(definitions)
  }

  /// Rules in declaration order.
  pub fn iter(&self) -> slice::Iter<'_, Rule> {
    self.rules.iter()
  }

  /// Number of rules.
  pub fn len(&self) -> usize {
    self.rules.len()
  }

  /// Returns `true` when no rules were declared.
  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }
}

impl<'a> IntoIterator for &'a RuleSet {
  type Item = &'a Rule;
  type IntoIter = slice::Iter<'a, Rule>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

fn record_to_definition(rule: usize, record: &RuleRecord) -> Result<RuleDefinition, ConfigError> {
  let transforms = match (&record.loader, record.use_entries.is_empty()) {
    (Some(_), false) => return Err(ConfigError::LoaderWithUse { rule }),
    (Some(loader), true) => vec![TransformStep::with_options(
      loader.clone(),
      record.options.clone().unwrap_or_default(),
    )],
    (None, _) if record.options.is_some() => {
      return Err(ConfigError::OptionsWithoutLoader { rule });
    }
    (None, _) => record
      .use_entries
      .iter()
      .map(|entry| match entry {
        UseEntry::Name(name) => TransformStep::new(name.clone()),
        UseEntry::Loader { loader, options } => {
          TransformStep::with_options(loader.clone(), options.clone())
        }
      })
      .collect(),
  };

  Ok(RuleDefinition {
    test: record.test.clone(),
    transforms,
    include: record.include.clone(),
    exclude: record.exclude.clone(),
  })
}

fn compile_rule(index: usize, definition: RuleDefinition) -> Result<Rule, ConfigError> {
  let matcher = compile_pattern(index, &definition.test)?;
  let include = compile_patterns(index, &definition.include)?;
  let exclude = compile_patterns(index, &definition.exclude)?;

  if definition.transforms.is_empty() {
    return Err(ConfigError::EmptyChain { rule: index });
  }
  if let Some(position) = definition
    .transforms
    .iter()
    .position(|step| step.name.trim().is_empty())
  {
    return Err(ConfigError::EmptyTransformName {
      rule: index,
      position,
    });
  }

  let scope = ScopeFilter::new(include, exclude);
  check_contradictions(index, &matcher, &scope)?;

  Ok(Rule {
    index,
    matcher,
    chain: definition.transforms,
    scope,
  })
}

fn compile_pattern(rule: usize, pattern: &str) -> Result<PathPattern, ConfigError> {
  PathPattern::parse(pattern).map_err(|source| ConfigError::InvalidPattern {
    rule,
    pattern: pattern.to_string(),
    source,
  })
}

fn compile_patterns(rule: usize, patterns: &[String]) -> Result<Vec<PathPattern>, ConfigError> {
  patterns
    .iter()
    .map(|pattern| compile_pattern(rule, pattern))
    .collect()
}

fn check_contradictions(
  rule: usize,
  matcher: &PathPattern,
  scope: &ScopeFilter,
) -> Result<(), ConfigError> {
  for exclude in scope.exclude() {
    let reason = if exclude.matches_everything() {
      format!("exclude `{exclude}` matches every path")
    } else if exclude.as_str() == matcher.as_str() {
      format!("exclude `{exclude}` repeats the rule's own matcher")
    } else if scope
      .include()
      .iter()
      .any(|include| include.as_str() == exclude.as_str())
    {
      format!("include `{exclude}` is also excluded")
    } else {
      continue;
    };

    return Err(ConfigError::ContradictoryFilters { rule, reason });
  }

  Ok(())
}
