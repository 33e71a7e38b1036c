//! Resolution of an asset against the rule set.
//!
//! Every rule is tested in declaration order. A rule applies when its matcher accepts the asset
//! path, none of its exclude filters do, and (if it has any) one of its include filters does. The
//! chains of all applying rules are concatenated in declaration order, which is also the order the
//! bundler engine applies them in: the first transform in the chain runs first.
//!
//! When a later rule names a transform that an earlier rule already contributed, the later rule's
//! options replace the earlier ones wholesale and the transform keeps the position where it was
//! first introduced. Replacements are recorded as [`OptionOverride`]s so callers can flag them.

use serde::Serialize;
use tracing::{debug, trace};

use crate::asset_paths::Asset;
use crate::rules::{RuleSet, TransformOptions, TransformStep};

/// Outcome of resolving one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum Resolution {
  /// At least one rule applied.
  Plan(ResolvedPlan),
  /// No rule applied; the asset is passed through unmodified.
  NoMatch,
}

impl Resolution {
  /// The plan, when one was produced.
  pub fn plan(&self) -> Option<&ResolvedPlan> {
    match self {
      Self::Plan(plan) => Some(plan),
      Self::NoMatch => None,
    }
  }

  /// Returns `true` for pass-through outcomes.
  pub fn is_no_match(&self) -> bool {
    matches!(self, Self::NoMatch)
  }
}

/// Ordered transform chain for a single asset, with options already merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPlan {
  /// Asset the plan was produced for.
  pub asset: Asset,
  /// Transforms in application order, each carrying its effective options.
  pub chain: Vec<TransformStep>,
  /// Indices of the rules that applied, in declaration order.
  pub matched_rules: Vec<usize>,
  /// Option replacements caused by overlapping rules.
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub overrides: Vec<OptionOverride>,
}

impl ResolvedPlan {
  /// Effective options of the named transform.
  pub fn options(&self, transform: &str) -> Option<&TransformOptions> {
    self
      .chain
      .iter()
      .find(|step| step.name == transform)
      .map(|step| &step.options)
  }

  /// Transform names in application order.
  pub fn transform_names(&self) -> impl Iterator<Item = &str> {
    self.chain.iter().map(|step| step.name.as_str())
  }

  /// Returns `true` when overlapping rules disagreed on a transform's options.
  pub fn has_conflicts(&self) -> bool {
    !self.overrides.is_empty()
  }
}

/// Record of a later rule replacing the options an earlier rule gave a transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionOverride {
  /// Transform whose options were replaced.
  pub transform: String,
  /// Rule whose options were discarded.
  pub replaced_rule: usize,
  /// Rule whose options are now in effect.
  pub winning_rule: usize,
}

/// Resolve the transform chain for `asset`. Pure: the rule set is only read.
pub fn resolve(asset: &Asset, rules: &RuleSet) -> Resolution {
  let mut chain: Vec<TransformStep> = Vec::new();
  // Rule that introduced each chain slot, and the rule whose options it currently carries.
  let mut introduced_by: Vec<usize> = Vec::new();
  let mut options_from: Vec<usize> = Vec::new();
  let mut matched_rules = Vec::new();
  let mut overrides = Vec::new();

  for rule in rules {
    if !rule.applies_to(asset) {
      trace!(asset = %asset, rule = rule.index(), "rule skipped");
      continue;
    }

    debug!(asset = %asset, rule = rule.index(), matcher = %rule.matcher(), "rule matched");
    matched_rules.push(rule.index());

    for step in rule.chain() {
      let earlier_slots: Vec<usize> = chain
        .iter()
        .enumerate()
        .filter(|(slot, existing)| {
          existing.name == step.name && introduced_by[*slot] != rule.index()
        })
        .map(|(slot, _)| slot)
        .collect();

      if earlier_slots.is_empty() {
        chain.push(step.clone());
        introduced_by.push(rule.index());
        options_from.push(rule.index());
        continue;
      }

      for slot in earlier_slots {
        if chain[slot].options != step.options {
          debug!(
            asset = %asset,
            transform = %step.name,
            replaced_rule = options_from[slot],
            winning_rule = rule.index(),
            "transform options overridden"
          );
          overrides.push(OptionOverride {
            transform: step.name.clone(),
            replaced_rule: options_from[slot],
            winning_rule: rule.index(),
          });
        }
        chain[slot].options = step.options.clone();
        options_from[slot] = rule.index();
      }
    }
  }

  if matched_rules.is_empty() {
    return Resolution::NoMatch;
  }

  Resolution::Plan(ResolvedPlan {
    asset: asset.clone(),
    chain,
    matched_rules,
    overrides,
  })
}

impl RuleSet {
  /// Convenience wrapper around [`resolve`].
  pub fn resolve(&self, asset: &Asset) -> Resolution {
    resolve(asset, self)
  }
}
