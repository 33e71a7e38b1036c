//! Property-based tests for resolution.
//!
//! These tests verify that:
//! - Resolving the same asset twice yields identical results
//! - Resolution never changes the rule set
//! - Assets no rule matches always pass through
//! - An asset matching exactly one rule gets that rule's chain verbatim

use asset_rules::{Asset, Resolution, RuleDefinition, RuleSet, TransformStep};
use proptest::prelude::*;

const EXTENSIONS: [&str; 6] = ["js", "jsx", "css", "svg", "png", "woff"];
const DIRECTORIES: [&str; 5] = ["src", "assets/fonts", "assets/images", "lib", "vendor"];

fn arb_asset() -> impl Strategy<Value = Asset> {
  (
    prop::sample::select(DIRECTORIES.to_vec()),
    prop::string::string_regex(r"[a-z][a-z0-9_-]{0,8}").unwrap(),
    prop::sample::select(EXTENSIONS.to_vec()),
  )
    .prop_map(|(dir, stem, ext)| Asset::new(format!("{dir}/{stem}.{ext}")))
}

fn arb_rule() -> impl Strategy<Value = RuleDefinition> {
  (
    prop::sample::select(EXTENSIONS.to_vec()),
    prop::collection::vec(
      prop::sample::select(vec!["babel", "style-loader", "css-loader", "url-loader", "file-loader"]),
      1..4,
    ),
    prop::option::of(prop::sample::select(DIRECTORIES.to_vec())),
    any::<u16>(),
  )
    .prop_map(|(ext, names, excluded_dir, limit)| {
      let mut definition = RuleDefinition::new(format!("*.{ext}"));
      for name in names {
        let mut options = serde_json::Map::new();
        options.insert("limit".into(), serde_json::json!(limit));
        definition = definition.transform(TransformStep::with_options(name, options));
      }
      if let Some(dir) = excluded_dir {
        definition = definition.exclude(format!("{dir}/**"));
      }
      definition
    })
}

fn arb_rules() -> impl Strategy<Value = Vec<RuleDefinition>> {
  prop::collection::vec(arb_rule(), 0..6)
}

fn snapshot(rules: &RuleSet) -> Vec<(usize, String, Vec<TransformStep>)> {
  rules
    .iter()
    .map(|rule| (rule.index(), rule.matcher().to_string(), rule.chain().to_vec()))
    .collect()
}

proptest! {
  /// Resolving the same inputs twice produces identical outcomes.
  #[test]
  fn resolution_is_deterministic(definitions in arb_rules(), asset in arb_asset()) {
    let rules = RuleSet::new(definitions).unwrap();
    prop_assert_eq!(rules.resolve(&asset), rules.resolve(&asset));
  }

  /// Resolution leaves the rule set untouched.
  #[test]
  fn resolution_does_not_mutate_rules(definitions in arb_rules(), assets in prop::collection::vec(arb_asset(), 1..8)) {
    let rules = RuleSet::new(definitions).unwrap();
    let before = snapshot(&rules);
    for asset in &assets {
      let _ = rules.resolve(asset);
    }
    prop_assert_eq!(before, snapshot(&rules));
  }

  /// Matched rules and outcome agree with each rule's own verdict.
  #[test]
  fn outcome_follows_rule_verdicts(definitions in arb_rules(), asset in arb_asset()) {
    let rules = RuleSet::new(definitions).unwrap();
    let applying: Vec<usize> = rules
      .iter()
      .filter(|rule| rule.applies_to(&asset))
      .map(|rule| rule.index())
      .collect();

    match rules.resolve(&asset) {
      Resolution::NoMatch => prop_assert!(applying.is_empty()),
      Resolution::Plan(plan) => {
        prop_assert_eq!(&plan.matched_rules, &applying);
        if let [only] = applying.as_slice() {
          let rule = rules.iter().nth(*only).unwrap();
          prop_assert_eq!(plan.chain.as_slice(), rule.chain());
        }
      }
    }
  }
}
