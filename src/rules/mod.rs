//! Rule compilation: path patterns, rule definitions and the validated rule set.
//!
//! Rules are compiled once when the configuration is loaded. After that the [`RuleSet`] is never
//! mutated, so a single instance can be shared by every resolution, including concurrent ones.

mod pattern;
mod rule;
mod set;

pub use pattern::{PathPattern, PatternError, PatternKind};
pub use rule::{Rule, RuleDefinition, ScopeFilter, TransformOptions, TransformStep};
pub use set::{ConfigError, RuleSet};
