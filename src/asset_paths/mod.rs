//! Asset identity and output path helpers.
//!
//! Every path handled by the crate is normalised to forward slashes relative to the project root
//! before it reaches a matcher, so rules behave identically on every platform.

mod asset;
mod output;

pub use asset::Asset;
pub use output::make_output_path;
