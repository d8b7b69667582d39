//! Launch plan parameters
//!
//! A launch plan is the validated input record for one generation run:
//! coin identity, economics, timing, consensus mechanism, and the
//! narrative fields the generation prompts draw on. Plans are loaded
//! from TOML, validated once, and never mutated after a run begins.

mod consensus;
mod params;

pub use consensus::ConsensusMechanism;
pub use params::ProjectParameters;
