//! Field-extraction module: rule set plus the orchestrating engine.

mod engine;
pub mod rules;

pub use engine::{extract_fields, Engine};
