//! Data models: input blocks, the extraction record, engine configuration.

pub mod block;
pub mod config;
pub mod record;
