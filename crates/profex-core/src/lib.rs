//! Core library for proforma invoice field extraction.
//!
//! This crate provides:
//! - Spatial layout analysis over positioned text blocks (rows, panels)
//! - Rule-based field extraction for multi-language proforma templates
//!   (order number, proforma number, totals, dates, units, contacts)
//! - Per-field and aggregate confidence scoring
//!
//! The engine is purely heuristic: no OCR, no layout models. It consumes
//! the positioned text output of an external PDF reader and produces a
//! best-effort [`ExtractionRecord`], never failing on a layout it does
//! not recognize.

pub mod error;
pub mod extract;
pub mod layout;
pub mod models;
pub mod text;

pub use error::{ProfexError, Result};
pub use extract::{extract_fields, Engine};
pub use layout::{group_rows, y_overlap_ratio, Row};
pub use models::block::Block;
pub use models::config::EngineConfig;
pub use models::record::{ExtractionRecord, ShippingFields, SOURCE_RULE};
