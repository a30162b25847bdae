//! The extraction orchestrator.

use lazy_static::lazy_static;
use tracing::{debug, info};

use crate::layout::{billing_panel, row_texts, shipping_panel};
use crate::models::block::Block;
use crate::models::config::EngineConfig;
use crate::models::record::{ExtractionRecord, SOURCE_RULE};
use crate::Result;

use super::rules::patterns::{ANCH_PROFORMA, ANCH_PROFORMA_INLINE};
use super::rules::{
    billing_name, cleanup_amount, find_date, find_order_number_from_rows, find_order_number_text,
    find_order_reference, find_total_amount, find_units, same_row_right_value, shipping_fields,
    PatternSet,
};

/// Identifier extractors report this on success; a miss is 0.0.
const CONF_IDENTIFIER: f32 = 0.9;
/// Divisor of the aggregate confidence sum.
const CONF_FIELDS: f32 = 6.0;

lazy_static! {
    static ref DEFAULT_ENGINE: Engine =
        Engine::with_config(EngineConfig::default()).expect("default pattern tables compile");
}

/// The rule-based extraction engine.
///
/// Holds the compiled pattern tables; one instance serves any number of
/// documents. Extraction is a pure function of the input block set:
/// deterministic, side-effect free, and safe to call from any thread.
pub struct Engine {
    config: EngineConfig,
    patterns: PatternSet,
}

impl Engine {
    /// Engine over the built-in pattern tables.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            patterns: PatternSet::compile(&EngineConfig::default())
                .expect("default pattern tables compile"),
        }
    }

    /// Engine over caller-supplied tables (custom locales, reduced
    /// test sets).
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        let patterns = PatternSet::compile(&config)?;
        Ok(Self { config, patterns })
    }

    /// The configuration this engine was built from.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extract all fields from one document's blocks.
    ///
    /// Total: any heuristic that does not match contributes an empty
    /// value and a zero confidence, never an error. An empty block set
    /// yields [`ExtractionRecord::empty`].
    pub fn extract(&self, blocks: &[Block]) -> ExtractionRecord {
        if blocks.is_empty() {
            return ExtractionRecord::empty();
        }

        info!("extracting fields from {} blocks", blocks.len());
        let text_all = blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let proforma = same_row_right_value(
            &ANCH_PROFORMA,
            &ANCH_PROFORMA_INLINE,
            blocks,
            self.config.max_right_dx,
        )
        .unwrap_or_default();
        let c_proforma = if proforma.is_empty() { 0.0 } else { CONF_IDENTIFIER };
        debug!(proforma = %proforma, "proforma number");

        let order = find_order_number_from_rows(blocks, self.config.row_overlap)
            .or_else(|| find_order_number_text(blocks))
            .unwrap_or_default();
        let c_order = if order.is_empty() { 0.0 } else { CONF_IDENTIFIER };
        debug!(order = %order, "order number");

        let reference = find_order_reference(&text_all).unwrap_or_default();
        let c_reference = if reference.is_empty() { 0.0 } else { CONF_IDENTIFIER };
        debug!(reference = %reference, "order reference");

        let (amount_raw, currency, c_amount) = find_total_amount(blocks);
        let amount = cleanup_amount(&amount_raw);
        debug!(raw = %amount_raw, cleaned = %amount, %currency, "total amount");

        let shipping_rows = row_texts(
            &shipping_panel(blocks, &self.patterns.header),
            self.config.row_overlap,
        );
        let shipping = shipping_fields(&shipping_rows, &self.patterns);
        debug!(country = %shipping.country, phone = %shipping.phone, "shipping fields");

        let billing_rows = row_texts(
            &billing_panel(blocks, &self.patterns.header, &self.patterns.observations),
            self.config.row_overlap,
        );
        let customer = billing_name(&billing_rows, &self.patterns);
        debug!(customer = %customer, "billing name");

        let (date, c_date) = find_date(blocks, &text_all);
        debug!(date = %date, "invoice date");

        let units = find_units(blocks, &self.patterns);
        debug!(units = %units, "units");

        let confidence = round2((c_proforma + c_order + c_reference + c_amount + c_date) / CONF_FIELDS);

        ExtractionRecord {
            order_number: order,
            proforma_number: proforma,
            order_reference: reference,
            customer_name: customer,
            amount,
            currency,
            date,
            units,
            shipping_country: shipping.country,
            shipping_phone: shipping.phone,
            shipping_email: shipping.email,
            confidence,
            source: SOURCE_RULE.to_string(),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract fields with the built-in pattern tables.
pub fn extract_fields(blocks: &[Block]) -> ExtractionRecord {
    DEFAULT_ENGINE.extract(blocks)
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(text: &str, bbox: [f64; 4]) -> Block {
        Block::new(text, bbox)
    }

    /// A minimal but complete Spanish proforma layout.
    fn sample_blocks() -> Vec<Block> {
        vec![
            block("FACTURA PROFORMA", [40.0, 30.0, 160.0, 44.0]),
            block("118650", [520.0, 31.0, 570.0, 45.0]),
            block("DIRECCIÓN ENVÍO MERCANCÍA", [320.0, 80.0, 520.0, 94.0]),
            block("PROFORMA Nº 118650", [40.0, 80.0, 200.0, 94.0]),
            block("Nº PEDIDO", [40.0, 100.0, 110.0, 114.0]),
            block("284128", [130.0, 101.0, 180.0, 115.0]),
            block("LOGISTICA SUD SRL", [322.0, 100.0, 470.0, 114.0]),
            block("FECHA PEDIDO 15/03/2024", [40.0, 120.0, 220.0, 134.0]),
            block("TEL +39 02 1234 5678", [322.0, 120.0, 470.0, 134.0]),
            block("ACME CORP", [40.0, 140.0, 150.0, 154.0]),
            block("ITALY", [322.0, 140.0, 380.0, 154.0]),
            block("Ref. 2024/00321", [40.0, 190.0, 160.0, 204.0]),
            block("OBSERVACIONES", [40.0, 220.0, 160.0, 234.0]),
            block("TOTAL 120 UND", [40.0, 380.0, 160.0, 394.0]),
            block("TOTAL", [40.0, 400.0, 90.0, 414.0]),
            block("1.440,00 EUR", [420.0, 401.0, 510.0, 415.0]),
        ]
    }

    #[test]
    fn test_empty_input() {
        let record = extract_fields(&[]);
        assert!(record.is_empty());
        assert_eq!(record.confidence, 0.0);
    }

    #[test]
    fn test_full_document() {
        let record = extract_fields(&sample_blocks());
        assert_eq!(record.proforma_number, "118650");
        assert_eq!(record.order_number, "284128");
        assert_eq!(record.order_reference, "2024/00321");
        assert_eq!(record.customer_name, "ACME CORP");
        assert_eq!(record.amount, "1440.00");
        assert_eq!(record.currency, "EUR");
        assert_eq!(record.date, "2024-03-15");
        assert_eq!(record.units, "120");
        assert_eq!(record.shipping_country, "ITALIA");
        assert_eq!(record.shipping_phone, "+390212345678");
        assert_eq!(record.source, SOURCE_RULE);
        // Five contributions of 0.9, 0.9, 0.9, 0.92, 0.9 over six slots.
        assert_eq!(record.confidence, 0.75);
    }

    #[test]
    fn test_determinism() {
        let blocks = sample_blocks();
        let first = extract_fields(&blocks);
        let second = extract_fields(&blocks);
        assert_eq!(first, second);
    }

    #[test]
    fn test_reduced_pattern_set() {
        let mut config = EngineConfig::default();
        config.shipping_headers.clear();
        let engine = Engine::with_config(config).unwrap();
        let record = engine.extract(&sample_blocks());
        // Without a header table no panels exist, so panel-derived
        // fields come back empty while the rest still extract.
        assert_eq!(record.customer_name, "");
        assert_eq!(record.shipping_country, "");
        assert_eq!(record.proforma_number, "118650");
    }

    #[test]
    fn test_country_last_match_wins() {
        let mut blocks = vec![block("origen FRANCE", [322.0, 60.0, 420.0, 74.0])];
        blocks.extend(sample_blocks());
        let record = extract_fields(&blocks);
        assert_eq!(record.shipping_country, "ITALIA");
    }
}
