//! The structured record produced by one extraction call.

use serde::{Deserialize, Serialize};

/// Tag identifying the rule-based heuristic pipeline, as opposed to a
/// hypothetical OCR or ML pipeline producing the same record shape.
pub const SOURCE_RULE: &str = "rule";

/// Best-effort structured fields extracted from one document.
///
/// Created once per document by the orchestrator and never mutated
/// afterwards. A field the heuristics could not locate is the empty
/// string, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Order number found beside an ORDER/ORDINE/COMMANDE/PEDIDO label.
    pub order_number: String,

    /// Proforma invoice number found beside a PROFORMA label.
    pub proforma_number: String,

    /// Order reference in year-slash form, e.g. "2024/00321".
    pub order_reference: String,

    /// Customer name from the billing panel.
    pub customer_name: String,

    /// Cleaned total amount with "." as the decimal separator.
    pub amount: String,

    /// ISO currency code (EUR, USD, GBP) when one could be detected.
    pub currency: String,

    /// Invoice date in ISO `YYYY-MM-DD` form.
    pub date: String,

    /// Unit count found beside a unit word (UND, PCS, PZ, ...).
    pub units: String,

    /// Destination country from the shipping panel, canonicalized.
    pub shipping_country: String,

    /// Normalized phone number from the shipping panel.
    pub shipping_phone: String,

    /// Lower-cased email address from the shipping panel.
    pub shipping_email: String,

    /// Aggregate confidence in [0.0, 1.0], rounded to 2 decimals.
    pub confidence: f32,

    /// Pipeline tag; always [`SOURCE_RULE`] for this engine.
    pub source: String,
}

impl ExtractionRecord {
    /// An all-empty record with zero confidence, the result for a
    /// document with no extractable text layer.
    pub fn empty() -> Self {
        Self {
            order_number: String::new(),
            proforma_number: String::new(),
            order_reference: String::new(),
            customer_name: String::new(),
            amount: String::new(),
            currency: String::new(),
            date: String::new(),
            units: String::new(),
            shipping_country: String::new(),
            shipping_phone: String::new(),
            shipping_email: String::new(),
            confidence: 0.0,
            source: SOURCE_RULE.to_string(),
        }
    }

    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.order_number.is_empty()
            && self.proforma_number.is_empty()
            && self.order_reference.is_empty()
            && self.customer_name.is_empty()
            && self.amount.is_empty()
            && self.currency.is_empty()
            && self.date.is_empty()
            && self.units.is_empty()
            && self.shipping_country.is_empty()
            && self.shipping_phone.is_empty()
            && self.shipping_email.is_empty()
    }
}

impl Default for ExtractionRecord {
    fn default() -> Self {
        Self::empty()
    }
}

/// Fields read from the shipping panel.
///
/// The name is extracted alongside the others but, matching the
/// downstream response shape, only country/phone/email flow into the
/// [`ExtractionRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingFields {
    /// Consignee name, first name-like row of the panel.
    pub name: String,
    /// Destination country, canonicalized (last mention wins).
    pub country: String,
    /// Longest normalized phone number found.
    pub phone: String,
    /// First email address found, lower-cased.
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_record() {
        let r = ExtractionRecord::empty();
        assert!(r.is_empty());
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.source, SOURCE_RULE);
    }

    #[test]
    fn test_record_roundtrip() {
        let mut r = ExtractionRecord::empty();
        r.order_number = "284128".to_string();
        r.confidence = 0.45;
        let json = serde_json::to_string(&r).unwrap();
        let back: ExtractionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
