//! Engine configuration: pattern tables and geometric thresholds.
//!
//! The multilingual phrase tables are process-wide constant data, not
//! mutable state. Modeling them as a configuration object keeps new
//! locales a data change and lets tests substitute a reduced set.

use serde::{Deserialize, Serialize};

/// Configuration for the extraction engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Shipping-address header phrases, one per known template language.
    /// Matched accent- and spacing-insensitively.
    pub shipping_headers: Vec<String>,

    /// Known destination countries with their per-language variants.
    pub countries: Vec<Country>,

    /// Unit words marking a quantity (e.g. "120 PCS").
    pub unit_words: Vec<String>,

    /// Label phrases excluded when picking the billing customer name.
    /// Matched at the start of a row.
    pub billing_label_exclusions: Vec<String>,

    /// Legal-boilerplate phrases excluded from the billing panel.
    /// Matched anywhere in a row.
    pub legal_exclusions: Vec<String>,

    /// Marker phrases bounding the billing panel from below.
    pub observations_markers: Vec<String>,

    /// Maximum horizontal distance (page units) between a label block
    /// and its value block on the same row.
    pub max_right_dx: f64,

    /// Minimum vertical-overlap ratio for two blocks to share a row.
    pub row_overlap: f64,
}

/// A destination country: the canonical form the engine reports plus
/// the spellings the templates use for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    /// Reported form, e.g. "ESPAÑA".
    pub canonical: String,
    /// Accepted spellings, e.g. ["ESPAÑA", "SPAIN"].
    pub variants: Vec<String>,
}

impl Country {
    fn new(canonical: &str, variants: &[&str]) -> Self {
        Self {
            canonical: canonical.to_string(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shipping_headers: [
                "GOODS DELIVERY ADDRESS",
                "ADRESSE LIVRAISON",
                "INDIRIZZO DI CONSEGNA",
                "DIRECCIÓN ENVÍO MERCANCÍA",
                "DIRECCION ENVIO MERCANCIA",
                "LIEFERADRESSE",
            ]
            .iter()
            .map(|h| h.to_string())
            .collect(),
            countries: vec![
                Country::new("ESPAÑA", &["ESPAÑA", "SPAIN"]),
                Country::new("ITALIA", &["ITALIA", "ITALY"]),
                Country::new("FRANCIA", &["FRANCIA", "FRANCE"]),
                Country::new("PORTUGAL", &["PORTUGAL"]),
                Country::new("RUMANIA", &["RUMANIA", "ROMANIA", "ROUMANIE"]),
                Country::new("ALEMANIA", &["ALEMANIA", "GERMANY", "ALLEMAGNE"]),
                Country::new("GRECIA", &["GRECIA", "GREECE", "GRÈCE"]),
                Country::new("POLONIA", &["POLONIA", "POLAND", "POLOGNE"]),
            ],
            unit_words: ["UND", "UNIDAD", "UNIDADES", "PCS", "PZ", "PCE"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
            billing_label_exclusions: [
                "PROFORMA",
                "FECHA PEDIDO",
                "Nº PEDIDO",
                "OBSERVACIONES",
                "OBSERVACION",
            ]
            .iter()
            .map(|l| l.to_string())
            .collect(),
            legal_exclusions: vec!["Inscrita en Registro mercantil".to_string()],
            observations_markers: vec!["OBSERVACIONES".to_string()],
            max_right_dx: 900.0,
            row_overlap: 0.55,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_tables() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_right_dx, 900.0);
        assert_eq!(cfg.row_overlap, 0.55);
        assert!(cfg.shipping_headers.iter().any(|h| h == "LIEFERADRESSE"));
        let spain = cfg.countries.iter().find(|c| c.canonical == "ESPAÑA").unwrap();
        assert!(spain.variants.iter().any(|v| v == "SPAIN"));
    }

    #[test]
    fn test_from_file_missing_path() {
        let err = EngineConfig::from_file(std::path::Path::new("no-such-config.json")).unwrap_err();
        assert!(matches!(err, crate::ProfexError::Io(_)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"max_right_dx": 450.0}"#).unwrap();
        assert_eq!(cfg.max_right_dx, 450.0);
        assert_eq!(cfg.row_overlap, 0.55);
        assert!(!cfg.countries.is_empty());
    }
}
