//! Contact and identity extraction from the billing and shipping panels.

use crate::models::record::ShippingFields;
use crate::text::match_form;

use super::patterns::{PatternSet, RX_DATE_FULL, RX_EMAIL, RX_ONLY_DIGITS, RX_PHONE};

/// Row prefixes that disqualify a shipping-panel row as the consignee
/// name; compared on the deaccented uppercase form.
const ADDRESS_PREFIXES: [&str; 6] = ["TEL", "EMAIL", "ADRESSE", "ADDRESS", "DIRECCION", "INDIRIZZO"];

/// Postal-code markers; a row carrying one is address detail, not a name.
const POSTAL_MARKERS: [&str; 4] = ["CP", "C.P.", "ZIP", "BP "];

/// Keep a leading "+", strip everything that is not a digit.
pub fn normalize_phone(raw: &str) -> String {
    let raw = raw.trim();
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        String::new()
    } else if raw.starts_with('+') {
        format!("+{digits}")
    } else {
        digits
    }
}

/// Customer name: the first billing-panel row that is neither a known
/// label, legal boilerplate, a bare country, a bare date nor a bare
/// number. Multi-line survivors contribute their first line.
pub fn billing_name(rows: &[String], patterns: &PatternSet) -> String {
    for row in rows {
        let s = row.trim();
        if s.is_empty() {
            continue;
        }
        if patterns.exclude_labels.is_match(&match_form(s)) {
            continue;
        }
        if patterns.legal.is_match(s) {
            continue;
        }
        if patterns.only_country.is_match(s) {
            continue;
        }
        if RX_DATE_FULL.is_match(s) {
            continue;
        }
        if RX_ONLY_DIGITS.is_match(s) {
            continue;
        }
        return first_line(s);
    }
    String::new()
}

/// Shipping fields from the shipping panel's rows, each extracted
/// independently.
pub fn shipping_fields(rows: &[String], patterns: &PatternSet) -> ShippingFields {
    let mut fields = ShippingFields::default();

    // Email: first match wins.
    for row in rows {
        if let Some(caps) = RX_EMAIL.captures(row) {
            fields.email = caps[1].to_lowercase();
            break;
        }
    }

    // Phone: longest normalized number, TEL/PHONE rows tried first.
    let labeled = rows
        .iter()
        .filter(|r| r.to_uppercase().contains("TEL") || r.to_uppercase().contains("PHONE"));
    let mut best = String::new();
    for row in labeled.chain(rows.iter()) {
        for caps in RX_PHONE.captures_iter(row) {
            let candidate = normalize_phone(&caps[1]);
            if candidate.len() > best.len() {
                best = candidate;
            }
        }
    }
    fields.phone = best;

    // Country: the last mention in document order wins.
    for row in rows {
        for m in patterns.country.find_iter(row) {
            fields.country = patterns.canonical_country(m.as_str());
        }
    }

    // Name: first row that is not the panel header, a label, address
    // detail or a bare country.
    for row in rows {
        let s = row.trim();
        if s.is_empty() {
            continue;
        }
        let normal = match_form(s);
        if patterns.header.is_match(&normal) {
            continue;
        }
        let upper = normal.to_uppercase();
        if ADDRESS_PREFIXES.iter().any(|p| upper.starts_with(p)) {
            continue;
        }
        if POSTAL_MARKERS.iter().any(|p| upper.contains(p)) {
            continue;
        }
        if patterns.only_country.is_match(s) {
            continue;
        }
        fields.name = first_line(s);
        break;
    }

    fields
}

fn first_line(s: &str) -> String {
    match s.split_once('\n') {
        Some((head, _)) => head.trim().to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::models::config::EngineConfig;

    fn default_patterns() -> PatternSet {
        PatternSet::compile(&EngineConfig::default()).unwrap()
    }

    fn rows(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+34 91 234 56 78"), "+34912345678");
        assert_eq!(normalize_phone("91-234-56-78"), "912345678");
        assert_eq!(normalize_phone("sin numero"), "");
    }

    #[test]
    fn test_billing_name_skips_labels() {
        let patterns = default_patterns();
        let lines = rows(&["PROFORMA Nº 1234", "FECHA PEDIDO 01/01/2024", "ACME CORP"]);
        assert_eq!(billing_name(&lines, &patterns), "ACME CORP");
    }

    #[test]
    fn test_billing_name_skips_noise_rows() {
        let patterns = default_patterns();
        let lines = rows(&["ESPAÑA", "15/03/2024", "21317", "Inscrita en Registro mercantil de Madrid", "COMERCIAL NORTE SL\nCalle Mayor 3"]);
        assert_eq!(billing_name(&lines, &patterns), "COMERCIAL NORTE SL");
    }

    #[test]
    fn test_billing_name_empty_panel() {
        let patterns = default_patterns();
        assert_eq!(billing_name(&[], &patterns), "");
    }

    #[test]
    fn test_shipping_country_last_wins() {
        let patterns = default_patterns();
        let lines = rows(&["origen FRANCE", "destino final ITALY"]);
        let fields = shipping_fields(&lines, &patterns);
        assert_eq!(fields.country, "ITALIA");
    }

    #[test]
    fn test_shipping_email_and_phone() {
        let patterns = default_patterns();
        let lines = rows(&[
            "LOGISTICA SUD SRL",
            "TEL +39 02 1234 5678",
            "Almacen: 987654321",
            "Email: Recepcion@Logisticasud.IT",
        ]);
        let fields = shipping_fields(&lines, &patterns);
        assert_eq!(fields.email, "recepcion@logisticasud.it");
        assert_eq!(fields.phone, "+390212345678");
        assert_eq!(fields.name, "LOGISTICA SUD SRL");
    }

    #[test]
    fn test_shipping_name_skips_panel_header() {
        let patterns = default_patterns();
        let lines = rows(&["GOODS DELIVERY ADDRESS", "NORDIC TRADE AB", "SWEDEN"]);
        let fields = shipping_fields(&lines, &patterns);
        assert_eq!(fields.name, "NORDIC TRADE AB");
    }

    #[test]
    fn test_shipping_name_skips_address_rows() {
        let patterns = default_patterns();
        let lines = rows(&["DIRECCIÓN DE ENTREGA C/ SUR 2", "ZIP 28001 MADRID", "ESPAÑA", "TALLERES GARCIA"]);
        let fields = shipping_fields(&lines, &patterns);
        assert_eq!(fields.name, "TALLERES GARCIA");
    }
}
