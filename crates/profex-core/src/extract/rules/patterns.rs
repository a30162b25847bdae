//! Regex patterns for proforma field extraction.
//!
//! Two layers: fixed token shapes (money, dates, identifiers, contact
//! data) compiled once here, and [`PatternSet`], compiled per engine
//! from the configurable phrase tables in
//! [`EngineConfig`](crate::models::config::EngineConfig).

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::config::EngineConfig;
use crate::text::match_form;

/// Money token: optional currency marker, grouped thousands, two
/// decimals; or currency marker followed by a plain number.
const MONEY: &str = r"(?:EUR|USD|GBP|EURO|€|\$|£)?\s?\d{1,3}(?:[.\s]\d{3})*(?:[.,]\d{2})|(?:EUR|USD|GBP|EURO|€|\$|£)\s?\d+(?:[.,]\d{2})";

/// Generic identifier shape used by the label-proximity fallbacks.
const ID: &str = r"([A-Z]?\d[\w\-/\.]{2,}|[A-Z0-9][A-Z0-9\-/\.]{3,})";

const ORDER_LABEL: &str = r"(?:ordine|order|commande|pedido|orden)";
const NUM_LABEL: &str = r"(?:n[º°o\.]*|no\.?|num\.?|number|#)?";
const LABEL_SEP: &str = r"[\s:\-·\.]*";

lazy_static! {
    /// Money token anywhere in a text run.
    pub static ref RX_MONEY: Regex = Regex::new(&format!("(?i){MONEY}")).unwrap();

    /// Explicit currency word or symbol.
    pub static ref RX_CURRENCY_TOKEN: Regex =
        Regex::new(r"(?i)\b(EUR|USD|GBP|EURO|DOLLAR|DÓLAR|POUND)\b|[€$£]").unwrap();

    /// TOTAL/TOTALE anchor.
    pub static ref RX_TOTAL: Regex = Regex::new(r"(?i)\bTOTAL(?:E)?\b").unwrap();

    /// Tax-context words that disqualify a TOTAL line (six languages).
    pub static ref RX_TOTAL_BADCTX: Regex = Regex::new(
        r"(?i)\b(TAX|TAXE|TAXES|TVA|IVA|IGIC|IMPUESTOS|IMPOSTOS|IMPOSTI|IMPOSTE|IMPOSTO|TASSE|TASSA|TAXA)\b"
    ).unwrap();

    /// Inline total: "TOTAL EUR 1.234,56" in one block.
    pub static ref RX_TOTAL_INLINE: Regex =
        Regex::new(&format!(r"(?i)\bTOTAL(?:E)?\b.*?({MONEY})")).unwrap();

    /// Date token: numeric day-first or an English month-name form.
    pub static ref RX_DATE: Regex = Regex::new(
        r"\b(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}|[A-Za-z]{3,9}\s+\d{1,2},?\s+\d{4})\b"
    ).unwrap();

    /// Date token filling a whole row (billing-panel exclusion).
    pub static ref RX_DATE_FULL: Regex = Regex::new(
        r"^(?:\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}|[A-Za-z]{3,9}\s+\d{1,2},?\s+\d{4})$"
    ).unwrap();

    /// Digits-only row (billing-panel exclusion).
    pub static ref RX_ONLY_DIGITS: Regex = Regex::new(r"^\d{3,}$").unwrap();

    /// Identifier token picked up beside an anchor label.
    pub static ref RX_ID_TOKEN: Regex =
        Regex::new(r"\b([A-Z]*\d{3,}|[A-Z0-9][A-Z0-9\-/\.]{1,})\b").unwrap();

    /// Shape an inline anchor capture must satisfy to be accepted.
    pub static ref RX_ID_VALID: Regex = Regex::new(r"^(?:\d{1,6}|[A-Z0-9\-/\.]{2,})$").unwrap();

    /// Order reference fast path: 4-digit year, slash, digits.
    pub static ref RX_REF_YYYY_SLASH: Regex = Regex::new(r"\b(20\d{2}/\d{3,7})\b").unwrap();

    /// Email address.
    pub static ref RX_EMAIL: Regex =
        Regex::new(r"(?i)([A-Z0-9._%+\-]+@[A-Z0-9.\-]+\.[A-Z]{2,})").unwrap();

    /// Phone number candidate, optional leading "+".
    pub static ref RX_PHONE: Regex = Regex::new(r"(\+?\d[\d\s\-\(\)\.]{7,})").unwrap();

    /// Proforma label with optional number marker.
    pub static ref ANCH_PROFORMA: Regex = Regex::new(
        r"(?i)\b(?:pro[\s\-]?forma(?:\s*invoice)?|factura\s*proforma|fattura\s*proforma)\b(?:\s*(?:n[º°o\.]*|no\.?|num\.?|number|#))?"
    ).unwrap();

    /// Proforma label immediately followed by its value in one block.
    pub static ref ANCH_PROFORMA_INLINE: Regex = Regex::new(
        r"(?i)\b(?:pro[\s\-]?forma(?:\s*invoice)?|factura\s*proforma|fattura\s*proforma)\b(?:\s*(?:n[º°o\.]*|no\.?|num\.?|number|#))?(?:\s*(?:[:\-\.·])?\s*([A-Z0-9][A-Z0-9\-/\.]*))"
    ).unwrap();

    /// Date label word in any of the template languages.
    pub static ref ANCH_DATE: Regex = Regex::new(r"(?i)\b(fecha|date|data)\b").unwrap();

    /// Order label, possibly preceded or followed by a number marker
    /// (row-level lookup).
    pub static ref ROW_ORDER_BEFORE: Regex =
        Regex::new(&format!(r"(?i)\b{NUM_LABEL}\s*{ORDER_LABEL}\b")).unwrap();
    pub static ref ROW_ORDER_AFTER: Regex =
        Regex::new(&format!(r"(?i)\b{ORDER_LABEL}\b\s*{NUM_LABEL}")).unwrap();

    /// Bare order label.
    pub static ref ORDER_LABEL_ONLY: Regex =
        Regex::new(&format!(r"(?i)\b{ORDER_LABEL}\b")).unwrap();

    /// Order number token: optional letter prefix, 4-9 digits.
    pub static ref ORDER_TOKEN: Regex = Regex::new(r"\b([A-Z]?\d{4,9})\b").unwrap();

    /// Full-text order lookups, label and value separated by
    /// punctuation or whitespace of varying width.
    pub static ref TXT_ORDER_LABELED: Regex =
        Regex::new(&format!(r"(?i)\b{NUM_LABEL}\s*{ORDER_LABEL}\b{LABEL_SEP}{ID}")).unwrap();
    pub static ref TXT_ORDER_TRAILING: Regex =
        Regex::new(&format!(r"(?i)\b{ORDER_LABEL}\b{LABEL_SEP}{NUM_LABEL}{LABEL_SEP}{ID}")).unwrap();

    /// Identifier at the start of a line (adjacent-line order lookup).
    pub static ref LINE_LEAD_ID: Regex = Regex::new(&format!(r"(?i)^{LABEL_SEP}{ID}")).unwrap();

    /// Identifier anywhere in a line.
    pub static ref LINE_ANY_ID: Regex = Regex::new(&format!(r"(?i){ID}")).unwrap();
}

/// A regex that matches nothing ("." cannot match after end of
/// haystack), used when a configured table is empty.
const NEVER: &str = r"$.";

fn phrase_pattern(phrase: &str) -> String {
    regex::escape(&match_form(phrase))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(r"\s+")
}

fn alternation<'a>(phrases: impl Iterator<Item = &'a str>, to_pattern: fn(&str) -> String) -> String {
    let alts: Vec<String> = phrases.map(to_pattern).collect();
    if alts.is_empty() {
        NEVER.to_string()
    } else {
        alts.join("|")
    }
}

/// Patterns compiled from the configurable phrase tables.
#[derive(Debug)]
pub struct PatternSet {
    /// Shipping-address header, matched on the match-normal form.
    pub header: Regex,
    /// Billing-panel lower bound marker.
    pub observations: Regex,
    /// Any country variant.
    pub country: Regex,
    /// A row that is nothing but a country name.
    pub only_country: Regex,
    /// Billing-panel label rows, anchored at the row start.
    pub exclude_labels: Regex,
    /// Legal boilerplate, matched anywhere in a row.
    pub legal: Regex,
    /// Unit word (UND, PCS, ...).
    pub unit_word: Regex,
    /// Number immediately preceding a unit word; the number is group 1.
    pub unit_num: Regex,
    /// Uppercased variant -> canonical country form.
    canonical_countries: HashMap<String, String>,
}

impl PatternSet {
    /// Compile the set from a configuration's phrase tables.
    pub fn compile(config: &EngineConfig) -> Result<Self, regex::Error> {
        let headers = alternation(config.shipping_headers.iter().map(String::as_str), phrase_pattern);
        let observations = alternation(
            config.observations_markers.iter().map(String::as_str),
            phrase_pattern,
        );

        let variants = alternation(
            config
                .countries
                .iter()
                .flat_map(|c| c.variants.iter().map(String::as_str)),
            |v| regex::escape(v),
        );

        let labels = alternation(
            config.billing_label_exclusions.iter().map(String::as_str),
            phrase_pattern,
        );
        let legal = alternation(config.legal_exclusions.iter().map(String::as_str), phrase_pattern);

        let units = alternation(config.unit_words.iter().map(String::as_str), |w| {
            regex::escape(w)
        });

        let mut canonical_countries = HashMap::new();
        for country in &config.countries {
            for variant in &country.variants {
                canonical_countries.insert(variant.to_uppercase(), country.canonical.clone());
            }
        }

        Ok(Self {
            header: Regex::new(&format!("(?i)(?:{headers})"))?,
            observations: Regex::new(&format!(r"(?i)\b(?:{observations})\b"))?,
            country: Regex::new(&format!(r"(?i)\b(?:{variants})\b"))?,
            only_country: Regex::new(&format!(r"(?i)^\s*(?:{variants})\s*$"))?,
            exclude_labels: Regex::new(&format!(r"(?i)^\s*(?:{labels})\b"))?,
            legal: Regex::new(&format!("(?i)(?:{legal})"))?,
            unit_word: Regex::new(&format!(r"(?i)\b(?:{units})\b"))?,
            unit_num: Regex::new(&format!(
                r"(?i)(\d{{1,3}}(?:[.,]\d{{3}})*(?:[.,]\d+)?)\s*(?:{units})\b"
            ))?,
            canonical_countries,
        })
    }

    /// Canonical form of a matched country variant. Later-page mentions
    /// of other variants of the same country all map to one spelling.
    pub fn canonical_country(&self, matched: &str) -> String {
        let upper = matched.to_uppercase();
        self.canonical_countries
            .get(&upper)
            .cloned()
            .unwrap_or(upper)
    }
}
