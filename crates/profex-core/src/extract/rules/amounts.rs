//! Total-amount extraction: anchor selection, cleanup, currency.

use rust_decimal::Decimal;
use std::str::FromStr;

use tracing::debug;

use crate::layout::y_overlap_ratio;
use crate::models::block::Block;

use super::patterns::{RX_CURRENCY_TOKEN, RX_MONEY, RX_TOTAL, RX_TOTAL_BADCTX, RX_TOTAL_INLINE};

/// Horizontal budget between a TOTAL block and its amount on the row.
const TOTAL_ROW_DX: f64 = 600.0;
/// Overlap required for the amount block to count as the same row.
const TOTAL_ROW_OVERLAP: f64 = 0.55;

const CONF_POSITIVE: f32 = 0.92;
const CONF_BEST_ZERO: f32 = 0.80;
const CONF_GLOBAL_MAX: f32 = 0.70;

/// Raw amount text, detected currency code and confidence for the
/// authoritative total of the document.
pub fn find_total_amount(blocks: &[Block]) -> (String, String, f32) {
    let mut candidates: Vec<&Block> = blocks
        .iter()
        .filter(|b| RX_TOTAL.is_match(&b.text) && !RX_TOTAL_BADCTX.is_match(&b.text))
        .collect();
    if candidates.is_empty() {
        return fallback_largest(blocks);
    }

    // Bottom to top: the final total prints lowest on the page.
    candidates.sort_by(|a, b| {
        (a.page, -a.y0(), a.x0())
            .partial_cmp(&(b.page, -b.y0(), b.x0()))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut best_zero: Option<(String, String)> = None;
    for base in candidates {
        let Some((raw, currency)) = same_row_amount(base, blocks) else {
            continue;
        };
        let cleaned = cleanup_amount(&raw);
        let value = Decimal::from_str(&cleaned).ok();
        if value.is_some_and(|v| v > Decimal::ZERO) {
            let currency = if currency.is_empty() {
                detect_currency(&page_text(blocks, base.page))
            } else {
                currency
            };
            debug!(amount = %raw, %currency, "positive total candidate accepted");
            return (raw, currency, CONF_POSITIVE);
        }
        if best_zero.is_none() {
            let currency = non_empty(detect_currency(&base.text), || {
                detect_currency(&page_text(blocks, base.page))
            });
            best_zero = Some((raw, currency));
        }
    }

    if let Some((raw, currency)) = best_zero {
        debug!(amount = %raw, "only a zero total found");
        return (raw, currency, CONF_BEST_ZERO);
    }

    fallback_largest(blocks)
}

/// Amount printed beside a TOTAL anchor: inline in the anchor block, or
/// in a block to its right on the same visual row. Currency-bearing
/// blocks are preferred over bare numbers.
fn same_row_amount(base: &Block, blocks: &[Block]) -> Option<(String, String)> {
    if let Some(caps) = RX_TOTAL_INLINE.captures(&base.text) {
        let raw = caps[1].to_string();
        let currency = non_empty(detect_currency(&base.text), || detect_currency(&raw));
        return Some((raw, currency));
    }

    let mut row: Vec<&Block> = blocks
        .iter()
        .filter(|r| {
            r.page == base.page
                && r.x0() > base.x1()
                && (r.x0() - base.x1()) <= TOTAL_ROW_DX
                && y_overlap_ratio(&r.bbox, &base.bbox) >= TOTAL_ROW_OVERLAP
        })
        .collect();
    row.sort_by(|a, b| {
        let ka = (
            u8::from(!RX_CURRENCY_TOKEN.is_match(&a.text)),
            -y_overlap_ratio(&a.bbox, &base.bbox),
            a.x0(),
        );
        let kb = (
            u8::from(!RX_CURRENCY_TOKEN.is_match(&b.text)),
            -y_overlap_ratio(&b.bbox, &base.bbox),
            b.x0(),
        );
        ka.partial_cmp(&kb).unwrap_or(std::cmp::Ordering::Equal)
    });

    for neighbor in row {
        if let Some(m) = RX_MONEY.find(&neighbor.text) {
            let raw = m.as_str().to_string();
            let currency = non_empty(detect_currency(&base.text), || {
                non_empty(detect_currency(&neighbor.text), || detect_currency(&raw))
            });
            return Some((raw, currency));
        }
    }

    None
}

/// Largest money-shaped token anywhere in the document.
fn fallback_largest(blocks: &[Block]) -> (String, String, f32) {
    let mut best: Option<(Decimal, String, String)> = None;
    for block in blocks {
        for m in RX_MONEY.find_iter(&block.text) {
            let raw = m.as_str().to_string();
            let Some(value) = Decimal::from_str(&cleanup_amount(&raw)).ok() else {
                continue;
            };
            let currency = non_empty(detect_currency(&block.text), || detect_currency(&raw));
            if best.as_ref().is_none_or(|(v, _, _)| value > *v) {
                best = Some((value, raw, currency));
            }
        }
    }
    match best {
        Some((_, raw, currency)) => (raw, currency, CONF_GLOBAL_MAX),
        None => (String::new(), String::new(), 0.0),
    }
}

/// Normalize a raw amount to a plain "1234.56" string.
///
/// Strips currency markers and spaces. A single comma whose suffix is
/// all digits is treated as the decimal separator, with dots read as
/// thousands separators; anything else keeps its dots and loses every
/// other character. The one rule covers both "1.234,56" and "1234.56".
pub fn cleanup_amount(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let s = raw
        .replace("EUR", "")
        .replace('€', "")
        .replace('\n', " ")
        .trim()
        .replace(' ', "");

    let s = match s.split_once(',') {
        Some((_, tail))
            if s.matches(',').count() == 1 && !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) =>
        {
            s.replace('.', "").replace(',', ".")
        }
        _ => s,
    };

    s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
}

/// ISO code for the first currency marker found, or "".
pub fn detect_currency(text: &str) -> String {
    let t = text.to_uppercase();
    if t.contains("USD") || t.contains('$') {
        "USD".to_string()
    } else if t.contains("EUR") || t.contains('€') {
        "EUR".to_string()
    } else if t.contains("GBP") || t.contains('£') {
        "GBP".to_string()
    } else {
        String::new()
    }
}

fn page_text(blocks: &[Block], page: u32) -> String {
    blocks
        .iter()
        .filter(|b| b.page == page)
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(first: String, second: impl FnOnce() -> String) -> String {
    if first.is_empty() { second() } else { first }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(text: &str, bbox: [f64; 4]) -> Block {
        Block::new(text, bbox)
    }

    #[test]
    fn test_cleanup_amount() {
        assert_eq!(cleanup_amount("1.234,56"), "1234.56");
        assert_eq!(cleanup_amount("1234.56"), "1234.56");
        assert_eq!(cleanup_amount(""), "");
        assert_eq!(cleanup_amount("EUR 950,00"), "950.00");
        assert_eq!(cleanup_amount("$ 1,234.56"), "1234.56");
    }

    #[test]
    fn test_detect_currency_priority() {
        assert_eq!(detect_currency("importe en EUR"), "EUR");
        assert_eq!(detect_currency("$ 12.00"), "USD");
        assert_eq!(detect_currency("£99"), "GBP");
        assert_eq!(detect_currency("sin moneda"), "");
    }

    #[test]
    fn test_total_selection_prefers_bottom_positive() {
        let blocks = vec![
            block("TOTAL IVA 45,00", [10.0, 100.0, 150.0, 112.0]),
            block("TOTAL 0,00", [10.0, 130.0, 120.0, 142.0]),
            block("TOTAL 230,50", [10.0, 160.0, 130.0, 172.0]),
        ];
        let (raw, _, conf) = find_total_amount(&blocks);
        assert_eq!(cleanup_amount(&raw), "230.50");
        assert_eq!(conf, 0.92);
    }

    #[test]
    fn test_total_skips_tax_row_below_total() {
        let blocks = vec![
            block("TOTALE 230,50", [10.0, 100.0, 130.0, 112.0]),
            block("TOTALE IMPOSTE 45,00", [10.0, 160.0, 170.0, 172.0]),
        ];
        let (raw, _, conf) = find_total_amount(&blocks);
        assert_eq!(cleanup_amount(&raw), "230.50");
        assert_eq!(conf, 0.92);
    }

    #[test]
    fn test_total_zero_kept_when_nothing_positive() {
        let blocks = vec![block("TOTAL EUR 0,00", [10.0, 50.0, 150.0, 62.0])];
        let (raw, currency, conf) = find_total_amount(&blocks);
        assert_eq!(cleanup_amount(&raw), "0.00");
        assert_eq!(currency, "EUR");
        assert_eq!(conf, 0.80);
    }

    #[test]
    fn test_total_same_row_neighbor() {
        let blocks = vec![
            block("TOTALE", [10.0, 300.0, 60.0, 312.0]),
            block("1.440,00 EUR", [400.0, 301.0, 480.0, 313.0]),
        ];
        let (raw, currency, conf) = find_total_amount(&blocks);
        assert_eq!(cleanup_amount(&raw), "1440.00");
        assert_eq!(currency, "EUR");
        assert_eq!(conf, 0.92);
    }

    #[test]
    fn test_fallback_global_largest() {
        let blocks = vec![
            block("anticipo 100,00", [10.0, 10.0, 100.0, 22.0]),
            block("importe 2.500,00 EUR", [10.0, 40.0, 150.0, 52.0]),
        ];
        let (raw, currency, conf) = find_total_amount(&blocks);
        assert_eq!(cleanup_amount(&raw), "2500.00");
        assert_eq!(currency, "EUR");
        assert_eq!(conf, 0.70);
    }

    #[test]
    fn test_no_money_anywhere() {
        let blocks = vec![block("sin importes", [0.0, 0.0, 50.0, 10.0])];
        let (raw, currency, conf) = find_total_amount(&blocks);
        assert_eq!(raw, "");
        assert_eq!(currency, "");
        assert_eq!(conf, 0.0);
    }
}
