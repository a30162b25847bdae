//! Unit-count extraction near unit-word tokens.

use crate::models::block::Block;

use super::patterns::{PatternSet, RX_TOTAL};

/// Unit count sold, as printed (thousands separators kept).
///
/// Blocks carrying a unit word are preferred in this order: blocks that
/// also say TOTAL, then lower on the page, then further right. Within
/// the chosen block the last number immediately preceding a unit word
/// wins. When no unit-word block exists anywhere, the first number
/// before a unit word in any block is taken.
pub fn find_units(blocks: &[Block], patterns: &PatternSet) -> String {
    if blocks.is_empty() {
        return String::new();
    }

    let mut candidates: Vec<&Block> = blocks
        .iter()
        .filter(|b| patterns.unit_word.is_match(&b.text))
        .collect();
    candidates.sort_by(|a, b| {
        let ka = (u8::from(!RX_TOTAL.is_match(&a.text)), -a.y0(), -a.x0());
        let kb = (u8::from(!RX_TOTAL.is_match(&b.text)), -b.y0(), -b.x0());
        ka.partial_cmp(&kb).unwrap_or(std::cmp::Ordering::Equal)
    });

    for candidate in candidates {
        if let Some(caps) = patterns.unit_num.captures_iter(&candidate.text).last() {
            return caps[1].trim().to_string();
        }
    }

    for block in blocks {
        if let Some(caps) = patterns.unit_num.captures(&block.text) {
            return caps[1].trim().to_string();
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::models::config::EngineConfig;

    fn default_patterns() -> PatternSet {
        PatternSet::compile(&EngineConfig::default()).unwrap()
    }

    fn block(text: &str, bbox: [f64; 4]) -> Block {
        Block::new(text, bbox)
    }

    #[test]
    fn test_units_prefers_total_block() {
        let patterns = default_patterns();
        let blocks = vec![
            block("12 PCS", [10.0, 50.0, 60.0, 62.0]),
            block("TOTAL 1.440 UND", [10.0, 300.0, 120.0, 312.0]),
        ];
        assert_eq!(find_units(&blocks, &patterns), "1.440");
    }

    #[test]
    fn test_units_last_number_in_block() {
        let patterns = default_patterns();
        let blocks = vec![block("24 PCS + 36 PCS", [10.0, 50.0, 120.0, 62.0])];
        assert_eq!(find_units(&blocks, &patterns), "36");
    }

    #[test]
    fn test_units_none_found() {
        let patterns = default_patterns();
        let blocks = vec![block("sin cantidades", [0.0, 0.0, 50.0, 10.0])];
        assert_eq!(find_units(&blocks, &patterns), "");
    }
}
