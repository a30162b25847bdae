//! Spatial layout analysis: visual rows and billing/shipping panels.
//!
//! Blocks arrive unordered; every notion of "same line" or "left panel"
//! is derived here from bounding boxes alone.

use regex::Regex;

use crate::models::block::Block;
use crate::text::match_form;

/// Horizontal tolerance when splitting a page at the shipping header.
const PANEL_X_MARGIN: f64 = 5.0;
/// Vertical tolerance above the shipping header for the billing panel.
const PANEL_Y_MARGIN: f64 = 6.0;

/// Blocks sharing vertical extent, ordered left to right.
#[derive(Debug, Clone)]
pub struct Row<'a> {
    /// Member blocks, sorted by `x0`.
    pub blocks: Vec<&'a Block>,
}

impl<'a> Row<'a> {
    /// Space-joined text of the row in reading order.
    pub fn text(&self) -> String {
        let joined = self
            .blocks
            .iter()
            .map(|b| b.text.trim())
            .collect::<Vec<_>>()
            .join(" ");
        joined.trim().to_string()
    }

    /// Bounding box of the leftmost block, used as the row's anchor
    /// when comparing rows against each other.
    pub fn lead_bbox(&self) -> [f64; 4] {
        self.blocks[0].bbox
    }
}

/// Vertical-overlap ratio of two bounding boxes: intersection height
/// over the taller of the two heights. 0.0 for disjoint boxes, 1.0 for
/// a box against itself.
pub fn y_overlap_ratio(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let inter = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
    let denom = (a[3] - a[1]).max(b[3] - b[1]).max(1e-6);
    inter / denom
}

/// Group blocks into visual rows by vertical overlap.
///
/// Greedy single-pass clustering: blocks are visited in `(y0, x0)`
/// order and join the first existing row whose seed block overlaps
/// vertically by at least `overlap_min`, else start a new row. Ties go
/// to the earliest row. Each row is left-to-right sorted afterwards.
pub fn group_rows<'a>(blocks: impl IntoIterator<Item = &'a Block>, overlap_min: f64) -> Vec<Row<'a>> {
    let mut ordered: Vec<&Block> = blocks.into_iter().collect();
    ordered.sort_by(|a, b| {
        (a.y0(), a.x0())
            .partial_cmp(&(b.y0(), b.x0()))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut rows: Vec<Vec<&Block>> = Vec::new();
    let mut seeds: Vec<[f64; 4]> = Vec::new();
    for block in ordered {
        let mut placed = false;
        for (row, seed) in rows.iter_mut().zip(&seeds) {
            if y_overlap_ratio(&block.bbox, seed) >= overlap_min {
                row.push(block);
                placed = true;
                break;
            }
        }
        if !placed {
            seeds.push(block.bbox);
            rows.push(vec![block]);
        }
    }

    rows.into_iter()
        .map(|mut blocks| {
            blocks.sort_by(|a, b| a.x0().partial_cmp(&b.x0()).unwrap_or(std::cmp::Ordering::Equal));
            Row { blocks }
        })
        .collect()
}

/// Row texts of a panel, top to bottom.
pub fn row_texts(panel: &[&Block], overlap_min: f64) -> Vec<String> {
    group_rows(panel.iter().copied(), overlap_min)
        .iter()
        .map(Row::text)
        .collect()
}

/// Locate the shipping-address header block, if any.
///
/// Matching is done on the match-normal form of the block text so the
/// header survives accent loss and ragged spacing. With several
/// candidates the topmost-then-leftmost one on the lowest page wins.
pub fn find_shipping_header<'a>(blocks: &'a [Block], header_rx: &Regex) -> Option<&'a Block> {
    blocks
        .iter()
        .filter(|b| header_rx.is_match(&match_form(&b.text)))
        .min_by(|a, b| {
            (a.page, a.y0(), a.x0())
                .partial_cmp(&(b.page, b.y0(), b.x0()))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// All blocks of the header's page at or right of the header's x
/// origin, with a small tolerance. Empty when no header exists.
pub fn shipping_panel<'a>(blocks: &'a [Block], header_rx: &Regex) -> Vec<&'a Block> {
    let Some(hdr) = find_shipping_header(blocks, header_rx) else {
        return Vec::new();
    };
    let split_x = hdr.x0();
    blocks
        .iter()
        .filter(|b| b.page == hdr.page && b.x0() >= split_x - PANEL_X_MARGIN)
        .collect()
}

/// Blocks of the billing panel: left of the shipping header, no higher
/// than it, and above the first OBSERVATIONS marker when one exists on
/// the page. Empty when no header exists.
pub fn billing_panel<'a>(
    blocks: &'a [Block],
    header_rx: &Regex,
    observations_rx: &Regex,
) -> Vec<&'a Block> {
    let Some(hdr) = find_shipping_header(blocks, header_rx) else {
        return Vec::new();
    };
    let split_x = hdr.x0();
    let y_min = hdr.y0() - PANEL_Y_MARGIN;
    let y_max = blocks
        .iter()
        .filter(|b| b.page == hdr.page && observations_rx.is_match(&match_form(&b.text)))
        .map(|b| b.y0())
        .fold(f64::INFINITY, f64::min);

    blocks
        .iter()
        .filter(|b| {
            b.page == hdr.page && b.x1() <= split_x + PANEL_X_MARGIN && b.y0() >= y_min && b.y0() < y_max
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(text: &str, bbox: [f64; 4]) -> Block {
        Block::new(text, bbox)
    }

    #[test]
    fn test_overlap_ratio() {
        assert_eq!(y_overlap_ratio(&[0.0, 0.0, 10.0, 10.0], &[0.0, 0.0, 10.0, 10.0]), 1.0);
        assert_eq!(y_overlap_ratio(&[0.0, 0.0, 10.0, 10.0], &[0.0, 20.0, 10.0, 30.0]), 0.0);
        // 5 units shared out of a 10-unit taller box
        assert_eq!(y_overlap_ratio(&[0.0, 0.0, 10.0, 10.0], &[0.0, 5.0, 10.0, 15.0]), 0.5);
    }

    #[test]
    fn test_group_rows_merges_overlapping() {
        let blocks = vec![
            block("right", [100.0, 10.0, 140.0, 22.0]),
            block("left", [10.0, 11.0, 50.0, 23.0]),
            block("below", [10.0, 40.0, 50.0, 52.0]),
        ];
        let rows = group_rows(&blocks, 0.55);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text(), "left right");
        assert_eq!(rows[1].text(), "below");
    }

    #[test]
    fn test_group_rows_zero_overlap_splits() {
        let blocks = vec![
            block("a", [0.0, 0.0, 10.0, 10.0]),
            block("b", [0.0, 10.0, 10.0, 20.0]),
        ];
        let rows = group_rows(&blocks, 0.55);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_group_rows_empty() {
        let rows = group_rows(&[], 0.55);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_shipping_header_accent_insensitive() {
        let header_rx = Regex::new(r"(?i)DIRECCION\s+ENVIO\s+MERCANCIA").unwrap();
        let blocks = vec![
            block("DIRECCIÓN  ENVÍO\u{00a0}MERCANCÍA", [300.0, 50.0, 420.0, 62.0]),
            block("ACME CORP", [10.0, 80.0, 90.0, 92.0]),
        ];
        let hdr = find_shipping_header(&blocks, &header_rx).unwrap();
        assert_eq!(hdr.x0(), 300.0);
    }

    #[test]
    fn test_panels_split_at_header() {
        let header_rx = Regex::new(r"(?i)GOODS\s+DELIVERY\s+ADDRESS").unwrap();
        let obs_rx = Regex::new(r"(?i)\bOBSERVACIONES\b").unwrap();
        let blocks = vec![
            block("GOODS DELIVERY ADDRESS", [300.0, 50.0, 440.0, 62.0]),
            block("ACME CORP", [10.0, 80.0, 120.0, 92.0]),
            block("SHIP-TO SRL", [310.0, 80.0, 430.0, 92.0]),
            block("OBSERVACIONES", [10.0, 200.0, 120.0, 212.0]),
            block("below the cut", [10.0, 230.0, 120.0, 242.0]),
        ];
        let ship = shipping_panel(&blocks, &header_rx);
        assert_eq!(ship.len(), 2); // header itself plus SHIP-TO SRL
        let bill = billing_panel(&blocks, &header_rx, &obs_rx);
        assert_eq!(bill.len(), 1);
        assert_eq!(bill[0].text, "ACME CORP");
    }

    #[test]
    fn test_panels_empty_without_header() {
        let header_rx = Regex::new(r"(?i)GOODS\s+DELIVERY\s+ADDRESS").unwrap();
        let obs_rx = Regex::new(r"(?i)\bOBSERVACIONES\b").unwrap();
        let blocks = vec![block("just text", [0.0, 0.0, 10.0, 10.0])];
        assert!(shipping_panel(&blocks, &header_rx).is_empty());
        assert!(billing_panel(&blocks, &header_rx, &obs_rx).is_empty());
    }
}
