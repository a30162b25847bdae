//! Identifier extraction: proforma number, order number, order reference.
//!
//! Two strategies, tried in order: anchor-proximity over the block
//! geometry, then regex lookups over the flattened page text. Each
//! identifier reports a fixed confidence on success; the strategy that
//! found it does not change the score.

use regex::Regex;

use crate::layout::{group_rows, y_overlap_ratio};
use crate::models::block::Block;
use crate::text::normalize;

use super::patterns::{
    LINE_ANY_ID, LINE_LEAD_ID, ORDER_LABEL_ONLY, ORDER_TOKEN, ROW_ORDER_AFTER, ROW_ORDER_BEFORE,
    RX_ID_TOKEN, RX_ID_VALID, RX_REF_YYYY_SLASH, TXT_ORDER_LABELED, TXT_ORDER_TRAILING,
};

/// Overlap required for a value block on the anchor's row.
const ANCHOR_OVERLAP: f64 = 0.6;
/// Relaxed overlap for the widened second pass.
const ANCHOR_OVERLAP_WIDE: f64 = 0.4;
/// Residual overlap under which a following row no longer counts as
/// adjacent to an order label's row.
const NEXT_ROW_OVERLAP: f64 = 0.20;

/// Find a labeled value on the label's own visual row.
///
/// The first block matching `anchor` is the base. An inline capture
/// (label and value in one block, via `inline`) wins outright; else the
/// blocks strictly right of the base within `max_dx` and with vertical
/// overlap >= 0.6 are scanned rightmost-first for an identifier token.
/// A second pass doubles the distance budget and relaxes the overlap
/// to 0.4.
pub fn same_row_right_value(
    anchor: &Regex,
    inline: &Regex,
    blocks: &[Block],
    max_dx: f64,
) -> Option<String> {
    let base = blocks.iter().find(|b| anchor.is_match(&b.text))?;

    if let Some(caps) = inline.captures(&base.text) {
        if let Some(value) = caps.get(1) {
            let value = value.as_str().trim();
            // The inline pattern can backtrack into capturing a trailing
            // label word ("PROFORMA INVOICE" -> "INVOICE"); an identifier
            // must carry at least one digit.
            if RX_ID_VALID.is_match(value) && value.chars().any(|c| c.is_ascii_digit()) {
                return Some(value.to_string());
            }
        }
    }

    for (dx, min_overlap) in [(max_dx, ANCHOR_OVERLAP), (max_dx * 2.0, ANCHOR_OVERLAP_WIDE)] {
        let mut window: Vec<&Block> = blocks
            .iter()
            .filter(|b| {
                b.page == base.page
                    && b.x0() > base.x1()
                    && (b.x0() - base.x1()) <= dx
                    && y_overlap_ratio(&b.bbox, &base.bbox) >= min_overlap
            })
            .collect();
        // rightmost first, then highest overlap
        window.sort_by(|a, b| {
            let ka = (-a.x0(), -y_overlap_ratio(&a.bbox, &base.bbox));
            let kb = (-b.x0(), -y_overlap_ratio(&b.bbox, &base.bbox));
            ka.partial_cmp(&kb).unwrap_or(std::cmp::Ordering::Equal)
        });

        for candidate in window {
            if let Some(caps) = RX_ID_TOKEN.captures(&candidate.text) {
                if let Some(token) = caps.get(1) {
                    return Some(token.as_str().trim().to_string());
                }
            }
        }
    }

    None
}

/// Order number from the label's visual row.
///
/// Scans rows top to bottom for an order label, then the blocks right
/// of the label within the row, then the label block itself, and
/// finally the next row when it still overlaps the label's row.
pub fn find_order_number_from_rows(blocks: &[Block], overlap_min: f64) -> Option<String> {
    let rows = group_rows(blocks, overlap_min);

    for (idx, row) in rows.iter().enumerate() {
        let row_text = row.text();
        if !ROW_ORDER_BEFORE.is_match(&row_text) && !ROW_ORDER_AFTER.is_match(&row_text) {
            continue;
        }

        let Some(anchor_idx) = row
            .blocks
            .iter()
            .position(|b| ORDER_LABEL_ONLY.is_match(&b.text))
        else {
            continue;
        };

        for block in &row.blocks[anchor_idx + 1..] {
            if let Some(caps) = ORDER_TOKEN.captures(&block.text) {
                return Some(caps[1].to_string());
            }
        }

        if let Some(caps) = ORDER_TOKEN.captures(&row.blocks[anchor_idx].text) {
            return Some(caps[1].to_string());
        }

        if let Some(next) = rows.get(idx + 1) {
            if y_overlap_ratio(&row.lead_bbox(), &next.lead_bbox()) >= NEXT_ROW_OVERLAP {
                for block in &next.blocks {
                    if let Some(caps) = ORDER_TOKEN.captures(&block.text) {
                        return Some(caps[1].to_string());
                    }
                }
            }
        }
    }

    None
}

/// Order number from the flattened document text.
///
/// Tolerates the label and the number on one line, separated by
/// punctuation of varying width, or up to two lines apart.
pub fn find_order_number_text(blocks: &[Block]) -> Option<String> {
    let text = normalize(
        &blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
    );

    if let Some(caps) = TXT_ORDER_LABELED.captures(&text) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = TXT_ORDER_TRAILING.captures(&text) {
        return Some(caps[1].to_string());
    }

    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    for (i, line) in lines.iter().enumerate() {
        if !ORDER_LABEL_ONLY.is_match(line) {
            continue;
        }
        if let Some(caps) = LINE_ANY_ID.captures(line) {
            return Some(caps[1].to_string());
        }
        for follower in lines.iter().skip(i + 1).take(2) {
            if let Some(caps) = LINE_LEAD_ID.captures(follower) {
                return Some(caps[1].to_string());
            }
        }
    }

    None
}

/// Year-slash order reference ("2024/00321") anywhere in the text.
pub fn find_order_reference(text: &str) -> Option<String> {
    RX_REF_YYYY_SLASH.captures(text).map(|caps| caps[1].to_string())
}
