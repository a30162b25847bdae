//! Date extraction: label-anchored lookup with day-first parsing.

use chrono::NaiveDate;

use crate::models::block::Block;

use super::patterns::{ANCH_DATE, RX_DATE};

/// Vertical distance within which sibling blocks of the date label are
/// searched for a date token.
const NEIGHBOR_DY: f64 = 40.0;

const CONF_LABEL_BLOCK: f32 = 0.9;
const CONF_NEIGHBOR: f32 = 0.85;
const CONF_GLOBAL: f32 = 0.6;

/// ISO date and confidence tier for the invoice date.
///
/// The token inside the first date-labeled block scores 0.9, one found
/// in a vertical neighbor 0.85, a document-wide match 0.6. A token that
/// refuses to parse is a miss, not an error: the result degrades to an
/// empty date with confidence 0.0.
pub fn find_date(blocks: &[Block], text_all: &str) -> (String, f32) {
    if let Some(base) = blocks.iter().find(|b| ANCH_DATE.is_match(&b.text)) {
        if let Some(m) = RX_DATE.captures(&base.text) {
            if let Some(date) = parse_date_token(&m[1]) {
                return (date, CONF_LABEL_BLOCK);
            }
        } else {
            let neighbors = blocks.iter().filter(|b| {
                b.page == base.page
                    && (b.y0() - base.y0()).abs() < NEIGHBOR_DY
                    && !std::ptr::eq(*b, base)
            });
            for neighbor in neighbors {
                if let Some(m) = RX_DATE.captures(&neighbor.text) {
                    if let Some(date) = parse_date_token(&m[1]) {
                        return (date, CONF_NEIGHBOR);
                    }
                    break;
                }
            }
        }
    }

    if let Some(m) = RX_DATE.captures(text_all) {
        if let Some(date) = parse_date_token(&m[1]) {
            return (date, CONF_GLOBAL);
        }
    }

    (String::new(), 0.0)
}

/// Parse one date token to ISO form, day first.
///
/// Accepts "15/03/2024", "15-3-24", "15.03.2024" and the English
/// month-name form "March 15, 2024". Numeric tokens are read day-first;
/// when that is impossible the fields are swapped once.
pub fn parse_date_token(token: &str) -> Option<String> {
    let token = token.trim();

    let numeric: Vec<&str> = token.split(['/', '-', '.']).collect();
    if numeric.len() == 3 {
        let a: u32 = numeric[0].parse().ok()?;
        let b: u32 = numeric[1].parse().ok()?;
        let year = expand_year(numeric[2].parse().ok()?);
        let date = NaiveDate::from_ymd_opt(year, b, a)
            .or_else(|| NaiveDate::from_ymd_opt(year, a, b))?;
        return Some(date.format("%Y-%m-%d").to_string());
    }

    // "March 15, 2024" / "Mar 15 2024"
    let cleaned = token.replace(',', " ");
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.len() == 3 {
        let month = month_from_name(words[0])?;
        let day: u32 = words[1].parse().ok()?;
        let year: i32 = words[2].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        return Some(date.format("%Y-%m-%d").to_string());
    }

    None
}

fn expand_year(year: i32) -> i32 {
    if year < 100 {
        // Two-digit year: 2000s for 00-50, 1900s for 51-99.
        if year <= 50 { 2000 + year } else { 1900 + year }
    } else {
        year
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| m.starts_with(&lower) && lower.len() >= 3)
        .map(|i| i as u32 + 1)
}
