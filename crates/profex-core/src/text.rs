//! Text normalization used by every downstream matcher.
//!
//! All functions here are pure and total. They exist so the anchor
//! regexes can be written once and still match accent-, NBSP- and
//! spacing-mangled renderings of the same label.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonical form: NFKC, non-breaking spaces to regular spaces, the
/// degree sign folded into the ordinal marker "º", and runs of
/// horizontal whitespace collapsed. Newlines are preserved.
pub fn normalize(s: &str) -> String {
    let folded: String = s
        .nfkc()
        .map(|c| match c {
            '\u{00a0}' => ' ',
            '°' => 'º',
            other => other,
        })
        .collect();

    let mut out = String::with_capacity(folded.len());
    let mut in_gap = false;
    for c in folded.chars() {
        if c == ' ' || c == '\t' {
            if !in_gap {
                out.push(' ');
            }
            in_gap = true;
        } else {
            out.push(c);
            in_gap = false;
        }
    }
    out
}

/// Strip combining diacritics so "DIRECCIÓN" matches "DIRECCION".
pub fn deaccent(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Match-normal form: deaccented, all whitespace collapsed to single
/// spaces, trimmed. Header and label lookups compare in this form.
pub fn match_form(s: &str) -> String {
    let deaccented = deaccent(&s.replace('\u{00a0}', " "));
    let mut out = String::with_capacity(deaccented.len());
    let mut in_gap = false;
    for c in deaccented.chars() {
        if c.is_whitespace() {
            if !in_gap && !out.is_empty() {
                out.push(' ');
            }
            in_gap = true;
        } else {
            out.push(c);
            in_gap = false;
        }
    }
    out.trim_end().to_string()
}
