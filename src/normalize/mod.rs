//! Pure parsing rules shared by the page scrapers.
//!
//! No I/O and no shared state; expected absence yields a documented
//! default instead of an error.

use chrono::{DateTime, Utc};

use crate::models::{CombatPower, Timezone};

/// Canonical base for image assets served through the CDN proxy.
pub const ASSET_BASE_URL: &str = "https://cdn.leekduck.com/assets/";

/// Timestamps at or under this length are already in compact ISO form.
const COMPACT_TIMESTAMP_LEN: usize = 24;

/// Ordered timezone markers; first match wins. Abbreviations are matched
/// with a leading space so "BEST" never reads as EST.
const TIMEZONE_MARKERS: [(&str, Timezone); 6] = [
    ("Local Time", Timezone::LocalTime),
    (" PST", Timezone::Pst),
    (" PDT", Timezone::Pdt),
    (" EST", Timezone::Est),
    (" EDT", Timezone::Edt),
    (" UTC", Timezone::Utc),
];

/// Parses a CP range: either a single integer ("900") or two integers
/// around a spaced hyphen ("1234 - 5678"). Anything else is the sentinel.
pub fn parse_combat_power_range(text: &str) -> CombatPower {
    let value = text.trim();
    if let Some((min, max)) = value.split_once(" - ") {
        match (min.trim().parse(), max.trim().parse()) {
            (Ok(min), Ok(max)) => CombatPower { min, max },
            _ => CombatPower::UNKNOWN,
        }
    } else {
        match value.parse() {
            Ok(single) => CombatPower {
                min: single,
                max: single,
            },
            Err(_) => CombatPower::UNKNOWN,
        }
    }
}

/// Maps a rarity icon count to its descriptive tier.
pub fn rarity_tier(count: u32) -> &'static str {
    match count {
        1 => "Common",
        2 => "Uncommon",
        3 => "Rare",
        4 => "Very Rare",
        5 => "Ultra Rare",
        _ => "Unknown",
    }
}

/// Scans a label for a "×N" multiplier and returns N if present.
pub fn try_parse_quantity(label: &str) -> Option<u32> {
    let pos = label.find('×')?;
    let digits: String = label[pos + '×'.len_utf8()..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Quantity from an inline label, defaulting to 1. A dedicated multiplier
/// element, when present, takes precedence at the call site.
pub fn parse_quantity(label: &str) -> u32 {
    try_parse_quantity(label).unwrap_or(1)
}

/// Parses the integer trailing a labelled value ("Min CP123" -> 123).
/// Returns the -1 sentinel when no trailing digits exist.
pub fn parse_trailing_int(text: &str) -> i32 {
    let trimmed = text.trim_end();
    let digits = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| &trimmed[i..])
        .unwrap_or("");
    digits.parse().unwrap_or(-1)
}

/// Reformats verbose date strings to UTC ISO-8601 with milliseconds.
/// Strings already in compact form (length <= 24) pass through unchanged,
/// as do long strings chrono cannot parse.
pub fn canonicalize_timestamp(raw: &str) -> String {
    if raw.len() <= COMPACT_TIMESTAMP_LEN {
        return raw.to_string();
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed
            .with_timezone(&Utc)
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

/// First timezone marker found in the text, if any.
pub fn detect_timezone(text: &str) -> Option<Timezone> {
    TIMEZONE_MARKERS
        .iter()
        .find(|(marker, _)| text.contains(marker))
        .map(|&(_, timezone)| timezone)
}

/// Rewrites CDN-proxy image URLs back to the canonical asset base.
pub fn rewrite_asset_url(url: &str) -> String {
    if url.contains("cdn-cgi") {
        if let Some((_, asset_path)) = url.split_once("/assets/") {
            return format!("{ASSET_BASE_URL}{asset_path}");
        }
    }
    url.to_string()
}
