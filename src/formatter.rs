//! Display strings derived from a [`CountryRecord`].
//!
//! Every function here is total: a missing field produces the `N/A` sentinel
//! (or an empty string for the list helpers, which the overlay turns into
//! `N/A`), never an error.

use crate::models::CountryRecord;

pub const NOT_AVAILABLE: &str = "N/A";

/// Flag image URL, `None` when the service sent none.
pub fn flag_url(record: &CountryRecord) -> Option<&str> {
    record.flag_image_url.as_deref()
}

pub fn currency_list(record: &CountryRecord) -> String {
    record
        .currencies
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn language_list(record: &CountryRecord) -> String {
    record
        .languages
        .iter()
        .map(|l| l.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn primary_capital(record: &CountryRecord) -> &str {
    record.capital.first().map_or(NOT_AVAILABLE, String::as_str)
}

pub fn primary_timezone(record: &CountryRecord) -> &str {
    record.timezones.first().map_or(NOT_AVAILABLE, String::as_str)
}

pub fn region(record: &CountryRecord) -> &str {
    record.region.as_deref().unwrap_or(NOT_AVAILABLE)
}

pub fn population(record: &CountryRecord) -> String {
    record
        .population
        .map_or_else(|| NOT_AVAILABLE.to_string(), |p| group_digits(p as f64))
}

pub fn area(record: &CountryRecord) -> String {
    record
        .area_sq_km
        .map_or_else(|| NOT_AVAILABLE.to_string(), group_digits)
}

/// Empty string becomes `N/A`.
pub fn or_not_available(value: String) -> String {
    if value.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value
    }
}

/// en-US grouping: commas every three integer digits, at most three
/// fraction digits with trailing zeros trimmed.
pub fn group_digits(value: f64) -> String {
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}
