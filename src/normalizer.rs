// Locale price text -> canonical f64
use regex::Regex;
use std::sync::LazyLock;

/// First decimal-like substring in a price text, e.g. "49,99" in
/// "R$ 49,99 com desconto". Storefronts in scope use a comma as the
/// decimal separator; the dot form also appears (GOG).
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+[.,]\d+").unwrap());

/// Extracts the first price-looking substring, comma converted to a dot.
pub fn extract_price_text(text: &str) -> Option<String> {
    PRICE_RE
        .find(text)
        .map(|m| m.as_str().replace(',', "."))
}

/// All price-looking substrings, verbatim. Aggregator rows carry several
/// per row and pick by position.
pub fn extract_price_texts(text: &str) -> Vec<String> {
    PRICE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Strict form: `None` when the text carries no parseable price.
pub fn try_parse_price(text: &str) -> Option<f64> {
    extract_price_text(text)?.parse::<f64>().ok()
}

/// Fail-soft form: malformed input degrades to 0.0, never errors.
/// Callers that must tell "free" apart from "unparseable" use
/// [`try_parse_price`] instead.
pub fn parse_price(text: &str) -> f64 {
    try_parse_price(text).unwrap_or(0.0)
}

/// Display form used by the result table: two decimals, comma separator.
pub fn format_price(price: f64) -> String {
    format!("{:.2}", price).replace('.', ",")
}
