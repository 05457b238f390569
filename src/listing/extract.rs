//! Best-effort extraction of structured fields from free-text feature strings.
//! Each function returns `None` rather than guessing when the text does not
//! match; callers only consult these when the structured column is missing.

use std::sync::LazyLock;

use regex::Regex;

// Digit groups are separated by spaces ("1 250 000") or commas ("120,000");
// a comma is only a decimal point when it carries a short fraction ("85,5").
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:[\s\u{a0}]\d+|,\d{3})*)([.,]\d{1,2})?\s*EUR").unwrap()
});

// Listings carry the area either as "Площ: 85 кв.м" or transliterated
// as "Area: 85.5 m2".
static AREA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Площ|Area):\s*(\d+(?:[.,]\d+)?)\s*(?:кв\.?\s*м|м2|kv\.?\s*m|m2)")
        .unwrap()
});

static DISTRICT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^,\r\n]+)").unwrap());

const MAX_DISTRICT_FEATURE_LEN: usize = 50;

/// First number followed by an `EUR` marker. Group separators are stripped
/// before parsing; a decimal fraction, dot or comma, is kept.
pub fn price_from_feature(text: &str) -> Option<f64> {
    let caps = PRICE_RE.captures(text)?;
    let mut digits: String = caps[1].chars().filter(char::is_ascii_digit).collect();
    if let Some(frac) = caps.get(2) {
        digits.push('.');
        digits.extend(frac.as_str().chars().filter(|c| c.is_ascii_digit()));
    }
    digits.parse().ok()
}

/// Area in square meters, looked up after the area label.
pub fn area_from_feature(text: &str) -> Option<f64> {
    let caps = AREA_RE.captures(text)?;
    caps[1].replace(',', ".").parse().ok()
}

/// Leading text up to the first comma or line break. Long feature strings
/// are descriptive prose, not a district name, and are rejected outright.
pub fn district_from_feature(text: &str) -> Option<String> {
    if text.chars().count() >= MAX_DISTRICT_FEATURE_LEN {
        return None;
    }
    let caps = DISTRICT_RE.captures(text)?;
    let district = caps[1].trim();
    if district.is_empty() {
        None
    } else {
        Some(district.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_plain() {
        assert_eq!(price_from_feature("120000 EUR"), Some(120000.0));
    }

    #[test]
    fn price_with_grouped_digits() {
        assert_eq!(price_from_feature("Цена: 1 250 000 EUR, чудесна сделка"), Some(1250000.0));
    }

    #[test]
    fn price_with_comma_grouped_digits() {
        assert_eq!(price_from_feature("120,000 EUR"), Some(120000.0));
        assert_eq!(price_from_feature("1,250,000 EUR"), Some(1250000.0));
    }

    #[test]
    fn price_with_decimal_fraction() {
        assert_eq!(price_from_feature("85000.50 EUR"), Some(85000.5));
        assert_eq!(price_from_feature("85000,5 EUR"), Some(85000.5));
    }

    #[test]
    fn price_requires_eur_marker() {
        assert_eq!(price_from_feature("120000 BGN"), None);
        assert_eq!(price_from_feature("no numbers here"), None);
    }

    #[test]
    fn area_latin_unit() {
        assert_eq!(area_from_feature("Area: 85.5 m2"), Some(85.5));
    }

    #[test]
    fn area_cyrillic_unit() {
        assert_eq!(area_from_feature("Площ: 85 кв.м"), Some(85.0));
        assert_eq!(area_from_feature("Площ: 72,5 кв.м"), Some(72.5));
    }

    #[test]
    fn area_needs_label() {
        assert_eq!(area_from_feature("85 кв.м"), None);
    }

    #[test]
    fn district_before_comma() {
        assert_eq!(
            district_from_feature("Лозенец, близо до метро"),
            Some("Лозенец".to_string())
        );
        assert_eq!(district_from_feature("Младост 1"), Some("Младост 1".to_string()));
    }

    #[test]
    fn district_rejects_long_text() {
        let long = "а".repeat(60) + ", квартал";
        assert_eq!(district_from_feature(&long), None);
    }
}
