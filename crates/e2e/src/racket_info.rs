//! Heuristic decomposition of a rendered catalog row
//!
//! This is a best-effort reading of display text, not a data contract. The
//! rules, in order:
//!
//! 1. Split on `" - "`: the parts are name, brand and price.
//! 2. No price part: take the first `<number> €` token anywhere in the text.
//! 3. No brand part: take the first all-caps (2+ letters) or capitalised
//!    (3+ letters) token that is not the name itself.
//!
//! A row "has a price" if a price was found or the text contains any digit.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static PRICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+[.,]?\d*\s*€)").expect("valid price regex"));
static BRAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z]{2,}|[A-Z][a-z]{2,})").expect("valid brand regex"));
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("valid digit regex"));

const SEPARATOR: &str = " - ";

/// Name, brand and price read off a catalog row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RacketInfo {
    pub name: String,
    pub brand: String,
    pub price: String,
    pub full_text: String,
}

impl RacketInfo {
    pub fn parse(text: &str) -> Self {
        let mut parts = text.split(SEPARATOR).map(str::trim);
        let name = parts.next().unwrap_or_default().to_string();
        let mut brand = parts.next().unwrap_or_default().to_string();
        let mut price = parts.next().unwrap_or_default().to_string();

        if price.is_empty() {
            if let Some(m) = PRICE.captures(text).and_then(|c| c.get(1)) {
                price = m.as_str().trim().to_string();
            }
        }

        if brand.is_empty() {
            if let Some(candidate) = BRAND
                .find_iter(text)
                .map(|m| m.as_str().trim())
                .find(|c| c.len() > 1 && !c.eq_ignore_ascii_case(&name))
            {
                brand = candidate.to_string();
            }
        }

        Self {
            name,
            brand,
            price,
            full_text: text.to_string(),
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }

    pub fn has_brand(&self) -> bool {
        !self.brand.is_empty()
    }

    pub fn has_price(&self) -> bool {
        !self.price.is_empty() || DIGIT.is_match(&self.full_text)
    }

    /// Name plus at least one of brand or price
    pub fn is_plausible(&self) -> bool {
        self.has_name() && (self.has_brand() || self.has_price())
    }
}

impl std::fmt::Display for RacketInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if self.has_brand() {
            write!(f, " ({})", self.brand)?;
        }
        if !self.price.is_empty() {
            write!(f, " - {}", self.price)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_split() {
        let info = RacketInfo::parse("Vertex 04 - Bullpadel - 219,95 €");
        assert_eq!(info.name, "Vertex 04");
        assert_eq!(info.brand, "Bullpadel");
        assert_eq!(info.price, "219,95 €");
        assert_eq!(info.to_string(), "Vertex 04 (Bullpadel) - 219,95 €");
    }

    #[test]
    fn test_price_fallback_pattern() {
        let info = RacketInfo::parse("AT10 Genius - NOX\nAhora 189.90€");
        assert_eq!(info.brand, "NOX\nAhora 189.90€");
        assert_eq!(info.price, "189.90€");
    }

    #[test]
    fn test_brand_fallback_skips_name() {
        let info = RacketInfo::parse("Metalbone\nADIDAS\n249 €");
        assert_eq!(info.name, "Metalbone\nADIDAS\n249 €");
        assert_eq!(info.brand, "Metalbone");
        assert_eq!(info.price, "249 €");

        let info = RacketInfo::parse("Speed");
        assert_eq!(info.name, "Speed");
        assert_eq!(info.brand, "");
        assert!(!info.is_plausible());
    }

    #[test]
    fn test_brand_fallback_prefers_caps_token() {
        let info = RacketInfo::parse("pala HEAD extreme");
        assert_eq!(info.brand, "HEAD");
        assert!(info.is_plausible());
    }

    #[test]
    fn test_digits_count_as_price() {
        let info = RacketInfo::parse("x 2024");
        assert!(info.price.is_empty());
        assert!(info.has_price());
        assert!(!info.has_brand());
        assert!(info.is_plausible());
    }

    #[test]
    fn test_empty_text() {
        let info = RacketInfo::parse("");
        assert!(!info.has_name());
        assert!(!info.has_price());
        assert!(!info.is_plausible());
    }
}
