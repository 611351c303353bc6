use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the vendor price table. Every field is kept as the display
/// text scraped from the page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub price: String,
    pub unit: String,
    pub expiry: String,
}

impl ProductRecord {
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self { name: name.into(), price: price.into(), ..Self::default() }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = expiry.into();
        self
    }

    /// Numeric price with thousands separators removed, if the display text
    /// is a plain number.
    pub fn parsed_price(&self) -> Option<Decimal> {
        parse_decimal(&self.price.replace(',', ""))
    }
}

/// Lenient decimal parse accepting plain and scientific notation.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<Decimal>().ok().or_else(|| Decimal::from_scientific(trimmed).ok())
}
