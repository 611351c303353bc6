use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, LookupOptions};
use crate::domain::product::parse_decimal;

const SPACED_SEPARATOR: &str = " x ";
const GLYPH_SEPARATOR: char = '×';

/// An order line that resolved to a priced product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub raw: String,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: Decimal,
    pub line_total: Decimal,
}

impl fmt::Display for PricedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {} x {} = {} Ks",
            self.raw,
            format_amount(self.unit_price),
            format_quantity(self.quantity),
            format_amount(self.line_total)
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuote {
    pub total: Decimal,
    pub lines: Vec<PricedLine>,
    /// Raw lines that matched no product or whose product has no usable price.
    pub unresolved: Vec<String>,
}

impl OrderQuote {
    pub fn breakdown(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }
}

/// Prices free-text order lines of the form `<name> x <qty>` against the
/// catalog. Lines are handled independently and in input order.
pub fn price_order_text(items_text: &str, catalog: &Catalog) -> OrderQuote {
    let mut quote = OrderQuote::default();

    for raw in items_text.lines() {
        if raw.trim().is_empty() {
            continue;
        }

        let (name_fragment, quantity) = split_order_line(raw);
        if name_fragment.is_empty() {
            quote.unresolved.push(raw.to_owned());
            continue;
        }

        let lookup = catalog.lookup(&name_fragment, LookupOptions::ORDER_LINE);
        let Some(product) = lookup.first() else {
            quote.unresolved.push(raw.to_owned());
            continue;
        };
        let Some(unit_price) = product.parsed_price() else {
            quote.unresolved.push(raw.to_owned());
            continue;
        };

        let Some((line_total, total)) = unit_price
            .checked_mul(quantity)
            .and_then(|line_total| Some((line_total, quote.total.checked_add(line_total)?)))
        else {
            quote.unresolved.push(raw.to_owned());
            continue;
        };
        quote.total = total;
        quote.lines.push(PricedLine {
            raw: raw.to_owned(),
            product_name: product.name.clone(),
            unit_price,
            quantity,
            line_total,
        });
    }

    quote
}

/// Splits one order line into a lowercased name fragment and a quantity.
///
/// The spaced letter `x` takes precedence over the `×` glyph. Only the first
/// token after the separator is read as the quantity, so trailing unit text
/// such as `box` is ignored; a missing or unreadable quantity counts as one.
pub fn split_order_line(line: &str) -> (String, Decimal) {
    let lower = line.trim().to_lowercase();

    let (name, rest) = if let Some((name, rest)) = lower.split_once(SPACED_SEPARATOR) {
        (name, Some(rest))
    } else if let Some((name, rest)) = lower.split_once(GLYPH_SEPARATOR) {
        (name, Some(rest))
    } else {
        (lower.as_str(), None)
    };

    let quantity = rest
        .and_then(|rest| rest.split(SPACED_SEPARATOR).next())
        .and_then(|segment| segment.split_whitespace().next())
        .and_then(parse_decimal)
        .unwrap_or(Decimal::ONE);

    (name.trim().to_owned(), quantity)
}

/// Whole-unit amount with thousands separators, e.g. `12,500`.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Quantity without trailing zeros, e.g. `10` or `2.5`.
pub fn format_quantity(quantity: Decimal) -> String {
    quantity.normalize().to_string()
}
