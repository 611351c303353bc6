use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::{format_amount, OrderQuote};

pub const ORDER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fields collected by the order form before confirmation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub items_text: Option<String>,
    pub total: Option<Decimal>,
}

impl OrderDraft {
    pub fn apply_quote(&mut self, quote: &OrderQuote) {
        self.total = Some(quote.total);
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Freezes the draft into a persisted record. Missing fields are stored
    /// blank.
    pub fn to_record(&self, recorded_at: NaiveDateTime) -> OrderRecord {
        OrderRecord {
            recorded_at,
            name: self.name.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            address: self.address.clone().unwrap_or_default(),
            items: self.items_text.clone().unwrap_or_default(),
            total: format_amount(self.total.unwrap_or(Decimal::ZERO)),
        }
    }
}

/// One row of the append-only order log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub recorded_at: NaiveDateTime,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub items: String,
    /// Display total, e.g. `10,000`.
    pub total: String,
}

impl OrderRecord {
    pub fn timestamp(&self) -> String {
        self.recorded_at.format(ORDER_TIMESTAMP_FORMAT).to_string()
    }
}
