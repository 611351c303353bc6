//! Vendor price list: fetching, table parsing, and the shared snapshot.

pub mod parse;
pub mod provider;

use async_trait::async_trait;
use thiserror::Error;

pub use parse::parse_price_table;
pub use provider::{PriceList, PriceListProvider, ScrapedPriceList};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PriceListError {
    #[error("price list request timed out")]
    Timeout,
    #[error("price list request failed: {0}")]
    Transport(String),
    #[error("price list page returned HTTP {status}")]
    Status { status: u16 },
    #[error("price list page has no <table> element")]
    MissingTable,
    #[error("price list table has no <tr> rows")]
    MissingRows,
}

/// Where the price page HTML comes from.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_page(&self) -> Result<String, PriceListError>;

    /// Human-readable origin for logs.
    fn origin(&self) -> &str;
}
