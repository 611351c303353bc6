use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{parse_price_table, PriceListError, PriceSource};
use crate::catalog::Catalog;
use crate::domain::product::ProductRecord;

/// Immutable snapshot of the vendor price list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceList {
    pub catalog: Catalog,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl PriceList {
    pub fn new(records: Vec<ProductRecord>, fetched_at: DateTime<Utc>) -> Self {
        Self { catalog: Catalog::new(records), fetched_at: Some(fetched_at) }
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }
}

#[async_trait]
pub trait PriceListProvider: Send + Sync {
    /// Fetches and parses a new snapshot. On failure the current snapshot is
    /// left untouched.
    async fn refresh(&self) -> Result<Arc<PriceList>, PriceListError>;

    async fn current(&self) -> Arc<PriceList>;

    /// Refreshes only when nothing has been loaded yet.
    async fn ensure_loaded(&self) -> Result<Arc<PriceList>, PriceListError> {
        let current = self.current().await;
        if !current.is_empty() {
            return Ok(current);
        }
        self.refresh().await
    }
}

/// Provider backed by a scraped HTML page.
pub struct ScrapedPriceList<S> {
    source: S,
    snapshot: RwLock<Arc<PriceList>>,
}

impl<S> ScrapedPriceList<S>
where
    S: PriceSource,
{
    pub fn new(source: S) -> Self {
        Self { source, snapshot: RwLock::new(Arc::new(PriceList::default())) }
    }

    /// Starts from a known snapshot instead of an empty one.
    pub fn preloaded(source: S, snapshot: PriceList) -> Self {
        Self { source, snapshot: RwLock::new(Arc::new(snapshot)) }
    }

    pub fn origin(&self) -> &str {
        self.source.origin()
    }
}

#[async_trait]
impl<S> PriceListProvider for ScrapedPriceList<S>
where
    S: PriceSource,
{
    async fn refresh(&self) -> Result<Arc<PriceList>, PriceListError> {
        let html = self.source.fetch_page().await?;
        let records = parse_price_table(&html)?;
        let fresh = Arc::new(PriceList::new(records, Utc::now()));

        *self.snapshot.write().await = Arc::clone(&fresh);
        Ok(fresh)
    }

    async fn current(&self) -> Arc<PriceList> {
        Arc::clone(&*self.snapshot.read().await)
    }
}
