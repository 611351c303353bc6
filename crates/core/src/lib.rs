pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod pricelist;
pub mod pricing;

pub use catalog::{Catalog, Lookup, LookupOptions, MatchStrategy};
pub use config::{AppConfig, BotProfile, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::order::{OrderDraft, OrderRecord};
pub use domain::product::ProductRecord;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use flows::{
    DraftField, FormAction, FormEngine, FormEvent, FormState, FormTransitionError, OrderForm,
    OrderSession, TransitionOutcome,
};
pub use pricelist::{PriceList, PriceListError, PriceListProvider, PriceSource, ScrapedPriceList};
pub use pricing::{price_order_text, OrderQuote, PricedLine};
