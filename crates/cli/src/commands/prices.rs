use std::time::Duration;

use pharmabot_core::catalog::{LookupOptions, MatchStrategy};
use pharmabot_core::domain::product::ProductRecord;
use pharmabot_core::pricelist::{PriceListProvider, ScrapedPriceList};
use pharmabot_server::price_source::HttpPriceSource;

use crate::commands::{load_config, runtime, CommandResult};

pub fn run(query: &str) -> CommandResult {
    let query = query.trim();
    if query.is_empty() {
        return CommandResult::failure("prices", "usage", "usage: pharmabot prices <query>", 64);
    }

    let config = match load_config("prices") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime("prices") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let source = match HttpPriceSource::new(
        config.pricelist.url.clone(),
        Duration::from_secs(config.pricelist.timeout_secs),
    ) {
        Ok(source) => source,
        Err(error) => return CommandResult::failure("prices", "price_list", error.to_string(), 4),
    };
    let provider = ScrapedPriceList::new(source);

    let list = match runtime.block_on(provider.refresh()) {
        Ok(list) => list,
        Err(error) => {
            return CommandResult::failure(
                "prices",
                "price_list",
                format!("could not load price list from `{}`: {error}", config.pricelist.url),
                4,
            );
        }
    };

    let lookup = list.catalog.lookup(query, LookupOptions::PRICE_COMMAND);
    if lookup.is_empty() {
        return CommandResult::success(
            "prices",
            format!("no products matched `{query}` among {} loaded", list.len()),
        );
    }

    let strategy = match lookup.strategy {
        MatchStrategy::Substring => "substring",
        MatchStrategy::Fuzzy => "fuzzy",
    };
    let mut lines = vec![format!("{} match(es) for `{query}` ({strategy}):", lookup.matches.len())];
    lines.extend(lookup.matches.iter().map(|product| render_product(product)));

    CommandResult::success("prices", lines.join("\n"))
}

fn render_product(product: &ProductRecord) -> String {
    let mut line = format!("- {} | {} Ks", product.name, product.price);
    if !product.unit.is_empty() {
        line.push_str(&format!(" | {}", product.unit));
    }
    if !product.expiry.is_empty() {
        line.push_str(&format!(" | exp {}", product.expiry));
    }
    line
}
