pub mod similarity;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductRecord;

/// Bounds for a single lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookupOptions {
    pub limit: usize,
    /// Minimum similarity ratio accepted by the fuzzy fallback.
    pub cutoff: f64,
}

impl LookupOptions {
    /// `/p <query>` replies list up to five products.
    pub const PRICE_COMMAND: Self = Self { limit: 5, cutoff: 0.5 };
    /// Order lines resolve to exactly one product.
    pub const ORDER_LINE: Self = Self { limit: 1, cutoff: 0.5 };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Substring,
    Fuzzy,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lookup<'a> {
    /// The last strategy that ran. `Fuzzy` with no matches means both missed.
    pub strategy: MatchStrategy,
    pub matches: Vec<&'a ProductRecord>,
}

impl Lookup<'_> {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn first(&self) -> Option<&ProductRecord> {
        self.matches.first().copied()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<ProductRecord>,
}

impl Catalog {
    pub fn new(products: Vec<ProductRecord>) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Case-insensitive containment, in storage order.
    pub fn search_substring(&self, query: &str, limit: usize) -> Vec<&ProductRecord> {
        let query = query.to_lowercase();
        self.products
            .iter()
            .filter(|product| product.name.to_lowercase().contains(&query))
            .take(limit)
            .collect()
    }

    /// Case-insensitive similarity search. Best ratio first; equal ratios are
    /// ordered by descending name. Each distinct name maps to the first record
    /// carrying it.
    pub fn search_fuzzy(&self, query: &str, limit: usize, cutoff: f64) -> Vec<&ProductRecord> {
        if limit == 0 || self.products.is_empty() {
            return Vec::new();
        }

        let query = query.to_lowercase();
        let mut scored: Vec<(f64, String)> = Vec::new();
        for product in &self.products {
            let name = product.name.to_lowercase();
            if scored.iter().any(|(_, seen)| seen == &name) {
                continue;
            }
            // candidate first, query second
            let score = similarity::ratio(&name, &query);
            if score >= cutoff {
                scored.push((score, name));
            }
        }

        scored.sort_by(|(left_score, left_name), (right_score, right_name)| {
            right_score
                .partial_cmp(left_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| right_name.cmp(left_name))
        });

        scored
            .into_iter()
            .take(limit)
            .filter_map(|(_, name)| {
                self.products.iter().find(|product| product.name.to_lowercase() == name)
            })
            .collect()
    }

    /// Substring match first; the fuzzy fallback only runs when it finds
    /// nothing.
    pub fn lookup(&self, query: &str, options: LookupOptions) -> Lookup<'_> {
        let matches = self.search_substring(query, options.limit);
        if !matches.is_empty() {
            return Lookup { strategy: MatchStrategy::Substring, matches };
        }

        Lookup {
            strategy: MatchStrategy::Fuzzy,
            matches: self.search_fuzzy(query, options.limit, options.cutoff),
        }
    }
}

impl From<Vec<ProductRecord>> for Catalog {
    fn from(products: Vec<ProductRecord>) -> Self {
        Self::new(products)
    }
}
