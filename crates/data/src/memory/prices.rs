use crate::sources::PriceOracle;
use anyhow::Result;
use async_trait::async_trait;
use hv_yield_domain::enums::Chain;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Price oracle over a fixed price table.
///
/// A lookup returns the most recent price recorded at or before the block.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceOracle {
    prices: HashMap<(Chain, String), BTreeMap<u64, Decimal>>,
}

impl StaticPriceOracle {
    /// Creates an oracle with no prices.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `price` for `token` from `block` on.
    #[must_use]
    pub fn with_price(mut self, chain: Chain, token: &str, block: u64, price: Decimal) -> Self {
        self.prices
            .entry((chain, token.to_lowercase()))
            .or_default()
            .insert(block, price);
        self
    }
}

#[async_trait]
impl PriceOracle for StaticPriceOracle {
    async fn price(&self, chain: Chain, token: &str, block: u64) -> Result<Option<Decimal>> {
        let price = self
            .prices
            .get(&(chain, token.to_lowercase()))
            .and_then(|history| history.range(..=block).next_back())
            .map(|(_, price)| *price);
        Ok(price)
    }
}
