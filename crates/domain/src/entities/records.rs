//! Records produced by a walk, shaped for a persistence layer to upsert.

use crate::entities::snapshot::VaultRef;
use crate::entities::token::Token;
use crate::enums::Chain;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Share of a period's rewards attributed to one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardShare {
    pub source: String,
    pub amount: Decimal,
    pub amount_usd: Decimal,
}

/// Rewards accrued between a period's start marker and its end marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardPeriodRecord {
    pub chain: Chain,
    pub vault: String,
    pub reward_token: Token,
    pub rewarder: String,
    pub block_ini: u64,
    pub block_end: u64,
    pub timestamp_ini: u64,
    pub timestamp_end: u64,
    /// Seconds between the two markers.
    pub time_passed: u64,
    pub base_rewards: Decimal,
    pub boosted_rewards: Decimal,
    pub base_rewards_usd: Decimal,
    pub boosted_rewards_usd: Decimal,
    pub tvl_usd: Decimal,
    /// Rewards over TVL for this period; zero when the period was rejected.
    pub period_yield: Decimal,
    #[serde(default)]
    pub breakdown: Vec<RewardShare>,
}

impl RewardPeriodRecord {
    #[must_use]
    pub fn total_rewards_usd(&self) -> Decimal {
        self.base_rewards_usd + self.boosted_rewards_usd
    }
}

/// Base/boosted split and rates backing an aggregate figure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccrualExtra {
    pub base_apr: Decimal,
    pub base_apy: Decimal,
    pub boosted_apr: Decimal,
    pub boosted_apy: Decimal,
    pub base_rewards_per_second: Decimal,
    pub boosted_rewards_per_second: Decimal,
    pub cumulative_return: Decimal,
    pub total_seconds: u64,
    pub periods: usize,
    pub excluded_periods: usize,
}

/// Upsert key for aggregate records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccrualKey {
    pub vault: VaultRef,
    pub reward_token: String,
    pub block: u64,
}

/// Annualized accrual for one vault and reward token at an evaluation point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateAccrualRecord {
    pub chain: Chain,
    pub vault: String,
    pub reward_token: Token,
    /// Evaluation block.
    pub block: u64,
    pub timestamp: u64,
    pub apr: Decimal,
    pub apy: Decimal,
    pub reward_token_price_usd: Decimal,
    pub token0_price_usd: Decimal,
    pub token1_price_usd: Decimal,
    pub share_price_usd: Decimal,
    pub extra: AccrualExtra,
}

impl AggregateAccrualRecord {
    #[must_use]
    pub fn key(&self) -> AccrualKey {
        AccrualKey {
            vault: VaultRef::new(self.chain, self.vault.as_str()),
            reward_token: self.reward_token.address.clone(),
            block: self.block,
        }
    }
}
