use crate::entities::token::Token;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reward emission active for a vault at a given block.
///
/// Rates are expressed in reward token units per second, split between the
/// base emission every depositor receives and the boosted part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardDistribution {
    /// Contract distributing the reward (gauge, rewarder, ...).
    pub rewarder: String,
    pub reward_token: Token,
    pub base_rewards_per_second: Decimal,
    pub boosted_rewards_per_second: Decimal,
}

impl RewardDistribution {
    pub fn new(
        rewarder: impl Into<String>,
        reward_token: Token,
        base_rewards_per_second: Decimal,
        boosted_rewards_per_second: Decimal,
    ) -> Self {
        Self {
            rewarder: rewarder.into().to_lowercase(),
            reward_token,
            base_rewards_per_second,
            boosted_rewards_per_second,
        }
    }

    /// Combined emission rate; `None` on overflow.
    #[must_use]
    pub fn rewards_per_second(&self) -> Option<Decimal> {
        self.base_rewards_per_second
            .checked_add(self.boosted_rewards_per_second)
    }
}
