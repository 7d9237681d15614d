//! Vault state sampled at a single block.

use crate::entities::reward::RewardDistribution;
use crate::entities::token::Token;
use crate::enums::{Chain, OperationKind};
use crate::value_objects::amount::{Amount, AmountError};
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a vault across networks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VaultRef {
    pub chain: Chain,
    pub address: String,
}

impl VaultRef {
    pub fn new(chain: Chain, address: impl Into<String>) -> Self {
        Self {
            chain,
            address: address.into().to_lowercase(),
        }
    }
}

impl fmt::Display for VaultRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.address)
    }
}

/// Underlying pool state at the snapshot block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolState {
    pub address: String,
    pub token0: Token,
    pub token1: Token,
    pub liquidity: u128,
    pub fee_growth_global0: U256,
    pub fee_growth_global1: U256,
    pub tick: i32,
}

/// One of the vault's two liquidity ranges (base or limit).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRange {
    pub liquidity: u128,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

/// Decimal-adjusted token amounts held by the vault.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalAmounts {
    pub total0: Decimal,
    pub total1: Decimal,
}

/// Decimal-adjusted fees owed to the vault and not yet collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UncollectedFees {
    pub qtty_token0: Decimal,
    pub qtty_token1: Decimal,
}

impl UncollectedFees {
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.qtty_token0.is_zero() && self.qtty_token1.is_zero()
    }
}

/// A vault's state at one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub chain: Chain,
    pub address: String,
    pub block: u64,
    pub timestamp: u64,
    /// Decimals of the vault share token.
    pub decimals: u8,
    pub total_supply: U256,
    pub pool: PoolState,
    pub base_position: TickRange,
    pub limit_position: TickRange,
    pub total_amounts: TotalAmounts,
    pub fees_uncollected: UncollectedFees,
    /// Operation tags present at, or leading to, this block.
    #[serde(default)]
    pub operations: Vec<OperationKind>,
    /// Reward emissions attached by an accrual strategy.
    #[serde(default)]
    pub distributions: Vec<RewardDistribution>,
}

impl PositionSnapshot {
    #[must_use]
    pub fn vault(&self) -> VaultRef {
        VaultRef::new(self.chain, self.address.as_str())
    }

    #[must_use]
    pub fn has_operations(&self) -> bool {
        !self.operations.is_empty()
    }

    /// Recognized operation tags, in the order they were recorded.
    pub fn recognized_operations(&self) -> impl Iterator<Item = OperationKind> + '_ {
        self.operations.iter().copied().filter(OperationKind::is_recognized)
    }

    #[must_use]
    pub fn has_uncollected_fees(&self) -> bool {
        !self.fees_uncollected.is_zero()
    }

    /// Whether this snapshot sits exactly one block after `previous`.
    #[must_use]
    pub fn follows_directly(&self, previous: &PositionSnapshot) -> bool {
        self.block == previous.block.saturating_add(1)
    }

    /// Decimal-adjusted share supply.
    ///
    /// # Errors
    /// Returns an error if the supply cannot be represented as a decimal.
    pub fn supply(&self) -> Result<Decimal, AmountError> {
        Amount::new(self.total_supply, self.decimals).to_decimal()
    }

    /// Vault TVL given token0/token1 USD prices; `None` on overflow.
    #[must_use]
    pub fn tvl_usd(&self, price0_usd: Decimal, price1_usd: Decimal) -> Option<Decimal> {
        let value0 = self.total_amounts.total0.checked_mul(price0_usd)?;
        let value1 = self.total_amounts.total1.checked_mul(price1_usd)?;
        value0.checked_add(value1)
    }

    /// USD value of one vault share; zero when no shares exist, `None` on
    /// overflow.
    ///
    /// # Errors
    /// Returns an error if the supply cannot be represented as a decimal.
    pub fn share_price_usd(
        &self,
        price0_usd: Decimal,
        price1_usd: Decimal,
    ) -> Result<Option<Decimal>, AmountError> {
        let supply = self.supply()?;
        if supply.is_zero() {
            return Ok(Some(Decimal::ZERO));
        }
        Ok(self
            .tvl_usd(price0_usd, price1_usd)
            .and_then(|tvl| tvl.checked_div(supply)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(block: u64, supply: u64) -> PositionSnapshot {
        PositionSnapshot {
            chain: Chain::Polygon,
            address: "0xvault".to_string(),
            block,
            timestamp: block * 2,
            decimals: 18,
            total_supply: U256::from(supply) * U256::exp10(18),
            pool: PoolState {
                address: "0xpool".to_string(),
                token0: Token::new("0xUSDC", "USDC", 6),
                token1: Token::new("0xWETH", "WETH", 18),
                liquidity: 1_000,
                fee_growth_global0: U256::from(10u8),
                fee_growth_global1: U256::from(20u8),
                tick: 200_000,
            },
            base_position: TickRange::default(),
            limit_position: TickRange::default(),
            total_amounts: TotalAmounts {
                total0: dec!(1000),
                total1: dec!(0.5),
            },
            fees_uncollected: UncollectedFees::default(),
            operations: vec![OperationKind::Other, OperationKind::Deposit],
            distributions: vec![],
        }
    }

    #[test]
    fn test_tvl_and_share_price() {
        let item = snapshot(10, 100);

        assert_eq!(item.tvl_usd(dec!(1), dec!(2000)), Some(dec!(2000)));
        assert_eq!(item.share_price_usd(dec!(1), dec!(2000)).unwrap(), Some(dec!(20)));
    }

    #[test]
    fn test_share_price_without_supply() {
        let item = snapshot(10, 0);
        assert_eq!(item.share_price_usd(dec!(1), dec!(1)).unwrap(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_tvl_overflow_is_none() {
        let mut item = snapshot(10, 100);
        item.total_amounts.total0 = Decimal::from_i128_with_scale(10i128.pow(25), 0);

        assert_eq!(item.tvl_usd(dec!(100000), dec!(2000)), None);
        assert_eq!(item.share_price_usd(dec!(100000), dec!(2000)).unwrap(), None);
    }

    #[test]
    fn test_recognized_operations_skip_unknown_tags() {
        let item = snapshot(10, 1);
        let ops: Vec<_> = item.recognized_operations().collect();
        assert_eq!(ops, vec![OperationKind::Deposit]);
        assert!(item.has_operations());
    }

    #[test]
    fn test_follows_directly() {
        let a = snapshot(10, 1);
        let b = snapshot(11, 1);
        let c = snapshot(13, 1);
        assert!(b.follows_directly(&a));
        assert!(!c.follows_directly(&b));
    }
}
