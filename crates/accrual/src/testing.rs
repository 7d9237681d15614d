//! Snapshot builders shared by the unit tests.

use hv_yield_domain::entities::{
    PoolState, PositionSnapshot, TickRange, Token, TotalAmounts, UncollectedFees, VaultRef,
};
use hv_yield_domain::enums::{Chain, OperationKind};
use primitive_types::U256;
use rust_decimal_macros::dec;

pub(crate) const VAULT: &str = "0xvault";
pub(crate) const USDC: &str = "0xusdc";
pub(crate) const WETH: &str = "0xweth";

pub(crate) fn vault() -> VaultRef {
    VaultRef::new(Chain::Polygon, VAULT)
}

/// Quiet snapshot holding 3600 USDC, `supply` whole shares and fee growth
/// equal to the block number.
pub(crate) fn snapshot(block: u64, timestamp: u64, supply: u64) -> PositionSnapshot {
    PositionSnapshot {
        chain: Chain::Polygon,
        address: VAULT.to_string(),
        block,
        timestamp,
        decimals: 18,
        total_supply: U256::from(supply) * U256::exp10(18),
        pool: PoolState {
            address: "0xpool".to_string(),
            token0: Token::new(USDC, "USDC", 6),
            token1: Token::new(WETH, "WETH", 18),
            liquidity: 1_000_000,
            fee_growth_global0: U256::from(block),
            fee_growth_global1: U256::from(block),
            tick: 0,
        },
        base_position: TickRange::default(),
        limit_position: TickRange::default(),
        total_amounts: TotalAmounts {
            total0: dec!(3600),
            total1: dec!(0),
        },
        fees_uncollected: UncollectedFees::default(),
        operations: vec![],
        distributions: vec![],
    }
}

pub(crate) fn with_ops(mut item: PositionSnapshot, ops: &[OperationKind]) -> PositionSnapshot {
    item.operations = ops.to_vec();
    item
}
