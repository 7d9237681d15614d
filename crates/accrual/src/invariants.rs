//! Cross-snapshot consistency checks.
//!
//! Fee growth accumulators never decrease. Total supply only changes across
//! a gap the history cannot explain, in which case the gap can be sent for
//! backfill instead of failing the walk.

use crate::error::{Invariant, ValidationError};
use hv_yield_data::RemediationTrigger;
use hv_yield_domain::entities::PositionSnapshot;
use std::sync::Arc;
use tracing::warn;

/// Result of a pair check that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Ok,
    /// Supply changed across a gap and a backfill was requested for it.
    Remediated { block_ini: u64, block_end: u64 },
}

/// Validates snapshot pairs and triggers remediation when allowed.
#[derive(Clone)]
pub struct InvariantChecker {
    remediation: Arc<dyn RemediationTrigger>,
}

impl InvariantChecker {
    /// Creates a new checker.
    #[must_use]
    pub fn new(remediation: Arc<dyn RemediationTrigger>) -> Self {
        Self { remediation }
    }

    /// Checks a period's start/end pair.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] if fee growth decreased, if supply
    /// changed between consecutive blocks, or if supply changed across a gap
    /// and `try_solve_errors` is off.
    pub async fn check(
        &self,
        last: &PositionSnapshot,
        current: &PositionSnapshot,
        try_solve_errors: bool,
    ) -> Result<CheckOutcome, ValidationError> {
        Self::check_fee_growth(last, current)?;

        if last.total_supply == current.total_supply {
            return Ok(CheckOutcome::Ok);
        }

        if current.follows_directly(last) {
            return Err(violation(
                last,
                current,
                Invariant::SupplyChangedAtConsecutiveBlocks,
            ));
        }
        if !try_solve_errors {
            return Err(violation(
                last,
                current,
                Invariant::SupplyChangedWithoutOperation,
            ));
        }

        warn!(
            vault = %current.address,
            block_ini = last.block,
            block_end = current.block,
            supply_ini = %last.total_supply,
            supply_end = %current.total_supply,
            "Supply changed without operations, requesting backfill"
        );
        self.remediate(current, last.block, current.block).await;

        Ok(CheckOutcome::Remediated {
            block_ini: last.block,
            block_end: current.block,
        })
    }

    /// Checks that both fee growth accumulators did not decrease.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] naming the first token whose
    /// accumulator went down.
    pub fn check_fee_growth(
        last: &PositionSnapshot,
        current: &PositionSnapshot,
    ) -> Result<(), ValidationError> {
        if current.pool.fee_growth_global0 < last.pool.fee_growth_global0 {
            return Err(violation(
                last,
                current,
                Invariant::FeeGrowthDecreased { token: 0 },
            ));
        }
        if current.pool.fee_growth_global1 < last.pool.fee_growth_global1 {
            return Err(violation(
                last,
                current,
                Invariant::FeeGrowthDecreased { token: 1 },
            ));
        }
        Ok(())
    }

    /// Requests a backfill of `item`'s vault between two blocks.
    pub async fn remediate(&self, item: &PositionSnapshot, block_ini: u64, block_end: u64) {
        self.remediation
            .backfill(item.chain, &item.address, block_ini, block_end)
            .await;
    }
}

/// Fatal error for a history starting with uncollected fees.
#[must_use]
pub fn missing_history(first: &PositionSnapshot) -> ValidationError {
    ValidationError {
        chain: first.chain,
        vault: first.address.clone(),
        block_ini: first.block,
        block_end: first.block,
        invariant: Invariant::MissingHistory,
    }
}

pub(crate) fn violation(
    last: &PositionSnapshot,
    current: &PositionSnapshot,
    invariant: Invariant,
) -> ValidationError {
    ValidationError {
        chain: current.chain,
        vault: current.address.clone(),
        block_ini: last.block,
        block_end: current.block,
        invariant,
    }
}
