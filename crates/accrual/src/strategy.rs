//! Accrual strategy trait.
//!
//! A strategy turns the pairs of snapshots the walker validates into reward
//! records. One implementation exists per reward distribution mechanism.

use crate::error::AccrualError;
use async_trait::async_trait;
use hv_yield_domain::entities::{
    AggregateAccrualRecord, PositionSnapshot, RewardPeriodRecord, VaultRef,
};
use hv_yield_domain::metrics::ComputationWarning;
use hv_yield_domain::value_objects::{Window, WindowBound};

/// Hooks the walker calls while traversing a vault's history.
///
/// Call order for a walk is `pre_loop`, then per snapshot `in_loop` followed
/// by `start_item` or `end_item`, then `post_loop`. `end_item` always receives
/// the start snapshot of the period it closes. `scrape_last` is called at most
/// once, after the last snapshot, when the window ends on an open period.
#[async_trait]
pub trait AccrualStrategy: Send {
    /// Returns the strategy name.
    fn name(&self) -> &'static str;

    /// Resets running totals and caches for a new walk.
    async fn pre_loop(&mut self, vault: &VaultRef, window: &Window) -> Result<(), AccrualError>;

    /// Called for every snapshot before it is classified; may annotate it.
    async fn in_loop(&mut self, item: &mut PositionSnapshot) -> Result<(), AccrualError>;

    /// Called when `item` opens a period.
    async fn start_item(&mut self, _item: &PositionSnapshot) -> Result<(), AccrualError> {
        Ok(())
    }

    /// Called when `end` closes the period opened at `start`.
    async fn end_item(
        &mut self,
        start: &PositionSnapshot,
        end: &PositionSnapshot,
    ) -> Result<Vec<RewardPeriodRecord>, AccrualError>;

    /// Produces the aggregate records for everything accrued.
    async fn post_loop(&mut self) -> Result<Vec<AggregateAccrualRecord>, AccrualError>;

    /// Snapshot at `bound`, past the last one walked, if one can be built.
    async fn scrape_last(
        &mut self,
        vault: &VaultRef,
        bound: WindowBound,
    ) -> Result<Option<PositionSnapshot>, AccrualError>;

    /// Hands over computation warnings collected so far.
    fn drain_warnings(&mut self) -> Vec<ComputationWarning> {
        Vec::new()
    }
}
