use anyhow::Result;
use async_trait::async_trait;
use hv_yield_domain::entities::{
    AggregateAccrualRecord, PositionSnapshot, RewardDistribution, VaultRef,
};
use hv_yield_domain::enums::Chain;
use hv_yield_domain::value_objects::{Window, WindowBound};
use rust_decimal::Decimal;

/// Supplies a vault's snapshot history.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetches the snapshots of `vault` that fall inside `window`.
    ///
    /// The result may be empty. Callers sort by block before walking.
    async fn fetch(&self, vault: &VaultRef, window: &Window) -> Result<Vec<PositionSnapshot>>;

    /// Block the vault was deployed at, when known.
    async fn creation_block(&self, _vault: &VaultRef) -> Result<Option<u64>> {
        Ok(None)
    }
}

/// Builds a snapshot at a bound past the last stored sample.
#[async_trait]
pub trait TerminalSnapshotResolver: Send + Sync {
    /// Returns `None` when no snapshot can be produced at `bound`.
    async fn scrape(&self, vault: &VaultRef, bound: WindowBound)
    -> Result<Option<PositionSnapshot>>;
}

/// Re-ingests operation events missing between two blocks.
///
/// Fire-and-forget: implementations log their own failures.
#[async_trait]
pub trait RemediationTrigger: Send + Sync {
    async fn backfill(&self, chain: Chain, vault: &str, block_ini: u64, block_end: u64);
}

/// USD prices per token and block.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn price(&self, chain: Chain, token: &str, block: u64) -> Result<Option<Decimal>>;
}

/// Reward emissions active for a vault.
#[async_trait]
pub trait RewardDataSource: Send + Sync {
    async fn distributions(&self, vault: &VaultRef, block: u64)
    -> Result<Vec<RewardDistribution>>;
}

/// Destination for aggregate records, upserted by
/// `(vault, reward_token, evaluation_block)`.
#[async_trait]
pub trait AccrualRecordSink: Send + Sync {
    async fn upsert(&self, records: &[AggregateAccrualRecord]) -> Result<()>;
}
