use crate::sources::RewardDataSource;
use anyhow::Result;
use async_trait::async_trait;
use hv_yield_domain::entities::{RewardDistribution, VaultRef};
use std::collections::{BTreeMap, HashMap};

/// Reward emissions per vault, keyed by the block they take effect at.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRewardSource {
    distributions: HashMap<VaultRef, BTreeMap<u64, Vec<RewardDistribution>>>,
}

impl InMemoryRewardSource {
    /// Creates a source with no emissions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the emissions active for `vault` from `block` on.
    ///
    /// Replaces whatever was registered at the same block.
    #[must_use]
    pub fn with_distributions(
        mut self,
        vault: VaultRef,
        block: u64,
        distributions: Vec<RewardDistribution>,
    ) -> Self {
        self.distributions
            .entry(vault)
            .or_default()
            .insert(block, distributions);
        self
    }
}

#[async_trait]
impl RewardDataSource for InMemoryRewardSource {
    async fn distributions(
        &self,
        vault: &VaultRef,
        block: u64,
    ) -> Result<Vec<RewardDistribution>> {
        Ok(self
            .distributions
            .get(vault)
            .and_then(|by_block| by_block.range(..=block).next_back())
            .map(|(_, active)| active.clone())
            .unwrap_or_default())
    }
}
