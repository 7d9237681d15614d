use crate::sources::RemediationTrigger;
use async_trait::async_trait;
use hv_yield_domain::enums::Chain;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// A backfill asked of the remediation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillRequest {
    pub chain: Chain,
    pub vault: String,
    pub block_ini: u64,
    pub block_end: u64,
}

/// Remediation trigger that only records what it was asked to do.
#[derive(Debug, Clone, Default)]
pub struct RecordingRemediationTrigger {
    requests: Arc<Mutex<Vec<BackfillRequest>>>,
}

impl RecordingRemediationTrigger {
    /// Creates a trigger with no recorded requests.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<BackfillRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of requests received so far.
    pub async fn calls(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl RemediationTrigger for RecordingRemediationTrigger {
    async fn backfill(&self, chain: Chain, vault: &str, block_ini: u64, block_end: u64) {
        info!(
            chain = %chain,
            vault = %vault,
            block_ini,
            block_end,
            "Backfill requested"
        );
        self.requests.lock().await.push(BackfillRequest {
            chain,
            vault: vault.to_string(),
            block_ini,
            block_end,
        });
    }
}
