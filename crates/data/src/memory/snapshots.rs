use crate::sources::{SnapshotSource, TerminalSnapshotResolver};
use anyhow::{Context, Result};
use async_trait::async_trait;
use hv_yield_domain::entities::{PositionSnapshot, VaultRef};
use hv_yield_domain::value_objects::{Window, WindowBound};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Snapshot history held in memory, grouped per vault.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotSource {
    snapshots: HashMap<VaultRef, Vec<PositionSnapshot>>,
    creation_blocks: HashMap<VaultRef, u64>,
}

impl InMemorySnapshotSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds snapshots, grouping them by vault.
    #[must_use]
    pub fn with_snapshots(mut self, snapshots: impl IntoIterator<Item = PositionSnapshot>) -> Self {
        for snapshot in snapshots {
            self.snapshots
                .entry(snapshot.vault())
                .or_default()
                .push(snapshot);
        }
        self
    }

    /// Records the block a vault was deployed at.
    #[must_use]
    pub fn with_creation_block(mut self, vault: VaultRef, block: u64) -> Self {
        self.creation_blocks.insert(vault, block);
        self
    }

    /// Builds a source from a JSON array of snapshots.
    ///
    /// # Errors
    /// Returns an error if the JSON does not describe a list of snapshots.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshots: Vec<PositionSnapshot> =
            serde_json::from_str(json).context("Failed to parse snapshot fixture")?;
        Ok(Self::new().with_snapshots(snapshots))
    }

    /// Reads a JSON fixture file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Number of snapshots stored for `vault`.
    #[must_use]
    pub fn snapshot_count(&self, vault: &VaultRef) -> usize {
        self.snapshots.get(vault).map_or(0, Vec::len)
    }
}

#[async_trait]
impl SnapshotSource for InMemorySnapshotSource {
    async fn fetch(&self, vault: &VaultRef, window: &Window) -> Result<Vec<PositionSnapshot>> {
        let mut items: Vec<PositionSnapshot> = self
            .snapshots
            .get(vault)
            .into_iter()
            .flatten()
            .filter(|s| window.admits(s.block, s.timestamp))
            .cloned()
            .collect();
        items.sort_by_key(|s| s.block);

        if let Some(tail) = window.only_use_last_items {
            let skip = items.len().saturating_sub(tail);
            items.drain(..skip);
        }

        debug!(vault = %vault, count = items.len(), "Fetched snapshots");
        Ok(items)
    }

    async fn creation_block(&self, vault: &VaultRef) -> Result<Option<u64>> {
        Ok(self.creation_blocks.get(vault).copied())
    }
}

/// Terminal resolver answering from a fixed set of snapshots.
///
/// For a bound it returns the latest registered snapshot at or before it.
#[derive(Debug, Clone, Default)]
pub struct StaticTerminalResolver {
    snapshots: HashMap<VaultRef, Vec<PositionSnapshot>>,
}

impl StaticTerminalResolver {
    /// Creates a resolver that never produces a snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a snapshot the resolver may return.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: PositionSnapshot) -> Self {
        self.snapshots
            .entry(snapshot.vault())
            .or_default()
            .push(snapshot);
        self
    }
}

#[async_trait]
impl TerminalSnapshotResolver for StaticTerminalResolver {
    async fn scrape(
        &self,
        vault: &VaultRef,
        bound: WindowBound,
    ) -> Result<Option<PositionSnapshot>> {
        let candidates = self.snapshots.get(vault).into_iter().flatten();
        let found = match bound {
            WindowBound::Block(block) => candidates
                .filter(|s| s.block <= block)
                .max_by_key(|s| s.block),
            WindowBound::Timestamp(ts) => candidates
                .filter(|s| s.timestamp <= ts)
                .max_by_key(|s| s.timestamp),
        };
        debug!(vault = %vault, ?bound, found = found.is_some(), "Resolved terminal snapshot");
        Ok(found.cloned())
    }
}
