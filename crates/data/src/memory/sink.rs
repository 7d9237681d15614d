use crate::sources::AccrualRecordSink;
use anyhow::Result;
use async_trait::async_trait;
use hv_yield_domain::entities::{AccrualKey, AggregateAccrualRecord};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Aggregate record store kept in memory, ordered by upsert key.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordSink {
    records: Arc<RwLock<BTreeMap<AccrualKey, AggregateAccrualRecord>>>,
}

impl InMemoryRecordSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored records in key order.
    pub async fn records(&self) -> Vec<AggregateAccrualRecord> {
        self.records.read().await.values().cloned().collect()
    }

    pub async fn get(&self, key: &AccrualKey) -> Option<AggregateAccrualRecord> {
        self.records.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AccrualRecordSink for InMemoryRecordSink {
    async fn upsert(&self, records: &[AggregateAccrualRecord]) -> Result<()> {
        let mut stored = self.records.write().await;
        for record in records {
            stored.insert(record.key(), record.clone());
        }
        debug!(upserted = records.len(), total = stored.len(), "Stored aggregate records");
        Ok(())
    }
}
