//! Collaborators the accrual core depends on.
//!
//! The core never reads chain state or talks to a store itself. Everything it
//! needs arrives through the async traits in [`sources`]; [`memory`] ships
//! in-memory implementations used by tests and embedding callers.

/// In-memory collaborator implementations.
pub mod memory;
/// Collaborator traits.
pub mod sources;

pub use memory::{
    BackfillRequest, InMemoryRecordSink, InMemoryRewardSource, InMemorySnapshotSource,
    RecordingRemediationTrigger, StaticPriceOracle, StaticTerminalResolver,
};
pub use sources::{
    AccrualRecordSink, PriceOracle, RemediationTrigger, RewardDataSource, SnapshotSource,
    TerminalSnapshotResolver,
};
