//! In-memory collaborators.
//!
//! Each type keeps its data behind plain collections filled through `with_*`
//! builders, or behind a `tokio` lock when the collaborator records calls.

mod prices;
mod remediation;
mod rewards;
mod sink;
mod snapshots;

pub use prices::StaticPriceOracle;
pub use remediation::{BackfillRequest, RecordingRemediationTrigger};
pub use rewards::InMemoryRewardSource;
pub use sink::InMemoryRecordSink;
pub use snapshots::{InMemorySnapshotSource, StaticTerminalResolver};
