//! Domain model for hypervisor reward accrual.
//!
//! Snapshots of vault state, the records produced from them, the query
//! window, and the pure yield math used to annualize accrued rewards.

/// Snapshot entities and output records.
pub mod entities;
/// Shared enumerations.
pub mod enums;
/// Yield compounding and annualization.
pub mod metrics;
/// Small value types.
pub mod value_objects;

pub use entities::{
    AggregateAccrualRecord, PositionSnapshot, RewardDistribution, RewardPeriodRecord, Token,
    VaultRef,
};
pub use enums::{Chain, OperationKind};
pub use value_objects::window::Window;
