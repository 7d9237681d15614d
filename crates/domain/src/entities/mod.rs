pub mod records;
pub mod reward;
pub mod snapshot;
pub mod token;

// Re-export for easier access
pub use records::{AccrualExtra, AccrualKey, AggregateAccrualRecord, RewardPeriodRecord, RewardShare};
pub use reward::RewardDistribution;
pub use snapshot::{PoolState, PositionSnapshot, TickRange, TotalAmounts, UncollectedFees, VaultRef};
pub use token::Token;
