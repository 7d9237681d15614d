//! Accrual strategy implementations, one per reward distribution mechanism.

mod gauge;

pub use gauge::GaugeRewardStrategy;
