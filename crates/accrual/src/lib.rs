//! Reward accrual over hypervisor snapshot histories.
//!
//! This crate turns an ordered, possibly noisy sequence of vault snapshots
//! into accrual periods and annualized reward yields:
//! - Period start/end classification
//! - Cross-snapshot invariant checks with optional remediation
//! - A period walker driving pluggable accrual strategies
//! - A gauge reward strategy built on the shared yield accumulator

/// Prelude module for convenient imports.
pub mod prelude;

/// Strategy-scoped read cache.
pub mod cache;
/// Walk settings.
pub mod config;
/// Error taxonomy.
pub mod error;
/// Cross-snapshot invariant checks.
pub mod invariants;
/// Period boundary classification.
pub mod marker;
/// Walk results and warnings.
pub mod outcome;
/// Accrual strategy implementations.
pub mod strategies;
/// Accrual strategy trait.
pub mod strategy;
/// Period walker.
pub mod walker;

#[cfg(test)]
mod testing;
