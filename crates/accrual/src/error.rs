//! Error taxonomy for accrual walks.

use hv_yield_domain::enums::Chain;
use hv_yield_domain::value_objects::{AmountError, WindowError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cross-snapshot rule that a pair of snapshots broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum Invariant {
    #[error("total supply changed between consecutive blocks")]
    SupplyChangedAtConsecutiveBlocks,
    #[error("total supply changed without a recorded operation")]
    SupplyChangedWithoutOperation,
    #[error("fee growth of token{token} decreased")]
    FeeGrowthDecreased { token: u8 },
    #[error("period start follows another start")]
    DuplicateStart,
    #[error("period end follows another end")]
    DuplicateEnd,
    #[error("uncollected fees before the first snapshot")]
    MissingHistory,
}

/// Fatal inconsistency in a vault's snapshot history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{invariant} for {chain}:{vault} between blocks {block_ini} and {block_end}")]
pub struct ValidationError {
    pub chain: Chain,
    pub vault: String,
    pub block_ini: u64,
    pub block_end: u64,
    pub invariant: Invariant,
}

/// Errors a walk can end with.
#[derive(Debug, Error)]
pub enum AccrualError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid window: {0}")]
    InvalidWindow(#[from] WindowError),

    #[error("Amount conversion failed: {0}")]
    Amount(#[from] AmountError),

    #[error("Collaborator failed: {0:#}")]
    Collaborator(#[from] anyhow::Error),
}

impl AccrualError {
    /// The violated invariant, for validation failures.
    #[must_use]
    pub fn invariant(&self) -> Option<Invariant> {
        match self {
            AccrualError::Validation(err) => Some(err.invariant),
            _ => None,
        }
    }
}

/// A settings variable that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value {value:?} for {key}")]
pub struct SettingsError {
    pub key: &'static str,
    pub value: String,
}
