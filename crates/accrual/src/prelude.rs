//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use hv_yield_accrual::prelude::*;
//! ```

// Settings and errors
pub use crate::config::AccrualSettings;
pub use crate::error::{AccrualError, Invariant, SettingsError, ValidationError};

// Walking
pub use crate::invariants::{CheckOutcome, InvariantChecker};
pub use crate::marker::{MarkerKind, classify};
pub use crate::outcome::{WalkOutcome, WalkStatus, WalkWarning};
pub use crate::walker::{PeriodWalker, WalkRequest};

// Strategies
pub use crate::cache::{CacheKey, ReadCache};
pub use crate::strategies::GaugeRewardStrategy;
pub use crate::strategy::AccrualStrategy;
