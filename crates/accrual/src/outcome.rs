//! What a walk hands back.

use hv_yield_domain::entities::{AggregateAccrualRecord, RewardPeriodRecord};
use hv_yield_domain::metrics::ComputationWarning;
use hv_yield_domain::value_objects::WindowBound;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkStatus {
    Completed,
    /// The source had no snapshots for the window.
    MissingData,
    /// Stopped through the cancellation token; results are partial.
    Cancelled,
}

/// Problem recovered from during a walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WalkWarning {
    /// Supply changed across a gap; a backfill was requested.
    Remediated { block_ini: u64, block_end: u64 },
    /// A start right after a start at the next block.
    ConsecutiveStart { block_ini: u64, block_end: u64 },
    /// The first snapshot was an end with no open period.
    DiscardedLeadingEnd { block: u64 },
    /// Uncollected fees on the first snapshot of an explicitly bounded window.
    MissingHistoryIgnored { block: u64 },
    /// Uncollected fees on the first snapshot; history was backfilled.
    MissingHistoryRemediated { block_ini: u64, block_end: u64 },
    /// The window ended on a start and no terminal snapshot was available.
    TerminalUnavailable { bound: WindowBound },
    Computation(ComputationWarning),
}

impl fmt::Display for WalkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkWarning::Remediated {
                block_ini,
                block_end,
            } => write!(f, "supply gap {block_ini}..{block_end} sent for backfill"),
            WalkWarning::ConsecutiveStart {
                block_ini,
                block_end,
            } => write!(f, "consecutive starts at {block_ini} and {block_end}"),
            WalkWarning::DiscardedLeadingEnd { block } => {
                write!(f, "leading end at {block} discarded")
            }
            WalkWarning::MissingHistoryIgnored { block } => {
                write!(f, "uncollected fees at first block {block} ignored")
            }
            WalkWarning::MissingHistoryRemediated {
                block_ini,
                block_end,
            } => write!(f, "history {block_ini}..{block_end} sent for backfill"),
            WalkWarning::TerminalUnavailable { bound } => {
                write!(f, "no terminal snapshot at {bound:?}")
            }
            WalkWarning::Computation(warning) => warning.fmt(f),
        }
    }
}

/// Records and diagnostics produced by one walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkOutcome {
    pub status: WalkStatus,
    /// Period records, in walk order.
    pub periods: Vec<RewardPeriodRecord>,
    pub aggregates: Vec<AggregateAccrualRecord>,
    pub warnings: Vec<WalkWarning>,
}

impl WalkOutcome {
    /// Outcome of a walk over a window with no snapshots.
    #[must_use]
    pub fn missing_data() -> Self {
        Self {
            status: WalkStatus::MissingData,
            periods: Vec::new(),
            aggregates: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == WalkStatus::Completed
    }

    /// Computation warnings only.
    pub fn computation_warnings(&self) -> impl Iterator<Item = &ComputationWarning> {
        self.warnings.iter().filter_map(|w| match w {
            WalkWarning::Computation(inner) => Some(inner),
            _ => None,
        })
    }
}
