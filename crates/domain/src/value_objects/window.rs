//! Block/time window a walk is requested for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("window needs an end bound (timestamp_end or block_end) or only_use_last_items")]
    MissingEndBound,
    #[error("timestamp_ini {ini} is after timestamp_end {end}")]
    InvertedTimestamps { ini: u64, end: u64 },
    #[error("block_ini {ini} is after block_end {end}")]
    InvertedBlocks { ini: u64, end: u64 },
    #[error("only_use_last_items must be greater than zero")]
    EmptyTail,
    #[error("date {0} is before the unix epoch")]
    NegativeTimestamp(DateTime<Utc>),
}

/// A single window bound, either a block number or a unix timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowBound {
    Block(u64),
    Timestamp(u64),
}

/// Query window over a vault's snapshot history.
///
/// Lower bound: `timestamp_ini` wins over `block_ini` when both are set.
/// Upper bound: both `timestamp_end` and `block_end` apply when set.
/// `only_use_last_items` keeps only that many trailing snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub timestamp_ini: Option<u64>,
    pub timestamp_end: Option<u64>,
    pub block_ini: Option<u64>,
    pub block_end: Option<u64>,
    pub only_use_last_items: Option<usize>,
}

impl Window {
    /// Window over a block range.
    #[must_use]
    pub fn blocks(block_ini: u64, block_end: u64) -> Self {
        Self {
            block_ini: Some(block_ini),
            block_end: Some(block_end),
            ..Self::default()
        }
    }

    /// Window over a unix timestamp range.
    #[must_use]
    pub fn timestamps(timestamp_ini: u64, timestamp_end: u64) -> Self {
        Self {
            timestamp_ini: Some(timestamp_ini),
            timestamp_end: Some(timestamp_end),
            ..Self::default()
        }
    }

    /// Window ending at `timestamp_end` with an open lower bound.
    #[must_use]
    pub fn until_timestamp(timestamp_end: u64) -> Self {
        Self {
            timestamp_end: Some(timestamp_end),
            ..Self::default()
        }
    }

    /// Window ending at `block_end` with an open lower bound.
    #[must_use]
    pub fn until_block(block_end: u64) -> Self {
        Self {
            block_end: Some(block_end),
            ..Self::default()
        }
    }

    /// Window made of the last `items` snapshots.
    #[must_use]
    pub fn last_items(items: usize) -> Self {
        Self {
            only_use_last_items: Some(items),
            ..Self::default()
        }
    }

    /// Window between two dates.
    ///
    /// # Errors
    /// Returns an error if either date precedes the unix epoch.
    pub fn between_dates(ini: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        let to_secs = |date: DateTime<Utc>| {
            u64::try_from(date.timestamp()).map_err(|_| WindowError::NegativeTimestamp(date))
        };
        Ok(Self::timestamps(to_secs(ini)?, to_secs(end)?))
    }

    /// Sets the block end bound.
    #[must_use]
    pub fn with_block_end(mut self, block_end: u64) -> Self {
        self.block_end = Some(block_end);
        self
    }

    /// Sets the trailing item cap.
    #[must_use]
    pub fn with_last_items(mut self, items: usize) -> Self {
        self.only_use_last_items = Some(items);
        self
    }

    /// Checks the window is well formed.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), WindowError> {
        if self.timestamp_end.is_none()
            && self.block_end.is_none()
            && self.only_use_last_items.is_none()
        {
            return Err(WindowError::MissingEndBound);
        }
        if let (Some(ini), Some(end)) = (self.timestamp_ini, self.timestamp_end) {
            if ini > end {
                return Err(WindowError::InvertedTimestamps { ini, end });
            }
        }
        if let (Some(ini), Some(end)) = (self.block_ini, self.block_end) {
            if ini > end {
                return Err(WindowError::InvertedBlocks { ini, end });
            }
        }
        if self.only_use_last_items == Some(0) {
            return Err(WindowError::EmptyTail);
        }
        Ok(())
    }

    /// Whether the caller pinned where history starts.
    ///
    /// Uncollected fees on the first snapshot are expected in that case.
    #[must_use]
    pub fn has_explicit_start(&self) -> bool {
        self.timestamp_ini.is_some() || self.block_ini.is_some() || self.only_use_last_items.is_some()
    }

    /// Lower bound, timestamps taking priority.
    #[must_use]
    pub fn lower_bound(&self) -> Option<WindowBound> {
        self.timestamp_ini
            .map(WindowBound::Timestamp)
            .or(self.block_ini.map(WindowBound::Block))
    }

    /// Whether a snapshot at `block`/`timestamp` falls inside the window.
    ///
    /// `only_use_last_items` is not applied here; it is a cap on the result.
    #[must_use]
    pub fn admits(&self, block: u64, timestamp: u64) -> bool {
        let above_lower = match self.lower_bound() {
            Some(WindowBound::Timestamp(ini)) => timestamp >= ini,
            Some(WindowBound::Block(ini)) => block >= ini,
            None => true,
        };
        let below_upper = self.timestamp_end.is_none_or(|end| timestamp <= end)
            && self.block_end.is_none_or(|end| block <= end);
        above_lower && below_upper
    }

    /// Bound past the last walked snapshot that still needs a terminal item.
    ///
    /// A block end is preferred; the timestamp end is only used when no block
    /// end was given.
    #[must_use]
    pub fn terminal_bound_after(&self, last_block: u64, last_timestamp: u64) -> Option<WindowBound> {
        match (self.block_end, self.timestamp_end) {
            (Some(block_end), _) if block_end > last_block => Some(WindowBound::Block(block_end)),
            (Some(_), _) => None,
            (None, Some(ts_end)) if ts_end > last_timestamp => Some(WindowBound::Timestamp(ts_end)),
            _ => None,
        }
    }
}
