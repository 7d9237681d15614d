//! Period boundary classification.

use crate::config::AccrualSettings;
use hv_yield_domain::entities::PositionSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a snapshot in the period sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Nothing classified yet.
    #[default]
    None,
    /// Position changed here; a new accrual period opens.
    Start,
    /// Quiet snapshot closing the open period.
    End,
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MarkerKind::None => "none",
            MarkerKind::Start => "start",
            MarkerKind::End => "end",
        })
    }
}

/// Classifies `current` as a period start or end.
///
/// A snapshot is an end marker when it carries no operation tags, or when
/// none of its recognized tags is relevant under `settings` and its supply matches `last`'s. Anything
/// else opens a period. Without a `last` item, a snapshot carrying only
/// irrelevant tags has nothing to compare against and is a start.
#[must_use]
pub fn classify(
    current: &PositionSnapshot,
    last: Option<&PositionSnapshot>,
    settings: &AccrualSettings,
) -> MarkerKind {
    if !current.has_operations() {
        return MarkerKind::End;
    }

    let has_relevant = current
        .recognized_operations()
        .any(|op| settings.is_relevant(op));
    let supply_unchanged = last.is_some_and(|last| last.total_supply == current.total_supply);

    if !has_relevant && supply_unchanged {
        MarkerKind::End
    } else {
        MarkerKind::Start
    }
}
