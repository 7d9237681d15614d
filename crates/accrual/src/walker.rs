//! Period walker.
//!
//! Walks a vault's snapshots in block order, classifies each one as a period
//! start or end, validates every closed period and drives an
//! [`AccrualStrategy`] through its hooks.

use crate::config::AccrualSettings;
use crate::error::{AccrualError, Invariant};
use crate::invariants::{CheckOutcome, InvariantChecker, missing_history, violation};
use crate::marker::{MarkerKind, classify};
use crate::outcome::{WalkOutcome, WalkStatus, WalkWarning};
use crate::strategy::AccrualStrategy;
use hv_yield_data::{AccrualRecordSink, RemediationTrigger, SnapshotSource};
use hv_yield_domain::entities::{PositionSnapshot, RewardPeriodRecord, VaultRef};
use hv_yield_domain::value_objects::Window;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// A request to walk one vault over one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkRequest {
    pub vault: VaultRef,
    pub window: Window,
    /// Overrides [`AccrualSettings::try_solve_errors`] when set.
    pub try_solve_errors: Option<bool>,
}

impl WalkRequest {
    /// Creates a new request using the walker's remediation default.
    #[must_use]
    pub fn new(vault: VaultRef, window: Window) -> Self {
        Self {
            vault,
            window,
            try_solve_errors: None,
        }
    }

    /// Sets whether inconsistencies are remediated instead of failing.
    #[must_use]
    pub fn with_try_solve_errors(mut self, try_solve: bool) -> Self {
        self.try_solve_errors = Some(try_solve);
        self
    }
}

/// Traversal state carried between snapshots.
#[derive(Debug, Default)]
struct WalkState {
    last_item: Option<PositionSnapshot>,
    last_type: MarkerKind,
    periods: Vec<RewardPeriodRecord>,
    warnings: Vec<WalkWarning>,
}

impl WalkState {
    fn into_outcome(self, status: WalkStatus) -> WalkOutcome {
        WalkOutcome {
            status,
            periods: self.periods,
            aggregates: Vec::new(),
            warnings: self.warnings,
        }
    }
}

/// Reconciles snapshot histories into accrual periods.
///
/// The walker keeps no state between walks; independent vaults can be walked
/// concurrently through a shared reference.
pub struct PeriodWalker {
    source: Arc<dyn SnapshotSource>,
    checker: InvariantChecker,
    settings: AccrualSettings,
    cancel: CancellationToken,
}

impl PeriodWalker {
    /// Creates a new walker with default settings.
    #[must_use]
    pub fn new(source: Arc<dyn SnapshotSource>, remediation: Arc<dyn RemediationTrigger>) -> Self {
        Self {
            source,
            checker: InvariantChecker::new(remediation),
            settings: AccrualSettings::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the walk settings.
    #[must_use]
    pub fn with_settings(mut self, settings: AccrualSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the token checked between snapshots.
    #[must_use]
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &AccrualSettings {
        &self.settings
    }

    /// Token that stops walks in progress when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Walks `request.vault` over `request.window` with `strategy`.
    ///
    /// An empty history is not an error: the outcome has status
    /// [`WalkStatus::MissingData`]. Cancellation returns the periods closed
    /// so far with status [`WalkStatus::Cancelled`] and no aggregates.
    ///
    /// # Errors
    /// Returns an error if the window is malformed, a collaborator fails, the
    /// strategy fails, or the history breaks an invariant that cannot be
    /// remediated.
    pub async fn walk<S>(
        &self,
        request: &WalkRequest,
        strategy: &mut S,
    ) -> Result<WalkOutcome, AccrualError>
    where
        S: AccrualStrategy + ?Sized,
    {
        request.window.validate()?;
        let vault = &request.vault;
        let try_solve = request
            .try_solve_errors
            .unwrap_or(self.settings.try_solve_errors);

        info!(
            vault = %vault,
            strategy = strategy.name(),
            window = ?request.window,
            try_solve,
            "Starting accrual walk"
        );

        let mut items = self.source.fetch(vault, &request.window).await?;
        if items.is_empty() {
            warn!(vault = %vault, window = ?request.window, "No snapshots found for window");
            return Ok(WalkOutcome::missing_data());
        }
        items.sort_by_key(|item| item.block);

        let mut state = WalkState::default();
        self.check_first_item(request, &items[0], try_solve, &mut state)
            .await?;

        strategy.pre_loop(vault, &request.window).await?;

        let count = items.len();
        for (index, item) in items.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Ok(self.cancelled(vault, state, strategy));
            }
            self.step(vault, strategy, &mut state, index, item, try_solve)
                .await?;
        }

        if state.last_type == MarkerKind::Start {
            if self.cancel.is_cancelled() {
                return Ok(self.cancelled(vault, state, strategy));
            }
            self.walk_terminal(request, strategy, &mut state, count, try_solve)
                .await?;
        }

        let aggregates = strategy.post_loop().await?;
        for warning in strategy.drain_warnings() {
            warn!(vault = %vault, %warning, "Computation warning");
            state.warnings.push(WalkWarning::Computation(warning));
        }

        info!(
            vault = %vault,
            periods = state.periods.len(),
            aggregates = aggregates.len(),
            warnings = state.warnings.len(),
            "Accrual walk completed"
        );

        Ok(WalkOutcome {
            status: WalkStatus::Completed,
            periods: state.periods,
            aggregates,
            warnings: state.warnings,
        })
    }

    /// Walks and upserts the resulting aggregates into `sink`.
    ///
    /// Nothing is stored unless the walk completed.
    ///
    /// # Errors
    /// Returns an error if the walk or the sink fails.
    pub async fn walk_into<S>(
        &self,
        request: &WalkRequest,
        strategy: &mut S,
        sink: &dyn AccrualRecordSink,
    ) -> Result<WalkOutcome, AccrualError>
    where
        S: AccrualStrategy + ?Sized,
    {
        let outcome = self.walk(request, strategy).await?;
        if outcome.is_completed() && !outcome.aggregates.is_empty() {
            sink.upsert(&outcome.aggregates).await?;
            debug!(vault = %request.vault, records = outcome.aggregates.len(), "Aggregates stored");
        }
        Ok(outcome)
    }

    // Uncollected fees on the first snapshot mean accrual happened before it.
    async fn check_first_item(
        &self,
        request: &WalkRequest,
        first: &PositionSnapshot,
        try_solve: bool,
        state: &mut WalkState,
    ) -> Result<(), AccrualError> {
        if !first.has_uncollected_fees() {
            return Ok(());
        }

        if request.window.has_explicit_start() {
            debug!(
                vault = %request.vault,
                block = first.block,
                "Uncollected fees on first snapshot of a bounded window"
            );
            state.warnings.push(WalkWarning::MissingHistoryIgnored { block: first.block });
            return Ok(());
        }

        if !try_solve {
            let err = missing_history(first);
            error!(vault = %request.vault, block = first.block, %err, "Missing history");
            return Err(err.into());
        }

        let from = self
            .source
            .creation_block(&request.vault)
            .await?
            .unwrap_or(0);
        warn!(
            vault = %request.vault,
            block_ini = from,
            block_end = first.block,
            "Uncollected fees on first snapshot, requesting backfill"
        );
        self.checker.remediate(first, from, first.block).await;
        state.warnings.push(WalkWarning::MissingHistoryRemediated {
            block_ini: from,
            block_end: first.block,
        });
        Ok(())
    }

    async fn step<S>(
        &self,
        vault: &VaultRef,
        strategy: &mut S,
        state: &mut WalkState,
        index: usize,
        mut item: PositionSnapshot,
        try_solve: bool,
    ) -> Result<(), AccrualError>
    where
        S: AccrualStrategy + ?Sized,
    {
        strategy.in_loop(&mut item).await?;

        let marker = classify(&item, state.last_item.as_ref(), &self.settings);
        debug!(
            vault = %vault,
            block = item.block,
            marker = %marker,
            last = %state.last_type,
            "Classified snapshot"
        );

        let closes_period = marker == MarkerKind::End && state.last_type == MarkerKind::Start;
        if !closes_period {
            if let Some(last) = &state.last_item {
                InvariantChecker::check_fee_growth(last, &item).inspect_err(|err| {
                    error!(vault = %vault, %err, "Fee growth check failed");
                })?;
            }
        }

        match marker {
            MarkerKind::End => self.on_end(vault, strategy, state, index, &item, try_solve).await?,
            MarkerKind::Start => self.on_start(vault, strategy, state, &item).await?,
            MarkerKind::None => {}
        }

        state.last_item = Some(item);
        Ok(())
    }

    async fn on_end<S>(
        &self,
        vault: &VaultRef,
        strategy: &mut S,
        state: &mut WalkState,
        index: usize,
        item: &PositionSnapshot,
        try_solve: bool,
    ) -> Result<(), AccrualError>
    where
        S: AccrualStrategy + ?Sized,
    {
        match (&state.last_item, state.last_type) {
            (Some(start), MarkerKind::Start) => {
                let checked = self
                    .checker
                    .check(start, item, try_solve)
                    .await
                    .inspect_err(|err| error!(vault = %vault, %err, "Period validation failed"))?;
                if let CheckOutcome::Remediated {
                    block_ini,
                    block_end,
                } = checked
                {
                    state.warnings.push(WalkWarning::Remediated {
                        block_ini,
                        block_end,
                    });
                }

                let records = strategy.end_item(start, item).await?;
                debug!(
                    vault = %vault,
                    block_ini = start.block,
                    block_end = item.block,
                    records = records.len(),
                    "Closed period"
                );
                state.periods.extend(records);
            }
            _ if index == 0 => {
                debug!(vault = %vault, block = item.block, "Discarding leading end");
                state
                    .warnings
                    .push(WalkWarning::DiscardedLeadingEnd { block: item.block });
            }
            (last, _) => {
                let last = last.as_ref().unwrap_or(item);
                let err = violation(last, item, Invariant::DuplicateEnd);
                error!(vault = %vault, %err, "Duplicate period end");
                return Err(err.into());
            }
        }

        state.last_type = MarkerKind::End;
        Ok(())
    }

    async fn on_start<S>(
        &self,
        vault: &VaultRef,
        strategy: &mut S,
        state: &mut WalkState,
        item: &PositionSnapshot,
    ) -> Result<(), AccrualError>
    where
        S: AccrualStrategy + ?Sized,
    {
        if let (Some(last), MarkerKind::Start) = (&state.last_item, state.last_type) {
            if item.follows_directly(last) && self.settings.tolerate_consecutive_starts {
                warn!(
                    vault = %vault,
                    block_ini = last.block,
                    block_end = item.block,
                    "Consecutive period starts"
                );
                state.warnings.push(WalkWarning::ConsecutiveStart {
                    block_ini: last.block,
                    block_end: item.block,
                });
            } else {
                let err = violation(last, item, Invariant::DuplicateStart);
                error!(vault = %vault, %err, "Duplicate period start");
                return Err(err.into());
            }
        }

        strategy.start_item(item).await?;
        state.last_type = MarkerKind::Start;
        Ok(())
    }

    // The window ends past the last sample while a period is still open.
    async fn walk_terminal<S>(
        &self,
        request: &WalkRequest,
        strategy: &mut S,
        state: &mut WalkState,
        index: usize,
        try_solve: bool,
    ) -> Result<(), AccrualError>
    where
        S: AccrualStrategy + ?Sized,
    {
        let Some((last_block, last_timestamp)) =
            state.last_item.as_ref().map(|s| (s.block, s.timestamp))
        else {
            return Ok(());
        };
        let Some(bound) = request
            .window
            .terminal_bound_after(last_block, last_timestamp)
        else {
            return Ok(());
        };

        match strategy.scrape_last(&request.vault, bound).await? {
            Some(terminal) if terminal.block > last_block => {
                debug!(
                    vault = %request.vault,
                    block = terminal.block,
                    ?bound,
                    "Walking terminal snapshot"
                );
                self.step(&request.vault, strategy, state, index, terminal, try_solve)
                    .await
            }
            _ => {
                info!(vault = %request.vault, ?bound, "No terminal snapshot available");
                state.warnings.push(WalkWarning::TerminalUnavailable { bound });
                Ok(())
            }
        }
    }

    fn cancelled<S>(&self, vault: &VaultRef, mut state: WalkState, strategy: &mut S) -> WalkOutcome
    where
        S: AccrualStrategy + ?Sized,
    {
        info!(vault = %vault, periods = state.periods.len(), "Accrual walk cancelled");
        state
            .warnings
            .extend(strategy.drain_warnings().into_iter().map(WalkWarning::Computation));
        state.into_outcome(WalkStatus::Cancelled)
    }
}
