//! Full walks with the gauge strategy over in-memory collaborators.

use hv_yield_accrual::prelude::*;
use hv_yield_data::{
    InMemoryRecordSink, InMemoryRewardSource, InMemorySnapshotSource,
    RecordingRemediationTrigger, StaticPriceOracle, StaticTerminalResolver,
};
use hv_yield_domain::entities::{
    PoolState, PositionSnapshot, RewardDistribution, TickRange, Token, TotalAmounts,
    UncollectedFees, VaultRef,
};
use hv_yield_domain::enums::{Chain, OperationKind};
use hv_yield_domain::metrics::ComputationWarning;
use hv_yield_domain::value_objects::{Window, WindowBound};
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

const FIXTURE: &str = include_str!("../../data/fixtures/polygon_snapshots.json");
const FIXTURE_VAULT: &str = "0x02203f2351e7ac6ab5051205172d3f772db7d814";
const OTHER_VAULT: &str = "0x6b7635b7d2e85188db41c3c05b1efa87b143fce8";
const USDC: &str = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174";
const WETH: &str = "0x7ceb23fd6bc0add59e62ac25578270cff1b9f619";
const WMATIC: &str = "0x0d500b1d8e8ef31e21c99d1db9a6444d3adf1270";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn vault() -> VaultRef {
    VaultRef::new(Chain::Polygon, FIXTURE_VAULT)
}

fn snapshot(block: u64, timestamp: u64, supply: u64, ops: &[OperationKind]) -> PositionSnapshot {
    PositionSnapshot {
        chain: Chain::Polygon,
        address: FIXTURE_VAULT.to_string(),
        block,
        timestamp,
        decimals: 18,
        total_supply: U256::from(supply) * U256::exp10(18),
        pool: PoolState {
            address: "0x45dda9cb7c25131df268515131f647d726f50608".to_string(),
            token0: Token::new(USDC, "USDC", 6),
            token1: Token::new(WETH, "WETH", 18),
            liquidity: 1_500_000,
            fee_growth_global0: U256::from(block),
            fee_growth_global1: U256::from(block),
            tick: 201_234,
        },
        base_position: TickRange::default(),
        limit_position: TickRange::default(),
        total_amounts: TotalAmounts {
            total0: dec!(3600),
            total1: Decimal::ZERO,
        },
        fees_uncollected: UncollectedFees::default(),
        operations: ops.to_vec(),
        distributions: vec![],
    }
}

fn rewards(base_per_second: Decimal) -> InMemoryRewardSource {
    let wmatic = Token::new(WMATIC, "WMATIC", 18);
    let gauge = RewardDistribution::new("0xgauge", wmatic, base_per_second, Decimal::ZERO);
    InMemoryRewardSource::new()
        .with_distributions(vault(), 0, vec![gauge.clone()])
        .with_distributions(VaultRef::new(Chain::Polygon, OTHER_VAULT), 0, vec![gauge])
}

fn oracle() -> StaticPriceOracle {
    StaticPriceOracle::new()
        .with_price(Chain::Polygon, USDC, 0, dec!(1))
        .with_price(Chain::Polygon, WETH, 0, dec!(2000))
        .with_price(Chain::Polygon, WMATIC, 0, dec!(1))
}

fn gauge(resolver: StaticTerminalResolver) -> GaugeRewardStrategy {
    GaugeRewardStrategy::new(
        Arc::new(rewards(dec!(0.01))),
        Arc::new(oracle()),
        Arc::new(resolver),
    )
}

fn walker(source: InMemorySnapshotSource) -> (PeriodWalker, RecordingRemediationTrigger) {
    let trigger = RecordingRemediationTrigger::new();
    (
        PeriodWalker::new(Arc::new(source), Arc::new(trigger.clone())),
        trigger,
    )
}

#[tokio::test]
async fn test_single_hour_period_end_to_end() {
    init_tracing();
    let source = InMemorySnapshotSource::new().with_snapshots([
        snapshot(100, 0, 1000, &[OperationKind::Deposit]),
        snapshot(105, 3_600, 1000, &[]),
    ]);
    let (walker, _) = walker(source);
    let mut strategy = gauge(StaticTerminalResolver::new());

    let outcome = walker
        .walk(
            &WalkRequest::new(vault(), Window::blocks(100, 105)),
            &mut strategy,
        )
        .await
        .unwrap();

    assert_eq!(outcome.status, WalkStatus::Completed);
    assert_eq!(outcome.periods.len(), 1);
    let period = &outcome.periods[0];
    assert_eq!(period.time_passed, 3_600);
    assert_eq!(period.total_rewards_usd(), dec!(36));
    assert_eq!(period.tvl_usd, dec!(3600));
    assert_eq!(period.period_yield, dec!(0.01));

    assert_eq!(outcome.aggregates.len(), 1);
    let aggregate = &outcome.aggregates[0];
    assert_eq!(aggregate.apr, dec!(87.6));
    assert_eq!(aggregate.reward_token.symbol, "WMATIC");
    assert_eq!(aggregate.key().block, 105);
    assert!(
        outcome
            .computation_warnings()
            .any(|w| matches!(w, ComputationWarning::ApyOverflow { .. }))
    );
}

#[tokio::test]
async fn test_fixture_history_compounds_two_periods() {
    init_tracing();
    let (walker, trigger) = walker(InMemorySnapshotSource::from_json(FIXTURE).unwrap());
    let mut strategy = gauge(StaticTerminalResolver::new());
    let sink = InMemoryRecordSink::new();

    let outcome = walker
        .walk_into(
            &WalkRequest::new(vault(), Window::blocks(0, 120)),
            &mut strategy,
            &sink,
        )
        .await
        .unwrap();

    let blocks: Vec<(u64, u64)> = outcome
        .periods
        .iter()
        .map(|p| (p.block_ini, p.block_end))
        .collect();
    assert_eq!(blocks, vec![(100, 105), (110, 120)]);
    assert_eq!(outcome.periods[1].period_yield, dec!(0.02));

    // (1.01 * 1.02 - 1) over three hours
    let aggregate = &outcome.aggregates[0];
    assert_eq!(aggregate.extra.cumulative_return, dec!(0.0302));
    assert_eq!(aggregate.extra.total_seconds, 10_800);
    assert_eq!(aggregate.apr, dec!(88.184));
    assert_eq!(aggregate.share_price_usd, dec!(4));

    assert_eq!(sink.records().await, outcome.aggregates);
    assert_eq!(trigger.calls().await, 0);
}

#[tokio::test]
async fn test_empty_window_reports_missing_data() {
    let (walker, _) = walker(InMemorySnapshotSource::from_json(FIXTURE).unwrap());
    let mut strategy = gauge(StaticTerminalResolver::new());
    let sink = InMemoryRecordSink::new();

    let outcome = walker
        .walk_into(
            &WalkRequest::new(vault(), Window::blocks(1_000, 2_000)),
            &mut strategy,
            &sink,
        )
        .await
        .unwrap();

    assert_eq!(outcome.status, WalkStatus::MissingData);
    assert!(outcome.periods.is_empty());
    assert!(sink.is_empty().await);
}

#[tokio::test]
async fn test_supply_gap_triggers_single_backfill() {
    init_tracing();
    let source = InMemorySnapshotSource::new().with_snapshots([
        snapshot(100, 0, 1000, &[OperationKind::Deposit]),
        snapshot(200, 1_200, 1200, &[]),
        snapshot(210, 1_320, 1200, &[OperationKind::Rebalance]),
        snapshot(220, 1_440, 1200, &[]),
    ]);
    let (walker, trigger) = walker(source);
    let walker = walker.with_settings(AccrualSettings::default().with_try_solve_errors(true));

    let outcome = walker
        .walk(
            &WalkRequest::new(vault(), Window::blocks(100, 220)),
            &mut gauge(StaticTerminalResolver::new()),
        )
        .await
        .unwrap();

    assert_eq!(outcome.periods.len(), 2);
    assert_eq!(
        outcome.warnings.first(),
        Some(&WalkWarning::Remediated {
            block_ini: 100,
            block_end: 200
        })
    );
    let requests = trigger.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].vault, FIXTURE_VAULT);
}

#[tokio::test]
async fn test_request_can_refuse_remediation() {
    let source = InMemorySnapshotSource::new().with_snapshots([
        snapshot(100, 0, 1000, &[OperationKind::Deposit]),
        snapshot(200, 1_200, 1200, &[]),
    ]);
    let (walker, trigger) = walker(source);
    let walker = walker.with_settings(AccrualSettings::default().with_try_solve_errors(true));

    let err = walker
        .walk(
            &WalkRequest::new(vault(), Window::blocks(100, 200)).with_try_solve_errors(false),
            &mut gauge(StaticTerminalResolver::new()),
        )
        .await
        .unwrap_err();

    assert_eq!(err.invariant(), Some(Invariant::SupplyChangedWithoutOperation));
    assert!(err.to_string().contains("between blocks 100 and 200"));
    assert_eq!(trigger.calls().await, 0);
}

#[tokio::test]
async fn test_terminal_snapshot_extends_open_window() {
    init_tracing();
    let source = InMemorySnapshotSource::new().with_snapshots([
        snapshot(100, 0, 1000, &[OperationKind::Deposit]),
        snapshot(105, 3_600, 1000, &[]),
        snapshot(110, 7_200, 1000, &[OperationKind::Deposit]),
    ]);
    let resolver = StaticTerminalResolver::new().with_snapshot(snapshot(150, 10_800, 1000, &[]));
    let (walker, _) = walker(source);
    let mut strategy = gauge(resolver);

    let outcome = walker
        .walk(
            &WalkRequest::new(vault(), Window::blocks(100, 150)),
            &mut strategy,
        )
        .await
        .unwrap();

    let last = outcome.periods.last().unwrap();
    assert_eq!((last.block_ini, last.block_end), (110, 150));
    assert_eq!(outcome.aggregates[0].block, 150);
    assert_eq!(outcome.aggregates[0].extra.periods, 2);
}

#[tokio::test]
async fn test_cancelled_walk_returns_nothing() {
    let (walker, _) = walker(InMemorySnapshotSource::from_json(FIXTURE).unwrap());
    let token = walker.cancellation_token();
    token.cancel();

    let outcome = walker
        .walk(
            &WalkRequest::new(vault(), Window::blocks(0, 120)),
            &mut gauge(StaticTerminalResolver::new()),
        )
        .await
        .unwrap();

    assert_eq!(outcome.status, WalkStatus::Cancelled);
    assert!(outcome.periods.is_empty());
    assert!(outcome.aggregates.is_empty());
}

#[tokio::test]
async fn test_vaults_walk_concurrently() {
    let (walker, _) = walker(InMemorySnapshotSource::from_json(FIXTURE).unwrap());
    let window = Window::blocks(0, 1_000);
    let first = WalkRequest::new(vault(), window.clone());
    let second = WalkRequest::new(VaultRef::new(Chain::Polygon, OTHER_VAULT), window);
    let mut first_strategy = gauge(StaticTerminalResolver::new());
    let mut second_strategy = gauge(StaticTerminalResolver::new());

    let (first, second) = tokio::join!(
        walker.walk(&first, &mut first_strategy),
        walker.walk(&second, &mut second_strategy),
    );

    assert_eq!(first.unwrap().periods.len(), 2);

    // a single start and no terminal snapshot: nothing accrues
    let second = second.unwrap();
    assert!(second.periods.is_empty());
    assert_eq!(
        second.warnings,
        vec![WalkWarning::TerminalUnavailable {
            bound: WindowBound::Block(1_000)
        }]
    );
}
