//! Gauge reward strategy.
//!
//! Gauges emit reward tokens at a per-second rate split into a base part and
//! a boosted part. Rewards for a period are the rates active at its start
//! multiplied by its length, valued at the period's end block.

use crate::cache::{CacheKey, ReadCache};
use crate::config::AccrualSettings;
use crate::error::AccrualError;
use crate::strategy::AccrualStrategy;
use async_trait::async_trait;
use futures::future::join_all;
use hv_yield_data::{PriceOracle, RewardDataSource, TerminalSnapshotResolver};
use hv_yield_domain::entities::{
    AccrualExtra, AggregateAccrualRecord, PositionSnapshot, RewardDistribution,
    RewardPeriodRecord, RewardShare, Token, VaultRef,
};
use hv_yield_domain::enums::Chain;
use hv_yield_domain::metrics::{ComputationWarning, PeriodInput, YieldAccumulator};
use hv_yield_domain::value_objects::{Window, WindowBound};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Prices and rates at the last closed period of a reward token.
#[derive(Debug, Clone, Copy)]
struct Evaluation {
    block: u64,
    timestamp: u64,
    reward_price: Decimal,
    price0: Decimal,
    price1: Decimal,
    share_price: Decimal,
    base_rewards_per_second: Decimal,
    boosted_rewards_per_second: Decimal,
}

/// Running totals for one reward token.
#[derive(Debug, Clone)]
struct TokenAccrual {
    token: Token,
    accumulator: YieldAccumulator,
    evaluation: Option<Evaluation>,
}

/// Emissions of one reward token over a period.
struct TokenRewards<'a> {
    token: &'a Token,
    distributions: Vec<&'a RewardDistribution>,
}

/// Amounts accrued by one reward token over a period.
#[derive(Debug, Default)]
struct Accrued {
    base_rewards_per_second: Decimal,
    boosted_rewards_per_second: Decimal,
    base_rewards: Decimal,
    boosted_rewards: Decimal,
    base_rewards_usd: Decimal,
    boosted_rewards_usd: Decimal,
    breakdown: Vec<RewardShare>,
}

impl TokenRewards<'_> {
    /// Rates times `seconds`, valued at `reward_price`; `None` on overflow.
    fn accrue(&self, seconds: Decimal, reward_price: Decimal) -> Option<Accrued> {
        let mut base_rps = Decimal::ZERO;
        let mut boosted_rps = Decimal::ZERO;
        let mut breakdown = Vec::with_capacity(self.distributions.len());
        for distribution in &self.distributions {
            base_rps = base_rps.checked_add(distribution.base_rewards_per_second)?;
            boosted_rps = boosted_rps.checked_add(distribution.boosted_rewards_per_second)?;
            let amount = distribution.rewards_per_second()?.checked_mul(seconds)?;
            breakdown.push(RewardShare {
                source: distribution.rewarder.clone(),
                amount,
                amount_usd: amount.checked_mul(reward_price)?,
            });
        }

        let base_rewards = base_rps.checked_mul(seconds)?;
        let boosted_rewards = boosted_rps.checked_mul(seconds)?;
        Some(Accrued {
            base_rewards_per_second: base_rps,
            boosted_rewards_per_second: boosted_rps,
            base_rewards,
            boosted_rewards,
            base_rewards_usd: base_rewards.checked_mul(reward_price)?,
            boosted_rewards_usd: boosted_rewards.checked_mul(reward_price)?,
            breakdown,
        })
    }
}

/// Accrual strategy for gauge-style base and boosted emissions.
pub struct GaugeRewardStrategy {
    rewards: Arc<dyn RewardDataSource>,
    prices: Arc<dyn PriceOracle>,
    resolver: Arc<dyn TerminalSnapshotResolver>,
    outlier_threshold: Decimal,
    vault: Option<VaultRef>,
    distribution_cache: ReadCache<Vec<RewardDistribution>>,
    price_cache: ReadCache<Option<Decimal>>,
    accruals: BTreeMap<String, TokenAccrual>,
    warnings: Vec<ComputationWarning>,
}

impl GaugeRewardStrategy {
    /// Creates a new gauge strategy.
    #[must_use]
    pub fn new(
        rewards: Arc<dyn RewardDataSource>,
        prices: Arc<dyn PriceOracle>,
        resolver: Arc<dyn TerminalSnapshotResolver>,
    ) -> Self {
        Self {
            rewards,
            prices,
            resolver,
            outlier_threshold: Decimal::ONE,
            vault: None,
            distribution_cache: ReadCache::new(),
            price_cache: ReadCache::new(),
            accruals: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Sets the period yield above which a period is rejected.
    #[must_use]
    pub fn with_outlier_threshold(mut self, threshold: Decimal) -> Self {
        self.outlier_threshold = threshold;
        self
    }

    /// Applies the walk settings this strategy honors.
    #[must_use]
    pub fn with_settings(self, settings: &AccrualSettings) -> Self {
        self.with_outlier_threshold(settings.outlier_threshold)
    }

    /// Number of cached chain reads.
    #[must_use]
    pub fn cached_reads(&self) -> usize {
        self.distribution_cache.len() + self.price_cache.len()
    }

    // Cached prices first; the rest are fetched concurrently.
    async fn prices_at(
        &mut self,
        chain: Chain,
        block: u64,
        tokens: &[&str],
    ) -> Result<BTreeMap<String, Decimal>, AccrualError> {
        let mut found: BTreeMap<String, Option<Decimal>> = BTreeMap::new();
        let mut missing = Vec::new();
        for token in tokens {
            match self.price_cache.get(&CacheKey::new(chain, *token, block)) {
                Some(price) => {
                    found.insert((*token).to_string(), price);
                }
                None => missing.push((*token).to_string()),
            }
        }

        let lookups = missing.into_iter().map(|token| {
            let oracle = Arc::clone(&self.prices);
            async move {
                let price = oracle.price(chain, &token, block).await;
                (token, price)
            }
        });
        for (token, price) in join_all(lookups).await {
            let price = price?;
            self.price_cache
                .insert(CacheKey::new(chain, token.as_str(), block), price);
            found.insert(token, price);
        }

        let mut prices = BTreeMap::new();
        for (token, price) in found {
            let price = price.unwrap_or_else(|| {
                self.warnings.push(ComputationWarning::MissingPrice {
                    token: token.clone(),
                    block,
                });
                Decimal::ZERO
            });
            prices.insert(token, price);
        }
        Ok(prices)
    }
}

#[async_trait]
impl AccrualStrategy for GaugeRewardStrategy {
    fn name(&self) -> &'static str {
        "Gauge Rewards"
    }

    async fn pre_loop(&mut self, vault: &VaultRef, _window: &Window) -> Result<(), AccrualError> {
        self.vault = Some(vault.clone());
        self.distribution_cache.clear();
        self.price_cache.clear();
        self.accruals.clear();
        self.warnings.clear();
        Ok(())
    }

    async fn in_loop(&mut self, item: &mut PositionSnapshot) -> Result<(), AccrualError> {
        if !item.distributions.is_empty() {
            return Ok(());
        }

        let key = CacheKey::new(item.chain, item.address.as_str(), item.block)
            .with_pool(item.pool.address.as_str());
        let distributions = match self.distribution_cache.get(&key) {
            Some(cached) => cached,
            None => {
                let fetched = self
                    .rewards
                    .distributions(&item.vault(), item.block)
                    .await?;
                self.distribution_cache.insert(key, fetched.clone());
                fetched
            }
        };

        debug!(
            vault = %item.address,
            block = item.block,
            distributions = distributions.len(),
            "Attached reward distributions"
        );
        item.distributions = distributions;
        Ok(())
    }

    async fn end_item(
        &mut self,
        start: &PositionSnapshot,
        end: &PositionSnapshot,
    ) -> Result<Vec<RewardPeriodRecord>, AccrualError> {
        if start.distributions.is_empty() {
            debug!(
                vault = %end.address,
                block_ini = start.block,
                block_end = end.block,
                "No reward distributions active for period"
            );
            return Ok(Vec::new());
        }

        let mut by_token: BTreeMap<&str, TokenRewards<'_>> = BTreeMap::new();
        for distribution in &start.distributions {
            by_token
                .entry(distribution.reward_token.address.as_str())
                .or_insert_with(|| TokenRewards {
                    token: &distribution.reward_token,
                    distributions: Vec::new(),
                })
                .distributions
                .push(distribution);
        }

        let token0 = end.pool.token0.address.as_str();
        let token1 = end.pool.token1.address.as_str();
        let mut tokens = vec![token0, token1];
        tokens.extend(by_token.keys().filter(|t| **t != token0 && **t != token1));
        let prices = self.prices_at(end.chain, end.block, &tokens).await?;
        let price_of = |token: &str| prices.get(token).copied().unwrap_or(Decimal::ZERO);

        let price0 = price_of(token0);
        let price1 = price_of(token1);
        // TVL and share price are shared by every reward token of the period
        let valuation = match (end.tvl_usd(price0, price1), end.share_price_usd(price0, price1)?) {
            (Some(tvl), Some(share_price)) => Some((tvl, share_price)),
            _ => None,
        };
        let time_passed = end.timestamp.saturating_sub(start.timestamp);
        let seconds = Decimal::from(time_passed);
        let threshold = self.outlier_threshold;

        let mut records = Vec::with_capacity(by_token.len());
        for (address, rewards) in by_token {
            let reward_price = price_of(address);
            let accrual = self
                .accruals
                .entry(address.to_string())
                .or_insert_with(|| TokenAccrual {
                    token: rewards.token.clone(),
                    accumulator: YieldAccumulator::new().with_outlier_threshold(threshold),
                    evaluation: None,
                });

            let accrued = valuation
                .and_then(|(tvl, share)| Some((tvl, share, rewards.accrue(seconds, reward_price)?)));
            let (derived, tvl_usd, share_price, accrued) = match accrued {
                Some((tvl_usd, share_price, accrued)) => {
                    let derived = accrual.accumulator.push(PeriodInput {
                        base_rewards_usd: accrued.base_rewards_usd,
                        boosted_rewards_usd: accrued.boosted_rewards_usd,
                        time_passed,
                        tvl_usd,
                    });
                    (derived, tvl_usd, share_price, accrued)
                }
                None => {
                    warn!(
                        vault = %end.address,
                        reward_token = %rewards.token.symbol,
                        block_ini = start.block,
                        block_end = end.block,
                        "Period usd values overflowed"
                    );
                    let derived = accrual.accumulator.push_overflowed(time_passed);
                    (derived, Decimal::ZERO, Decimal::ZERO, Accrued::default())
                }
            };
            self.warnings.extend(accrual.accumulator.take_warnings());
            accrual.evaluation = Some(Evaluation {
                block: end.block,
                timestamp: end.timestamp,
                reward_price,
                price0,
                price1,
                share_price,
                base_rewards_per_second: accrued.base_rewards_per_second,
                boosted_rewards_per_second: accrued.boosted_rewards_per_second,
            });

            debug!(
                vault = %end.address,
                reward_token = %rewards.token.symbol,
                block_ini = start.block,
                block_end = end.block,
                base_rewards_usd = %accrued.base_rewards_usd,
                boosted_rewards_usd = %accrued.boosted_rewards_usd,
                tvl_usd = %tvl_usd,
                period_yield = %derived.period_yield,
                "Accrued period rewards"
            );

            let rewarders: Vec<&str> = rewards
                .distributions
                .iter()
                .map(|d| d.rewarder.as_str())
                .collect();
            records.push(RewardPeriodRecord {
                chain: end.chain,
                vault: end.address.clone(),
                reward_token: rewards.token.clone(),
                rewarder: rewarders.join(","),
                block_ini: start.block,
                block_end: end.block,
                timestamp_ini: start.timestamp,
                timestamp_end: end.timestamp,
                time_passed,
                base_rewards: accrued.base_rewards,
                boosted_rewards: accrued.boosted_rewards,
                base_rewards_usd: accrued.base_rewards_usd,
                boosted_rewards_usd: accrued.boosted_rewards_usd,
                tvl_usd,
                period_yield: derived.period_yield,
                breakdown: accrued.breakdown,
            });
        }

        Ok(records)
    }

    async fn post_loop(&mut self) -> Result<Vec<AggregateAccrualRecord>, AccrualError> {
        let Some(vault) = self.vault.clone() else {
            return Ok(Vec::new());
        };
        debug!(
            vault = %vault,
            distribution_hits = self.distribution_cache.hits(),
            distribution_misses = self.distribution_cache.misses(),
            price_hits = self.price_cache.hits(),
            price_misses = self.price_cache.misses(),
            "Read cache usage"
        );

        let mut records = Vec::with_capacity(self.accruals.len());
        for accrual in self.accruals.values_mut() {
            let Some(evaluation) = accrual.evaluation else {
                continue;
            };
            let annual = accrual.accumulator.annualize();
            self.warnings.extend(accrual.accumulator.take_warnings());

            info!(
                vault = %vault,
                reward_token = %accrual.token.symbol,
                block = evaluation.block,
                apr = %annual.apr,
                apy = %annual.apy,
                periods = annual.periods,
                "Annualized rewards"
            );

            records.push(AggregateAccrualRecord {
                chain: vault.chain,
                vault: vault.address.clone(),
                reward_token: accrual.token.clone(),
                block: evaluation.block,
                timestamp: evaluation.timestamp,
                apr: annual.apr,
                apy: annual.apy,
                reward_token_price_usd: evaluation.reward_price,
                token0_price_usd: evaluation.price0,
                token1_price_usd: evaluation.price1,
                share_price_usd: evaluation.share_price,
                extra: AccrualExtra {
                    base_apr: annual.base_apr,
                    base_apy: annual.base_apy,
                    boosted_apr: annual.boosted_apr,
                    boosted_apy: annual.boosted_apy,
                    base_rewards_per_second: evaluation.base_rewards_per_second,
                    boosted_rewards_per_second: evaluation.boosted_rewards_per_second,
                    cumulative_return: annual.cumulative_return,
                    total_seconds: annual.total_seconds,
                    periods: annual.periods,
                    excluded_periods: annual.excluded_periods,
                },
            });
        }

        Ok(records)
    }

    async fn scrape_last(
        &mut self,
        vault: &VaultRef,
        bound: WindowBound,
    ) -> Result<Option<PositionSnapshot>, AccrualError> {
        Ok(self.resolver.scrape(vault, bound).await?)
    }

    fn drain_warnings(&mut self) -> Vec<ComputationWarning> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_OUTLIER_THRESHOLD;
    use crate::testing::{USDC, WETH, snapshot, vault, with_ops};
    use hv_yield_data::{InMemoryRewardSource, StaticPriceOracle, StaticTerminalResolver};
    use hv_yield_domain::enums::OperationKind;
    use rust_decimal_macros::dec;

    const REWARD: &str = "0xreward";

    fn reward_token() -> Token {
        Token::new(REWARD, "RWD", 18)
    }

    fn oracle() -> StaticPriceOracle {
        StaticPriceOracle::new()
            .with_price(Chain::Polygon, USDC, 0, dec!(1))
            .with_price(Chain::Polygon, WETH, 0, dec!(2000))
            .with_price(Chain::Polygon, REWARD, 0, dec!(1))
    }

    fn strategy(distributions: Vec<RewardDistribution>, oracle: StaticPriceOracle) -> GaugeRewardStrategy {
        let rewards = InMemoryRewardSource::new().with_distributions(vault(), 0, distributions);
        GaugeRewardStrategy::new(
            Arc::new(rewards),
            Arc::new(oracle),
            Arc::new(StaticTerminalResolver::new().with_snapshot(snapshot(300, 7_200, 1000))),
        )
    }

    async fn close_period(
        strategy: &mut GaugeRewardStrategy,
        start: PositionSnapshot,
        end: PositionSnapshot,
    ) -> Vec<RewardPeriodRecord> {
        let mut start = start;
        let mut end = end;
        strategy.in_loop(&mut start).await.unwrap();
        strategy.in_loop(&mut end).await.unwrap();
        strategy.end_item(&start, &end).await.unwrap()
    }

    #[tokio::test]
    async fn test_single_period_rewards() {
        let mut strategy = strategy(
            vec![RewardDistribution::new("0xgauge", reward_token(), dec!(0.01), dec!(0))],
            oracle(),
        );
        strategy.pre_loop(&vault(), &Window::blocks(100, 105)).await.unwrap();

        let records = close_period(
            &mut strategy,
            with_ops(snapshot(100, 0, 1000), &[OperationKind::Deposit]),
            snapshot(105, 3_600, 1000),
        )
        .await;

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.time_passed, 3_600);
        assert_eq!(record.base_rewards, dec!(36));
        assert_eq!(record.base_rewards_usd, dec!(36));
        assert_eq!(record.tvl_usd, dec!(3600));
        assert_eq!(record.period_yield, dec!(0.01));
        assert_eq!(record.rewarder, "0xgauge");

        let aggregates = strategy.post_loop().await.unwrap();
        assert_eq!(aggregates.len(), 1);
        let aggregate = &aggregates[0];
        assert_eq!(aggregate.apr, dec!(87.6));
        assert_eq!(aggregate.block, 105);
        assert_eq!(aggregate.share_price_usd, dec!(3.6));
        assert_eq!(aggregate.extra.base_rewards_per_second, dec!(0.01));
        assert_eq!(aggregate.extra.total_seconds, 3_600);
        assert!(strategy
            .drain_warnings()
            .iter()
            .any(|w| matches!(w, ComputationWarning::ApyOverflow { .. })));
    }

    #[tokio::test]
    async fn test_rewarders_of_same_token_are_merged() {
        let mut strategy = strategy(
            vec![
                RewardDistribution::new("0xgaugeA", reward_token(), dec!(0.001), dec!(0.002)),
                RewardDistribution::new("0xgaugeB", reward_token(), dec!(0.003), dec!(0)),
            ],
            oracle(),
        );
        strategy.pre_loop(&vault(), &Window::blocks(0, 10)).await.unwrap();

        let records = close_period(
            &mut strategy,
            with_ops(snapshot(1, 0, 1000), &[OperationKind::Rebalance]),
            snapshot(10, 1_000, 1000),
        )
        .await;

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.base_rewards, dec!(4));
        assert_eq!(record.boosted_rewards, dec!(2));
        assert_eq!(record.rewarder, "0xgaugea,0xgaugeb");
        let shares: Vec<Decimal> = record.breakdown.iter().map(|s| s.amount).collect();
        assert_eq!(shares, vec![dec!(3), dec!(3)]);
    }

    #[tokio::test]
    async fn test_each_reward_token_gets_its_own_record() {
        let other = Token::new("0xother", "OTH", 18);
        let mut strategy = strategy(
            vec![
                RewardDistribution::new("0xgauge", reward_token(), dec!(0.01), dec!(0)),
                RewardDistribution::new("0xgauge", other, dec!(1), dec!(0)),
            ],
            oracle(),
        );
        strategy.pre_loop(&vault(), &Window::blocks(0, 10)).await.unwrap();

        let records = close_period(
            &mut strategy,
            with_ops(snapshot(1, 0, 1000), &[OperationKind::Deposit]),
            snapshot(10, 100, 1000),
        )
        .await;
        assert_eq!(records.len(), 2);

        // no price for 0xother: valued at zero
        let other = records.iter().find(|r| r.reward_token.symbol == "OTH").unwrap();
        assert_eq!(other.base_rewards, dec!(100));
        assert_eq!(other.base_rewards_usd, Decimal::ZERO);
        assert!(strategy.drain_warnings().contains(&ComputationWarning::MissingPrice {
            token: "0xother".to_string(),
            block: 10,
        }));

        assert_eq!(strategy.post_loop().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_period_without_distributions() {
        let mut strategy = strategy(vec![], oracle());
        strategy.pre_loop(&vault(), &Window::blocks(0, 10)).await.unwrap();

        let records = close_period(
            &mut strategy,
            with_ops(snapshot(1, 0, 1000), &[OperationKind::Deposit]),
            snapshot(10, 100, 1000),
        )
        .await;

        assert!(records.is_empty());
        assert!(strategy.post_loop().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pre_loop_resets_totals() {
        let mut strategy = strategy(
            vec![RewardDistribution::new("0xgauge", reward_token(), dec!(0.01), dec!(0))],
            oracle(),
        );

        for _ in 0..2 {
            strategy.pre_loop(&vault(), &Window::blocks(100, 105)).await.unwrap();
            close_period(
                &mut strategy,
                with_ops(snapshot(100, 0, 1000), &[OperationKind::Deposit]),
                snapshot(105, 3_600, 1000),
            )
            .await;
            assert!(strategy.cached_reads() > 0);

            let aggregates = strategy.post_loop().await.unwrap();
            assert_eq!(aggregates[0].extra.periods, 1);
        }
    }

    #[tokio::test]
    async fn test_outlier_period_is_excluded() {
        let mut strategy = strategy(
            vec![RewardDistribution::new("0xgauge", reward_token(), dec!(5), dec!(0))],
            oracle(),
        )
        .with_outlier_threshold(dec!(1));
        strategy.pre_loop(&vault(), &Window::blocks(100, 105)).await.unwrap();

        // 18000 USD of rewards on 3600 USD of TVL
        let records = close_period(
            &mut strategy,
            with_ops(snapshot(100, 0, 1000), &[OperationKind::Deposit]),
            snapshot(105, 3_600, 1000),
        )
        .await;
        assert_eq!(records[0].period_yield, Decimal::ZERO);

        let aggregates = strategy.post_loop().await.unwrap();
        assert_eq!(aggregates[0].apr, Decimal::ZERO);
        assert_eq!(aggregates[0].extra.excluded_periods, 1);
        assert!(strategy.drain_warnings().contains(&ComputationWarning::OutlierYield {
            period: 0,
            period_yield: dec!(5),
        }));
    }

    #[tokio::test]
    async fn test_outlier_threshold_from_settings() {
        let settings = AccrualSettings::from_lookup(|key| {
            (key == ENV_OUTLIER_THRESHOLD).then(|| "10".to_string())
        })
        .unwrap();
        let mut strategy = strategy(
            vec![RewardDistribution::new("0xgauge", reward_token(), dec!(5), dec!(0))],
            oracle(),
        )
        .with_settings(&settings);
        strategy.pre_loop(&vault(), &Window::blocks(100, 105)).await.unwrap();

        let records = close_period(
            &mut strategy,
            with_ops(snapshot(100, 0, 1000), &[OperationKind::Deposit]),
            snapshot(105, 3_600, 1000),
        )
        .await;
        assert_eq!(records[0].period_yield, dec!(5));

        let aggregates = strategy.post_loop().await.unwrap();
        assert_eq!(aggregates[0].extra.excluded_periods, 0);
        assert_eq!(aggregates[0].extra.cumulative_return, dec!(5));
    }

    #[tokio::test]
    async fn test_overflowing_tvl_is_a_warning() {
        let oracle = StaticPriceOracle::new()
            .with_price(Chain::Polygon, USDC, 0, dec!(100000))
            .with_price(Chain::Polygon, WETH, 0, dec!(2000))
            .with_price(Chain::Polygon, REWARD, 0, dec!(1));
        let mut strategy = strategy(
            vec![RewardDistribution::new("0xgauge", reward_token(), dec!(0.01), dec!(0))],
            oracle,
        );
        strategy.pre_loop(&vault(), &Window::blocks(100, 105)).await.unwrap();

        let mut end = snapshot(105, 3_600, 1000);
        end.total_amounts.total0 = Decimal::from_i128_with_scale(10i128.pow(25), 0);
        let records = close_period(
            &mut strategy,
            with_ops(snapshot(100, 0, 1000), &[OperationKind::Deposit]),
            end,
        )
        .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].period_yield, Decimal::ZERO);
        assert_eq!(records[0].tvl_usd, Decimal::ZERO);
        assert_eq!(records[0].total_rewards_usd(), Decimal::ZERO);

        let aggregates = strategy.post_loop().await.unwrap();
        assert_eq!(aggregates[0].apr, Decimal::ZERO);
        assert_eq!(aggregates[0].extra.excluded_periods, 1);
        assert_eq!(aggregates[0].extra.total_seconds, 3_600);
        assert!(strategy
            .drain_warnings()
            .contains(&ComputationWarning::ValueOverflow { period: 0 }));
    }

    #[tokio::test]
    async fn test_scrape_last_uses_resolver() {
        let mut strategy = strategy(vec![], oracle());

        let found = strategy
            .scrape_last(&vault(), WindowBound::Block(400))
            .await
            .unwrap();
        assert_eq!(found.map(|s| s.block), Some(300));

        let found = strategy
            .scrape_last(&vault(), WindowBound::Block(200))
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
