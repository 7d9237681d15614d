use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SECONDS_PER_DAY: u64 = 86_400;
pub const SECONDS_PER_YEAR: u64 = 31_536_000;
/// Compounding periods per year used for APY.
pub const DAYS_PER_YEAR: i64 = 365;

/// Numeric problem recovered locally; the offending contribution is zeroed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComputationWarning {
    /// A single period returned more than the outlier threshold.
    OutlierYield { period: usize, period_yield: Decimal },
    /// A period had no TVL to divide by.
    ZeroTvl { period: usize },
    /// The compounded product left the decimal range.
    CompoundingOverflow,
    /// `(1 + daily)^365` left the decimal range.
    ApyOverflow {
        cumulative_return: Decimal,
        total_seconds: u64,
    },
    /// A USD price was unavailable; the value was taken as zero.
    MissingPrice { token: String, block: u64 },
    /// A period's USD amounts left the decimal range; the period counts as zero.
    ValueOverflow { period: usize },
}

impl fmt::Display for ComputationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputationWarning::OutlierYield {
                period,
                period_yield,
            } => write!(f, "period {period} yield {period_yield} rejected as outlier"),
            ComputationWarning::ZeroTvl { period } => write!(f, "period {period} has zero tvl"),
            ComputationWarning::CompoundingOverflow => f.write_str("compounded return overflowed"),
            ComputationWarning::ApyOverflow {
                cumulative_return,
                total_seconds,
            } => write!(
                f,
                "apy overflowed for return {cumulative_return} over {total_seconds}s"
            ),
            ComputationWarning::MissingPrice { token, block } => {
                write!(f, "no usd price for {token} at block {block}")
            }
            ComputationWarning::ValueOverflow { period } => {
                write!(f, "period {period} usd values overflowed")
            }
        }
    }
}

/// Inputs for one accrual period, all USD values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodInput {
    pub base_rewards_usd: Decimal,
    pub boosted_rewards_usd: Decimal,
    pub time_passed: u64,
    pub tvl_usd: Decimal,
}

/// Yields derived for one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodYield {
    pub period_yield: Decimal,
    pub base_yield: Decimal,
    pub boosted_yield: Decimal,
    /// Rejected periods keep all yields at zero and are not compounded.
    pub excluded: bool,
}

/// Compounded return over the retained periods, per component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeReturn {
    pub total: Decimal,
    pub base: Decimal,
    pub boosted: Decimal,
}

/// Annualized figures, clamped at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualizedYield {
    pub apr: Decimal,
    pub apy: Decimal,
    pub base_apr: Decimal,
    pub base_apy: Decimal,
    pub boosted_apr: Decimal,
    pub boosted_apy: Decimal,
    pub cumulative_return: Decimal,
    pub total_seconds: u64,
    pub periods: usize,
    pub excluded_periods: usize,
}

/// Rewards over TVL; `None` when there is no TVL.
#[must_use]
pub fn period_yield(rewards_usd: Decimal, tvl_usd: Decimal) -> Option<Decimal> {
    if tvl_usd.is_zero() {
        return None;
    }
    rewards_usd.checked_div(tvl_usd)
}

/// `Π(1 + y) - 1`; `None` on overflow.
#[must_use]
pub fn compound<I>(yields: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let product = yields
        .into_iter()
        .try_fold(Decimal::ONE, |acc, y| acc.checked_mul(Decimal::ONE.checked_add(y)?))?;
    product.checked_sub(Decimal::ONE)
}

/// Simple annualization: `cum_return * seconds_per_year / total_seconds`.
///
/// Returns zero for an empty interval or on overflow.
#[must_use]
pub fn annual_percentage_rate(cumulative_return: Decimal, total_seconds: u64) -> Decimal {
    if total_seconds == 0 {
        return Decimal::ZERO;
    }
    let periods_per_year = Decimal::from(SECONDS_PER_YEAR) / Decimal::from(total_seconds);
    cumulative_return
        .checked_mul(periods_per_year)
        .unwrap_or(Decimal::ZERO)
}

/// Daily-compounded annualization:
/// `(1 + cum_return * seconds_per_day / total_seconds)^365 - 1`.
///
/// Zero for an empty interval, `None` when the power overflows.
///
/// `Decimal` tops out near 7.9e28, so any daily return above roughly 20%
/// (`1.2^365`) overflows. Short intervals with a visible return hit this
/// quickly: 1% over one hour is 24% a day.
#[must_use]
pub fn annual_percentage_yield(cumulative_return: Decimal, total_seconds: u64) -> Option<Decimal> {
    if total_seconds == 0 {
        return Some(Decimal::ZERO);
    }
    let days = Decimal::from(SECONDS_PER_DAY) / Decimal::from(total_seconds);
    let daily = cumulative_return.checked_mul(days)?;
    let compounded = Decimal::ONE.checked_add(daily)?.checked_powi(DAYS_PER_YEAR)?;
    compounded.checked_sub(Decimal::ONE)
}

fn clamp(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Accumulates period yields and annualizes them.
///
/// Periods returning more than `outlier_threshold` are treated as corrupted
/// input: their yields are zeroed and they are left out of compounding, but
/// the time they span still counts towards the annualization interval.
#[derive(Debug, Clone)]
pub struct YieldAccumulator {
    outlier_threshold: Decimal,
    periods: Vec<(PeriodInput, PeriodYield)>,
    warnings: Vec<ComputationWarning>,
}

impl Default for YieldAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl YieldAccumulator {
    /// Creates an accumulator rejecting single-period yields above 100%.
    #[must_use]
    pub fn new() -> Self {
        Self {
            outlier_threshold: Decimal::ONE,
            periods: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Sets the outlier threshold.
    #[must_use]
    pub fn with_outlier_threshold(mut self, threshold: Decimal) -> Self {
        self.outlier_threshold = threshold;
        self
    }

    /// Adds a period and returns its derived yields.
    pub fn push(&mut self, input: PeriodInput) -> PeriodYield {
        let index = self.periods.len();
        let Some(rewards) = input.base_rewards_usd.checked_add(input.boosted_rewards_usd) else {
            return self.push_overflowed(input.time_passed);
        };

        let derived = match period_yield(rewards, input.tvl_usd) {
            None => {
                self.warnings.push(ComputationWarning::ZeroTvl { period: index });
                PeriodYield::default()
            }
            Some(total) if total > self.outlier_threshold => {
                self.warnings.push(ComputationWarning::OutlierYield {
                    period: index,
                    period_yield: total,
                });
                PeriodYield {
                    excluded: true,
                    ..PeriodYield::default()
                }
            }
            Some(total) => PeriodYield {
                period_yield: total,
                base_yield: period_yield(input.base_rewards_usd, input.tvl_usd)
                    .unwrap_or_default(),
                boosted_yield: period_yield(input.boosted_rewards_usd, input.tvl_usd)
                    .unwrap_or_default(),
                excluded: false,
            },
        };

        self.periods.push((input, derived));
        derived
    }

    /// Adds a period whose USD amounts could not be computed.
    ///
    /// The period contributes nothing but its duration.
    pub fn push_overflowed(&mut self, time_passed: u64) -> PeriodYield {
        let index = self.periods.len();
        self.warnings.push(ComputationWarning::ValueOverflow { period: index });
        let derived = PeriodYield {
            excluded: true,
            ..PeriodYield::default()
        };
        self.periods.push((
            PeriodInput {
                base_rewards_usd: Decimal::ZERO,
                boosted_rewards_usd: Decimal::ZERO,
                time_passed,
                tvl_usd: Decimal::ZERO,
            },
            derived,
        ));
        derived
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    #[must_use]
    pub fn excluded_periods(&self) -> usize {
        self.periods.iter().filter(|(_, y)| y.excluded).count()
    }

    /// Seconds spanned by every period pushed, rejected ones included.
    #[must_use]
    pub fn total_seconds(&self) -> u64 {
        self.periods.iter().map(|(p, _)| p.time_passed).sum()
    }

    /// Compounded return of the retained periods.
    pub fn cumulative_return(&mut self) -> CumulativeReturn {
        let retained = || self.periods.iter().filter(|(_, y)| !y.excluded).map(|(_, y)| y);

        let total = compound(retained().map(|y| y.period_yield));
        let base = compound(retained().map(|y| y.base_yield));
        let boosted = compound(retained().map(|y| y.boosted_yield));

        if total.is_none() || base.is_none() || boosted.is_none() {
            self.warnings.push(ComputationWarning::CompoundingOverflow);
        }

        CumulativeReturn {
            total: total.unwrap_or_default(),
            base: base.unwrap_or_default(),
            boosted: boosted.unwrap_or_default(),
        }
    }

    /// Annualizes everything pushed so far.
    pub fn annualize(&mut self) -> AnnualizedYield {
        let cumulative = self.cumulative_return();
        let total_seconds = self.total_seconds();

        let apr = annual_percentage_rate(cumulative.total, total_seconds);
        let apy = self.apy_or_zero(cumulative.total, total_seconds);
        let base_apy = self.apy_or_zero(cumulative.base, total_seconds);
        let boosted_apy = self.apy_or_zero(cumulative.boosted, total_seconds);

        AnnualizedYield {
            apr: clamp(apr),
            apy: clamp(apy),
            base_apr: clamp(annual_percentage_rate(cumulative.base, total_seconds)),
            base_apy: clamp(base_apy),
            boosted_apr: clamp(annual_percentage_rate(cumulative.boosted, total_seconds)),
            boosted_apy: clamp(boosted_apy),
            cumulative_return: cumulative.total,
            total_seconds,
            periods: self.len(),
            excluded_periods: self.excluded_periods(),
        }
    }

    fn apy_or_zero(&mut self, cumulative_return: Decimal, total_seconds: u64) -> Decimal {
        match annual_percentage_yield(cumulative_return, total_seconds) {
            Some(apy) => apy,
            None => {
                self.warnings.push(ComputationWarning::ApyOverflow {
                    cumulative_return,
                    total_seconds,
                });
                Decimal::ZERO
            }
        }
    }

    /// Hands over the warnings collected so far.
    pub fn take_warnings(&mut self) -> Vec<ComputationWarning> {
        std::mem::take(&mut self.warnings)
    }
}
