pub mod yield_accumulator;

pub use yield_accumulator::{
    AnnualizedYield, ComputationWarning, CumulativeReturn, DAYS_PER_YEAR, PeriodInput,
    PeriodYield, SECONDS_PER_DAY, SECONDS_PER_YEAR, YieldAccumulator, annual_percentage_rate,
    annual_percentage_yield, compound, period_yield,
};
