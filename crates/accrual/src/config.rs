//! Walk settings.
//!
//! Defaults match the behavior expected of a production run. Each field can be
//! overridden through `HV_YIELD_*` environment variables (a `.env` file is
//! honored) or through the `with_*` builders.

use crate::error::SettingsError;
use hv_yield_domain::enums::OperationKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const ENV_OUTLIER_THRESHOLD: &str = "HV_YIELD_OUTLIER_THRESHOLD";
pub const ENV_RELEVANT_OPERATIONS: &str = "HV_YIELD_RELEVANT_OPERATIONS";
pub const ENV_TOLERATE_CONSECUTIVE_STARTS: &str = "HV_YIELD_TOLERATE_CONSECUTIVE_STARTS";
pub const ENV_TRY_SOLVE_ERRORS: &str = "HV_YIELD_TRY_SOLVE_ERRORS";

/// Settings shared by the walker and the strategies it drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccrualSettings {
    /// Period yields above this are rejected as corrupted input.
    pub outlier_threshold: Decimal,
    /// Operation tags that open a period.
    pub relevant_operations: Vec<OperationKind>,
    /// Accept a start right after another start when the blocks are consecutive.
    pub tolerate_consecutive_starts: bool,
    /// Used when a request does not say whether to remediate.
    pub try_solve_errors: bool,
}

impl Default for AccrualSettings {
    fn default() -> Self {
        Self {
            outlier_threshold: Decimal::ONE,
            relevant_operations: OperationKind::RECOGNIZED.to_vec(),
            tolerate_consecutive_starts: true,
            try_solve_errors: false,
        }
    }
}

impl AccrualSettings {
    /// Creates the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the outlier threshold.
    #[must_use]
    pub fn with_outlier_threshold(mut self, threshold: Decimal) -> Self {
        self.outlier_threshold = threshold;
        self
    }

    /// Sets the operations that open a period.
    #[must_use]
    pub fn with_relevant_operations(
        mut self,
        operations: impl IntoIterator<Item = OperationKind>,
    ) -> Self {
        self.relevant_operations = operations.into_iter().collect();
        self
    }

    /// Sets whether consecutive-block duplicate starts are tolerated.
    #[must_use]
    pub fn with_tolerate_consecutive_starts(mut self, tolerate: bool) -> Self {
        self.tolerate_consecutive_starts = tolerate;
        self
    }

    /// Sets the default remediation behavior.
    #[must_use]
    pub fn with_try_solve_errors(mut self, try_solve: bool) -> Self {
        self.try_solve_errors = try_solve;
        self
    }

    /// Whether `operation` opens a period.
    #[must_use]
    pub fn is_relevant(&self, operation: OperationKind) -> bool {
        self.relevant_operations.contains(&operation)
    }

    /// Loads `.env` if present, then reads the `HV_YIELD_*` variables.
    ///
    /// # Errors
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from a variable lookup, defaulting what is missing.
    ///
    /// # Errors
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(value) = lookup(ENV_OUTLIER_THRESHOLD) {
            settings.outlier_threshold = parse(ENV_OUTLIER_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(ENV_RELEVANT_OPERATIONS) {
            settings.relevant_operations = parse_operations(&value)?;
        }
        if let Some(value) = lookup(ENV_TOLERATE_CONSECUTIVE_STARTS) {
            settings.tolerate_consecutive_starts = parse(ENV_TOLERATE_CONSECUTIVE_STARTS, &value)?;
        }
        if let Some(value) = lookup(ENV_TRY_SOLVE_ERRORS) {
            settings.try_solve_errors = parse(ENV_TRY_SOLVE_ERRORS, &value)?;
        }

        Ok(settings)
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, SettingsError> {
    value.trim().parse().map_err(|_| SettingsError {
        key,
        value: value.to_string(),
    })
}

// Comma separated tags; unknown tags are an error.
fn parse_operations(value: &str) -> Result<Vec<OperationKind>, SettingsError> {
    value
        .split(',')
        .filter(|tag| !tag.trim().is_empty())
        .map(|tag| match tag.parse::<OperationKind>() {
            Ok(OperationKind::Other) | Err(_) => Err(SettingsError {
                key: ENV_RELEVANT_OPERATIONS,
                value: tag.trim().to_string(),
            }),
            Ok(operation) => Ok(operation),
        })
        .collect()
}
