use primitive_types::U256;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

/// Largest value representable by a `Decimal` mantissa (2^96 - 1).
const MAX_MANTISSA: u128 = (1u128 << 96) - 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("decimals {0} exceed the supported scale of 28")]
    UnsupportedDecimals(u8),
    #[error("amount {0} does not fit in a decimal")]
    Overflow(U256),
}

/// Raw on-chain integer quantity paired with its token decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount {
    pub raw: U256,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn zero(decimals: u8) -> Self {
        Self {
            raw: U256::zero(),
            decimals,
        }
    }

    /// Decimal-adjusted value.
    ///
    /// Raw values wider than 96 bits lose their least significant digits
    /// rather than failing, matching the precision a `Decimal` can hold.
    pub fn to_decimal(&self) -> Result<Decimal, AmountError> {
        if self.decimals > 28 {
            return Err(AmountError::UnsupportedDecimals(self.decimals));
        }

        let mut raw = self.raw;
        let mut dropped: u32 = 0;
        while raw > U256::from(MAX_MANTISSA) {
            raw = raw / U256::from(10u8);
            dropped += 1;
        }

        let mantissa = raw.as_u128() as i128;
        let scale = u32::from(self.decimals);
        if dropped <= scale {
            return Ok(Decimal::from_i128_with_scale(mantissa, scale - dropped));
        }

        let base = Decimal::from_i128_with_scale(mantissa, 0);
        let factor = Decimal::from(10u64)
            .checked_powu(u64::from(dropped - scale))
            .ok_or(AmountError::Overflow(self.raw))?;
        base.checked_mul(factor)
            .ok_or(AmountError::Overflow(self.raw))
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}
