use rust_decimal::{prelude::ToPrimitive, Decimal};
use thiserror::Error;

/// Spgateway only settles New Taiwan Dollars.
pub const DEFAULT_CURRENCY: &str = "TWD";

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a gateway amount: {0}")]
pub struct AmountConversionError(String);

/// Converts a basket total into the integer amount (`Amt`) the gateway expects.
///
/// Spgateway has no notion of minor units, so totals carrying a fractional part are rejected rather than rounded.
pub fn gateway_amount(total: Decimal) -> Result<i64, AmountConversionError> {
    if total.is_sign_negative() {
        return Err(AmountConversionError(format!("{total} is negative")));
    }
    if !total.fract().is_zero() {
        return Err(AmountConversionError(format!("{total} has a fractional part")));
    }
    total.trunc().to_i64().ok_or_else(|| AmountConversionError(format!("{total} is too large")))
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn whole_amounts_convert() {
        assert_eq!(gateway_amount(Decimal::from(1500)).unwrap(), 1500);
        assert_eq!(gateway_amount(Decimal::from_str("99.00").unwrap()).unwrap(), 99);
        assert_eq!(gateway_amount(Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn fractional_and_negative_amounts_are_rejected() {
        assert!(gateway_amount(Decimal::from_str("99.50").unwrap()).is_err());
        assert!(gateway_amount(Decimal::from(-1)).is_err());
    }
}
