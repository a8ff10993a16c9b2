use rust_decimal::Decimal;

use crate::core::error::{AppError, Result};

/// Total number of digits a monetary value may carry
pub const MONEY_PRECISION: u32 = 9;

/// Number of fractional digits a monetary value may carry
pub const MONEY_SCALE: u32 = 2;

/// Validates that an amount fits DECIMAL(9,2) and is not negative
pub fn validate_amount(field: &str, amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(AppError::validation(format!("{} cannot be negative", field)));
    }

    if amount.normalize().scale() > MONEY_SCALE {
        return Err(AppError::validation(format!(
            "{} must have at most {} decimal places, got {}",
            field, MONEY_SCALE, amount
        )));
    }

    let integer_digits_limit = Decimal::from(10i64.pow(MONEY_PRECISION - MONEY_SCALE));
    if amount.trunc() >= integer_digits_limit {
        return Err(AppError::validation(format!(
            "{} must be lower than {}",
            field, integer_digits_limit
        )));
    }

    Ok(())
}
