//! Checked arithmetic over amounts
//!
//! Pure functions over two operands. Wrapping is never an acceptable
//! outcome for balance math: every operation either returns the exact
//! result or a typed error.

use crate::error::{Error, Result};
use crate::types::Amount;

/// Checked addition
pub fn add(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_add(b).ok_or(Error::ArithmeticOverflow)
}

/// Checked subtraction
pub fn sub(a: Amount, b: Amount) -> Result<Amount> {
    sub_ctx(a, b, "subtraction")
}

/// Checked subtraction with a caller-supplied context tag
///
/// The tag names the failing subtraction in the underflow diagnostic,
/// e.g. `sub_ctx(balance, amount, "burn balance")`.
pub fn sub_ctx(a: Amount, b: Amount, context: &'static str) -> Result<Amount> {
    a.checked_sub(b)
        .ok_or(Error::ArithmeticUnderflow { context })
}

/// Checked multiplication
pub fn mul(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_mul(b).ok_or(Error::ArithmeticOverflow)
}

/// Checked division
pub fn div(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_div(b).ok_or(Error::DivideByZero)
}

/// Checked remainder
pub fn rem(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_rem(b).ok_or(Error::DivideByZero)
}
