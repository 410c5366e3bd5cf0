//! Cart pricing and the member discount.
//!
//! All figures are integer minor currency units, the same unit the store
//! persists, so a computed breakdown and the stored sale never drift apart.
//! The member discount is 2% of each refund-eligible line's subtotal,
//! rounded half up to the minor unit per line.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Member discount rate expressed as a divisor: 1/50 == 2%.
const MEMBER_DISCOUNT_DIVISOR: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub refund_eligible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub struct PriceBreakdown {
    pub total: i64,
    pub discount: i64,
    pub final_amount: i64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PricingError {
    #[error("quantity must be at least 1")]
    NonPositiveQuantity,
    #[error("unit price must be positive")]
    NonPositivePrice,
    #[error("amount is too large")]
    Overflow,
}

pub fn line_subtotal(line: &PricedLine) -> Result<i64, PricingError> {
    if line.quantity <= 0 {
        return Err(PricingError::NonPositiveQuantity);
    }
    if line.unit_price <= 0 {
        return Err(PricingError::NonPositivePrice);
    }
    line.unit_price
        .checked_mul(i64::from(line.quantity))
        .ok_or(PricingError::Overflow)
}

/// Discount for one line. Zero unless the customer is a member and the line is refund-eligible.
pub fn line_discount(
    subtotal: i64,
    customer_is_member: bool,
    refund_eligible: bool,
) -> Result<i64, PricingError> {
    if !(customer_is_member && refund_eligible) {
        return Ok(0);
    }
    let half = MEMBER_DISCOUNT_DIVISOR / 2;
    let rounded = subtotal.checked_add(half).ok_or(PricingError::Overflow)?;
    Ok(rounded / MEMBER_DISCOUNT_DIVISOR)
}

pub fn price(lines: &[PricedLine], customer_is_member: bool) -> Result<PriceBreakdown, PricingError> {
    let mut total: i64 = 0;
    let mut discount: i64 = 0;

    for line in lines {
        let subtotal = line_subtotal(line)?;
        total = total.checked_add(subtotal).ok_or(PricingError::Overflow)?;
        let line_off = line_discount(subtotal, customer_is_member, line.refund_eligible)?;
        discount = discount.checked_add(line_off).ok_or(PricingError::Overflow)?;
    }

    Ok(PriceBreakdown {
        total,
        discount,
        final_amount: total - discount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(unit_price: i64, quantity: i32, refund_eligible: bool) -> PricedLine {
        PricedLine {
            product_id: Uuid::new_v4(),
            quantity,
            unit_price,
            refund_eligible,
        }
    }

    #[test]
    fn half_unit_rounds_up() {
        // 25 * 2% = 0.5 minor units
        assert_eq!(line_discount(25, true, true), Ok(1));
        assert_eq!(line_discount(24, true, true), Ok(0));
    }

    #[test]
    fn overflow_is_reported() {
        let lines = [line(i64::MAX, 2, false)];
        assert_eq!(price(&lines, false), Err(PricingError::Overflow));
    }
}
