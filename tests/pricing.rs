use pos_backend::pricing::{PriceBreakdown, PricedLine, PricingError, line_discount, price};
use uuid::Uuid;

fn line(unit_price: i64, quantity: i32, refund_eligible: bool) -> PricedLine {
    PricedLine {
        product_id: Uuid::new_v4(),
        quantity,
        unit_price,
        refund_eligible,
    }
}

#[test]
fn non_member_pays_full_total() {
    // 10.00 x 2, no customer
    let result = price(&[line(1000, 2, true)], false).unwrap();
    assert_eq!(
        result,
        PriceBreakdown {
            total: 2000,
            discount: 0,
            final_amount: 2000,
        }
    );
}

#[test]
fn member_gets_two_percent_on_refundable_line() {
    let result = price(&[line(1000, 2, true)], true).unwrap();
    assert_eq!(result.total, 2000);
    assert_eq!(result.discount, 40);
    assert_eq!(result.final_amount, 1960);
}

#[test]
fn discount_only_applies_to_refund_eligible_lines() {
    let lines = [line(1000, 2, true), line(5000, 1, false)];
    let result = price(&lines, true).unwrap();
    assert_eq!(result.total, 7000);
    assert_eq!(result.discount, 40);
    assert_eq!(result.final_amount, 6960);
}

#[test]
fn discount_is_rounded_per_line() {
    // Each line's 2% is 0.5 minor units and rounds up on its own.
    let lines = [line(25, 1, true), line(25, 1, true)];
    let result = price(&lines, true).unwrap();
    assert_eq!(result.discount, 2);
    assert_eq!(result.final_amount, 48);
}

#[test]
fn final_is_total_minus_discount_and_never_negative() {
    let prices = [1, 7, 24, 25, 26, 49, 50, 99, 333, 1_999, 123_457];
    for (i, unit_price) in prices.into_iter().enumerate() {
        for quantity in 1..=5 {
            for member in [false, true] {
                let lines = [
                    line(unit_price, quantity, i % 2 == 0),
                    line(unit_price + 3, 1, true),
                ];
                let result = price(&lines, member).unwrap();
                assert_eq!(result.final_amount, result.total - result.discount);
                assert!(result.discount >= 0);
                assert!(result.discount <= result.total);
                if !member {
                    assert_eq!(result.discount, 0);
                }
            }
        }
    }
}

#[test]
fn line_discount_requires_member_and_eligibility() {
    assert_eq!(line_discount(1000, false, true), Ok(0));
    assert_eq!(line_discount(1000, true, false), Ok(0));
    assert_eq!(line_discount(1000, false, false), Ok(0));
    assert_eq!(line_discount(1000, true, true), Ok(20));
}

#[test]
fn rejects_non_positive_inputs() {
    assert_eq!(
        price(&[line(1000, 0, true)], true),
        Err(PricingError::NonPositiveQuantity)
    );
    assert_eq!(
        price(&[line(0, 1, true)], true),
        Err(PricingError::NonPositivePrice)
    );
}

#[test]
fn empty_cart_prices_to_zero() {
    assert_eq!(price(&[], true), Ok(PriceBreakdown::default()));
}
