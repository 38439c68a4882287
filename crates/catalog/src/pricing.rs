//! Discount pricing.
//!
//! Prices are decimals with two fractional digits. The discount is a whole
//! percentage taken off the base price.

use rust_decimal::Decimal;

use storefront_core::{DomainError, DomainResult};

/// Highest discount rate accepted when a product form is cleaned.
pub const MAX_DISCOUNT_RATE: i32 = 100;

/// Price after applying `discount_rate` percent to `price`.
///
/// A rate of zero or below leaves the price unchanged. The arithmetic itself is
/// unbounded: rates above 100 produce a negative price, which is why forms
/// reject them up front (see [`validate_discount_rate`]). Results are rounded
/// to cents with banker's rounding.
pub fn sell_price(price: Decimal, discount_rate: i32) -> Decimal {
    if discount_rate > 0 {
        let discount = price * Decimal::from(discount_rate) / Decimal::ONE_HUNDRED;
        (price - discount).round_dp(2)
    } else {
        price
    }
}

/// Effective price of a variant: the discounted product price plus the
/// variant's own delta.
pub fn variant_price(product_sell_price: Decimal, price_delta: Decimal) -> Decimal {
    product_sell_price + price_delta
}

pub fn validate_discount_rate(rate: i32) -> DomainResult<i32> {
    if !(0..=MAX_DISCOUNT_RATE).contains(&rate) {
        return Err(DomainError::validation(format!(
            "discount_rate must be between 0 and {MAX_DISCOUNT_RATE}, got {rate}"
        )));
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn twenty_percent_off_one_hundred() {
        assert_eq!(sell_price(d("100.00"), 20), d("80.00"));
    }

    #[test]
    fn zero_rate_returns_price_unchanged() {
        assert_eq!(sell_price(d("19.99"), 0), d("19.99"));
        assert_eq!(sell_price(d("19.99"), -5), d("19.99"));
    }

    #[test]
    fn results_are_rounded_to_cents() {
        // 19.99 * 0.85 = 16.9915
        assert_eq!(sell_price(d("19.99"), 15), d("16.99"));
        // 0.05 * 0.5 = 0.025 -> banker's rounding keeps the even cent
        assert_eq!(sell_price(d("0.05"), 50), d("0.02"));
    }

    #[test]
    fn rates_over_one_hundred_go_negative_when_called_directly() {
        assert_eq!(sell_price(d("10.00"), 150), d("-5.00"));
    }

    #[test]
    fn discount_rate_validation() {
        assert!(validate_discount_rate(0).is_ok());
        assert!(validate_discount_rate(100).is_ok());
        assert!(validate_discount_rate(101).is_err());
        assert!(validate_discount_rate(-1).is_err());
    }

    #[test]
    fn variant_price_adds_delta_to_sell_price() {
        let base = sell_price(d("200.00"), 10);
        assert_eq!(variant_price(base, d("15.50")), d("195.50"));
        assert_eq!(variant_price(base, d("-30.00")), d("150.00"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: for valid rates the sell price lies between 0 and the price.
            #[test]
            fn sell_price_is_bounded(cents in 0i64..10_000_000_000, rate in 0i32..=100) {
                let price = Decimal::new(cents, 2);
                let sp = sell_price(price, rate);
                prop_assert!(sp >= Decimal::ZERO);
                prop_assert!(sp <= price);
                if rate == 0 {
                    prop_assert_eq!(sp, price);
                }
            }
        }
    }
}
