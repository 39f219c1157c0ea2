//! Prices

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

use crate::{discounts::DiscountType, rules::{PricingRule, RuleId}};

/// A shop price in some ISO currency.
pub type Price = Money<'static, Currency>;

/// Errors that can occur while applying a discount.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The discount could not be represented in minor units.
    #[error("discount of {value} cannot be applied to {minor} minor units")]
    DiscountOverflow {
        /// Rule discount value
        value: Decimal,
        /// Base price in minor units
        minor: i64,
    },
}

/// Returned for ISO codes the shop does not price in.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown currency code: {0}")]
pub struct UnknownCurrency(pub String);

/// Outcome of pricing one product for one user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceAdjustment {
    /// Base price the discount was applied to
    pub original: Price,

    /// Price after the discount, never below zero
    pub adjusted: Price,

    /// The rule that was applied, if any
    pub rule: Option<RuleId>,

    /// Set when the discount exceeded the base price and the result was floored at zero
    pub clamped: bool,
}

impl PriceAdjustment {
    /// No rule applied.
    pub fn unchanged(price: Price) -> Self {
        Self {
            original: price,
            adjusted: price,
            rule: None,
            clamped: false,
        }
    }

    /// Amount taken off the base price.
    pub fn discount(&self) -> Price {
        Money::from_minor(
            self.original.to_minor_units().saturating_sub(self.adjusted.to_minor_units()),
            self.original.currency(),
        )
    }
}

/// Resolve a currency from its ISO code.
///
/// # Errors
///
/// Returns [`UnknownCurrency`] for codes other than GBP, USD and EUR.
pub fn parse_currency(code: &str) -> Result<&'static Currency, UnknownCurrency> {
    match code.trim().to_ascii_uppercase().as_str() {
        "GBP" => Ok(iso::GBP),
        "USD" => Ok(iso::USD),
        "EUR" => Ok(iso::EUR),
        other => Err(UnknownCurrency(other.to_string())),
    }
}

/// Sale price when one is set and above zero, otherwise the regular price.
pub fn base_price(regular: Price, sale: Option<Price>) -> Price {
    sale.filter(|sale| sale.to_minor_units() > 0).unwrap_or(regular)
}

/// Apply `rule` to `base`.
///
/// Percentages take `discount_value / 100` of the base; fixed discounts take
/// `discount_value` major units. A discount larger than the base floors the result at
/// zero and logs a warning.
///
/// # Errors
///
/// Returns [`PricingError::DiscountOverflow`] if the discount cannot be expressed in
/// minor units of the base price's currency.
pub fn apply_rule(base: Price, rule: Option<&PricingRule>) -> Result<PriceAdjustment, PricingError> {
    let Some(rule) = rule else {
        return Ok(PriceAdjustment::unchanged(base));
    };

    let currency = base.currency();
    let base_minor = base.to_minor_units();

    let discount_minor = match rule.discount_type {
        DiscountType::Percentage => percent_of_minor(rule.discount_value, base_minor),
        DiscountType::Fixed => major_to_minor(rule.discount_value, currency),
    }
    .ok_or(PricingError::DiscountOverflow {
        value: rule.discount_value,
        minor: base_minor,
    })?;

    let adjusted_minor = base_minor.checked_sub(discount_minor).ok_or(PricingError::DiscountOverflow {
        value: rule.discount_value,
        minor: base_minor,
    })?;

    let clamped = adjusted_minor < 0;

    if clamped {
        tracing::warn!(
            rule_id = %rule.id,
            discount_type = %rule.discount_type,
            discount_value = %rule.discount_value,
            base_minor,
            adjusted_minor,
            "discount exceeds base price, clamping to zero"
        );
    }

    Ok(PriceAdjustment {
        original: base,
        adjusted: Money::from_minor(adjusted_minor.max(0), currency),
        rule: Some(rule.id),
        clamped,
    })
}

/// `percent`% of `minor`, rounded half away from zero.
fn percent_of_minor(percent: Decimal, minor: i64) -> Option<i64> {
    percent
        .checked_div(Decimal::ONE_HUNDRED)?
        .checked_mul(Decimal::from(minor))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Major currency units to minor units of `currency`.
fn major_to_minor(amount: Decimal, currency: &Currency) -> Option<i64> {
    let scale = 10_i64.checked_pow(currency.exponent)?;

    amount
        .checked_mul(Decimal::from(scale))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;
    use crate::{groups::GroupId, schedule::Schedule};

    fn rule(discount_type: DiscountType, value: Decimal) -> Result<PricingRule, jiff::Error> {
        Ok(PricingRule {
            id: RuleId::new(7),
            group: GroupId::new(1),
            discount_type,
            discount_value: value,
            is_active: true,
            schedule: Schedule::always(),
            created_at: "2025-01-01T00:00:00Z".parse::<Timestamp>()?,
            sort_order: 0,
        })
    }

    #[test]
    fn no_rule_leaves_price_unchanged() -> TestResult {
        let base = Money::from_minor(1_999, USD);

        let adjustment = apply_rule(base, None)?;

        assert_eq!(adjustment, PriceAdjustment::unchanged(base));
        assert_eq!(adjustment.discount(), Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn percentage_discount_rounds_half_away_from_zero() -> TestResult {
        let base = Money::from_minor(999, GBP);
        let rule = rule(DiscountType::Percentage, Decimal::new(15, 0))?;

        let adjustment = apply_rule(base, Some(&rule))?;

        // 15% of 999 = 149.85 -> 150
        assert_eq!(adjustment.adjusted, Money::from_minor(849, GBP));
        assert_eq!(adjustment.rule, Some(RuleId::new(7)));
        assert!(!adjustment.clamped);

        Ok(())
    }

    #[test]
    fn fractional_percentage_is_supported() -> TestResult {
        let base = Money::from_minor(10_000, USD);
        let rule = rule(DiscountType::Percentage, Decimal::new(1250, 2))?;

        assert_eq!(apply_rule(base, Some(&rule))?.adjusted, Money::from_minor(8_750, USD));

        Ok(())
    }

    #[test]
    fn fixed_discount_is_in_major_units() -> TestResult {
        let base = Money::from_minor(2_000, USD);
        let rule = rule(DiscountType::Fixed, Decimal::new(550, 2))?;

        let adjustment = apply_rule(base, Some(&rule))?;

        assert_eq!(adjustment.adjusted, Money::from_minor(1_450, USD));
        assert_eq!(adjustment.discount(), Money::from_minor(550, USD));

        Ok(())
    }

    #[test]
    fn fixed_discount_larger_than_price_clamps_to_zero() -> TestResult {
        let base = Money::from_minor(300, USD);
        let rule = rule(DiscountType::Fixed, Decimal::new(5, 0))?;

        let adjustment = apply_rule(base, Some(&rule))?;

        assert_eq!(adjustment.adjusted, Money::from_minor(0, USD));
        assert!(adjustment.clamped);

        Ok(())
    }

    #[test]
    fn full_percentage_discount_reaches_zero_without_clamping() -> TestResult {
        let base = Money::from_minor(300, USD);
        let rule = rule(DiscountType::Percentage, Decimal::ONE_HUNDRED)?;

        let adjustment = apply_rule(base, Some(&rule))?;

        assert_eq!(adjustment.adjusted, Money::from_minor(0, USD));
        assert!(!adjustment.clamped);

        Ok(())
    }

    #[test]
    fn overflowing_discount_is_an_error() -> TestResult {
        let base = Money::from_minor(i64::MIN, USD);
        let rule = rule(DiscountType::Fixed, Decimal::new(1, 0))?;

        assert!(matches!(
            apply_rule(base, Some(&rule)),
            Err(PricingError::DiscountOverflow { .. })
        ));

        Ok(())
    }

    #[test]
    fn sale_price_is_used_when_positive() {
        let regular = Money::from_minor(2_000, USD);

        assert_eq!(base_price(regular, Some(Money::from_minor(1_500, USD))), Money::from_minor(1_500, USD));
        assert_eq!(base_price(regular, Some(Money::from_minor(0, USD))), regular);
        assert_eq!(base_price(regular, None), regular);
    }

    #[test]
    fn parses_supported_currencies() -> TestResult {
        assert_eq!(parse_currency("gbp")?, GBP);
        assert_eq!(parse_currency("XYZ"), Err(UnknownCurrency("XYZ".to_string())));

        Ok(())
    }
}
