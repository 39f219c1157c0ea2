//! Rule Validation

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    discounts::{DiscountType, UnknownDiscountType},
    schedule::{Schedule, ScheduleError},
};

/// Upper bound on fixed discounts unless configured otherwise.
pub const DEFAULT_FIXED_CEILING: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Most decimal places a discount value may carry.
pub const MAX_DISCOUNT_SCALE: u32 = 2;

/// Reasons a rule is rejected before anything is written.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Discount type string is not recognised.
    #[error(transparent)]
    UnknownDiscountType(#[from] UnknownDiscountType),

    /// Percentage outside `0..=100`.
    #[error("percentage discount must be between 0 and 100, got {0}")]
    PercentageOutOfRange(Decimal),

    /// Negative discount value.
    #[error("discount value cannot be negative, got {0}")]
    NegativeDiscount(Decimal),

    /// Fixed discount above the configured ceiling.
    #[error("fixed discount of {value} exceeds the maximum of {ceiling}")]
    FixedDiscountAboveCeiling {
        /// Requested value
        value: Decimal,
        /// Configured ceiling
        ceiling: Decimal,
    },

    /// More than two decimal places.
    #[error("discount value {0} has more than two decimal places")]
    TooPrecise(Decimal),

    /// Schedule window is inverted or empty.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Neither products nor categories were given.
    #[error("a rule must apply to at least one product or category")]
    EmptyScope,
}

/// Checks rule input against the configured limits.
#[derive(Debug, Clone, Copy)]
pub struct RuleValidator {
    fixed_ceiling: Decimal,
}

impl Default for RuleValidator {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_CEILING)
    }
}

impl RuleValidator {
    /// Validator with a custom ceiling for fixed discounts.
    pub const fn new(fixed_ceiling: Decimal) -> Self {
        Self { fixed_ceiling }
    }

    /// Configured fixed discount ceiling.
    pub fn fixed_ceiling(&self) -> Decimal {
        self.fixed_ceiling
    }

    /// Validate a discount type and value pair.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] the value violates.
    pub fn check_discount(&self, discount_type: DiscountType, value: Decimal) -> Result<(), ValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::NegativeDiscount(value));
        }

        if value.normalize().scale() > MAX_DISCOUNT_SCALE {
            return Err(ValidationError::TooPrecise(value));
        }

        match discount_type {
            DiscountType::Percentage if value > Decimal::ONE_HUNDRED => {
                Err(ValidationError::PercentageOutOfRange(value))
            }
            DiscountType::Fixed if value > self.fixed_ceiling => Err(ValidationError::FixedDiscountAboveCeiling {
                value,
                ceiling: self.fixed_ceiling,
            }),
            _ => Ok(()),
        }
    }

    /// Validate a raw discount type string and value, as typed by an administrator.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownDiscountType`] for anything but `percentage`
    /// or `fixed`, otherwise the result of [`RuleValidator::check_discount`].
    pub fn parse_discount(&self, discount_type: &str, value: Decimal) -> Result<DiscountType, ValidationError> {
        let discount_type = discount_type.parse::<DiscountType>()?;

        self.check_discount(discount_type, value)?;

        Ok(discount_type)
    }

    /// Validate a complete rule definition.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, checking the discount, then the
    /// scope.
    pub fn check_rule(
        &self,
        discount_type: DiscountType,
        value: Decimal,
        product_count: usize,
        category_count: usize,
    ) -> Result<(), ValidationError> {
        self.check_discount(discount_type, value)?;

        if product_count == 0 && category_count == 0 {
            return Err(ValidationError::EmptyScope);
        }

        Ok(())
    }

    /// Validate schedule bounds and build the window.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Schedule`] when the end is not after the start.
    pub fn check_schedule(
        start: Option<jiff::Timestamp>,
        end: Option<jiff::Timestamp>,
    ) -> Result<Schedule, ValidationError> {
        Ok(Schedule::new(start, end)?)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn accepts_boundary_values() -> TestResult {
        let validator = RuleValidator::default();

        validator.check_discount(DiscountType::Percentage, Decimal::ZERO)?;
        validator.check_discount(DiscountType::Percentage, Decimal::ONE_HUNDRED)?;
        validator.check_discount(DiscountType::Fixed, DEFAULT_FIXED_CEILING)?;
        validator.check_discount(DiscountType::Fixed, Decimal::new(1999, 2))?;

        Ok(())
    }

    #[test]
    fn rejects_percentage_above_one_hundred() {
        let value = Decimal::new(10001, 2);

        assert_eq!(
            RuleValidator::default().check_discount(DiscountType::Percentage, value),
            Err(ValidationError::PercentageOutOfRange(value))
        );
    }

    #[test]
    fn rejects_negative_values_for_both_types() {
        let value = Decimal::new(-5, 0);
        let validator = RuleValidator::default();

        for discount_type in [DiscountType::Percentage, DiscountType::Fixed] {
            assert_eq!(
                validator.check_discount(discount_type, value),
                Err(ValidationError::NegativeDiscount(value))
            );
        }
    }

    #[test]
    fn rejects_fixed_above_configured_ceiling() {
        let validator = RuleValidator::new(Decimal::new(50, 0));

        assert!(matches!(
            validator.check_discount(DiscountType::Fixed, Decimal::new(5001, 2)),
            Err(ValidationError::FixedDiscountAboveCeiling { .. })
        ));
    }

    #[test]
    fn rejects_sub_cent_precision_but_ignores_trailing_zeros() -> TestResult {
        let validator = RuleValidator::default();

        assert_eq!(
            validator.check_discount(DiscountType::Fixed, Decimal::new(1005, 3)),
            Err(ValidationError::TooPrecise(Decimal::new(1005, 3)))
        );
        validator.check_discount(DiscountType::Fixed, Decimal::new(1_500, 3))?;

        Ok(())
    }

    #[test]
    fn rejects_unknown_type_strings() {
        assert_eq!(
            RuleValidator::default().parse_discount("bogus", Decimal::ONE),
            Err(ValidationError::UnknownDiscountType(UnknownDiscountType("bogus".to_string())))
        );
    }

    #[test]
    fn rejects_rules_without_scope() {
        assert_eq!(
            RuleValidator::default().check_rule(DiscountType::Fixed, Decimal::ONE, 0, 0),
            Err(ValidationError::EmptyScope)
        );
    }

    #[test]
    fn rejects_inverted_schedule() -> TestResult {
        let start: jiff::Timestamp = "2025-02-01T00:00:00Z".parse()?;
        let end: jiff::Timestamp = "2025-01-01T00:00:00Z".parse()?;

        assert!(matches!(
            RuleValidator::check_schedule(Some(start), Some(end)),
            Err(ValidationError::Schedule(_))
        ));

        Ok(())
    }
}
