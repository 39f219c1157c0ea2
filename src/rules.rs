//! Pricing Rules

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{discounts::DiscountType, groups::GroupId, ids::TypedId, schedule::Schedule};

/// Pricing rule id
pub type RuleId = TypedId<PricingRule>;

/// A discount definition scoped to one customer group.
///
/// The products and categories a rule applies to live beside it in the store; the
/// engine only ever sees rules that were already matched to a product or category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRule {
    /// Store key
    pub id: RuleId,

    /// Owning group
    pub group: GroupId,

    /// Percentage or fixed amount
    pub discount_type: DiscountType,

    /// Percent (`0..=100`) or major currency units, depending on `discount_type`
    pub discount_value: Decimal,

    /// Administrative on/off switch
    pub is_active: bool,

    /// Optional activation window
    #[serde(default)]
    pub schedule: Schedule,

    /// Creation instant, used to break ties between equal discounts
    pub created_at: Timestamp,

    /// Display position in listings; never consulted when choosing a winner
    #[serde(default)]
    pub sort_order: u32,
}

impl PricingRule {
    /// Active and inside its schedule at `at`.
    pub fn is_eligible(&self, at: Timestamp) -> bool {
        self.is_active && self.schedule.contains(at)
    }
}

/// Which association matched a resolved rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSource {
    /// Associated with the product, or with its parent when the product is a variation.
    Product,

    /// Associated with one of the product's categories or their ancestors.
    Category,
}

impl RuleSource {
    /// Label used in listings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Category => "category",
        }
    }
}

/// The winning rule for one product/user evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRule {
    /// Winning rule
    pub rule: PricingRule,

    /// Where the rule came from
    pub source: RuleSource,
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use testresult::TestResult;

    use super::*;

    fn rule(is_active: bool, schedule: Schedule) -> Result<PricingRule, jiff::Error> {
        Ok(PricingRule {
            id: RuleId::new(1),
            group: GroupId::new(1),
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::new(10, 0),
            is_active,
            schedule,
            created_at: "2025-01-01T00:00:00Z".parse()?,
            sort_order: 1,
        })
    }

    #[test]
    fn inactive_rule_is_never_eligible() -> TestResult {
        let now: Timestamp = "2025-03-01T00:00:00Z".parse()?;

        assert!(rule(true, Schedule::always())?.is_eligible(now));
        assert!(!rule(false, Schedule::always())?.is_eligible(now));

        Ok(())
    }

    #[test]
    fn eligibility_follows_the_schedule_without_other_changes() -> TestResult {
        let now: Timestamp = "2025-03-01T00:00:00Z".parse()?;
        let start = now.checked_sub(SignedDuration::from_hours(1))?;

        let open = rule(
            true,
            Schedule::new(Some(start), Some(now.checked_add(SignedDuration::from_hours(1))?))?,
        )?;
        let closed = PricingRule {
            schedule: Schedule::new(Some(start), Some(now.checked_sub(SignedDuration::from_mins(1))?))?,
            ..open.clone()
        };

        assert!(open.is_eligible(now));
        assert!(!closed.is_eligible(now));

        Ok(())
    }
}
