//! Cohort prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    catalog::{Category, CategoryId, Product, ProductId},
    discounts::{DiscountType, UnknownDiscountType},
    fixtures::{Fixture, FixtureError, RuleDefinition},
    groups::{CustomerGroup, GroupId, UserId},
    ids::TypedId,
    memo::ResolutionMemo,
    precedence::{compare_rules, is_better, select_winner},
    pricing::{Price, PriceAdjustment, PricingError, UnknownCurrency, apply_rule, base_price, parse_currency},
    rules::{PricingRule, ResolvedRule, RuleId, RuleSource},
    schedule::{Schedule, ScheduleError, ScheduleStatus},
    validation::{RuleValidator, ValidationError},
};
