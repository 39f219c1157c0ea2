//! Rule Precedence
//!
//! Picks one winner among eligible category rules. Product rules never reach this
//! module: when one matches it wins outright.

use std::cmp::Ordering;

use crate::{discounts::DiscountType, rules::PricingRule};

const fn type_rank(discount_type: DiscountType) -> u8 {
    match discount_type {
        DiscountType::Percentage => 0,
        DiscountType::Fixed => 1,
    }
}

/// Total order over rules; `Greater` means `a` is the better rule.
///
/// Fixed beats percentage whatever the magnitudes. Within one type the higher raw
/// `discount_value` wins, with no reference to the price it will be applied to. Equal
/// values fall back to the later `created_at`, then to the higher rule id.
pub fn compare_rules(a: &PricingRule, b: &PricingRule) -> Ordering {
    type_rank(a.discount_type)
        .cmp(&type_rank(b.discount_type))
        .then_with(|| a.discount_value.cmp(&b.discount_value))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Whether `candidate` should replace `incumbent` as the current winner.
pub fn is_better(candidate: &PricingRule, incumbent: &PricingRule) -> bool {
    compare_rules(candidate, incumbent) == Ordering::Greater
}

/// Pairwise reduction: start from the first rule and replace the winner whenever a
/// later rule is strictly better.
pub fn select_winner<'a, I>(candidates: I) -> Option<&'a PricingRule>
where
    I: IntoIterator<Item = &'a PricingRule>,
{
    candidates.into_iter().fold(None, |winner, candidate| match winner {
        Some(incumbent) if !is_better(candidate, incumbent) => Some(incumbent),
        _ => Some(candidate),
    })
}
