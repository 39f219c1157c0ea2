//! Rules Data

use cohort::{
    catalog::{CategoryId, ProductId},
    discounts::DiscountType,
    groups::GroupId,
};
use jiff::Timestamp;
use rust_decimal::Decimal;

/// New Rule Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewRule {
    pub group: GroupId,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub products: Vec<ProductId>,
    pub categories: Vec<CategoryId>,
    pub is_active: bool,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

/// Rule Update Data
///
/// Replaces the group, the discount and both association sets. The schedule is
/// changed separately.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleUpdate {
    pub group: GroupId,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub products: Vec<ProductId>,
    pub categories: Vec<CategoryId>,
}
