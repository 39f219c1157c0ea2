//! Rule Records

use std::str::FromStr;

use cohort::{
    catalog::{CategoryId, ProductId},
    discounts::DiscountType,
    groups::GroupId,
    rules::{PricingRule, RuleId},
    schedule::Schedule,
};
use rust_decimal::Decimal;
use sqlx::{FromRow, Row, sqlite::SqliteRow};

use crate::database::from_millis;

/// Rule Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRecord {
    pub rule: PricingRule,
    pub products: Vec<ProductId>,
    pub categories: Vec<CategoryId>,
}

/// What a conflicting set of rules is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictScope {
    Product(ProductId),
    Category(CategoryId),
}

/// Several rules of one group attached to the same product or category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleConflict {
    pub group: GroupId,
    pub scope: ConflictScope,
    pub rules: Vec<RuleId>,
}

/// A `pricing_rules` row.
#[derive(Debug, Clone)]
pub(crate) struct RuleRow(pub(crate) PricingRule);

fn decode_error(column: &str, source: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

impl<'r> FromRow<'r, SqliteRow> for RuleRow {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let discount_type = DiscountType::from_str(row.try_get("discount_type")?)
            .map_err(|e| decode_error("discount_type", e))?;

        let discount_value = Decimal::from_str(row.try_get("discount_value")?)
            .map_err(|e| decode_error("discount_value", e))?;

        let start = row
            .try_get::<Option<i64>, _>("start_at")?
            .map(|millis| from_millis("start_at", millis))
            .transpose()?;

        let end = row
            .try_get::<Option<i64>, _>("end_at")?
            .map(|millis| from_millis("end_at", millis))
            .transpose()?;

        let schedule = Schedule::new(start, end).map_err(|e| decode_error("end_at", e))?;

        let sort_order = u32::try_from(row.try_get::<i64, _>("sort_order")?)
            .map_err(|e| decode_error("sort_order", e))?;

        Ok(Self(PricingRule {
            id: RuleId::new(row.try_get("id")?),
            group: GroupId::new(row.try_get("group_id")?),
            discount_type,
            discount_value,
            is_active: row.try_get("is_active")?,
            schedule,
            created_at: from_millis("created_at", row.try_get("created_at")?)?,
            sort_order,
        }))
    }
}
