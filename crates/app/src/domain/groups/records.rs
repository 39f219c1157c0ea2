//! Group Records

use cohort::groups::{CustomerGroup, GroupId};
use sqlx::{FromRow, Row, sqlite::SqliteRow};

/// What deleting a group removed alongside it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupDeletion {
    pub rules: u64,
    pub assignments: u64,
}

/// A `customer_groups` row.
#[derive(Debug, Clone)]
pub(crate) struct GroupRow(pub(crate) CustomerGroup);

impl<'r> FromRow<'r, SqliteRow> for GroupRow {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self(CustomerGroup {
            id: GroupId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
        }))
    }
}
