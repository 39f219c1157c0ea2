//! Customer Groups

use serde::{Deserialize, Serialize};

use crate::ids::TypedId;

/// Customer group id
pub type GroupId = TypedId<CustomerGroup>;

/// Shopper id
pub type UserId = TypedId<User>;

/// A named customer segment that pricing rules are scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerGroup {
    /// Group id
    pub id: GroupId,

    /// Display name
    pub name: String,

    /// Free-form description
    pub description: String,
}

/// Shopper marker.
#[derive(Debug)]
pub struct User;

impl UserId {
    /// Id used for shoppers who are not signed in. No assignment can exist for it, so
    /// guests always fall through to the default group.
    pub const GUEST: Self = Self::new(0);
}
