//! Maintenance Records

/// Rows removed by an orphan sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrphanCleanup {
    pub assignments: u64,
    pub product_links: u64,
    pub category_links: u64,
}

impl OrphanCleanup {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.assignments + self.product_links + self.category_links
    }
}
