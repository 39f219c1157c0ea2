//! Rule candidate fetching.

use std::sync::Arc;

use cohort::{
    catalog::{CategoryId, ProductId},
    groups::GroupId,
    rules::PricingRule,
};
use jiff::Timestamp;
use smallvec::{SmallVec, smallvec};

use crate::domain::resolution::{errors::StoreError, store::RuleStore};

/// Product ids a product rule may be attached to, most specific first.
pub type CandidateProducts = SmallVec<[ProductId; 2]>;

/// Fetches eligible product and category rules for a group.
#[derive(Clone)]
pub struct RuleCandidateFetcher {
    rules: Arc<dyn RuleStore>,
}

impl std::fmt::Debug for RuleCandidateFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleCandidateFetcher").finish_non_exhaustive()
    }
}

impl RuleCandidateFetcher {
    #[must_use]
    pub fn new(rules: Arc<dyn RuleStore>) -> Self {
        Self { rules }
    }

    /// The product itself, then its parent when it is a variation.
    #[must_use]
    pub fn candidate_products(product: ProductId, parent: Option<ProductId>) -> CandidateProducts {
        match parent {
            Some(parent) if parent != product => smallvec![product, parent],
            _ => smallvec![product],
        }
    }

    /// The single eligible product rule for the candidates, variation rules first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn product_rule(
        &self,
        candidates: &[ProductId],
        group: GroupId,
        at: Timestamp,
    ) -> Result<Option<PricingRule>, StoreError> {
        self.rules.active_product_rule(candidates, group, at).await
    }

    /// All eligible category rules for the categories, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn category_rules(
        &self,
        categories: &[CategoryId],
        group: GroupId,
        at: Timestamp,
    ) -> Result<Vec<PricingRule>, StoreError> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        self.rules.active_category_rules(categories, group, at).await
    }
}
