//! Request-scoped resolution memo

use rustc_hash::FxHashMap;

use crate::{catalog::ProductId, groups::UserId, rules::ResolvedRule};

/// Rule resolutions already made during one request, keyed by product and user.
///
/// A miss (`None`) is cached too, so a product with no applicable rule is only looked
/// up once. Create one per request and drop it at the end; it is not shared between
/// requests.
#[derive(Debug, Default)]
pub struct ResolutionMemo {
    entries: FxHashMap<(ProductId, UserId), Option<ResolvedRule>>,
}

impl ResolutionMemo {
    /// Empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached resolution, outer `None` meaning "not resolved yet".
    pub fn get(&self, product: ProductId, user: UserId) -> Option<Option<&ResolvedRule>> {
        self.entries.get(&(product, user)).map(Option::as_ref)
    }

    /// Record a resolution.
    pub fn insert(&mut self, product: ProductId, user: UserId, resolved: Option<ResolvedRule>) {
        self.entries.insert((product, user), resolved);
    }

    /// Number of cached pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything, e.g. after a rule edit within the same request.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
