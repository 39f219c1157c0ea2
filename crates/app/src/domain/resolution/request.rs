//! Per-request pricing state.

use cohort::{memo::ResolutionMemo, schedule::to_millisecond_precision};
use jiff::Timestamp;

/// State for pricing within one request: the instant rules are evaluated at and the
/// resolutions already made. Create one per request and drop it afterwards.
#[derive(Debug)]
pub struct PricingRequest {
    point_in_time: Timestamp,
    memo: ResolutionMemo,
}

impl PricingRequest {
    /// Start a request evaluated at `point_in_time`, truncated to whole milliseconds.
    #[must_use]
    pub fn new(point_in_time: Timestamp) -> Self {
        Self {
            point_in_time: to_millisecond_precision(point_in_time),
            memo: ResolutionMemo::new(),
        }
    }

    #[must_use]
    pub fn point_in_time(&self) -> Timestamp {
        self.point_in_time
    }

    #[must_use]
    pub fn memo(&self) -> &ResolutionMemo {
        &self.memo
    }

    /// Drop cached resolutions, e.g. after editing rules mid-request.
    pub fn invalidate(&mut self) {
        self.memo.clear();
    }

    pub(crate) fn memo_mut(&mut self) -> &mut ResolutionMemo {
        &mut self.memo
    }
}
