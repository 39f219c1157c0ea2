//! Schedules

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors building a schedule window.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The window closes at or before it opens.
    #[error("end date must be after start date")]
    EndNotAfterStart {
        /// Window start
        start: Timestamp,
        /// Window end
        end: Timestamp,
    },
}

/// Truncate an instant to whole milliseconds, the precision instants are stored at.
///
/// Schedule bounds and evaluation instants are compared at this precision so that
/// an in-memory check and a store query always agree.
#[must_use]
pub fn to_millisecond_precision(at: Timestamp) -> Timestamp {
    Timestamp::from_millisecond(at.as_millisecond()).unwrap_or(at)
}

/// Optional activation/expiry window of a rule. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    start: Option<Timestamp>,
    end: Option<Timestamp>,
}

/// Where an instant falls relative to a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// No bounds at all.
    AlwaysActive,

    /// Start lies in the future.
    Scheduled,

    /// Inside the window.
    Active,

    /// End lies in the past.
    Expired,
}

impl ScheduleStatus {
    /// Label used in listings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlwaysActive => "always active",
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }
}

impl Schedule {
    /// Build a schedule window. Bounds are truncated to whole milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EndNotAfterStart`] when both bounds are present and
    /// `end <= start`.
    pub fn new(start: Option<Timestamp>, end: Option<Timestamp>) -> Result<Self, ScheduleError> {
        let start = start.map(to_millisecond_precision);
        let end = end.map(to_millisecond_precision);

        if let (Some(start), Some(end)) = (start, end)
            && end <= start
        {
            return Err(ScheduleError::EndNotAfterStart { start, end });
        }

        Ok(Self { start, end })
    }

    /// A schedule with no bounds.
    #[must_use]
    pub const fn always() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Window start, if any.
    pub fn start(&self) -> Option<Timestamp> {
        self.start
    }

    /// Window end, if any.
    pub fn end(&self) -> Option<Timestamp> {
        self.end
    }

    /// `(start is null or start <= at) and (end is null or end >= at)`
    pub fn contains(&self, at: Timestamp) -> bool {
        let at = to_millisecond_precision(at);

        self.start.is_none_or(|start| start <= at) && self.end.is_none_or(|end| end >= at)
    }

    /// Classify `at` against this window.
    pub fn status(&self, at: Timestamp) -> ScheduleStatus {
        let at = to_millisecond_precision(at);

        match (self.start, self.end) {
            (None, None) => ScheduleStatus::AlwaysActive,
            (Some(start), _) if start > at => ScheduleStatus::Scheduled,
            (_, Some(end)) if end < at => ScheduleStatus::Expired,
            _ => ScheduleStatus::Active,
        }
    }
}
