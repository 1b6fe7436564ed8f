use chrono::{DateTime, Months, Utc};
use super::ProbeError;

/// Expiration range queried from the CA, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ExpiryWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ProbeError> {
        if start > end {
            return Err(ProbeError::input(format!(
                "start date {} is after end date {}",
                start.format("%Y-%m-%d %H:%M"),
                end.format("%Y-%m-%d %H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    /// `start` (default now) through `end` (default twelve months after now).
    pub fn resolve(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<Self, ProbeError> {
        let start = start.unwrap_or(now);
        let end = match end {
            Some(e) => e,
            None => now
                .checked_add_months(Months::new(12))
                .ok_or_else(|| ProbeError::input("default end date is out of range"))?,
        };
        Self::new(start, end)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}
