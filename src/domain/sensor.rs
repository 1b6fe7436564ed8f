use super::IssuedCertificate;
use chrono::{DateTime, Utc};

/// Days reported when there is nothing to report.
pub const SENTINEL_DAYS: i64 = 99_999;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thresholds {
    pub warning_days: u32,
    pub error_days: u32,
}

impl Thresholds {
    pub fn new(warning_days: u32, error_days: u32) -> Self {
        Self { warning_days, error_days }
    }
}

/// One sensor reading. Always rendered as the expiry channel plus a
/// zero-valued placeholder channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorRecord {
    pub days_remaining: i64,
    pub thresholds: Thresholds,
    pub text: String,
}

impl SensorRecord {
    pub fn expiry(cert: &IssuedCertificate, template_name: &str, thresholds: Thresholds, now: DateTime<Utc>) -> Self {
        let days = cert.days_remaining(now);
        Self {
            days_remaining: days,
            thresholds,
            text: format!("{} ({}) expires in {} Days", cert.common_name, template_name, days),
        }
    }

    pub fn out_of_range(return_index: usize, available: usize) -> Self {
        Self {
            days_remaining: SENTINEL_DAYS,
            thresholds: Thresholds::default(),
            text: format!(
                "ReturnIndex {} out of range - Result only contains {} elements",
                return_index, available
            ),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.days_remaining == SENTINEL_DAYS && self.thresholds == Thresholds::default()
    }
}
