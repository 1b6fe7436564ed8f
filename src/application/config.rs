use std::time::Duration;
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{ExpiryWindow, ProbeError, TemplateExclusions, Thresholds};

pub const DEFAULT_MAX_RESULTS: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Filter and selection parameters for one run.
#[derive(Debug, Clone)]
pub struct SelectionParams {
    pub exclude_templates: Vec<String>,
    pub exclude_auto_enroll: bool,
    pub thresholds: Thresholds,
    pub max_results: usize,
    pub return_index: usize,
}

impl SelectionParams {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            exclude_templates: Vec::new(),
            exclude_auto_enroll: false,
            thresholds,
            max_results: DEFAULT_MAX_RESULTS,
            return_index: 0,
        }
    }

    pub fn with_excluded_templates<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_templates = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_auto_enroll_exclusion(mut self, enabled: bool) -> Self {
        self.exclude_auto_enroll = enabled;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_return_index(mut self, return_index: usize) -> Self {
        self.return_index = return_index;
        self
    }

    pub fn validate(&self) -> Result<(), ProbeError> {
        if self.max_results == 0 {
            return Err(ProbeError::input("max results must be at least 1"));
        }
        Ok(())
    }

    pub fn name_exclusions(&self) -> TemplateExclusions {
        TemplateExclusions::new(&self.exclude_templates)
    }
}

#[derive(Debug)]
pub struct ProbeConfig {
    pub ca: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub selection: SelectionParams,
    pub timeout: Duration,
}

impl ProbeConfig {
    pub fn new(ca: impl Into<String>, selection: SelectionParams) -> Self {
        Self { ca: ca.into(), start: None, end: None, selection, timeout: DEFAULT_TIMEOUT }
    }

    pub fn with_window(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ProbeError> {
        if self.ca.trim().is_empty() {
            return Err(ProbeError::input("CA name must not be empty"));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            ExpiryWindow::new(start, end)?;
        }
        if self.timeout.is_zero() {
            return Err(ProbeError::input("timeout must be greater than zero"));
        }
        self.selection.validate()
    }
}

/// `30s`, `1500ms` or bare seconds.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let v = value.trim();
    let parsed = if let Some(s) = v.strip_suffix("ms") {
        s.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(s) = v.strip_suffix('s') {
        s.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(s) = v.strip_suffix('m') {
        s.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        v.parse::<u64>().ok().map(Duration::from_secs)
    };
    parsed.ok_or_else(|| format!("invalid duration '{}', expected e.g. 30s or 1500ms", value))
}

/// `YYYY-MM-DD` (midnight UTC) or RFC 3339.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    let v = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(v) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(v, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD or RFC 3339", value))
}

/// Semicolon-separated template list; blank entries are dropped.
pub fn split_template_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
