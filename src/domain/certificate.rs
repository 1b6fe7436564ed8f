use chrono::{DateTime, Utc};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Template a certificate was issued from, as recorded by the CA.
///
/// `identifier` is the template OID for version 2+ templates and the template
/// name for version 1 templates. The friendly name is only present when the
/// enumeration reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub identifier: String,
    pub friendly_name: Option<String>,
}

impl TemplateRef {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self { identifier: identifier.into(), friendly_name: None }
    }

    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.friendly_name = if name.trim().is_empty() { None } else { Some(name) };
        self
    }

    /// Splits a certutil template column. Version 2 templates come out as an
    /// OID optionally followed by the friendly name, version 1 templates as a
    /// bare name which doubles as their friendly name.
    pub fn from_certutil(raw: &str) -> Self {
        let raw = raw.trim();
        if !looks_like_oid(raw.split_whitespace().next().unwrap_or("")) {
            return Self::new(raw).with_friendly_name(raw);
        }
        match raw.split_once(char::is_whitespace) {
            Some((oid, rest)) => Self::new(oid).with_friendly_name(rest.trim()),
            None => Self::new(raw),
        }
    }
}

fn looks_like_oid(s: &str) -> bool {
    s.contains('.') && s.split('.').all(|arc| !arc.is_empty() && arc.bytes().all(|b| b.is_ascii_digit()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCertificate {
    pub template: TemplateRef,
    pub common_name: String,
    pub not_after: DateTime<Utc>,
}

impl IssuedCertificate {
    pub fn new(template: TemplateRef, common_name: impl Into<String>, not_after: DateTime<Utc>) -> Self {
        Self { template, common_name: common_name.into(), not_after }
    }

    /// Whole days left until expiry, truncated toward zero.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.not_after - now).num_milliseconds() / MILLIS_PER_DAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(days: i64, hours: i64) -> (IssuedCertificate, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let cert = IssuedCertificate::new(
            TemplateRef::new("WebServer"),
            "www.contoso.com",
            now + Duration::days(days) + Duration::hours(hours),
        );
        (cert, now)
    }

    #[test]
    fn days_are_truncated_not_rounded() {
        let (cert, now) = at(10, 22);
        assert_eq!(cert.days_remaining(now), 10);
    }

    #[test]
    fn less_than_a_day_is_zero() {
        let (cert, now) = at(0, 23);
        assert_eq!(cert.days_remaining(now), 0);
    }

    #[test]
    fn expired_truncates_toward_zero() {
        let (cert, now) = at(-1, -12);
        assert_eq!(cert.days_remaining(now), -1);
    }

    #[test]
    fn certutil_v2_template_with_name() {
        let t = TemplateRef::from_certutil("1.3.6.1.4.1.311.21.8.1234.5678.1 Contoso Web Server");
        assert_eq!(t.identifier, "1.3.6.1.4.1.311.21.8.1234.5678.1");
        assert_eq!(t.friendly_name.as_deref(), Some("Contoso Web Server"));
    }

    #[test]
    fn certutil_bare_oid() {
        let t = TemplateRef::from_certutil("1.3.6.1.4.1.311.21.8.99");
        assert_eq!(t.identifier, "1.3.6.1.4.1.311.21.8.99");
        assert_eq!(t.friendly_name, None);
    }

    #[test]
    fn certutil_v1_template_name() {
        let t = TemplateRef::from_certutil("WebServer");
        assert_eq!(t.identifier, "WebServer");
        assert_eq!(t.friendly_name.as_deref(), Some("WebServer"));
    }

    #[test]
    fn blank_friendly_name_is_dropped() {
        let t = TemplateRef::new("1.2.3").with_friendly_name("  ");
        assert_eq!(t.friendly_name, None);
    }
}
