use std::path::PathBuf;
use std::process::Stdio;
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Timelike, Utc};
use tokio::process::Command;
use tracing::{debug, info};
use crate::domain::{ExpiryWindow, IssuedCertificate, ProbeError, TemplateRef};
use crate::ports::CertificateSource;

/// Disposition of issued (not pending, denied or revoked) requests.
const DISPOSITION_ISSUED: u32 = 20;
const OUT_COLUMNS: &str = "CertificateTemplate,CommonName,NotAfter";
const RESTRICT_DATE_FORMAT: &str = "%m/%d/%Y %H:%M";

/// certutil prints dates in the server's locale; the common ones are tried in order.
const OUTPUT_DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Enumerates issued certificates with `certutil -view`.
pub struct CertutilSource {
    program: PathBuf,
    config: String,
}

impl CertutilSource {
    /// `config` is the `-config` string, `HOST\CA Name`.
    pub fn new(program: impl Into<PathBuf>, config: impl Into<String>) -> Self {
        Self { program: program.into(), config: config.into() }
    }

    fn restriction(window: &ExpiryWindow) -> String {
        format!(
            "Disposition={},NotAfter>={},NotAfter<={}",
            DISPOSITION_ISSUED,
            window.start.with_timezone(&Local).format(RESTRICT_DATE_FORMAT),
            ceil_to_minute(window.end).with_timezone(&Local).format(RESTRICT_DATE_FORMAT)
        )
    }
}

impl CertificateSource for CertutilSource {
    async fn issued_expiring(&self, window: &ExpiryWindow) -> Result<Vec<IssuedCertificate>, ProbeError> {
        let restrict = Self::restriction(window);
        debug!(program = %self.program.display(), config = %self.config, %restrict, "running certutil");

        let output = Command::new(&self.program)
            .arg("-config")
            .arg(&self.config)
            .arg("-view")
            .arg("-restrict")
            .arg(&restrict)
            .arg("-out")
            .arg(OUT_COLUMNS)
            .arg("csv")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProbeError::ca(format!("failed to run {}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() { stdout.trim().to_string() } else { stderr.trim().to_string() };
            return Err(ProbeError::ca(format!("certutil failed for {} ({}): {}", self.config, output.status, detail)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut certs = parse_view_csv(&stdout, &Local)?;
        certs.retain(|c| window.contains(c.not_after));
        certs.sort_by_key(|c| c.not_after);
        info!(rows = certs.len(), "certutil returned issued certificates");
        Ok(certs)
    }
}

/// Parses `certutil -view -out CertificateTemplate,CommonName,NotAfter csv`.
/// Dates are interpreted in `tz`, the CA host's local time.
pub fn parse_view_csv<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<Vec<IssuedCertificate>, ProbeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let mut certs = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(|e| ProbeError::ca(format!("unreadable certutil output: {}", e)))?;
        if row.len() < 3 {
            debug!(line = line + 2, "skipping certutil line: {:?}", row.as_slice());
            continue;
        }

        let template = TemplateRef::from_certutil(field(&row[0]));
        let common_name = field(&row[1]);
        let not_after = parse_local_date(&row[2], tz)
            .ok_or_else(|| ProbeError::ca(format!("unrecognised expiration date '{}' on row {}", &row[2], line + 1)))?;

        certs.push(IssuedCertificate::new(template, common_name, not_after));
    }
    Ok(certs)
}

/// The restriction only has minute precision; the exact bounds are applied
/// after parsing.
fn ceil_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    let floor = at.with_second(0).and_then(|d| d.with_nanosecond(0)).unwrap_or(at);
    if floor < at { floor + Duration::minutes(1) } else { floor }
}

fn field(raw: &str) -> &str {
    if raw == "EMPTY" { "" } else { raw }
}

fn parse_local_date<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    OUTPUT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}
