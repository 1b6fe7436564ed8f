use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use crate::domain::*;
use crate::ports::{CertificateSource, TemplateDirectory};

#[derive(Debug, Deserialize)]
struct ExportedCertificate {
    template: String,
    #[serde(default)]
    template_name: Option<String>,
    #[serde(default)]
    common_name: String,
    not_after: DateTime<Utc>,
}

impl From<ExportedCertificate> for IssuedCertificate {
    fn from(e: ExportedCertificate) -> Self {
        let mut template = TemplateRef::new(e.template);
        if let Some(name) = e.template_name {
            template = template.with_friendly_name(name);
        }
        IssuedCertificate::new(template, e.common_name, e.not_after)
    }
}

#[derive(Debug, Deserialize)]
struct ExportedTemplate {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    oid: Option<String>,
    #[serde(default)]
    auto_enroll: bool,
    #[serde(default)]
    enrollment_flags: u32,
}

impl From<ExportedTemplate> for CertificateTemplate {
    fn from(e: ExportedTemplate) -> Self {
        let mut flags = e.enrollment_flags;
        if e.auto_enroll {
            flags |= CT_FLAG_AUTO_ENROLLMENT;
        }
        let mut template = CertificateTemplate::new(e.name).with_enrollment_flags(flags);
        if let Some(display_name) = e.display_name {
            template = template.with_display_name(display_name);
        }
        if let Some(oid) = e.oid {
            template = template.with_oid(oid);
        }
        template
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("invalid JSON in {}: {}", path.display(), e))
}

/// Issued certificates exported to a JSON array, e.g. by a scheduled job on
/// the CA host.
pub struct ExportFileSource {
    path: PathBuf,
}

impl ExportFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CertificateSource for ExportFileSource {
    async fn issued_expiring(&self, window: &ExpiryWindow) -> Result<Vec<IssuedCertificate>, ProbeError> {
        let exported: Vec<ExportedCertificate> = read_json(&self.path).await.map_err(ProbeError::ca)?;
        let total = exported.len();
        let mut certs: Vec<IssuedCertificate> = exported
            .into_iter()
            .map(IssuedCertificate::from)
            .filter(|c| window.contains(c.not_after))
            .collect();
        certs.sort_by_key(|c| c.not_after);
        info!(path = %self.path.display(), total, in_window = certs.len(), "read certificate export");
        Ok(certs)
    }
}

/// Template metadata kept in a JSON file.
pub struct TemplateFile {
    path: PathBuf,
}

impl TemplateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TemplateDirectory for TemplateFile {
    async fn templates(&self) -> Result<Vec<CertificateTemplate>, ProbeError> {
        let exported: Vec<ExportedTemplate> = read_json(&self.path).await.map_err(ProbeError::directory)?;
        Ok(exported.into_iter().map(CertificateTemplate::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use chrono::TimeZone;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn export_is_windowed_and_sorted() {
        let file = write_temp(r#"[
            {"template": "WebServer", "template_name": "Web Server", "common_name": "late.contoso.com", "not_after": "2027-06-01T00:00:00Z"},
            {"template": "1.3.6.1.4.1.311.21.8.9", "common_name": "early.contoso.com", "not_after": "2026-11-01T00:00:00Z"},
            {"template": "WebServer", "common_name": "outside.contoso.com", "not_after": "2030-01-01T00:00:00Z"}
        ]"#);
        let window = ExpiryWindow::new(
            Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2027, 10, 19, 0, 0, 0).unwrap(),
        ).unwrap();

        let certs = ExportFileSource::new(file.path()).issued_expiring(&window).await.unwrap();
        let names: Vec<&str> = certs.iter().map(|c| c.common_name.as_str()).collect();
        assert_eq!(names, vec!["early.contoso.com", "late.contoso.com"]);
        assert_eq!(certs[0].template.friendly_name, None);
        assert_eq!(certs[1].template.friendly_name.as_deref(), Some("Web Server"));
    }

    #[tokio::test]
    async fn missing_export_is_a_ca_error() {
        let window = ExpiryWindow::new(Utc::now(), Utc::now()).unwrap();
        let err = ExportFileSource::new("/nonexistent/certs.json").issued_expiring(&window).await.unwrap_err();
        assert_eq!(err.class, ErrorClass::Ca);
    }

    #[tokio::test]
    async fn template_file_sets_auto_enroll_flag() {
        let file = write_temp(r#"[
            {"name": "User", "display_name": "User", "auto_enroll": true},
            {"name": "ContosoWeb", "oid": "1.3.6.1.4.1.311.21.8.9", "enrollment_flags": 32},
            {"name": "WebServer"}
        ]"#);
        let templates = TemplateFile::new(file.path()).templates().await.unwrap();
        assert!(templates[0].is_auto_enroll());
        assert!(templates[1].is_auto_enroll());
        assert_eq!(templates[1].oid.as_deref(), Some("1.3.6.1.4.1.311.21.8.9"));
        assert!(!templates[2].is_auto_enroll());
    }

    #[tokio::test]
    async fn malformed_template_file_is_a_directory_error() {
        let file = write_temp("{ not json");
        let err = TemplateFile::new(file.path()).templates().await.unwrap_err();
        assert_eq!(err.class, ErrorClass::Directory);
    }
}
