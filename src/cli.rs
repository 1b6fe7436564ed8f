use std::path::PathBuf;
use std::time::Duration;
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use crate::application::{parse_date, parse_duration, split_template_list, ProbeConfig, SelectionParams};
use crate::domain::{ProbeError, Thresholds};
use crate::infrastructure::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// PRTG "EXE/Script Advanced" JSON
    PrtgJson,
    /// PRTG "EXE/Script" value:message line
    PrtgText,
}

/// Reports the ADCS certificate closest to expiry as a PRTG sensor result.
#[derive(Parser, Debug, Clone)]
#[command(name = "certexp", version, about)]
pub struct Cli {
    /// CA to query, as passed to `certutil -config` (HOST\CA Name)
    #[arg(long, env = "CERTEXP_CA", value_name = "HOST\\CA")]
    pub ca: String,

    /// Earliest expiration date to report (YYYY-MM-DD or RFC 3339) [default: now]
    #[arg(long, env = "CERTEXP_START", value_parser = parse_date)]
    pub start: Option<DateTime<Utc>>,

    /// Latest expiration date to report [default: now + 12 months]
    #[arg(long, env = "CERTEXP_END", value_parser = parse_date)]
    pub end: Option<DateTime<Utc>>,

    /// Semicolon-separated template names to ignore
    #[arg(long, env = "CERTEXP_EXCLUDE_TEMPLATES", value_name = "NAME;NAME", default_value = "")]
    pub exclude_templates: String,

    /// Ignore certificates from templates with auto-enrollment enabled
    #[arg(long, env = "CERTEXP_EXCLUDE_AUTO_ENROLL")]
    pub exclude_auto_enroll: bool,

    /// Warning limit in days
    #[arg(long = "warning-days", env = "CERTEXP_WARNING_DAYS")]
    pub warning_days: u32,

    /// Error limit in days
    #[arg(long = "error-days", env = "CERTEXP_ERROR_DAYS")]
    pub error_days: u32,

    /// Number of certificates kept after filtering
    #[arg(long, env = "CERTEXP_MAX_RESULTS", default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_results: u32,

    /// Which of the kept certificates to report, 0 = soonest to expire
    #[arg(long, env = "CERTEXP_RETURN_INDEX", default_value_t = 0)]
    pub return_index: u32,

    /// Read issued certificates from a JSON export instead of running certutil
    #[arg(long, env = "CERTEXP_EXPORT_FILE", value_name = "PATH")]
    pub export_file: Option<PathBuf>,

    /// certutil executable
    #[arg(long, env = "CERTEXP_CERTUTIL", default_value = "certutil", value_name = "PATH")]
    pub certutil: PathBuf,

    /// Domain controller holding the certificate templates (ldap://dc01.contoso.com)
    #[arg(long, env = "CERTEXP_LDAP_URL", value_name = "URL", conflicts_with = "templates_file")]
    pub ldap_url: Option<String>,

    /// Configuration naming context [default: read from rootDSE]
    #[arg(long, env = "CERTEXP_LDAP_BASE", value_name = "DN")]
    pub ldap_base: Option<String>,

    /// Bind user for --ldap-url; the password is read from CERTEXP_LDAP_PASSWORD
    #[arg(long, env = "CERTEXP_LDAP_USER", value_name = "USER")]
    pub ldap_user: Option<String>,

    #[arg(long, env = "CERTEXP_LDAP_PASSWORD", hide = true, hide_env_values = true)]
    pub ldap_password: Option<String>,

    /// Read certificate templates from a JSON file instead of LDAP
    #[arg(long, env = "CERTEXP_TEMPLATES_FILE", value_name = "PATH")]
    pub templates_file: Option<PathBuf>,

    /// Limit for each CA or directory round-trip (30s, 1500ms)
    #[arg(long, env = "CERTEXP_TIMEOUT", default_value = "60s", value_parser = parse_duration)]
    pub timeout: Duration,

    #[arg(long, env = "CERTEXP_FORMAT", value_enum, default_value_t = OutputFormat::PrtgJson)]
    pub format: OutputFormat,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn probe_config(&self) -> Result<ProbeConfig, ProbeError> {
        let selection = SelectionParams::new(Thresholds::new(self.warning_days, self.error_days))
            .with_excluded_templates(split_template_list(&self.exclude_templates))
            .with_auto_enroll_exclusion(self.exclude_auto_enroll)
            .with_max_results(self.max_results as usize)
            .with_return_index(self.return_index as usize);

        let config = ProbeConfig::new(self.ca.clone(), selection)
            .with_window(self.start, self.end)
            .with_timeout(self.timeout);
        config.validate()?;
        Ok(config)
    }

    pub fn certificate_backend(&self) -> CertificateBackend {
        match &self.export_file {
            Some(path) => CertificateBackend::Export(ExportFileSource::new(path)),
            None => CertificateBackend::Certutil(CertutilSource::new(&self.certutil, &self.ca)),
        }
    }

    pub fn template_backend(&self) -> Result<Option<TemplateBackend>, ProbeError> {
        if let Some(path) = &self.templates_file {
            return Ok(Some(TemplateBackend::File(TemplateFile::new(path))));
        }
        let Some(url) = &self.ldap_url else {
            return Ok(None);
        };

        let credentials = match (&self.ldap_user, &self.ldap_password) {
            (Some(user), Some(password)) => Some(LdapCredentials { user: user.clone(), password: password.clone() }),
            (Some(_), None) => return Err(ProbeError::input("--ldap-user needs CERTEXP_LDAP_PASSWORD")),
            (None, _) => None,
        };

        Ok(Some(TemplateBackend::Ldap(
            LdapTemplateDirectory::new(url.clone())
                .with_configuration_nc(self.ldap_base.clone())
                .with_credentials(credentials)
                .with_timeout(self.timeout),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("certexp").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let cli = parse(&["--ca", "pki01\\Contoso Issuing CA", "--warning-days", "30", "--error-days", "10"]).unwrap();
        let cfg = cli.probe_config().unwrap();
        assert_eq!(cfg.selection.max_results, 10);
        assert_eq!(cfg.selection.return_index, 0);
        assert!(cfg.selection.exclude_templates.is_empty());
        assert!(!cfg.selection.exclude_auto_enroll);
        assert_eq!(cfg.timeout, Duration::from_secs(60));
        assert_eq!(cli.format, OutputFormat::PrtgJson);
        assert!(matches!(cli.certificate_backend(), CertificateBackend::Certutil(_)));
        assert!(cli.template_backend().unwrap().is_none());
    }

    #[test]
    fn thresholds_are_required() {
        let err = parse(&["--ca", "pki01", "--warning-days", "30"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn negative_threshold_is_rejected() {
        assert!(parse(&["--ca", "pki01", "--warning-days", "-1", "--error-days", "10"]).is_err());
    }

    #[test]
    fn zero_max_results_is_rejected() {
        let err = parse(&["--ca", "pki01", "--warning-days", "30", "--error-days", "10", "--max-results", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn exclude_list_and_window() {
        let cli = parse(&[
            "--ca", "pki01", "--warning-days", "30", "--error-days", "10",
            "--exclude-templates", "WebServer;DomainController",
            "--start", "2026-11-01", "--end", "2027-01-01",
            "--return-index", "2",
        ]).unwrap();
        let cfg = cli.probe_config().unwrap();
        assert_eq!(cfg.selection.exclude_templates, vec!["WebServer", "DomainController"]);
        assert_eq!(cfg.selection.return_index, 2);
        assert!(cfg.start.unwrap() < cfg.end.unwrap());
    }

    #[test]
    fn inverted_window_is_an_input_error() {
        let cli = parse(&[
            "--ca", "pki01", "--warning-days", "30", "--error-days", "10",
            "--start", "2027-01-01", "--end", "2026-01-01",
        ]).unwrap();
        assert_eq!(cli.probe_config().unwrap_err().exit_code(), 2);
    }

    #[test]
    fn ldap_and_template_file_conflict() {
        let err = parse(&[
            "--ca", "pki01", "--warning-days", "30", "--error-days", "10",
            "--ldap-url", "ldap://dc01", "--templates-file", "t.json",
        ]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn ldap_user_without_password_is_rejected() {
        let mut cli = parse(&[
            "--ca", "pki01", "--warning-days", "30", "--error-days", "10",
            "--ldap-url", "ldap://dc01", "--ldap-user", "CONTOSO\\svc-prtg",
        ]).unwrap();
        cli.ldap_password = None;
        assert_eq!(cli.template_backend().err().map(|e| e.class), Some(crate::domain::ErrorClass::Input));

        cli.ldap_password = Some("hunter2".to_string());
        assert!(matches!(cli.template_backend().unwrap(), Some(TemplateBackend::Ldap(_))));
    }

    #[test]
    fn export_file_replaces_certutil() {
        let cli = parse(&[
            "--ca", "pki01", "--warning-days", "30", "--error-days", "10",
            "--export-file", "certs.json", "--format", "prtg-text",
        ]).unwrap();
        assert!(matches!(cli.certificate_backend(), CertificateBackend::Export(_)));
        assert_eq!(cli.format, OutputFormat::PrtgText);
    }
}
