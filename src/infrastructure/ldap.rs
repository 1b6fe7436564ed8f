use std::time::Duration;
use ldap3::{LdapConn, LdapConnSettings, LdapError, Scope, SearchEntry};
use tracing::{debug, info};
use crate::domain::{CertificateTemplate, ProbeError};
use crate::ports::TemplateDirectory;

const TEMPLATE_CONTAINER: &str = "CN=Certificate Templates,CN=Public Key Services,CN=Services";
const TEMPLATE_FILTER: &str = "(objectClass=pKICertificateTemplate)";
const ATTR_NAME: &str = "cn";
const ATTR_DISPLAY_NAME: &str = "displayName";
const ATTR_OID: &str = "msPKI-Cert-Template-OID";
const ATTR_ENROLLMENT_FLAG: &str = "msPKI-Enrollment-Flag";

#[derive(Clone)]
pub struct LdapCredentials {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for LdapCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapCredentials").field("user", &self.user).finish_non_exhaustive()
    }
}

/// Reads certificate templates from the AD configuration partition.
#[derive(Debug, Clone)]
pub struct LdapTemplateDirectory {
    url: String,
    configuration_nc: Option<String>,
    credentials: Option<LdapCredentials>,
    timeout: Duration,
}

impl LdapTemplateDirectory {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            configuration_nc: None,
            credentials: None,
            timeout: Duration::from_secs(15),
        }
    }

    /// Skips the rootDSE lookup, e.g. `CN=Configuration,DC=contoso,DC=com`.
    pub fn with_configuration_nc(mut self, dn: Option<String>) -> Self {
        self.configuration_nc = dn;
        self
    }

    pub fn with_credentials(mut self, credentials: Option<LdapCredentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Bounds the connect and every request on the connection.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn fetch_blocking(&self) -> Result<Vec<CertificateTemplate>, ProbeError> {
        let settings = LdapConnSettings::new().set_conn_timeout(self.timeout);
        let mut ldap = LdapConn::with_settings(settings, &self.url).map_err(|e| self.failure("connect", e))?;

        if let Some(creds) = &self.credentials {
            ldap.with_timeout(self.timeout)
                .simple_bind(&creds.user, &creds.password)
                .and_then(|res| res.success())
                .map_err(|e| self.failure("bind", e))?;
        }

        let configuration_nc = match &self.configuration_nc {
            Some(dn) => dn.clone(),
            None => configuration_nc_from_root_dse(&mut ldap, self.timeout)
                .map_err(|e| self.failure("rootDSE search", e))?
                .ok_or_else(|| ProbeError::directory(format!("{} did not publish configurationNamingContext", self.url)))?,
        };
        let base = format!("{},{}", TEMPLATE_CONTAINER, configuration_nc);
        debug!(%base, "searching certificate templates");

        let (entries, _res) = ldap
            .with_timeout(self.timeout)
            .search(
                &base,
                Scope::OneLevel,
                TEMPLATE_FILTER,
                vec![ATTR_NAME, ATTR_DISPLAY_NAME, ATTR_OID, ATTR_ENROLLMENT_FLAG],
            )
            .and_then(|res| res.success())
            .map_err(|e| self.failure("template search", e))?;

        let templates = entries
            .into_iter()
            .map(SearchEntry::construct)
            .filter_map(|entry| template_from_entry(&entry))
            .collect();

        if let Err(e) = ldap.unbind() {
            debug!(url = %self.url, error = %e, "LDAP unbind failed");
        }
        Ok(templates)
    }

    fn failure(&self, step: &str, err: LdapError) -> ProbeError {
        ProbeError::directory(format!("LDAP {} on {} failed: {}", step, self.url, err))
    }
}

impl TemplateDirectory for LdapTemplateDirectory {
    async fn templates(&self) -> Result<Vec<CertificateTemplate>, ProbeError> {
        let this = self.clone();
        let templates = tokio::task::spawn_blocking(move || this.fetch_blocking())
            .await
            .map_err(|e| ProbeError::directory(format!("template lookup task failed: {}", e)))??;
        info!(url = %self.url, templates = templates.len(), "read certificate templates from directory");
        Ok(templates)
    }
}

fn configuration_nc_from_root_dse(ldap: &mut LdapConn, timeout: Duration) -> Result<Option<String>, LdapError> {
    let (entries, _res) = ldap
        .with_timeout(timeout)
        .search("", Scope::Base, "(objectClass=*)", vec!["configurationNamingContext"])?
        .success()?;
    Ok(entries
        .into_iter()
        .map(SearchEntry::construct)
        .find_map(|entry| first_value(&entry, "configurationNamingContext").map(str::to_string)))
}

fn first_value<'a>(entry: &'a SearchEntry, attr: &str) -> Option<&'a str> {
    entry
        .attrs
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(attr))
        .and_then(|(_, values)| values.first())
        .map(String::as_str)
}

/// `None` for entries without a `cn`.
pub fn template_from_entry(entry: &SearchEntry) -> Option<CertificateTemplate> {
    let name = first_value(entry, ATTR_NAME)?;
    // Stored as a signed 32-bit integer.
    let flags = first_value(entry, ATTR_ENROLLMENT_FLAG)
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|v| v as u32)
        .unwrap_or(0);

    let mut template = CertificateTemplate::new(name).with_enrollment_flags(flags);
    if let Some(display_name) = first_value(entry, ATTR_DISPLAY_NAME) {
        template = template.with_display_name(display_name);
    }
    if let Some(oid) = first_value(entry, ATTR_OID) {
        template = template.with_oid(oid);
    }
    Some(template)
}
