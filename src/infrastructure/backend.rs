use crate::domain::{CertificateTemplate, ExpiryWindow, IssuedCertificate, ProbeError};
use crate::ports::{CertificateSource, TemplateDirectory};
use super::{CertutilSource, ExportFileSource, LdapTemplateDirectory, TemplateFile};

/// Source chosen on the command line.
pub enum CertificateBackend {
    Certutil(CertutilSource),
    Export(ExportFileSource),
}

impl CertificateSource for CertificateBackend {
    async fn issued_expiring(&self, window: &ExpiryWindow) -> Result<Vec<IssuedCertificate>, ProbeError> {
        match self {
            CertificateBackend::Certutil(s) => s.issued_expiring(window).await,
            CertificateBackend::Export(s) => s.issued_expiring(window).await,
        }
    }
}

pub enum TemplateBackend {
    Ldap(LdapTemplateDirectory),
    File(TemplateFile),
}

impl TemplateDirectory for TemplateBackend {
    async fn templates(&self) -> Result<Vec<CertificateTemplate>, ProbeError> {
        match self {
            TemplateBackend::Ldap(d) => d.templates().await,
            TemplateBackend::File(d) => d.templates().await,
        }
    }
}
