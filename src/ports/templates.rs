use crate::domain::{CertificateTemplate, ProbeError};

pub trait TemplateDirectory: Send + Sync {
    fn templates(&self) -> impl std::future::Future<Output = Result<Vec<CertificateTemplate>, ProbeError>> + Send;
}
