use crate::domain::{ExpiryWindow, IssuedCertificate, ProbeError};

/// Enumerates issued certificates on a CA.
///
/// Implementations return only certificates expiring inside `window`, sorted
/// ascending by expiration.
pub trait CertificateSource: Send + Sync {
    fn issued_expiring(&self, window: &ExpiryWindow) -> impl std::future::Future<Output = Result<Vec<IssuedCertificate>, ProbeError>> + Send;
}
