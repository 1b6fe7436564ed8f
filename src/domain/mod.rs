mod certificate;
mod template;
mod sensor;
mod window;
mod error;

pub use certificate::{IssuedCertificate, TemplateRef};
pub use template::{CertificateTemplate, TemplateCatalog, TemplateExclusions, CT_FLAG_AUTO_ENROLLMENT};
pub use sensor::{SensorRecord, Thresholds, SENTINEL_DAYS};
pub use window::ExpiryWindow;
pub use error::{ErrorClass, ProbeError};
