mod certutil;
mod export;
mod ldap;
mod backend;
mod clock;
mod renderer;
mod runtime;

pub use certutil::{parse_view_csv, CertutilSource};
pub use export::{ExportFileSource, TemplateFile};
pub use ldap::{template_from_entry, LdapCredentials, LdapTemplateDirectory};
pub use backend::{CertificateBackend, TemplateBackend};
pub use clock::SystemClock;
pub use renderer::{PrtgJsonRenderer, PrtgTextRenderer};
pub use runtime::{block_on_bounded, SHUTDOWN_GRACE};
