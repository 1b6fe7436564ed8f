use std::time::Instant;
use tracing::{info, warn};
use crate::domain::*;
use crate::ports::*;
use super::{ExpirySelector, ProbeConfig, Selection};

/// One probe run: template lookup, CA enumeration, selection.
pub struct CheckExpiryUseCase<S, T, C>
where
    S: CertificateSource,
    T: TemplateDirectory,
    C: Clock,
{
    source: S,
    directory: Option<T>,
    clock: C,
    config: ProbeConfig,
}

impl<S, T, C> CheckExpiryUseCase<S, T, C>
where
    S: CertificateSource,
    T: TemplateDirectory,
    C: Clock,
{
    pub fn new(source: S, directory: Option<T>, clock: C, config: ProbeConfig) -> Self {
        Self { source, directory, clock, config }
    }

    pub async fn execute(&self) -> Result<Selection, ProbeError> {
        self.config.validate()?;
        let params = &self.config.selection;
        let now = self.clock.now();
        let window = ExpiryWindow::resolve(self.config.start, self.config.end, now)?;

        if params.exclude_auto_enroll && self.directory.is_none() {
            return Err(ProbeError::input(
                "excluding auto-enrollment templates needs a template directory (--ldap-url or --templates-file)",
            ));
        }

        let catalog = self.load_catalog().await?;
        let mut exclusions = params.name_exclusions();
        if params.exclude_auto_enroll {
            let auto_enroll = catalog.auto_enroll_identifiers();
            info!(count = auto_enroll.len(), "auto-enrollment template identifiers excluded");
            exclusions = exclusions.with_auto_enroll(auto_enroll);
        }

        let started = Instant::now();
        let certs = self.clock.timeout(self.config.timeout, self.source.issued_expiring(&window)).await??;
        info!(
            ca = %self.config.ca,
            certificates = certs.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "enumerated certificates expiring between {} and {}",
            window.start.format("%Y-%m-%d"),
            window.end.format("%Y-%m-%d")
        );

        let selection = ExpirySelector::new(params, &exclusions, &catalog).select(certs, now);
        if selection.records.len() <= params.return_index {
            info!(
                return_index = params.return_index,
                available = selection.records.len(),
                "return index out of range, reporting sentinel"
            );
        }
        Ok(selection)
    }

    async fn load_catalog(&self) -> Result<TemplateCatalog, ProbeError> {
        let Some(directory) = &self.directory else {
            return Ok(TemplateCatalog::default());
        };

        let started = Instant::now();
        let result = self.clock.timeout(self.config.timeout, directory.templates()).await;

        match result.and_then(|inner| inner) {
            Ok(templates) => {
                info!(templates = templates.len(), elapsed_ms = started.elapsed().as_millis() as u64, "loaded certificate templates");
                Ok(TemplateCatalog::new(templates))
            }
            Err(e) if self.config.selection.exclude_auto_enroll => Err(e),
            Err(e) => {
                warn!("template lookup failed, reporting template identifiers instead of names: {}", e);
                Ok(TemplateCatalog::default())
            }
        }
    }
}
