use std::collections::{HashMap, HashSet};
use super::TemplateRef;

/// `CT_FLAG_AUTO_ENROLLMENT` in `msPKI-Enrollment-Flag`.
pub const CT_FLAG_AUTO_ENROLLMENT: u32 = 0x0000_0020;

/// A certificate template as published in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateTemplate {
    pub name: String,
    pub display_name: Option<String>,
    pub oid: Option<String>,
    pub enrollment_flags: u32,
}

impl CertificateTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), display_name: None, oid: None, enrollment_flags: 0 }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_oid(mut self, oid: impl Into<String>) -> Self {
        self.oid = Some(oid.into());
        self
    }

    pub fn with_enrollment_flags(mut self, flags: u32) -> Self {
        self.enrollment_flags = flags;
        self
    }

    pub fn is_auto_enroll(&self) -> bool {
        self.enrollment_flags & CT_FLAG_AUTO_ENROLLMENT != 0
    }

    /// Values the CA may have stored as the template identifier.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.oid.as_deref().into_iter().chain(std::iter::once(self.name.as_str()))
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().filter(|d| !d.is_empty()).unwrap_or(&self.name)
    }
}

/// Templates indexed by every identifier a certificate can reference them by.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    by_identifier: HashMap<String, CertificateTemplate>,
}

impl TemplateCatalog {
    pub fn new(templates: impl IntoIterator<Item = CertificateTemplate>) -> Self {
        let mut by_identifier = HashMap::new();
        for template in templates {
            for id in template.identifiers() {
                by_identifier.insert(id.to_string(), template.clone());
            }
        }
        Self { by_identifier }
    }

    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }

    pub fn get(&self, identifier: &str) -> Option<&CertificateTemplate> {
        self.by_identifier.get(identifier)
    }

    /// Friendly name reported with the certificate, else the directory's
    /// display name, else the raw identifier.
    pub fn display_name<'a>(&'a self, template: &'a TemplateRef) -> &'a str {
        if let Some(name) = template.friendly_name.as_deref() {
            return name;
        }
        self.get(&template.identifier)
            .map(|t| t.label())
            .unwrap_or(&template.identifier)
    }

    pub fn auto_enroll_identifiers(&self) -> HashSet<String> {
        self.by_identifier
            .iter()
            .filter(|(_, t)| t.is_auto_enroll())
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// Which certificates never make it into the result.
#[derive(Debug, Clone, Default)]
pub struct TemplateExclusions {
    names: HashSet<String>,
    auto_enroll: HashSet<String>,
}

impl TemplateExclusions {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        Self { names, auto_enroll: HashSet::new() }
    }

    pub fn with_auto_enroll(mut self, identifiers: HashSet<String>) -> Self {
        self.auto_enroll = identifiers;
        self
    }

    pub fn is_auto_enroll(&self, template: &TemplateRef) -> bool {
        self.auto_enroll.contains(&template.identifier)
    }

    pub fn is_excluded_name(&self, name: &str) -> bool {
        !name.is_empty() && self.names.contains(&name.to_lowercase())
    }

    /// Reason a certificate is skipped, if any.
    pub fn exclusion_reason(&self, template: &TemplateRef, display_name: &str, catalog: &TemplateCatalog) -> Option<&'static str> {
        if self.is_auto_enroll(template) {
            return Some("auto-enrollment template");
        }
        if self.is_excluded_name(display_name) {
            return Some("excluded template");
        }
        let short_name = catalog.get(&template.identifier).map(|t| t.name.as_str());
        if short_name.is_some_and(|n| self.is_excluded_name(n)) {
            return Some("excluded template");
        }
        None
    }
}
