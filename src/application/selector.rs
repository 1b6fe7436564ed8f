use chrono::{DateTime, Utc};
use tracing::debug;
use crate::domain::{IssuedCertificate, SensorRecord, TemplateCatalog, TemplateExclusions};
use super::SelectionParams;

/// Outcome of one filter/bound/select pass.
#[derive(Debug, Clone)]
pub struct Selection {
    pub records: Vec<SensorRecord>,
    pub return_index: usize,
}

impl Selection {
    /// Record at the requested index, or the out-of-range sentinel.
    pub fn selected(&self) -> SensorRecord {
        self.records
            .get(self.return_index)
            .cloned()
            .unwrap_or_else(|| SensorRecord::out_of_range(self.return_index, self.records.len()))
    }
}

pub struct ExpirySelector<'a> {
    params: &'a SelectionParams,
    exclusions: &'a TemplateExclusions,
    catalog: &'a TemplateCatalog,
}

impl<'a> ExpirySelector<'a> {
    pub fn new(params: &'a SelectionParams, exclusions: &'a TemplateExclusions, catalog: &'a TemplateCatalog) -> Self {
        Self { params, exclusions, catalog }
    }

    /// Consumes `certs` (ascending by expiration) only until `max_results`
    /// records have been produced.
    pub fn select<I>(&self, certs: I, now: DateTime<Utc>) -> Selection
    where
        I: IntoIterator<Item = IssuedCertificate>,
    {
        let records = certs
            .into_iter()
            .filter_map(|cert| self.record_for(&cert, now))
            .take(self.params.max_results)
            .collect();

        Selection { records, return_index: self.params.return_index }
    }

    fn record_for(&self, cert: &IssuedCertificate, now: DateTime<Utc>) -> Option<SensorRecord> {
        let template_name = self.catalog.display_name(&cert.template);
        if let Some(reason) = self.exclusions.exclusion_reason(&cert.template, template_name, self.catalog) {
            debug!(cn = %cert.common_name, template = %template_name, reason, "skipping certificate");
            return None;
        }
        Some(SensorRecord::expiry(cert, template_name, self.params.thresholds, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashSet;
    use chrono::{Duration, TimeZone};
    use crate::domain::{TemplateRef, Thresholds};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn cert(cn: &str, template: &str, days: i64) -> IssuedCertificate {
        IssuedCertificate::new(
            TemplateRef::new(template).with_friendly_name(template),
            cn,
            now() + Duration::days(days) + Duration::minutes(5),
        )
    }

    fn run(params: &SelectionParams, certs: Vec<IssuedCertificate>) -> Selection {
        let exclusions = params.name_exclusions();
        let catalog = TemplateCatalog::default();
        ExpirySelector::new(params, &exclusions, &catalog).select(certs, now())
    }

    #[test]
    fn second_of_three_is_selected() {
        let params = SelectionParams::new(Thresholds::new(30, 10)).with_return_index(1);
        let sel = run(&params, vec![
            cert("a.contoso.com", "WebServer", 5),
            cert("b.contoso.com", "WebServer", 40),
            cert("c.contoso.com", "WebServer", 200),
        ]);
        assert_eq!(sel.records.len(), 3);
        let picked = sel.selected();
        assert_eq!(picked.days_remaining, 40);
        assert!(picked.text.contains("b.contoso.com"));
        assert_eq!(picked.thresholds, Thresholds::new(30, 10));
    }

    #[test]
    fn empty_input_yields_sentinel() {
        let params = SelectionParams::new(Thresholds::new(30, 10)).with_return_index(4);
        let picked = run(&params, Vec::new()).selected();
        assert!(picked.is_sentinel());
        assert!(picked.text.ends_with("Result only contains 0 elements"));
    }

    #[test]
    fn excluded_template_is_dropped() {
        let params = SelectionParams::new(Thresholds::new(30, 10)).with_excluded_templates(["WebServer"]);
        let sel = run(&params, vec![
            cert("a.contoso.com", "WebServer", 5),
            cert("dc01.contoso.com", "DomainController", 9),
        ]);
        assert_eq!(sel.records.len(), 1);
        assert!(sel.records[0].text.starts_with("dc01.contoso.com (DomainController)"));
    }

    #[test]
    fn only_excluded_certificate_degrades_to_sentinel() {
        let params = SelectionParams::new(Thresholds::new(30, 10)).with_excluded_templates(["WebServer"]);
        let picked = run(&params, vec![cert("a.contoso.com", "WebServer", 5)]).selected();
        assert!(picked.is_sentinel());
        assert_eq!(picked.text, "ReturnIndex 0 out of range - Result only contains 0 elements");
    }

    #[test]
    fn auto_enroll_templates_are_dropped() {
        let params = SelectionParams::new(Thresholds::new(30, 10));
        let exclusions = params.name_exclusions().with_auto_enroll(HashSet::from(["1.3.6.1.4.1.311.21.8.5".to_string()]));
        let catalog = TemplateCatalog::default();
        let certs = vec![
            IssuedCertificate::new(TemplateRef::new("1.3.6.1.4.1.311.21.8.5"), "alice", now() + Duration::days(3)),
            cert("b.contoso.com", "WebServer", 12),
        ];
        let sel = ExpirySelector::new(&params, &exclusions, &catalog).select(certs, now());
        assert_eq!(sel.records.len(), 1);
        assert_eq!(sel.records[0].days_remaining, 12);
    }

    #[test]
    fn result_is_capped_to_earliest() {
        let params = SelectionParams::new(Thresholds::new(30, 10)).with_max_results(2);
        let certs = (1..=5).map(|i| cert(&format!("h{}.contoso.com", i), "WebServer", i * 10)).collect();
        let sel = run(&params, certs);
        let days: Vec<i64> = sel.records.iter().map(|r| r.days_remaining).collect();
        assert_eq!(days, vec![10, 20]);
    }

    #[test]
    fn index_past_cap_is_out_of_range() {
        let params = SelectionParams::new(Thresholds::new(30, 10)).with_max_results(2).with_return_index(2);
        let certs = (1..=5).map(|i| cert("h.contoso.com", "WebServer", i)).collect();
        let picked = run(&params, certs).selected();
        assert_eq!(picked.text, "ReturnIndex 2 out of range - Result only contains 2 elements");
    }

    #[test]
    fn stops_pulling_once_full() {
        let params = SelectionParams::new(Thresholds::new(30, 10)).with_max_results(2);
        let pulled = Cell::new(0);
        let certs = (1..=100).map(|i| {
            pulled.set(pulled.get() + 1);
            cert("h.contoso.com", "WebServer", i)
        });
        let exclusions = params.name_exclusions();
        let catalog = TemplateCatalog::default();
        ExpirySelector::new(&params, &exclusions, &catalog).select(certs, now());
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn same_input_same_output() {
        let params = SelectionParams::new(Thresholds::new(30, 10));
        let certs = vec![cert("a", "WebServer", 5), cert("b", "WebServer", 6)];
        let first = run(&params, certs.clone()).selected();
        let second = run(&params, certs).selected();
        assert_eq!(first, second);
    }
}
