//! Client-side list filters.
//!
//! Filters are pure predicates over the already-fetched lists, never
//! re-fetches. Multiple active filters combine with logical AND.

use radar_core::types::{Finding, Scan, ScanStatus, Severity};

/// Scans page filters: status and environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanFilter {
    pub status: Option<ScanStatus>,
    pub environment_id: Option<i64>,
}

impl ScanFilter {
    pub fn matches(&self, scan: &Scan) -> bool {
        if let Some(status) = self.status {
            if scan.status != status {
                return false;
            }
        }
        if let Some(environment_id) = self.environment_id {
            if scan.environment_id != environment_id {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, scans: &'a [Scan]) -> Vec<&'a Scan> {
        scans.iter().filter(|s| self.matches(s)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.environment_id.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Scan-details filters: severity, scanner, and regulation tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindingFilter {
    pub severity: Option<Severity>,
    pub scanner: Option<String>,
    pub regulation: Option<String>,
}

impl FindingFilter {
    pub fn matches(&self, finding: &Finding) -> bool {
        if let Some(severity) = self.severity {
            if finding.severity != severity {
                return false;
            }
        }
        if let Some(scanner) = &self.scanner {
            if &finding.scanner != scanner {
                return false;
            }
        }
        if let Some(regulation) = &self.regulation {
            if !finding.regulations.iter().any(|r| r == regulation) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, findings: &'a [Finding]) -> Vec<&'a Finding> {
        findings.iter().filter(|f| self.matches(f)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.severity.is_none() && self.scanner.is_none() && self.regulation.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Advance a filter through `values`: unset → first → ... → last → unset.
pub fn cycle<T: Clone + PartialEq>(current: Option<T>, values: &[T]) -> Option<T> {
    match current {
        None => values.first().cloned(),
        Some(value) => match values.iter().position(|v| *v == value) {
            Some(i) if i + 1 < values.len() => Some(values[i + 1].clone()),
            _ => None,
        },
    }
}

/// Distinct scanner names across the fetched findings, sorted.
pub fn unique_scanners(findings: &[Finding]) -> Vec<String> {
    let mut scanners: Vec<String> = findings.iter().map(|f| f.scanner.clone()).collect();
    scanners.sort();
    scanners.dedup();
    scanners
}

/// Distinct regulation tags across the fetched findings, sorted.
pub fn unique_regulations(findings: &[Finding]) -> Vec<String> {
    let mut regulations: Vec<String> = findings
        .iter()
        .flat_map(|f| f.regulations.iter().cloned())
        .collect();
    regulations.sort();
    regulations.dedup();
    regulations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn scan(id: i64, environment_id: i64, status: ScanStatus) -> Scan {
        Scan {
            id,
            environment_id,
            environment_name: None,
            environment_type: None,
            status,
            started_at: Utc::now(),
            completed_at: None,
            duration: None,
            overall_score: None,
            conformity_scores: Default::default(),
            total_findings: 0,
            critical_count: 0,
            high_count: 0,
            medium_count: 0,
            low_count: 0,
        }
    }

    fn finding(id: i64, severity: Severity, scanner: &str, regulations: &[&str]) -> Finding {
        Finding {
            id,
            scan_id: 1,
            finding_hash: format!("hash-{id}"),
            scanner: scanner.to_string(),
            check_id: format!("check-{id}"),
            title: format!("finding {id}"),
            description: String::new(),
            severity,
            resource_type: None,
            resource_id: None,
            status: "open".to_string(),
            remediation: None,
            ai_remediation: None,
            regulations: regulations.iter().map(|r| r.to_string()).collect(),
            raw_result: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_scan_filter_matches_everything() {
        let scans = vec![
            scan(1, 1, ScanStatus::Completed),
            scan(2, 2, ScanStatus::Failed),
        ];
        let filter = ScanFilter::default();
        assert_eq!(filter.apply(&scans).len(), 2);
        assert!(filter.is_empty());
    }

    #[test]
    fn scan_filter_is_exact_subset() {
        let scans = vec![
            scan(1, 1, ScanStatus::Completed),
            scan(2, 1, ScanStatus::Failed),
            scan(3, 2, ScanStatus::Completed),
        ];
        let filter = ScanFilter {
            status: Some(ScanStatus::Completed),
            environment_id: Some(1),
        };

        let visible = filter.apply(&scans);
        assert_eq!(visible.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1]);

        // Everything hidden fails at least one predicate.
        for s in &scans {
            assert_eq!(filter.matches(s), visible.iter().any(|v| v.id == s.id));
        }
    }

    #[test]
    fn finding_filters_combine_with_and() {
        let findings = vec![
            finding(1, Severity::Critical, "prowler", &["NIS2"]),
            finding(2, Severity::Critical, "trivy", &["NIS2"]),
            finding(3, Severity::High, "prowler", &["NIS2", "RGPD"]),
            finding(4, Severity::Critical, "prowler", &["RGPD"]),
        ];

        let filter = FindingFilter {
            severity: Some(Severity::Critical),
            scanner: Some("prowler".to_string()),
            regulation: Some("NIS2".to_string()),
        };
        let visible = filter.apply(&findings);
        assert_eq!(visible.iter().map(|f| f.id).collect::<Vec<_>>(), vec![1]);

        let by_regulation = FindingFilter {
            regulation: Some("RGPD".to_string()),
            ..FindingFilter::default()
        };
        assert_eq!(
            by_regulation
                .apply(&findings)
                .iter()
                .map(|f| f.id)
                .collect::<Vec<_>>(),
            vec![3, 4]
        );
    }

    #[test]
    fn cycle_wraps_through_unset() {
        let values = vec!["a".to_string(), "b".to_string()];
        let step1 = cycle(None, &values);
        assert_eq!(step1.as_deref(), Some("a"));
        let step2 = cycle(step1, &values);
        assert_eq!(step2.as_deref(), Some("b"));
        let step3 = cycle(step2, &values);
        assert_eq!(step3, None);
    }

    #[test]
    fn cycle_resets_when_value_disappears() {
        let values = vec!["a".to_string()];
        assert_eq!(cycle(Some("gone".to_string()), &values), None);
        let empty: Vec<String> = Vec::new();
        assert_eq!(cycle(None, &empty), None);
    }

    #[test]
    fn unique_values_are_sorted_and_deduped() {
        let findings = vec![
            finding(1, Severity::Low, "trivy", &["RGPD", "NIS2"]),
            finding(2, Severity::Low, "prowler", &["NIS2"]),
            finding(3, Severity::Low, "trivy", &[]),
        ];
        assert_eq!(unique_scanners(&findings), vec!["prowler", "trivy"]);
        assert_eq!(unique_regulations(&findings), vec!["NIS2", "RGPD"]);
    }
}
