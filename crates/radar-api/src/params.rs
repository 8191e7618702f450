//! Query-parameter types for list endpoints.

use radar_core::types::{ScanStatus, Severity};

/// Filters for `GET /api/v1/scans`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanListParams {
    pub environment_id: Option<i64>,
    pub status: Option<ScanStatus>,
}

impl ScanListParams {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(id) = self.environment_id {
            query.push(("environment_id", id.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.to_string()));
        }
        query
    }
}

/// Filters for `GET /api/v1/findings`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindingListParams {
    pub scan_id: Option<i64>,
    pub severity: Option<Severity>,
    pub scanner: Option<String>,
    pub status: Option<String>,
}

impl FindingListParams {
    /// Findings of one scan, unfiltered.
    pub fn for_scan(scan_id: i64) -> Self {
        Self {
            scan_id: Some(scan_id),
            ..Self::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(id) = self.scan_id {
            query.push(("scan_id", id.to_string()));
        }
        if let Some(severity) = self.severity {
            query.push(("severity", severity.to_string()));
        }
        if let Some(scanner) = &self.scanner {
            query.push(("scanner", scanner.clone()));
        }
        if let Some(status) = &self.status {
            query.push(("status", status.clone()));
        }
        query
    }
}

/// Parameters for `GET /api/v1/statistics/compliance-trend`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendParams {
    pub days: Option<u32>,
    pub regulation: Option<String>,
}

impl TrendParams {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(days) = self.days {
            query.push(("days", days.to_string()));
        }
        if let Some(regulation) = &self.regulation {
            query.push(("regulation", regulation.clone()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_produce_no_query() {
        assert!(ScanListParams::default().to_query().is_empty());
        assert!(FindingListParams::default().to_query().is_empty());
        assert!(TrendParams::default().to_query().is_empty());
    }

    #[test]
    fn scan_params_serialize_in_order() {
        let params = ScanListParams {
            environment_id: Some(3),
            status: Some(ScanStatus::Failed),
        };
        assert_eq!(
            params.to_query(),
            vec![
                ("environment_id", "3".to_string()),
                ("status", "failed".to_string()),
            ]
        );
    }

    #[test]
    fn finding_params_for_scan() {
        let params = FindingListParams::for_scan(7);
        assert_eq!(params.to_query(), vec![("scan_id", "7".to_string())]);

        let params = FindingListParams {
            scan_id: Some(7),
            severity: Some(Severity::High),
            scanner: Some("prowler".to_string()),
            status: None,
        };
        assert_eq!(
            params.to_query(),
            vec![
                ("scan_id", "7".to_string()),
                ("severity", "high".to_string()),
                ("scanner", "prowler".to_string()),
            ]
        );
    }

    #[test]
    fn trend_params_serialize() {
        let params = TrendParams {
            days: Some(30),
            regulation: Some("NIS2".to_string()),
        };
        assert_eq!(
            params.to_query(),
            vec![("days", "30".to_string()), ("regulation", "NIS2".to_string())]
        );
    }
}
