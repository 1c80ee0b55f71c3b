use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Outcome of an access-map query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportStatus {
    /// Every requested entity contributed to the map.
    Complete,
    /// Some entities contributed while others failed; see `errors`.
    Partial,
    /// Nothing contributed.
    Error,
}

/// One per-entity failure inside an otherwise usable access report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DataError {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub message: String,
}

/// Everything one role may do: operation name mapped to the sorted list of
/// entity and field paths it grants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoleAccess {
    pub role: String,
    pub operations: BTreeMap<String, Vec<String>>,
}

/// Role-centric view over the access rules of one or all entities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccessReport {
    pub status: ReportStatus,
    pub roles: Vec<RoleAccess>,
    pub errors: Vec<DataError>,
}

/// Accumulates (role, operation, path) grants and renders them as a sorted,
/// de-duplicated [AccessReport].
#[derive(Debug, Default)]
pub struct AccessAggregator {
    grants: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl AccessAggregator {
    pub fn new() -> AccessAggregator {
        AccessAggregator::default()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn add(&mut self, role: &str, operation: &str, path: &str) {
        self.grants
            .entry(role.to_string())
            .or_default()
            .entry(operation.to_string())
            .or_default()
            .insert(path.to_string());
    }

    pub fn add_all(&mut self, roles: &[String], operation: &str, path: &str) {
        for role in roles {
            self.add(role, operation, path);
        }
    }

    pub fn into_report(self, status: ReportStatus, errors: Vec<DataError>) -> AccessReport {
        let roles = self
            .grants
            .into_iter()
            .map(|(role, operations)| RoleAccess {
                role,
                operations: operations
                    .into_iter()
                    .map(|(op, paths)| (op, paths.into_iter().collect()))
                    .collect(),
            })
            .collect();
        AccessReport {
            status,
            roles,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregator_sorts_and_dedupes() {
        let mut agg = AccessAggregator::new();
        agg.add("admin", "insert", "user");
        agg.add("admin", "find", "user.email");
        agg.add("admin", "find", "user");
        agg.add("admin", "find", "user");
        agg.add("anyone", "find", "user");

        let report = agg.into_report(ReportStatus::Complete, Vec::new());
        assert_eq!(report.roles.len(), 2);
        assert_eq!(report.roles[0].role, "admin");
        assert_eq!(
            report.roles[0].operations["find"],
            vec!["user".to_string(), "user.email".to_string()]
        );
        assert_eq!(report.roles[1].role, "anyone");
    }

    #[test]
    fn test_report_serializes_without_absent_version() {
        let report = AccessReport {
            status: ReportStatus::Partial,
            roles: Vec::new(),
            errors: vec![DataError {
                name: "user".to_string(),
                version: None,
                message: "boom".to_string(),
            }],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"status\":\"PARTIAL\""));
        assert!(!json.contains("version"));
    }
}
