//! Append-only history log port.
//!
//! The engine never opens transactions or manages locking over snapshot
//! storage; it treats the log as a pure query/append interface. An
//! in-memory implementation ships for tests and embedded hosts.

use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use planforge_core::{ProjectId, TenantId};

use crate::snapshot::ReportSnapshot;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// The log already holds a snapshot for this period; snapshots are
    /// written once and never replaced.
    #[error("snapshot already recorded for period {period_key}")]
    DuplicatePeriod { period_key: String },
}

/// Read/append accessor for snapshot storage, implemented by the
/// surrounding system.
pub trait HistoryLog: Send + Sync {
    /// Snapshots for one project, oldest first.
    fn read(&self, tenant_id: TenantId, project_id: ProjectId) -> Vec<ReportSnapshot>;

    /// Append a snapshot. Existing entries are never modified.
    fn append(&self, snapshot: ReportSnapshot) -> Result<(), HistoryError>;
}

/// Process-local history log.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    entries: Mutex<Vec<ReportSnapshot>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryLog for InMemoryHistory {
    fn read(&self, tenant_id: TenantId, project_id: ProjectId) -> Vec<ReportSnapshot> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.tenant_id == tenant_id && s.project_id == project_id)
            .cloned()
            .collect()
    }

    fn append(&self, snapshot: ReportSnapshot) -> Result<(), HistoryError> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let duplicate = entries.iter().any(|s| {
            s.tenant_id == snapshot.tenant_id
                && s.project_id == snapshot.project_id
                && s.granularity == snapshot.granularity
                && s.period_key == snapshot.period_key
        });
        if duplicate {
            return Err(HistoryError::DuplicatePeriod {
                period_key: snapshot.period_key,
            });
        }
        entries.push(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{
        ForecastSummary, LoadSummary, PeriodGranularity, ProgressSummary, ScheduleSummary,
    };
    use chrono::NaiveDate;
    use planforge_core::SnapshotId;
    use std::collections::BTreeMap;

    fn snapshot(tenant_id: TenantId, project_id: ProjectId, period_key: &str) -> ReportSnapshot {
        ReportSnapshot {
            id: SnapshotId::new(),
            tenant_id,
            project_id,
            granularity: PeriodGranularity::Weekly,
            period_key: period_key.to_string(),
            as_of: NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
            schedule: ScheduleSummary {
                total_duration_days: 10,
                completion_date: None,
                critical_task_count: 1,
                total_slack_days: 3,
                overloaded_days: 0,
                deadline_shortfall_days: None,
                optimization_incomplete: false,
            },
            load: LoadSummary {
                member_loads: BTreeMap::new(),
                load_spread: 0.0,
                assigned_count: 0,
                unassigned_count: 0,
                over_capacity_count: 0,
            },
            forecast: ForecastSummary::default(),
            progress: ProgressSummary::default(),
            delta: None,
        }
    }

    #[test]
    fn appends_accumulate_per_project() {
        let log = InMemoryHistory::new();
        let tenant = TenantId::new();
        let project = ProjectId::new();
        let other_project = ProjectId::new();

        log.append(snapshot(tenant, project, "2026-W31")).unwrap();
        log.append(snapshot(tenant, project, "2026-W32")).unwrap();
        log.append(snapshot(tenant, other_project, "2026-W32")).unwrap();

        assert_eq!(log.read(tenant, project).len(), 2);
        assert_eq!(log.read(tenant, other_project).len(), 1);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn duplicate_period_is_rejected() {
        let log = InMemoryHistory::new();
        let tenant = TenantId::new();
        let project = ProjectId::new();

        log.append(snapshot(tenant, project, "2026-W32")).unwrap();
        let err = log.append(snapshot(tenant, project, "2026-W32")).unwrap_err();
        assert_eq!(
            err,
            HistoryError::DuplicatePeriod {
                period_key: "2026-W32".to_string()
            }
        );
        // The original entry is untouched.
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn reads_are_tenant_scoped() {
        let log = InMemoryHistory::new();
        let project = ProjectId::new();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();

        log.append(snapshot(tenant_a, project, "2026-W32")).unwrap();
        assert!(log.read(tenant_b, project).is_empty());
    }
}
