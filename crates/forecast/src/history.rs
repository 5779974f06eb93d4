//! Per-period history samples distilled from prior report snapshots.

use serde::{Deserialize, Serialize};

/// One reporting period's worth of observed progress.
///
/// The surrounding system derives these from its append-only snapshot log;
/// the forecast models only ever read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocitySample {
    pub period_key: String,
    /// Work completed during the period, in hours.
    pub completed_hours: f64,
    /// Cumulative spend at the end of the period.
    pub spent_budget: f64,
    /// Aggregate slack headroom across the schedule at the end of the
    /// period; a shrinking series signals schedule risk.
    pub total_slack_days: f64,
    pub member_count: u32,
}

impl VelocitySample {
    pub fn new(period_key: impl Into<String>, completed_hours: f64) -> Self {
        Self {
            period_key: period_key.into(),
            completed_hours,
            spent_budget: 0.0,
            total_slack_days: 0.0,
            member_count: 0,
        }
    }

    pub fn with_spent_budget(mut self, spent_budget: f64) -> Self {
        self.spent_budget = spent_budget;
        self
    }

    pub fn with_total_slack_days(mut self, total_slack_days: f64) -> Self {
        self.total_slack_days = total_slack_days;
        self
    }

    pub fn with_member_count(mut self, member_count: u32) -> Self {
        self.member_count = member_count;
        self
    }
}
