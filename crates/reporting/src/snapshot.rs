//! Snapshot construction and delta computation.

use core::str::FromStr;
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use planforge_assignment::AssignmentResult;
use planforge_core::{EngineError, MemberId, ProjectId, SnapshotId, TenantId};
use planforge_forecast::{Confidence, ForecastResult, RiskBucket, VelocitySample};
use planforge_schedule::Schedule;

/// Reporting cadence.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodGranularity {
    Daily,
    Weekly,
    Monthly,
}

impl PeriodGranularity {
    /// Stable period identifier derived from the reporting date.
    pub fn period_key(&self, as_of: NaiveDate) -> String {
        match self {
            Self::Daily => as_of.format("%Y-%m-%d").to_string(),
            Self::Weekly => {
                let week = as_of.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Monthly => as_of.format("%Y-%m").to_string(),
        }
    }
}

impl FromStr for PeriodGranularity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(EngineError::validation(format!(
                "unknown period granularity: {other}"
            ))),
        }
    }
}

impl core::fmt::Display for PeriodGranularity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

/// Point-in-time schedule digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_duration_days: u32,
    pub completion_date: Option<NaiveDate>,
    pub critical_task_count: u32,
    pub total_slack_days: u32,
    pub overloaded_days: u32,
    pub deadline_shortfall_days: Option<u32>,
    pub optimization_incomplete: bool,
}

impl From<&Schedule> for ScheduleSummary {
    fn from(schedule: &Schedule) -> Self {
        Self {
            total_duration_days: schedule.total_duration_days,
            completion_date: schedule.completion_date,
            critical_task_count: schedule.critical_task_count() as u32,
            total_slack_days: schedule.total_slack_days(),
            overloaded_days: schedule.unresolved_overloads.len() as u32,
            deadline_shortfall_days: schedule.deadline_shortfall_days,
            optimization_incomplete: schedule.optimization_incomplete,
        }
    }
}

/// Point-in-time assignment digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub member_loads: BTreeMap<MemberId, f64>,
    pub load_spread: f64,
    pub assigned_count: u32,
    pub unassigned_count: u32,
    pub over_capacity_count: u32,
}

impl From<&AssignmentResult> for LoadSummary {
    fn from(result: &AssignmentResult) -> Self {
        Self {
            member_loads: result.member_loads.clone(),
            load_spread: result.load_spread(),
            assigned_count: result.assignments.len() as u32,
            unassigned_count: result.unassigned.len() as u32,
            over_capacity_count: result.over_capacity.len() as u32,
        }
    }
}

/// Point-in-time forecast digest; fields are populated from whichever
/// forecast variant was produced for the period.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub projected_completion: Option<NaiveDate>,
    pub completion_confidence: Option<Confidence>,
    pub risk_bucket: Option<RiskBucket>,
    pub risk_score: Option<f64>,
    pub projected_budget_total: Option<f64>,
    pub budget_overrun_amount: Option<f64>,
}

impl From<&ForecastResult> for ForecastSummary {
    fn from(result: &ForecastResult) -> Self {
        let mut summary = Self::default();
        match result {
            ForecastResult::Completion(completion) => {
                summary.projected_completion = Some(completion.projected);
                summary.completion_confidence = Some(completion.confidence);
            }
            ForecastResult::Budget(budget) => {
                summary.projected_budget_total = Some(budget.projected_total);
                summary.budget_overrun_amount =
                    budget.overrun.then_some(budget.overrun_amount);
            }
            ForecastResult::Risk(risk) => {
                summary.risk_bucket = Some(risk.bucket);
                summary.risk_score = Some(risk.score);
            }
        }
        summary
    }
}

/// Actuals observed by the surrounding system during the period.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub completed_hours: f64,
    pub spent_budget: f64,
    pub member_count: u32,
}

/// Changes versus the immediately prior snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDelta {
    pub total_duration_delta_days: i64,
    /// Present only when the bucket actually moved.
    pub risk_bucket_change: Option<(RiskBucket, RiskBucket)>,
    pub unassigned_delta: i64,
    pub load_spread_delta: f64,
}

/// Immutable progress report. Appended to the history log, never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub id: SnapshotId,
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub granularity: PeriodGranularity,
    pub period_key: String,
    pub as_of: NaiveDate,
    pub schedule: ScheduleSummary,
    pub load: LoadSummary,
    pub forecast: ForecastSummary,
    pub progress: ProgressSummary,
    pub delta: Option<SnapshotDelta>,
}

impl From<&ReportSnapshot> for VelocitySample {
    fn from(snapshot: &ReportSnapshot) -> Self {
        VelocitySample::new(snapshot.period_key.clone(), snapshot.progress.completed_hours)
            .with_spent_budget(snapshot.progress.spent_budget)
            .with_total_slack_days(snapshot.schedule.total_slack_days as f64)
            .with_member_count(snapshot.progress.member_count)
    }
}

#[derive(Debug, Clone)]
pub struct ReportInputs<'a> {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub granularity: PeriodGranularity,
    pub as_of: NaiveDate,
    pub schedule: &'a Schedule,
    pub assignments: &'a AssignmentResult,
    pub forecast: &'a ForecastResult,
    pub progress: ProgressSummary,
    pub prior: Option<&'a ReportSnapshot>,
}

/// Build a new snapshot, diffed against the prior one when present.
///
/// Pure construction: appending the result to the history log is the
/// caller's move.
pub fn generate_report(inputs: ReportInputs<'_>) -> ReportSnapshot {
    let schedule = ScheduleSummary::from(inputs.schedule);
    let load = LoadSummary::from(inputs.assignments);
    let forecast = ForecastSummary::from(inputs.forecast);

    let delta = inputs.prior.map(|prior| SnapshotDelta {
        total_duration_delta_days: i64::from(schedule.total_duration_days)
            - i64::from(prior.schedule.total_duration_days),
        risk_bucket_change: match (prior.forecast.risk_bucket, forecast.risk_bucket) {
            (Some(before), Some(after)) if before != after => Some((before, after)),
            _ => None,
        },
        unassigned_delta: i64::from(load.unassigned_count)
            - i64::from(prior.load.unassigned_count),
        load_spread_delta: load.load_spread - prior.load.load_spread,
    });

    ReportSnapshot {
        id: SnapshotId::new(),
        tenant_id: inputs.tenant_id,
        project_id: inputs.project_id,
        granularity: inputs.granularity,
        period_key: inputs.granularity.period_key(inputs.as_of),
        as_of: inputs.as_of,
        schedule,
        load,
        forecast,
        progress: inputs.progress,
        delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_assignment::{assign_tasks, AssignmentOptions, AssignmentStrategy};
    use planforge_core::{Calendar, Task, TaskGraph, TaskId, TeamMember};
    use planforge_forecast::{risk_forecast, RiskInputs, RiskWeights};
    use planforge_schedule::{optimize_schedule, ScheduleOptions};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> (Schedule, AssignmentResult, ForecastResult) {
        let graph = TaskGraph::try_new(vec![
            Task::new(TaskId::new(), "build", 5).with_effort_hours(30.0),
            Task::new(TaskId::new(), "verify", 3).with_effort_hours(18.0),
        ])
        .unwrap();
        let roster = vec![
            TeamMember::new(MemberId::new(), "ana", 40.0),
            TeamMember::new(MemberId::new(), "ben", 40.0),
        ];

        let schedule = optimize_schedule(
            &graph,
            &Calendar::standard(),
            &ScheduleOptions::new(date(2026, 8, 3)),
        )
        .unwrap();
        let assignments = assign_tasks(
            &graph,
            &roster,
            AssignmentStrategy::Balanced,
            &AssignmentOptions::default(),
        )
        .unwrap();
        let forecast = ForecastResult::Risk(risk_forecast(
            &RiskInputs {
                history: &[],
                incident_rate: 0.9,
            },
            &RiskWeights::default(),
        ));
        (schedule, assignments, forecast)
    }

    #[test]
    fn period_keys_follow_the_granularity() {
        let as_of = date(2026, 8, 6);
        assert_eq!(PeriodGranularity::Daily.period_key(as_of), "2026-08-06");
        assert_eq!(PeriodGranularity::Weekly.period_key(as_of), "2026-W32");
        assert_eq!(PeriodGranularity::Monthly.period_key(as_of), "2026-08");
    }

    #[test]
    fn granularity_names_round_trip() {
        for granularity in [
            PeriodGranularity::Daily,
            PeriodGranularity::Weekly,
            PeriodGranularity::Monthly,
        ] {
            assert_eq!(
                granularity
                    .to_string()
                    .parse::<PeriodGranularity>()
                    .unwrap(),
                granularity
            );
        }
    }

    #[test]
    fn first_snapshot_has_no_delta() {
        let (schedule, assignments, forecast) = fixture();
        let snapshot = generate_report(ReportInputs {
            tenant_id: TenantId::new(),
            project_id: ProjectId::new(),
            granularity: PeriodGranularity::Weekly,
            as_of: date(2026, 8, 6),
            schedule: &schedule,
            assignments: &assignments,
            forecast: &forecast,
            progress: ProgressSummary::default(),
            prior: None,
        });

        assert!(snapshot.delta.is_none());
        assert_eq!(snapshot.period_key, "2026-W32");
        assert_eq!(snapshot.schedule.total_duration_days, 5);
    }

    #[test]
    fn delta_tracks_duration_and_risk_movement() {
        let (schedule, assignments, forecast) = fixture();
        let tenant_id = TenantId::new();
        let project_id = ProjectId::new();

        let mut first = generate_report(ReportInputs {
            tenant_id,
            project_id,
            granularity: PeriodGranularity::Weekly,
            as_of: date(2026, 8, 6),
            schedule: &schedule,
            assignments: &assignments,
            forecast: &forecast,
            progress: ProgressSummary::default(),
            prior: None,
        });
        // Simulate a calmer prior period.
        first.schedule.total_duration_days = 4;
        first.forecast.risk_bucket = Some(RiskBucket::Low);

        let second = generate_report(ReportInputs {
            tenant_id,
            project_id,
            granularity: PeriodGranularity::Weekly,
            as_of: date(2026, 8, 13),
            schedule: &schedule,
            assignments: &assignments,
            forecast: &forecast,
            progress: ProgressSummary::default(),
            prior: Some(&first),
        });

        let delta = second.delta.unwrap();
        assert_eq!(delta.total_duration_delta_days, 1);
        assert_eq!(
            delta.risk_bucket_change,
            Some((RiskBucket::Low, second.forecast.risk_bucket.unwrap()))
        );
    }

    #[test]
    fn snapshots_feed_velocity_samples() {
        let (schedule, assignments, forecast) = fixture();
        let snapshot = generate_report(ReportInputs {
            tenant_id: TenantId::new(),
            project_id: ProjectId::new(),
            granularity: PeriodGranularity::Weekly,
            as_of: date(2026, 8, 6),
            schedule: &schedule,
            assignments: &assignments,
            forecast: &forecast,
            progress: ProgressSummary {
                completed_hours: 32.0,
                spent_budget: 4_000.0,
                member_count: 2,
            },
            prior: None,
        });

        let sample = VelocitySample::from(&snapshot);
        assert_eq!(sample.period_key, "2026-W32");
        assert_eq!(sample.completed_hours, 32.0);
        assert_eq!(sample.spent_budget, 4_000.0);
        assert_eq!(sample.member_count, 2);
    }
}
