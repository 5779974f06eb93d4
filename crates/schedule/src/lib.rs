//! `planforge-schedule` — critical-path scheduling with resource leveling.
//!
//! Computes earliest/latest timings, slack, and the critical path over an
//! immutable task graph, then levels resource demand inside slack windows.
//! Supports a risk-buffered mode and cooperative cancellation; a cancelled
//! run returns the best schedule found so far instead of nothing.

use core::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use planforge_core::{Calendar, EngineError, EngineResult, TaskGraph, TaskId};

pub mod cancel;
mod cpm;
mod leveling;

pub use cancel::CancelToken;

/// Optimization mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    Standard,
    /// Pads critical-path durations proportionally to each task's estimate
    /// variance, then recomputes the passes.
    RiskBuffered,
}

impl FromStr for ScheduleMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "standard" => Ok(Self::Standard),
            "risk-buffered" | "riskbuffered" => Ok(Self::RiskBuffered),
            other => Err(EngineError::validation(format!(
                "unknown schedule mode: {other}"
            ))),
        }
    }
}

/// Caller knobs for one optimization run.
#[derive(Debug, Clone)]
pub struct ScheduleOptions {
    pub mode: ScheduleMode,
    pub project_start: NaiveDate,
    /// Aggregate resource units available per working day.
    pub daily_capacity: f64,
    /// Caller-declared deadline (inclusive). Overrunning it is non-fatal:
    /// the schedule reports the shortfall instead of failing.
    pub deadline: Option<NaiveDate>,
    /// Scales the risk buffer added to critical tasks in risk-buffered mode.
    pub risk_buffer_factor: f64,
    pub cancel: CancelToken,
}

impl ScheduleOptions {
    pub fn new(project_start: NaiveDate) -> Self {
        Self {
            mode: ScheduleMode::Standard,
            project_start,
            daily_capacity: f64::INFINITY,
            deadline: None,
            risk_buffer_factor: 0.5,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_mode(mut self, mode: ScheduleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_daily_capacity(mut self, daily_capacity: f64) -> Self {
        self.daily_capacity = daily_capacity;
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_risk_buffer_factor(mut self, factor: f64) -> Self {
        self.risk_buffer_factor = factor;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Per-task timing in working-day offsets plus calendar-mapped dates.
/// Offsets are half-open: a task occupies `[scheduled_start,
/// scheduled_finish)` and `finish_date` is the first working day after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTiming {
    pub task_id: TaskId,
    /// Duration used by the passes (includes any risk buffer).
    pub duration_days: u32,
    pub earliest_start: u32,
    pub earliest_finish: u32,
    pub latest_start: u32,
    pub latest_finish: u32,
    pub scheduled_start: u32,
    pub scheduled_finish: u32,
    pub slack: u32,
    pub critical: bool,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
}

/// A working day whose demand leveling could not bring under capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overload {
    pub day_offset: u32,
    pub excess_demand: f64,
}

/// The derived schedule. A new object per run; the input graph is untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub project_start: NaiveDate,
    /// Timings in graph arena order.
    pub timings: Vec<TaskTiming>,
    pub total_duration_days: u32,
    /// Last working day of the project, if it has any work at all.
    pub completion_date: Option<NaiveDate>,
    /// Zero-slack chain whose durations sum to `total_duration_days`.
    pub critical_path: Vec<TaskId>,
    /// Working days missing to the caller's deadline (non-fatal).
    pub deadline_shortfall_days: Option<u32>,
    pub unresolved_overloads: Vec<Overload>,
    pub optimization_incomplete: bool,
}

impl Schedule {
    pub fn timing(&self, task_id: TaskId) -> Option<&TaskTiming> {
        self.timings.iter().find(|t| t.task_id == task_id)
    }

    pub fn critical_task_count(&self) -> usize {
        self.timings.iter().filter(|t| t.critical).count()
    }

    pub fn total_slack_days(&self) -> u32 {
        self.timings.iter().map(|t| t.slack).sum()
    }
}

/// Compute the schedule for a task graph.
///
/// Fails only on a cyclic dependency relation; every other adverse outcome
/// (deadline overrun, unresolved oversubscription, cancellation) is carried
/// in the returned schedule.
pub fn optimize_schedule(
    graph: &TaskGraph,
    calendar: &Calendar,
    options: &ScheduleOptions,
) -> EngineResult<Schedule> {
    let layers = cpm::topological_layers(graph)?;

    let mut durations: Vec<u32> = graph.tasks().iter().map(|t| t.duration_days).collect();
    let mut pass = cpm::critical_path_pass(graph, &layers, &durations);
    let mut incomplete = false;

    if options.mode == ScheduleMode::RiskBuffered {
        if options.cancel.is_cancelled() {
            incomplete = true;
        } else {
            for i in 0..graph.len() {
                if pass.critical[i] {
                    durations[i] += risk_buffer_days(
                        durations[i],
                        graph.task(i).estimate_variance,
                        options.risk_buffer_factor,
                    );
                }
            }
            pass = cpm::critical_path_pass(graph, &layers, &durations);
        }
    }

    let leveled = leveling::level_resources(
        graph,
        &pass,
        &durations,
        options.daily_capacity,
        &options.cancel,
    );
    incomplete |= !leveled.completed;

    let critical_path = cpm::critical_chain(graph, &pass, &durations);

    let timings: Vec<TaskTiming> = (0..graph.len())
        .map(|i| {
            let scheduled_start = leveled.scheduled_start[i];
            let scheduled_finish = scheduled_start + durations[i];
            TaskTiming {
                task_id: graph.task(i).id,
                duration_days: durations[i],
                earliest_start: pass.earliest_start[i],
                earliest_finish: pass.earliest_finish[i],
                latest_start: pass.latest_start[i],
                latest_finish: pass.latest_finish[i],
                scheduled_start,
                scheduled_finish,
                slack: pass.slack[i],
                critical: pass.critical[i],
                start_date: calendar.date_at(options.project_start, scheduled_start),
                finish_date: calendar.date_at(options.project_start, scheduled_finish),
            }
        })
        .collect();

    let completion_date = (pass.total_duration > 0)
        .then(|| calendar.date_at(options.project_start, pass.total_duration - 1));

    let deadline_shortfall_days = options.deadline.and_then(|deadline| {
        let available =
            calendar.working_days_between(options.project_start, deadline + Days::new(1));
        (pass.total_duration > available).then(|| pass.total_duration - available)
    });

    Ok(Schedule {
        project_start: options.project_start,
        timings,
        total_duration_days: pass.total_duration,
        completion_date,
        critical_path,
        deadline_shortfall_days,
        unresolved_overloads: leveled.overloads,
        optimization_incomplete: incomplete,
    })
}

fn risk_buffer_days(duration: u32, estimate_variance: f64, factor: f64) -> u32 {
    let buffer = duration as f64 * estimate_variance.max(0.0) * factor.max(0.0);
    buffer.ceil() as u32
}
