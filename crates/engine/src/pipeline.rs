//! The five pipeline contracts.
//!
//! Every function takes the acting tenant for span context, parses
//! name-typed inputs, and validates cross-input consistency before handing
//! off to the pure engine crates. No function here logs on an error path;
//! errors carry their own context.

use chrono::NaiveDate;
use tracing::debug;

use planforge_assignment::{AssignmentOptions, AssignmentResult, AssignmentStrategy};
use planforge_core::{Calendar, EngineError, EngineResult, ProjectId, TaskGraph, TeamMember, TenantId};
use planforge_forecast::{
    budget_forecast, completion_forecast, risk_forecast, simulate_completion, BudgetInputs,
    CompletionInputs, ForecastKind, ForecastResult, RiskInputs, RiskWeights, SimulationConfig,
    VelocitySample,
};
use planforge_reporting::{ProgressSummary, ReportSnapshot};
use planforge_schedule::{Schedule, ScheduleOptions};
use planforge_structure::{ProjectMeta, TemplateKind};

/// Derive a project's initial task graph from a template.
pub fn generate_structure(
    tenant_id: TenantId,
    meta: &ProjectMeta,
    template_name: &str,
) -> EngineResult<TaskGraph> {
    if meta.tenant_id != tenant_id {
        return Err(EngineError::validation(format!(
            "project {} does not belong to tenant {tenant_id}",
            meta.project_id
        )));
    }
    let template: TemplateKind = template_name.parse()?;
    debug!(%tenant_id, project_id = %meta.project_id, %template, "generating project structure");
    planforge_structure::generate_structure(meta, template)
}

/// Map tasks to roster members under a named strategy.
pub fn assign_tasks(
    tenant_id: TenantId,
    graph: &TaskGraph,
    roster: &[TeamMember],
    strategy_name: &str,
    options: &AssignmentOptions,
) -> EngineResult<AssignmentResult> {
    let strategy: AssignmentStrategy = strategy_name.parse()?;
    debug!(%tenant_id, %strategy, tasks = graph.len(), members = roster.len(), "assigning tasks");
    planforge_assignment::assign_tasks(graph, roster, strategy, options)
}

/// Compute the critical-path schedule with resource leveling.
///
/// The assignment result rides along for cross-input validation: every
/// assigned task id must belong to the graph being scheduled.
pub fn optimize_schedule(
    tenant_id: TenantId,
    graph: &TaskGraph,
    assignments: &AssignmentResult,
    calendar: &Calendar,
    options: &ScheduleOptions,
) -> EngineResult<Schedule> {
    for task_id in assignments.assignments.keys() {
        if graph.index_of(*task_id).is_none() {
            return Err(EngineError::validation(format!(
                "assignment references task {task_id} not present in the graph"
            )));
        }
    }
    debug!(%tenant_id, tasks = graph.len(), mode = ?options.mode, "optimizing schedule");
    planforge_schedule::optimize_schedule(graph, calendar, options)
}

/// Everything a forecast run needs, bundled per kind.
#[derive(Debug, Clone)]
pub struct ForecastRequest<'a> {
    pub graph: &'a TaskGraph,
    pub schedule: &'a Schedule,
    pub history: &'a [VelocitySample],
    pub calendar: &'a Calendar,
    pub as_of: NaiveDate,
    /// Working days per reporting period.
    pub period_days: u32,
    /// Estimated work still open, in hours.
    pub remaining_hours: f64,
    /// Required for budget forecasts.
    pub budget: Option<BudgetInputs>,
    /// Incident frequency on structurally similar projects, in [0, 1].
    pub incident_rate: f64,
    pub risk_weights: RiskWeights,
    /// Opt-in Monte Carlo sub-mode; the seed comes from the caller.
    pub simulation: Option<SimulationConfig>,
}

/// Produce a forecast of the named kind.
///
/// Non-simulation runs are bit-deterministic; simulation runs are
/// deterministic per seed.
pub fn forecast(
    tenant_id: TenantId,
    kind_name: &str,
    request: &ForecastRequest<'_>,
) -> EngineResult<ForecastResult> {
    let kind: ForecastKind = kind_name.parse()?;
    debug!(%tenant_id, %kind, periods = request.history.len(), "running forecast");

    match kind {
        ForecastKind::CompletionDate => {
            let mut completion = completion_forecast(
                &CompletionInputs {
                    schedule: request.schedule,
                    calendar: request.calendar,
                    as_of: request.as_of,
                    remaining_hours: request.remaining_hours,
                    period_days: request.period_days,
                },
                request.history,
            );
            if let Some(config) = &request.simulation {
                completion.simulation = Some(simulate_completion(request.graph, config));
            }
            Ok(ForecastResult::Completion(completion))
        }
        ForecastKind::Budget => {
            let inputs = request.budget.clone().ok_or_else(|| {
                EngineError::validation("budget forecast requires budget inputs")
            })?;
            Ok(ForecastResult::Budget(budget_forecast(&inputs)))
        }
        ForecastKind::Risk => Ok(ForecastResult::Risk(risk_forecast(
            &RiskInputs {
                history: request.history,
                incident_rate: request.incident_rate,
            },
            &request.risk_weights,
        ))),
    }
}

/// Inputs for one report period.
#[derive(Debug, Clone)]
pub struct ReportRequest<'a> {
    pub project_id: ProjectId,
    pub granularity_name: &'a str,
    pub as_of: NaiveDate,
    pub schedule: &'a Schedule,
    pub assignments: &'a AssignmentResult,
    pub forecast: &'a ForecastResult,
    pub progress: ProgressSummary,
    pub prior: Option<&'a ReportSnapshot>,
}

/// Build the period's immutable snapshot.
///
/// The prior snapshot, when given, must belong to the same tenant and
/// project; a mismatch is a caller bug surfaced as validation.
pub fn generate_report(
    tenant_id: TenantId,
    request: &ReportRequest<'_>,
) -> EngineResult<ReportSnapshot> {
    if let Some(prior) = request.prior {
        if prior.tenant_id != tenant_id || prior.project_id != request.project_id {
            return Err(EngineError::validation(
                "prior snapshot belongs to a different tenant or project",
            ));
        }
    }
    let granularity = request.granularity_name.parse()?;
    debug!(%tenant_id, project_id = %request.project_id, %granularity, "generating report snapshot");

    Ok(planforge_reporting::generate_report(
        planforge_reporting::ReportInputs {
            tenant_id,
            project_id: request.project_id,
            granularity,
            as_of: request.as_of,
            schedule: request.schedule,
            assignments: request.assignments,
            forecast: request.forecast,
            progress: request.progress.clone(),
            prior: request.prior,
        },
    ))
}
