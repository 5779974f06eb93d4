//! Methodology templates and graph construction.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use planforge_core::{EngineError, EngineResult, ProjectId, Task, TaskGraph, TaskId, TenantId};

/// Supported project templates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Agile,
    Waterfall,
    Kanban,
}

impl FromStr for TemplateKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "agile" => Ok(Self::Agile),
            "waterfall" => Ok(Self::Waterfall),
            "kanban" => Ok(Self::Kanban),
            other => Err(EngineError::validation(format!("unknown template: {other}"))),
        }
    }
}

impl core::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Agile => "agile",
            Self::Waterfall => "waterfall",
            Self::Kanban => "kanban",
        };
        f.write_str(name)
    }
}

/// Project metadata feeding template expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub name: String,
    pub team_size: u32,
    /// Number of sprints generated for agile projects.
    pub sprint_count: u32,
    /// Working days per sprint.
    pub sprint_length_days: u32,
}

impl ProjectMeta {
    pub fn new(tenant_id: TenantId, project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            tenant_id,
            project_id,
            name: name.into(),
            team_size: 4,
            sprint_count: 3,
            sprint_length_days: 10,
        }
    }

    pub fn with_team_size(mut self, team_size: u32) -> Self {
        self.team_size = team_size.max(1);
        self
    }

    pub fn with_sprints(mut self, count: u32, length_days: u32) -> Self {
        self.sprint_count = count.max(1);
        self.sprint_length_days = length_days.max(1);
        self
    }
}

/// Build the template's default phase/milestone structure for a project.
///
/// Pure construction; the returned graph is validated and immutable.
pub fn generate_structure(meta: &ProjectMeta, template: TemplateKind) -> EngineResult<TaskGraph> {
    let tasks = match template {
        TemplateKind::Agile => agile_tasks(meta),
        TemplateKind::Waterfall => waterfall_tasks(meta),
        TemplateKind::Kanban => kanban_tasks(meta),
    };
    TaskGraph::try_new(tasks)
}

/// Backlog bucket plus sprint buckets. Sprints have no fixed dates; each
/// sprint's planning milestone gates it on the previous sprint.
fn agile_tasks(meta: &ProjectMeta) -> Vec<Task> {
    let crew = meta.team_size as f64;
    let mut tasks = Vec::with_capacity(1 + meta.sprint_count as usize * 2);

    let backlog = Task::new(TaskId::new(), "product backlog", 2)
        .with_skills(["planning"])
        .with_priority(6)
        .with_effort_hours(2.0 * 6.0)
        .with_estimate_variance(0.1);
    let mut previous = backlog.id;
    tasks.push(backlog);

    for sprint in 1..=meta.sprint_count {
        let planning = Task::new(TaskId::new(), format!("sprint {sprint} planning"), 1)
            .with_dependencies([previous])
            .with_skills(["planning"])
            .with_priority(6)
            .with_effort_hours(1.0 * 6.0)
            .with_estimate_variance(0.1);
        let planning_id = planning.id;
        tasks.push(planning);

        let bucket = Task::new(TaskId::new(), format!("sprint {sprint}"), meta.sprint_length_days)
            .with_dependencies([planning_id])
            .with_skills(["engineering"])
            .with_priority(4)
            .with_effort_hours(meta.sprint_length_days as f64 * 6.0 * crew)
            .with_estimate_variance(0.3);
        previous = bucket.id;
        tasks.push(bucket);
    }

    tasks
}

/// Sequential phases with zero-duration gate milestones between them.
fn waterfall_tasks(meta: &ProjectMeta) -> Vec<Task> {
    let crew = meta.team_size as f64;
    let phases: [(&str, u32, &str, u8, f64); 5] = [
        ("requirements", 5, "analysis", 7, 0.1),
        ("design", 10, "architecture", 6, 0.2),
        ("implementation", 20, "engineering", 5, 0.3),
        ("verification", 10, "qa", 6, 0.2),
        ("maintenance", 5, "support", 3, 0.1),
    ];

    let mut tasks: Vec<Task> = Vec::with_capacity(phases.len() * 2 - 1);
    let mut previous: Option<TaskId> = None;

    for (name, duration, skill, priority, variance) in phases {
        let gate_id = previous.map(|prev| {
            let gate = Task::new(TaskId::new(), format!("{name} gate"), 0)
                .with_dependencies([prev])
                .with_priority(8);
            let id = gate.id;
            tasks.push(gate);
            id
        });

        let mut phase = Task::new(TaskId::new(), name, duration)
            .with_skills([skill])
            .with_priority(priority)
            .with_effort_hours(duration as f64 * 6.0 * crew)
            .with_estimate_variance(variance);
        if let Some(gate) = gate_id {
            phase = phase.with_dependencies([gate]);
        }
        previous = Some(phase.id);
        tasks.push(phase);
    }

    tasks
}

/// Flow stages without fixed dates or generated dependencies.
fn kanban_tasks(meta: &ProjectMeta) -> Vec<Task> {
    let crew = meta.team_size as f64;
    ["backlog", "ready", "in progress", "review", "done"]
        .into_iter()
        .map(|stage| {
            Task::new(TaskId::new(), stage, 5)
                .with_priority(4)
                .with_effort_hours(5.0 * 6.0 * crew)
                .with_estimate_variance(0.2)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> ProjectMeta {
        ProjectMeta::new(TenantId::new(), ProjectId::new(), "rollout")
    }

    #[test]
    fn unknown_template_name_is_rejected() {
        let err = "scrumfall".parse::<TemplateKind>().unwrap_err();
        match err {
            EngineError::Validation(msg) => assert!(msg.contains("scrumfall")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn template_names_round_trip() {
        for kind in [TemplateKind::Agile, TemplateKind::Waterfall, TemplateKind::Kanban] {
            assert_eq!(kind.to_string().parse::<TemplateKind>().unwrap(), kind);
        }
    }

    #[test]
    fn agile_chains_sprints_through_planning_milestones() {
        let meta = meta().with_sprints(3, 10);
        let graph = generate_structure(&meta, TemplateKind::Agile).unwrap();

        // backlog + 3 × (planning + bucket)
        assert_eq!(graph.len(), 7);
        // Every sprint bucket depends on exactly its planning task.
        for i in 0..graph.len() {
            let task = graph.task(i);
            if task.name.starts_with("sprint") && !task.name.ends_with("planning") {
                assert_eq!(graph.parents_of(i).len(), 1);
                let parent = graph.task(graph.parents_of(i)[0]);
                assert!(parent.name.ends_with("planning"));
            }
        }
    }

    #[test]
    fn waterfall_is_a_single_gated_chain() {
        let graph = generate_structure(&meta(), TemplateKind::Waterfall).unwrap();

        // 5 phases with 4 gates between them.
        assert_eq!(graph.len(), 9);
        let sinks = (0..graph.len())
            .filter(|&i| graph.children_of(i).is_empty())
            .count();
        let sources = (0..graph.len())
            .filter(|&i| graph.parents_of(i).is_empty())
            .count();
        assert_eq!(sinks, 1);
        assert_eq!(sources, 1);

        for i in 0..graph.len() {
            let task = graph.task(i);
            if task.name.ends_with("gate") {
                assert_eq!(task.duration_days, 0);
            }
        }
    }

    #[test]
    fn kanban_stages_have_no_dependencies() {
        let graph = generate_structure(&meta(), TemplateKind::Kanban).unwrap();
        assert_eq!(graph.len(), 5);
        for i in 0..graph.len() {
            assert!(graph.parents_of(i).is_empty());
        }
    }
}
