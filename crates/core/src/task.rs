//! Task and team-member snapshots.
//!
//! These are read-only views of entities owned by the surrounding
//! project-management module. The engine never mutates them; every stage
//! returns newly constructed derived objects instead.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::{MemberId, TaskId};

/// A unit of project work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Estimated duration in working days. Zero-duration tasks act as
    /// milestones/gates.
    pub duration_days: u32,
    /// Estimated effort in person-hours (drives capacity checks and the
    /// per-day resource demand during leveling).
    pub effort_hours: f64,
    /// Tasks that must finish before this one may start.
    pub depends_on: Vec<TaskId>,
    /// Skill tags a member must share (at least one) to qualify for this
    /// task. Empty means any member qualifies.
    pub required_skills: BTreeSet<String>,
    /// Higher value = more urgent.
    pub priority: u8,
    pub assignee: Option<MemberId>,
    pub department: Option<String>,
    /// Relative spread of the duration estimate in [0, 1]; drives risk
    /// buffering and Monte Carlo duration sampling.
    pub estimate_variance: f64,
}

impl Task {
    pub fn new(id: TaskId, name: impl Into<String>, duration_days: u32) -> Self {
        Self {
            id,
            name: name.into(),
            duration_days,
            effort_hours: duration_days as f64 * 8.0,
            depends_on: Vec::new(),
            required_skills: BTreeSet::new(),
            priority: 0,
            assignee: None,
            department: None,
            estimate_variance: 0.0,
        }
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = TaskId>) -> Self {
        self.depends_on = deps.into_iter().collect();
        self
    }

    pub fn with_skills<S: Into<String>>(mut self, skills: impl IntoIterator<Item = S>) -> Self {
        self.required_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_effort_hours(mut self, effort_hours: f64) -> Self {
        self.effort_hours = effort_hours;
        self
    }

    pub fn with_estimate_variance(mut self, estimate_variance: f64) -> Self {
        self.estimate_variance = estimate_variance;
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Resource demand this task exerts on each working day it is active.
    ///
    /// Zero-duration gates exert no demand.
    pub fn daily_demand(&self) -> f64 {
        if self.duration_days == 0 {
            0.0
        } else {
            self.effort_hours / self.duration_days as f64
        }
    }
}

/// A member of the project roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: MemberId,
    pub name: String,
    pub skills: BTreeSet<String>,
    /// Available hours per planning period.
    pub capacity_hours: f64,
    /// Hours already committed to other work this period.
    pub committed_hours: f64,
}

impl TeamMember {
    pub fn new(id: MemberId, name: impl Into<String>, capacity_hours: f64) -> Self {
        Self {
            id,
            name: name.into(),
            skills: BTreeSet::new(),
            capacity_hours,
            committed_hours: 0.0,
        }
    }

    pub fn with_skills<S: Into<String>>(mut self, skills: impl IntoIterator<Item = S>) -> Self {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_committed_hours(mut self, committed_hours: f64) -> Self {
        self.committed_hours = committed_hours;
        self
    }

    /// Number of skill tags shared with the task's requirement set.
    pub fn skill_overlap(&self, task: &Task) -> usize {
        task.required_skills
            .iter()
            .filter(|s| self.skills.contains(*s))
            .count()
    }

    /// Whether this member qualifies for the task: shares at least one
    /// required skill tag, or the task requires none.
    pub fn qualifies_for(&self, task: &Task) -> bool {
        task.required_skills.is_empty() || self.skill_overlap(task) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_requirement_set_matches_any_member() {
        let task = Task::new(TaskId::new(), "setup", 2);
        let member = TeamMember::new(MemberId::new(), "dana", 40.0);
        assert!(member.qualifies_for(&task));
        assert_eq!(member.skill_overlap(&task), 0);
    }

    #[test]
    fn qualification_requires_one_shared_tag() {
        let task = Task::new(TaskId::new(), "api design", 3).with_skills(["architecture", "api"]);
        let architect = TeamMember::new(MemberId::new(), "alex", 40.0).with_skills(["architecture"]);
        let tester = TeamMember::new(MemberId::new(), "toni", 40.0).with_skills(["qa"]);

        assert!(architect.qualifies_for(&task));
        assert_eq!(architect.skill_overlap(&task), 1);
        assert!(!tester.qualifies_for(&task));
    }

    #[test]
    fn zero_duration_gate_exerts_no_demand() {
        let gate = Task::new(TaskId::new(), "design gate", 0);
        assert_eq!(gate.daily_demand(), 0.0);

        let task = Task::new(TaskId::new(), "build", 4).with_effort_hours(32.0);
        assert_eq!(task.daily_demand(), 8.0);
    }
}
