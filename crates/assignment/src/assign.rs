//! Assignment execution over an immutable graph snapshot.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use planforge_core::{EngineError, EngineResult, MemberId, Task, TaskGraph, TaskId, TeamMember};

use crate::strategy::AssignmentStrategy;

const SPREAD_IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Caller knobs for a single assignment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentOptions {
    /// Allow assignments that exceed a member's stated capacity (the member
    /// is then recorded in `over_capacity`).
    pub forced: bool,
    /// Turn capacity misses into `EngineError::CapacityExceeded` instead of
    /// a reportable condition.
    pub strict: bool,
    /// Skill-based strategy: score penalty per committed hour.
    pub load_penalty_per_hour: f64,
}

impl Default for AssignmentOptions {
    fn default() -> Self {
        Self {
            forced: false,
            strict: false,
            load_penalty_per_hour: 0.1,
        }
    }
}

/// Why a task ended up without an owner.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnassignedReason {
    /// No roster member shares a required skill tag.
    NoQualifiedMember,
    /// Every qualified member would exceed capacity and `forced` was off.
    CapacityExceeded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignedTask {
    pub task_id: TaskId,
    pub reason: UnassignedReason,
}

/// Outcome of one assignment run. A new object per run; the input graph and
/// roster are never touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub strategy: AssignmentStrategy,
    pub assignments: BTreeMap<TaskId, MemberId>,
    pub unassigned: Vec<UnassignedTask>,
    /// Members whose capacity was exceeded through forced assignment.
    pub over_capacity: Vec<MemberId>,
    /// Projected load per roster member (committed + newly assigned hours).
    pub member_loads: BTreeMap<MemberId, f64>,
}

impl AssignmentResult {
    /// Max − min of projected member loads; the balanced strategy's
    /// objective and the what-if comparison score.
    pub fn load_spread(&self) -> f64 {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &load in self.member_loads.values() {
            min = min.min(load);
            max = max.max(load);
        }
        if min.is_finite() { max - min } else { 0.0 }
    }
}

/// Assign the graph's tasks to roster members under the given strategy.
///
/// Deterministic: identical inputs produce identical results. Only strict
/// mode makes capacity a hard error.
pub fn assign_tasks(
    graph: &TaskGraph,
    roster: &[TeamMember],
    strategy: AssignmentStrategy,
    options: &AssignmentOptions,
) -> EngineResult<AssignmentResult> {
    let mut loads: Vec<f64> = roster.iter().map(|m| m.committed_hours).collect();
    // task index -> roster index
    let mut owners: Vec<Option<usize>> = vec![None; graph.len()];
    let mut forced_members: BTreeSet<MemberId> = BTreeSet::new();
    let mut unassigned: Vec<UnassignedTask> = Vec::new();

    let order = task_order(graph, strategy);

    for &ti in &order {
        let task = graph.task(ti);
        let candidates: Vec<usize> = (0..roster.len())
            .filter(|&m| roster[m].qualifies_for(task))
            .collect();

        if candidates.is_empty() {
            unassigned.push(UnassignedTask {
                task_id: task.id,
                reason: UnassignedReason::NoQualifiedMember,
            });
            continue;
        }

        let ranked = rank_candidates(strategy, task, roster, &loads, candidates, options);
        let fitting = ranked
            .iter()
            .copied()
            .find(|&m| loads[m] + task.effort_hours <= roster[m].capacity_hours);

        match fitting {
            Some(m) => {
                owners[ti] = Some(m);
                loads[m] += task.effort_hours;
            }
            None if options.forced => {
                let m = ranked[0];
                owners[ti] = Some(m);
                loads[m] += task.effort_hours;
                forced_members.insert(roster[m].id);
            }
            None if options.strict => {
                return Err(EngineError::capacity(task.id, roster[ranked[0]].id));
            }
            None => {
                unassigned.push(UnassignedTask {
                    task_id: task.id,
                    reason: UnassignedReason::CapacityExceeded,
                });
            }
        }
    }

    if strategy == AssignmentStrategy::Balanced {
        improve_balance(
            graph,
            roster,
            options,
            &mut owners,
            &mut loads,
            &mut forced_members,
        );
    }

    let mut assignments = BTreeMap::new();
    for (ti, owner) in owners.iter().enumerate() {
        if let Some(m) = owner {
            assignments.insert(graph.task(ti).id, roster[*m].id);
        }
    }
    let member_loads = roster
        .iter()
        .zip(&loads)
        .map(|(m, &load)| (m.id, load))
        .collect();

    Ok(AssignmentResult {
        strategy,
        assignments,
        unassigned,
        over_capacity: forced_members.into_iter().collect(),
        member_loads,
    })
}

/// Balanced processes urgent tasks first; the other strategies walk the
/// arena in order.
fn task_order(graph: &TaskGraph, strategy: AssignmentStrategy) -> Vec<usize> {
    let mut order: Vec<usize> = (0..graph.len()).collect();
    if strategy == AssignmentStrategy::Balanced {
        order.sort_by(|&a, &b| {
            graph
                .task(b)
                .priority
                .cmp(&graph.task(a).priority)
                .then(a.cmp(&b))
        });
    }
    order
}

/// Candidate roster indices ordered best-first for the given strategy.
fn rank_candidates(
    strategy: AssignmentStrategy,
    task: &Task,
    roster: &[TeamMember],
    loads: &[f64],
    mut candidates: Vec<usize>,
    options: &AssignmentOptions,
) -> Vec<usize> {
    match strategy {
        AssignmentStrategy::Balanced => {
            candidates.sort_by(|&a, &b| loads[a].total_cmp(&loads[b]).then(a.cmp(&b)));
        }
        AssignmentStrategy::SkillBased => {
            let score = |m: usize| {
                roster[m].skill_overlap(task) as f64 - options.load_penalty_per_hour * loads[m]
            };
            candidates.sort_by(|&a, &b| {
                score(b)
                    .total_cmp(&score(a))
                    .then(loads[a].total_cmp(&loads[b]))
                    .then(a.cmp(&b))
            });
        }
        AssignmentStrategy::WorkloadBased => {
            candidates.sort_by(|&a, &b| {
                loads[a]
                    .total_cmp(&loads[b])
                    .then(roster[b].skill_overlap(task).cmp(&roster[a].skill_overlap(task)))
                    .then(a.cmp(&b))
            });
        }
    }
    candidates
}

/// Local-improvement pass: while a single task reassignment strictly
/// reduces (max − min) of member loads, apply it. The greedy pass seeds the
/// solution; this closes the gap to local optimality. Terminates because
/// every applied move shrinks the spread by more than a fixed epsilon.
fn improve_balance(
    graph: &TaskGraph,
    roster: &[TeamMember],
    options: &AssignmentOptions,
    owners: &mut [Option<usize>],
    loads: &mut [f64],
    forced_members: &mut BTreeSet<MemberId>,
) {
    if roster.len() < 2 {
        return;
    }

    loop {
        let current = spread(loads);
        let mut applied = false;

        'moves: for ti in 0..owners.len() {
            let Some(from) = owners[ti] else { continue };
            let task = graph.task(ti);

            for to in 0..roster.len() {
                if to == from || !roster[to].qualifies_for(task) {
                    continue;
                }
                let within_capacity =
                    loads[to] + task.effort_hours <= roster[to].capacity_hours;
                if !within_capacity && !options.forced {
                    continue;
                }

                loads[from] -= task.effort_hours;
                loads[to] += task.effort_hours;
                if spread(loads) < current - SPREAD_IMPROVEMENT_EPSILON {
                    owners[ti] = Some(to);
                    if !within_capacity {
                        forced_members.insert(roster[to].id);
                    }
                    applied = true;
                    break 'moves;
                }
                loads[to] -= task.effort_hours;
                loads[from] += task.effort_hours;
            }
        }

        if !applied {
            break;
        }
    }
}

fn spread(loads: &[f64]) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &load in loads {
        min = min.min(load);
        max = max.max(load);
    }
    if min.is_finite() { max - min } else { 0.0 }
}
