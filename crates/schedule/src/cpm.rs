//! Critical Path Method passes over the task graph.
//!
//! Works entirely in working-day offsets; the caller maps offsets to civil
//! dates. Durations are passed separately from the graph so risk buffering
//! can re-run the passes with adjusted values.

use planforge_core::{EngineError, EngineResult, TaskGraph, TaskId};

/// Output of the forward/backward passes.
#[derive(Debug, Clone)]
pub(crate) struct CpmPass {
    pub earliest_start: Vec<u32>,
    pub earliest_finish: Vec<u32>,
    pub latest_start: Vec<u32>,
    pub latest_finish: Vec<u32>,
    pub slack: Vec<u32>,
    pub critical: Vec<bool>,
    pub total_duration: u32,
}

/// Kahn's algorithm, layer by layer. Returns the topological layers or the
/// task ids stuck on a cycle (any task whose in-degree never drains).
pub(crate) fn topological_layers(graph: &TaskGraph) -> EngineResult<Vec<Vec<usize>>> {
    let n = graph.len();
    let mut indegree: Vec<usize> = (0..n).map(|i| graph.parents_of(i).len()).collect();
    let mut frontier: Vec<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut layers: Vec<Vec<usize>> = Vec::new();
    let mut seen = 0usize;

    while !frontier.is_empty() {
        seen += frontier.len();
        let mut next: Vec<usize> = Vec::new();
        for &node in &frontier {
            for &child in graph.children_of(node) {
                indegree[child] -= 1;
                if indegree[child] == 0 {
                    next.push(child);
                }
            }
        }
        next.sort_unstable();
        layers.push(std::mem::replace(&mut frontier, next));
    }

    if seen < n {
        let mut stuck: Vec<TaskId> = (0..n)
            .filter(|&i| indegree[i] > 0)
            .map(|i| graph.task(i).id)
            .collect();
        stuck.sort();
        return Err(EngineError::cyclic(stuck));
    }
    Ok(layers)
}

/// Forward and backward passes over precomputed layers.
pub(crate) fn critical_path_pass(
    graph: &TaskGraph,
    layers: &[Vec<usize>],
    durations: &[u32],
) -> CpmPass {
    let n = graph.len();
    let mut earliest_start = vec![0u32; n];
    let mut earliest_finish = vec![0u32; n];

    for layer in layers {
        for &i in layer {
            let start = graph
                .parents_of(i)
                .iter()
                .map(|&p| earliest_finish[p])
                .max()
                .unwrap_or(0);
            earliest_start[i] = start;
            earliest_finish[i] = start + durations[i];
        }
    }

    let total_duration = earliest_finish.iter().copied().max().unwrap_or(0);

    let mut latest_finish = vec![total_duration; n];
    let mut latest_start = vec![total_duration; n];
    for layer in layers.iter().rev() {
        for &i in layer {
            let finish = graph
                .children_of(i)
                .iter()
                .map(|&c| latest_start[c])
                .min()
                .unwrap_or(total_duration);
            latest_finish[i] = finish;
            latest_start[i] = finish - durations[i];
        }
    }

    let slack: Vec<u32> = (0..n)
        .map(|i| latest_start[i] - earliest_start[i])
        .collect();
    let critical: Vec<bool> = slack.iter().map(|&s| s == 0).collect();

    CpmPass {
        earliest_start,
        earliest_finish,
        latest_start,
        latest_finish,
        slack,
        critical,
        total_duration,
    }
}

/// Reconstruct the critical path: the zero-slack chain whose durations sum
/// to the total duration. Walks from a zero-slack source, always stepping to
/// a zero-slack child that starts exactly at the current finish.
pub(crate) fn critical_chain(graph: &TaskGraph, pass: &CpmPass, durations: &[u32]) -> Vec<TaskId> {
    let n = graph.len();
    let mut chain: Vec<TaskId> = Vec::new();
    let mut current = (0..n)
        .filter(|&i| pass.critical[i] && pass.earliest_start[i] == 0)
        .min_by_key(|&i| (core::cmp::Reverse(durations[i]), i));

    while let Some(node) = current {
        chain.push(graph.task(node).id);
        current = graph
            .children_of(node)
            .iter()
            .copied()
            .filter(|&c| pass.critical[c] && pass.earliest_start[c] == pass.earliest_finish[node])
            .min_by_key(|&c| (core::cmp::Reverse(durations[c]), c));
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_core::Task;

    fn chain_graph(durations: &[u32]) -> TaskGraph {
        let mut tasks: Vec<Task> = Vec::new();
        let mut prev: Option<TaskId> = None;
        for (i, &d) in durations.iter().enumerate() {
            let mut task = Task::new(TaskId::new(), format!("t{i}"), d);
            if let Some(p) = prev {
                task = task.with_dependencies([p]);
            }
            prev = Some(task.id);
            tasks.push(task);
        }
        TaskGraph::try_new(tasks).unwrap()
    }

    #[test]
    fn single_chain_is_fully_critical() {
        let graph = chain_graph(&[3, 2, 4]);
        let layers = topological_layers(&graph).unwrap();
        let durations: Vec<u32> = graph.tasks().iter().map(|t| t.duration_days).collect();
        let pass = critical_path_pass(&graph, &layers, &durations);

        assert_eq!(pass.total_duration, 9);
        assert!(pass.critical.iter().all(|&c| c));
        assert_eq!(critical_chain(&graph, &pass, &durations).len(), 3);
    }

    #[test]
    fn cycle_reports_stuck_tasks() {
        let a = TaskId::new();
        let b = TaskId::new();
        let graph = TaskGraph::new_unchecked(vec![
            Task::new(a, "a", 1).with_dependencies([b]),
            Task::new(b, "b", 1).with_dependencies([a]),
        ]);

        let err = topological_layers(&graph).unwrap_err();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(err, EngineError::cyclic(expected));
    }
}
