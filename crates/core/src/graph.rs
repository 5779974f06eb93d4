//! Task-graph arena.
//!
//! Tasks live in a flat arena and dependency edges are index pairs, so
//! derived stages can snapshot the graph cheaply and no accidental cyclic
//! object graph can form. DAG validity is checked once at construction via
//! a three-color depth-first traversal; the stored topological order is
//! computed at the same time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::id::TaskId;
use crate::task::Task;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Immutable task graph owned by one project.
///
/// Produced by the structure generator (or built from caller tasks) and
/// never mutated afterwards; downstream stages return new derived objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskGraph {
    tasks: Vec<Task>,
    /// For each task index, the indices of tasks it depends on.
    parents: Vec<Vec<usize>>,
    /// For each task index, the indices of tasks depending on it.
    children: Vec<Vec<usize>>,
    /// Valid topological order (parents before children).
    topo: Vec<usize>,
}

impl TaskGraph {
    /// Build and validate a graph from caller-owned task snapshots.
    ///
    /// Fails with `Validation` on duplicate or unresolvable task ids and
    /// with `CyclicDependency` (carrying the offending task ids) when the
    /// dependency relation contains a cycle.
    pub fn try_new(tasks: Vec<Task>) -> EngineResult<Self> {
        let (parents, children) = resolve_edges(&tasks, true)?;

        let mut graph = Self {
            tasks,
            parents,
            children,
            topo: Vec::new(),
        };
        graph.topo = graph.check_acyclic()?;
        Ok(graph)
    }

    /// Build a graph without cycle validation.
    ///
    /// The caller asserts the dependency relation is acyclic; consumers that
    /// require validity (the schedule optimizer) re-derive their own
    /// topological order and still fail cleanly on a cycle. Unresolvable
    /// dependency ids are ignored rather than rejected.
    pub fn new_unchecked(tasks: Vec<Task>) -> Self {
        let n = tasks.len();
        let (parents, children) = resolve_edges(&tasks, false)
            .unwrap_or_else(|_| (vec![Vec::new(); n], vec![Vec::new(); n]));
        let topo = (0..tasks.len()).collect();
        Self {
            tasks,
            parents,
            children,
            topo,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, index: usize) -> &Task {
        &self.tasks[index]
    }

    pub fn index_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    pub fn parents_of(&self, index: usize) -> &[usize] {
        &self.parents[index]
    }

    pub fn children_of(&self, index: usize) -> &[usize] {
        &self.children[index]
    }

    /// Topological order computed at construction. For graphs built via
    /// `new_unchecked` this is simply the arena order.
    pub fn topological_order(&self) -> &[usize] {
        &self.topo
    }

    /// Iterative three-color DFS; returns a reverse-postorder topological
    /// order, or the tasks on a detected back edge's cycle.
    fn check_acyclic(&self) -> EngineResult<Vec<usize>> {
        let n = self.tasks.len();
        let mut color = vec![Color::White; n];
        let mut postorder: Vec<usize> = Vec::with_capacity(n);

        for root in 0..n {
            if color[root] != Color::White {
                continue;
            }

            // Stack holds (node, next child cursor); `path` mirrors the gray
            // chain so a back edge can name the cycle members.
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            let mut path: Vec<usize> = vec![root];
            color[root] = Color::Gray;

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                if frame.1 < self.children[node].len() {
                    let next = self.children[node][frame.1];
                    frame.1 += 1;
                    match color[next] {
                        Color::Gray => {
                            let at = path.iter().position(|&p| p == next).unwrap_or(0);
                            let mut ids: Vec<TaskId> =
                                path[at..].iter().map(|&i| self.tasks[i].id).collect();
                            ids.sort();
                            return Err(EngineError::cyclic(ids));
                        }
                        Color::White => {
                            color[next] = Color::Gray;
                            stack.push((next, 0));
                            path.push(next);
                        }
                        Color::Black => {}
                    }
                } else {
                    color[node] = Color::Black;
                    postorder.push(node);
                    stack.pop();
                    path.pop();
                }
            }
        }

        postorder.reverse();
        Ok(postorder)
    }
}

fn resolve_edges(
    tasks: &[Task],
    strict: bool,
) -> EngineResult<(Vec<Vec<usize>>, Vec<Vec<usize>>)> {
    let mut index: HashMap<TaskId, usize> = HashMap::with_capacity(tasks.len());
    for (i, task) in tasks.iter().enumerate() {
        if index.insert(task.id, i).is_some() && strict {
            return Err(EngineError::validation(format!(
                "duplicate task id {}",
                task.id
            )));
        }
    }

    let mut parents: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    for (i, task) in tasks.iter().enumerate() {
        for dep in &task.depends_on {
            match index.get(dep) {
                Some(&p) => {
                    parents[i].push(p);
                    children[p].push(i);
                }
                None if strict => {
                    return Err(EngineError::validation(format!(
                        "task {} depends on unknown task {}",
                        task.id, dep
                    )));
                }
                None => {}
            }
        }
    }
    Ok((parents, children))
}
