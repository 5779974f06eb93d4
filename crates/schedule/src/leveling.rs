//! Serial resource leveling within slack windows.
//!
//! Tasks are placed in ascending-slack, descending-priority order so the
//! least-flexible, highest-priority tasks claim capacity first. A task may
//! only shift inside its own slack window, so leveling can never lengthen
//! the project; whatever oversubscription the windows cannot absorb is
//! reported, not dropped.

use planforge_core::TaskGraph;

use crate::cancel::CancelToken;
use crate::cpm::CpmPass;
use crate::Overload;

#[derive(Debug, Clone)]
pub(crate) struct LevelingOutcome {
    /// Chosen start offset per task (arena order).
    pub scheduled_start: Vec<u32>,
    /// Days still over capacity after leveling.
    pub overloads: Vec<Overload>,
    /// False when cancellation stopped the pass early; remaining tasks stay
    /// at their earliest starts.
    pub completed: bool,
}

pub(crate) fn level_resources(
    graph: &TaskGraph,
    pass: &CpmPass,
    durations: &[u32],
    daily_capacity: f64,
    cancel: &CancelToken,
) -> LevelingOutcome {
    let n = graph.len();
    let mut scheduled_start: Vec<u32> = pass.earliest_start.clone();
    let mut histogram = vec![0.0f64; pass.total_duration as usize];
    let mut completed = true;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        pass.slack[a]
            .cmp(&pass.slack[b])
            .then(graph.task(b).priority.cmp(&graph.task(a).priority))
            .then(a.cmp(&b))
    });

    for &i in &order {
        let demand = graph.task(i).daily_demand();
        if cancel.is_cancelled() {
            // Best effort: account the remaining tasks at their earliest
            // starts and stop optimizing.
            completed = false;
            add_demand(&mut histogram, scheduled_start[i], durations[i], demand);
            continue;
        }

        let start = choose_start(
            graph,
            pass,
            durations,
            &scheduled_start,
            &histogram,
            daily_capacity,
            i,
        );
        scheduled_start[i] = start;
        add_demand(&mut histogram, start, durations[i], demand);
    }

    let overloads = histogram
        .iter()
        .enumerate()
        .filter(|&(_, &load)| load > daily_capacity + f64::EPSILON)
        .map(|(day, &load)| Overload {
            day_offset: day as u32,
            excess_demand: load - daily_capacity,
        })
        .collect();

    LevelingOutcome {
        scheduled_start,
        overloads,
        completed,
    }
}

/// Pick the start offset inside the task's feasible window that adds the
/// least capacity excess, breaking ties by the lowest resulting peak and
/// then the earliest start.
#[allow(clippy::too_many_arguments)]
fn choose_start(
    graph: &TaskGraph,
    pass: &CpmPass,
    durations: &[u32],
    scheduled_start: &[u32],
    histogram: &[f64],
    daily_capacity: f64,
    i: usize,
) -> u32 {
    let duration = durations[i];
    let demand = graph.task(i).daily_demand();

    // Precedence bounds against current neighbor positions: parents placed
    // so far already finish before this task's current start, and children
    // only ever move later, so these caps stay valid as the pass proceeds.
    let floor = graph
        .parents_of(i)
        .iter()
        .map(|&p| scheduled_start[p] + durations[p])
        .max()
        .unwrap_or(0)
        .max(pass.earliest_start[i]);
    let mut cap = pass.earliest_start[i] + pass.slack[i];
    for &c in graph.children_of(i) {
        cap = cap.min(scheduled_start[c].saturating_sub(duration));
    }
    let cap = cap.max(floor);

    if demand == 0.0 || duration == 0 || pass.critical[i] {
        return floor;
    }

    let mut best = floor;
    let mut best_excess = f64::INFINITY;
    let mut best_peak = f64::INFINITY;
    for start in floor..=cap {
        let mut excess = 0.0;
        let mut peak = 0.0f64;
        for day in start..start + duration {
            let before = histogram.get(day as usize).copied().unwrap_or(0.0);
            let after = before + demand;
            excess += (after - daily_capacity).max(0.0) - (before - daily_capacity).max(0.0);
            peak = peak.max(after);
        }
        if excess < best_excess - f64::EPSILON
            || (excess < best_excess + f64::EPSILON && peak < best_peak - f64::EPSILON)
        {
            best = start;
            best_excess = excess;
            best_peak = peak;
        }
    }
    best
}

fn add_demand(histogram: &mut [f64], start: u32, duration: u32, demand: f64) {
    if demand == 0.0 {
        return;
    }
    for day in start..start + duration {
        if let Some(slot) = histogram.get_mut(day as usize) {
            *slot += demand;
        }
    }
}
