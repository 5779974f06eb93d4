//! Seeded Monte Carlo simulation of project duration.
//!
//! Each trial samples every task's duration from a normal distribution
//! centered on its estimate (spread = estimate × declared variance) and runs
//! a forward pass over the dependency graph. Only summary statistics leave
//! the simulation; the seed is caller-supplied so identical inputs always
//! reproduce identical results.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use planforge_core::TaskGraph;

use crate::stats::{mean, percentile_sorted};
use crate::SimulationSummary;

/// Default trial count; callers can raise or lower it per run.
pub const DEFAULT_TRIALS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Mandatory seed: simulation without one would not be reproducible.
    pub seed: u64,
    pub trials: u32,
}

impl SimulationConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            trials: DEFAULT_TRIALS,
        }
    }

    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials.max(1);
        self
    }
}

/// Run the simulation and summarize total project duration across trials.
pub fn simulate_completion(graph: &TaskGraph, config: &SimulationConfig) -> SimulationSummary {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let trials = config.trials.max(1);
    let order = graph.topological_order();

    let mut totals: Vec<f64> = Vec::with_capacity(trials as usize);
    let mut finish = vec![0.0f64; graph.len()];

    for _ in 0..trials {
        let mut total = 0.0f64;
        for &i in order {
            let task = graph.task(i);
            let start = graph
                .parents_of(i)
                .iter()
                .map(|&p| finish[p])
                .fold(0.0f64, f64::max);
            let estimate = task.duration_days as f64;
            let spread = estimate * task.estimate_variance.max(0.0);
            let duration = sample_normal(&mut rng, estimate, spread).max(0.0);
            finish[i] = start + duration;
            total = total.max(finish[i]);
        }
        totals.push(total);
    }

    totals.sort_by(f64::total_cmp);
    SimulationSummary {
        trials,
        mean_days: mean(&totals),
        p10_days: percentile_sorted(&totals, 0.1),
        p90_days: percentile_sorted(&totals, 0.9),
    }
}

/// Box–Muller transform over the generator's uniform output.
fn sample_normal(rng: &mut StdRng, mean: f64, spread: f64) -> f64 {
    if spread <= 0.0 {
        return mean;
    }
    let mut u1: f64 = rng.gen_range(0.0..1.0);
    while u1 <= f64::MIN_POSITIVE {
        u1 = rng.gen_range(0.0..1.0);
    }
    let u2: f64 = rng.gen_range(0.0..1.0);
    let z = (-2.0 * u1.ln()).sqrt() * (core::f64::consts::TAU * u2).cos();
    mean + spread * z
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_core::{Task, TaskId};

    fn chain(durations_and_variance: &[(u32, f64)]) -> TaskGraph {
        let mut tasks: Vec<Task> = Vec::new();
        let mut prev: Option<TaskId> = None;
        for (i, &(d, v)) in durations_and_variance.iter().enumerate() {
            let mut task = Task::new(TaskId::new(), format!("t{i}"), d).with_estimate_variance(v);
            if let Some(p) = prev {
                task = task.with_dependencies([p]);
            }
            prev = Some(task.id);
            tasks.push(task);
        }
        TaskGraph::try_new(tasks).unwrap()
    }

    #[test]
    fn zero_variance_collapses_to_the_deterministic_total() {
        let graph = chain(&[(3, 0.0), (2, 0.0), (4, 0.0)]);
        let summary = simulate_completion(&graph, &SimulationConfig::new(7).with_trials(100));

        assert_eq!(summary.trials, 100);
        assert_eq!(summary.mean_days, 9.0);
        assert_eq!(summary.p10_days, 9.0);
        assert_eq!(summary.p90_days, 9.0);
    }

    #[test]
    fn same_seed_reproduces_the_summary_exactly() {
        let graph = chain(&[(4, 0.25), (4, 0.25), (4, 0.25)]);
        let config = SimulationConfig::new(42);

        let first = simulate_completion(&graph, &config);
        let second = simulate_completion(&graph, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn variance_spreads_the_percentiles_around_the_estimate() {
        let graph = chain(&[(4, 0.25), (4, 0.25), (4, 0.25)]);
        let summary = simulate_completion(&graph, &SimulationConfig::new(42));

        assert!(summary.p10_days < summary.mean_days);
        assert!(summary.mean_days < summary.p90_days);
        // The chain's estimate is 12 days; a thousand trials keep the mean
        // close to it.
        assert!(summary.mean_days > 10.0 && summary.mean_days < 14.0);
    }
}
