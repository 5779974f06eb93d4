//! `planforge-forecast` — predictive analytics over schedules and history.
//!
//! Completion-date, budget, and risk forecasts as pure deterministic
//! functions: identical inputs always produce identical outputs. The Monte
//! Carlo sub-mode requires an explicit caller-supplied seed so simulated
//! results stay reproducible.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use planforge_core::EngineError;

pub mod budget;
pub mod completion;
pub mod history;
pub mod risk;
pub mod simulation;
mod stats;

pub use budget::{budget_forecast, BudgetInputs};
pub use completion::{completion_forecast, CompletionInputs, DEFAULT_VELOCITY_WINDOW};
pub use history::VelocitySample;
pub use risk::{risk_forecast, RiskInputs, RiskWeights};
pub use simulation::{simulate_completion, SimulationConfig, DEFAULT_TRIALS};

/// What the caller wants projected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastKind {
    CompletionDate,
    Budget,
    Risk,
}

impl FromStr for ForecastKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "completion-date" | "completiondate" | "completion" => Ok(Self::CompletionDate),
            "budget" => Ok(Self::Budget),
            "risk" => Ok(Self::Risk),
            other => Err(EngineError::validation(format!(
                "unknown forecast kind: {other}"
            ))),
        }
    }
}

impl core::fmt::Display for ForecastKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::CompletionDate => "completion-date",
            Self::Budget => "budget",
            Self::Risk => "risk",
        };
        f.write_str(name)
    }
}

/// How much the velocity history backs the projection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Naive extrapolation; fewer than two history periods were available.
    Low,
    Normal,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBucket {
    Low,
    Medium,
    High,
}

/// One scored input to the risk model, reported for explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub weight: f64,
    /// Normalized factor reading in [0, 1].
    pub value: f64,
    /// Share of the final score this factor contributed.
    pub contribution: f64,
}

/// Confidence band around the projected completion date.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionBand {
    pub p10: NaiveDate,
    pub p50: NaiveDate,
    pub p90: NaiveDate,
}

/// Summary statistics of a Monte Carlo run. Raw trial data never leaves the
/// simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub trials: u32,
    pub mean_days: f64,
    pub p10_days: f64,
    pub p90_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionForecast {
    pub projected: NaiveDate,
    pub band: CompletionBand,
    pub confidence: Confidence,
    /// Velocity used for the projection, in completed hours per period.
    pub velocity_hours_per_period: f64,
    pub simulation: Option<SimulationSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetForecast {
    /// Actual spend per period so far.
    pub burn_rate: f64,
    pub projected_total: f64,
    pub budget_total: f64,
    pub overrun: bool,
    pub overrun_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskForecast {
    pub bucket: RiskBucket,
    /// Weighted score in [0, 1].
    pub score: f64,
    pub factors: Vec<RiskFactor>,
}

/// Tagged forecast output, one variant per [`ForecastKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastResult {
    Completion(CompletionForecast),
    Budget(BudgetForecast),
    Risk(RiskForecast),
}
