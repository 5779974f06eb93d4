//! Completion-date projection from velocity history.

use chrono::NaiveDate;

use planforge_core::{Calendar, EngineError, EngineResult};
use planforge_schedule::Schedule;

use crate::history::VelocitySample;
use crate::stats::{mean, stddev_sample};
use crate::{CompletionBand, CompletionForecast, Confidence};

/// How many recent periods feed the velocity trend.
pub const DEFAULT_VELOCITY_WINDOW: usize = 3;

/// Floor for the pessimistic velocity so the P90 projection stays finite.
const PESSIMISTIC_VELOCITY_FLOOR: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct CompletionInputs<'a> {
    pub schedule: &'a Schedule,
    pub calendar: &'a Calendar,
    pub as_of: NaiveDate,
    /// Estimated work still open, in hours.
    pub remaining_hours: f64,
    /// Working days per reporting period.
    pub period_days: u32,
}

/// Project the completion date.
///
/// Combines recent velocity with remaining work; the confidence band comes
/// from the historical velocity variance. With fewer than two history
/// periods the projection falls back to the current schedule and is marked
/// low-confidence.
pub fn completion_forecast(
    inputs: &CompletionInputs<'_>,
    history: &[VelocitySample],
) -> CompletionForecast {
    match velocity_trend(history) {
        Ok((velocity, deviation)) => projected(inputs, velocity, deviation),
        // InsufficientHistory is the only failure mode of the trend.
        Err(_) => naive_fallback(inputs),
    }
}

/// Mean and sample deviation of completed work over the recent window.
fn velocity_trend(history: &[VelocitySample]) -> EngineResult<(f64, f64)> {
    if history.len() < 2 {
        return Err(EngineError::insufficient_history(format!(
            "{} period(s) recorded, need at least 2 for a velocity trend",
            history.len()
        )));
    }
    let window = history.len().min(DEFAULT_VELOCITY_WINDOW);
    let recent: Vec<f64> = history[history.len() - window..]
        .iter()
        .map(|s| s.completed_hours)
        .collect();
    let velocity = mean(&recent);
    if velocity <= 0.0 {
        return Err(EngineError::insufficient_history(
            "recorded velocity is zero; no completed work to extrapolate from",
        ));
    }
    Ok((velocity, stddev_sample(&recent, velocity)))
}

fn projected(
    inputs: &CompletionInputs<'_>,
    velocity: f64,
    deviation: f64,
) -> CompletionForecast {
    let optimistic = velocity + deviation;
    let pessimistic = (velocity - deviation).max(velocity * PESSIMISTIC_VELOCITY_FLOOR);

    let p50 = date_after_remaining(inputs, velocity);
    let p10 = date_after_remaining(inputs, optimistic);
    let p90 = date_after_remaining(inputs, pessimistic);

    CompletionForecast {
        projected: p50,
        band: CompletionBand { p10, p50, p90 },
        confidence: Confidence::Normal,
        velocity_hours_per_period: velocity,
        simulation: None,
    }
}

fn date_after_remaining(inputs: &CompletionInputs<'_>, velocity: f64) -> NaiveDate {
    let periods = inputs.remaining_hours / velocity;
    let days = (periods * inputs.period_days.max(1) as f64).ceil().max(0.0) as u32;
    inputs.calendar.date_at(inputs.as_of, days)
}

/// Linear extrapolation straight off the current schedule.
fn naive_fallback(inputs: &CompletionInputs<'_>) -> CompletionForecast {
    let projected = inputs
        .schedule
        .completion_date
        .unwrap_or(inputs.as_of);
    let total_periods =
        inputs.schedule.total_duration_days as f64 / inputs.period_days.max(1) as f64;
    let velocity = if total_periods > 0.0 {
        inputs.remaining_hours / total_periods
    } else {
        0.0
    };

    CompletionForecast {
        projected,
        band: CompletionBand {
            p10: projected,
            p50: projected,
            p90: projected,
        },
        confidence: Confidence::Low,
        velocity_hours_per_period: velocity,
        simulation: None,
    }
}
