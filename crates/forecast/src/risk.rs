//! Weighted-factor risk scoring.

use serde::{Deserialize, Serialize};

use crate::history::VelocitySample;
use crate::{RiskBucket, RiskFactor, RiskForecast};

const BUCKET_MEDIUM_THRESHOLD: f64 = 0.33;
const BUCKET_HIGH_THRESHOLD: f64 = 0.66;

/// Relative factor weights; normalized before scoring so they need not sum
/// to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub slack_trend: f64,
    pub turnover: f64,
    pub incidents: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            slack_trend: 0.5,
            turnover: 0.3,
            incidents: 0.2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RiskInputs<'a> {
    pub history: &'a [VelocitySample],
    /// Incident frequency observed on structurally similar projects,
    /// normalized to [0, 1] by the caller.
    pub incident_rate: f64,
}

/// Score project risk from slack trend, team turnover, and incident
/// history, bucketed with the contributing factors reported alongside.
pub fn risk_forecast(inputs: &RiskInputs<'_>, weights: &RiskWeights) -> RiskForecast {
    let slack_value = slack_shrink_trend(inputs.history);
    let turnover_value = turnover_rate(inputs.history);
    let incident_value = inputs.incident_rate.clamp(0.0, 1.0);

    let raw = [
        ("slack-trend", weights.slack_trend.max(0.0), slack_value),
        ("turnover", weights.turnover.max(0.0), turnover_value),
        ("incidents", weights.incidents.max(0.0), incident_value),
    ];
    let weight_sum: f64 = raw.iter().map(|(_, w, _)| w).sum();

    let mut score = 0.0;
    let mut factors = Vec::with_capacity(raw.len());
    for (name, weight, value) in raw {
        let contribution = if weight_sum > 0.0 {
            weight * value / weight_sum
        } else {
            0.0
        };
        score += contribution;
        factors.push(RiskFactor {
            name: name.to_string(),
            weight,
            value,
            contribution,
        });
    }
    let score = score.clamp(0.0, 1.0);

    RiskForecast {
        bucket: bucket_for(score),
        score,
        factors,
    }
}

fn bucket_for(score: f64) -> RiskBucket {
    if score < BUCKET_MEDIUM_THRESHOLD {
        RiskBucket::Low
    } else if score < BUCKET_HIGH_THRESHOLD {
        RiskBucket::Medium
    } else {
        RiskBucket::High
    }
}

/// How fast aggregate slack is disappearing, in [0, 1]. A short history
/// reads as a neutral 0.5: nothing known either way.
fn slack_shrink_trend(history: &[VelocitySample]) -> f64 {
    if history.len() < 2 {
        return 0.5;
    }
    let first = history[0].total_slack_days;
    let last = history[history.len() - 1].total_slack_days;
    if first <= 0.0 {
        return if last < first { 1.0 } else { 0.0 };
    }
    ((first - last) / first).clamp(0.0, 1.0)
}

/// Mean absolute roster change per period relative to the mean roster size.
fn turnover_rate(history: &[VelocitySample]) -> f64 {
    if history.len() < 2 {
        return 0.0;
    }
    let counts: Vec<f64> = history.iter().map(|s| s.member_count as f64).collect();
    let mean_count = counts.iter().sum::<f64>() / counts.len() as f64;
    if mean_count <= 0.0 {
        return 0.0;
    }
    let churn: f64 = counts
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .sum::<f64>()
        / (counts.len() - 1) as f64;
    (churn / mean_count).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(slack: f64, members: u32) -> VelocitySample {
        VelocitySample::new("p", 40.0)
            .with_total_slack_days(slack)
            .with_member_count(members)
    }

    #[test]
    fn stable_project_scores_low() {
        let history = vec![sample(10.0, 5), sample(10.0, 5), sample(10.0, 5)];
        let forecast = risk_forecast(
            &RiskInputs {
                history: &history,
                incident_rate: 0.0,
            },
            &RiskWeights::default(),
        );

        assert_eq!(forecast.bucket, RiskBucket::Low);
        assert_eq!(forecast.score, 0.0);
    }

    #[test]
    fn vanishing_slack_and_churn_score_high() {
        let history = vec![sample(10.0, 6), sample(4.0, 3), sample(0.0, 6)];
        let forecast = risk_forecast(
            &RiskInputs {
                history: &history,
                incident_rate: 0.8,
            },
            &RiskWeights::default(),
        );

        assert_eq!(forecast.bucket, RiskBucket::High);
        assert!(forecast.score >= BUCKET_HIGH_THRESHOLD);
    }

    #[test]
    fn factors_explain_the_score() {
        let history = vec![sample(10.0, 5), sample(5.0, 5)];
        let forecast = risk_forecast(
            &RiskInputs {
                history: &history,
                incident_rate: 0.5,
            },
            &RiskWeights::default(),
        );

        assert_eq!(forecast.factors.len(), 3);
        let total: f64 = forecast.factors.iter().map(|f| f.contribution).sum();
        assert!((total - forecast.score).abs() < 1e-9);
        assert!(forecast.factors.iter().any(|f| f.name == "slack-trend"));
    }

    #[test]
    fn short_history_reads_slack_as_neutral() {
        let forecast = risk_forecast(
            &RiskInputs {
                history: &[],
                incident_rate: 0.0,
            },
            &RiskWeights::default(),
        );

        let slack = forecast
            .factors
            .iter()
            .find(|f| f.name == "slack-trend")
            .unwrap();
        assert_eq!(slack.value, 0.5);
    }
}
