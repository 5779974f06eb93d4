//! Strategy selection as a tagged variant (one pure function per variant).

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use planforge_core::EngineError;

/// How tasks are mapped to roster members.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStrategy {
    /// Minimize the spread (max − min) of member loads.
    Balanced,
    /// Maximize skill-tag overlap, penalized by current load.
    SkillBased,
    /// Fewest committed hours among qualified members.
    WorkloadBased,
}

impl FromStr for AssignmentStrategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "balanced" => Ok(Self::Balanced),
            "skill-based" | "skillbased" => Ok(Self::SkillBased),
            "workload-based" | "workloadbased" => Ok(Self::WorkloadBased),
            other => Err(EngineError::validation(format!("unknown strategy: {other}"))),
        }
    }
}

impl core::fmt::Display for AssignmentStrategy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Balanced => "balanced",
            Self::SkillBased => "skill-based",
            Self::WorkloadBased => "workload-based",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for strategy in [
            AssignmentStrategy::Balanced,
            AssignmentStrategy::SkillBased,
            AssignmentStrategy::WorkloadBased,
        ] {
            assert_eq!(
                strategy.to_string().parse::<AssignmentStrategy>().unwrap(),
                strategy
            );
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!("round-robin".parse::<AssignmentStrategy>().is_err());
    }
}
