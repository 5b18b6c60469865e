//! Result and report types produced by the Validator Runner and Evaluation
//! Engine.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::context::Environment;
use crate::core::criteria::{CriterionId, Priority};

/// Terminal disposition of a single validator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    ValidatorError,
    Timeout,
    Cancelled,
    Skipped,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::ValidatorError => "validator_error",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
        }
    }
}

/// Result of one validator run against one criterion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionResult {
    pub id: CriterionId,
    pub score: f64,
    pub passed: bool,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    pub details: Option<String>,
    pub fix_suggestions: Vec<String>,
    pub outcome: Outcome,
}

impl CriterionResult {
    /// Build an `ok` result. Enforces invariant R1 implicitly: callers only
    /// reach this constructor when the validator actually produced a score.
    pub fn ok(id: CriterionId, score: f64, passed: bool, duration: Duration) -> Self {
        Self {
            id,
            score: score.clamp(0.0, 100.0),
            passed,
            duration,
            details: None,
            fix_suggestions: Vec::new(),
            outcome: Outcome::Ok,
        }
    }

    /// Build a non-`ok` result. Invariant R1: `passed = false`, `score = 0`.
    pub fn non_ok(id: CriterionId, outcome: Outcome, duration: Duration, details: impl Into<String>) -> Self {
        debug_assert_ne!(outcome, Outcome::Ok, "use CriterionResult::ok for ok outcomes");
        Self {
            id,
            score: 0.0,
            passed: false,
            duration,
            details: Some(details.into()),
            fix_suggestions: Vec::new(),
            outcome,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_fix_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.fix_suggestions = suggestions;
        self
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (d.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}

/// The terminal aggregate produced by one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationReport {
    pub run_id: Uuid,
    pub overall_score: f64,
    pub tier_scores: HashMap<Priority, f64>,
    pub criterion_results: HashMap<CriterionId, CriterionResult>,
    #[serde(with = "duration_ms")]
    pub wall_duration: Duration,
    pub environment: Environment,
    pub auto_fix_applied: bool,
    pub parallel_used: bool,
    pub terminated_early: bool,
    pub success: bool,
    pub no_criteria: bool,
}

impl AutomationReport {
    /// Empty report for the "no criteria selected" boundary case
    /// (specification §8: `overall_score=0, success=false, no_criteria=true`).
    pub fn empty(run_id: Uuid, environment: Environment, auto_fix_applied: bool, parallel_used: bool) -> Self {
        Self {
            run_id,
            overall_score: 0.0,
            tier_scores: HashMap::new(),
            criterion_results: HashMap::new(),
            wall_duration: Duration::ZERO,
            environment,
            auto_fix_applied,
            parallel_used,
            terminated_early: false,
            success: false,
            no_criteria: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_ok_results_satisfy_invariant_r1() {
        let result = CriterionResult::non_ok(
            CriterionId::Security,
            Outcome::Timeout,
            Duration::from_secs(1),
            "deadline exceeded",
        );
        assert_eq!(result.score, 0.0);
        assert!(!result.passed);
    }

    #[test]
    fn ok_scores_are_clamped() {
        let result = CriterionResult::ok(CriterionId::Testing, 150.0, true, Duration::ZERO);
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn priority_round_trips_through_json() {
        let json = serde_json::to_string(&Priority::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
        let back: Priority = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Priority::Critical);
    }
}
