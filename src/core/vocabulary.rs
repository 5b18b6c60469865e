//! Frozen semantic vocabulary for spans, metrics, and attributes.
//!
//! Downstream telemetry consumers depend on these names byte-for-byte, so
//! they are compiled constants rather than runtime-formatted strings. Only
//! `span_validate` and `span_phase` take a parameter, and even those are
//! built from the closed `CriterionId`/tier enumerations, never free text.

use crate::core::criteria::{CriterionId, Priority};

/// Span names.
pub mod span {
    pub const AUTOMATE_COMPLETE: &str = "dod.automate.complete";
    pub const VALIDATE: &str = "dod.validate";
    pub const EXOSKELETON_INIT: &str = "dod.exoskeleton.init";
    pub const PIPELINE_GENERATE: &str = "dod.pipeline.generate";
}

/// Build the `dod.phase.<tier>` span name for a priority tier.
pub fn span_phase(tier: Priority) -> String {
    format!("dod.phase.{}", tier.as_str())
}

/// Build the `dod.validate.<criterion_id>` span name for a criterion.
pub fn span_validate(id: CriterionId) -> String {
    format!("dod.validate.{}", id.as_str())
}

/// Metric names.
pub mod metric {
    pub const AUTOMATIONS_TOTAL: &str = "dod.automations.total";
    pub const RUN_DURATION: &str = "dod.run.duration";
    pub const CRITERION_RESULTS: &str = "dod.criterion.results";
    pub const CRITERION_DURATION: &str = "dod.criterion.duration";
    pub const SCORE_OVERALL: &str = "dod.score.overall";
    pub const INPUT_ERRORS: &str = "dod.input_errors";
    pub const PLANNER_UNKNOWN_CRITERION: &str = "dod.planner.unknown_criterion";
}

/// Span/metric attribute keys.
pub mod attr {
    pub const RUN_ID: &str = "dod.run_id";
    pub const ENVIRONMENT: &str = "dod.environment";
    pub const AUTO_FIX: &str = "dod.auto_fix";
    pub const PARALLEL: &str = "dod.parallel";
    pub const CRITERIA_REQUESTED: &str = "dod.criteria.requested";

    pub const CRITERION_ID: &str = "criterion.id";
    pub const CRITERION_WEIGHT: &str = "criterion.weight";
    pub const CRITERION_PRIORITY: &str = "criterion.priority";
    pub const CRITERION_OUTCOME: &str = "criterion.outcome";
    pub const CRITERION_PASSED: &str = "criterion.passed";
    pub const CRITERION_SCORE: &str = "criterion.score";

    pub const OUTCOME: &str = "outcome";
    pub const PASSED: &str = "passed";

    pub const REPORT_OVERALL_SCORE: &str = "dod.report.overall_score";
    pub const REPORT_SUCCESS: &str = "dod.report.success";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_names_are_stable() {
        assert_eq!(span_phase(Priority::Critical), "dod.phase.critical");
        assert_eq!(span_validate(CriterionId::Testing), "dod.validate.testing");
    }
}
