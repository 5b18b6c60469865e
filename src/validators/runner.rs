//! Validator Runner: invokes one validator against a context, enforcing the
//! deadline and converting panics/errors into typed outcomes.

use std::time::{Duration, Instant};

use crate::core::criteria::CriterionSpec;
use crate::core::context::ProjectContext;
use crate::core::report::{CriterionResult, Outcome};
use crate::core::telemetry::TelemetryPort;
use crate::core::vocabulary::{attr, metric, span_validate};
use crate::validators::{ValidatorOptions, Validator};

/// Runs `spec.validator` against `ctx`, honoring `deadline` and converting
/// any failure mode into a `CriterionResult` rather than propagating it.
/// Never aborts the outer evaluation.
pub async fn run_validator(
    spec: &CriterionSpec,
    ctx: &ProjectContext,
    opts: ValidatorOptions,
    telemetry: &TelemetryPort,
) -> CriterionResult {
    let span = telemetry.span(
        span_validate(spec.id),
        vec![
            (attr::CRITERION_ID, spec.id.as_str().into()),
            (attr::CRITERION_WEIGHT, spec.weight.into()),
            (attr::CRITERION_PRIORITY, spec.priority.as_str().into()),
        ],
    );

    let start = Instant::now();
    let remaining = opts.deadline.saturating_duration_since(Instant::now());
    let validator = spec.validator.clone();
    let ctx_owned = ctx.clone();

    let outcome_result = tokio::time::timeout(remaining, run_guarded(validator, ctx_owned, opts)).await;

    let result = match outcome_result {
        Ok(Ok(Ok(mut result))) => {
            result.duration = start.elapsed();
            result
        }
        Ok(Ok(Err(failure))) => {
            span.record_exception(&failure);
            CriterionResult::non_ok(spec.id, Outcome::ValidatorError, start.elapsed(), failure.0)
        }
        Ok(Err(join_error)) => {
            let message = format!("validator panicked: {join_error}");
            span.add_event(&message);
            CriterionResult::non_ok(spec.id, Outcome::ValidatorError, start.elapsed(), message)
        }
        Err(_elapsed) => CriterionResult::non_ok(
            spec.id,
            Outcome::Timeout,
            start.elapsed(),
            format!("exceeded deadline of {:?}", remaining),
        ),
    };

    span.set_attribute(attr::CRITERION_OUTCOME, result.outcome.as_str());
    span.set_attribute(attr::CRITERION_PASSED, result.passed);
    span.set_attribute(attr::CRITERION_SCORE, result.score);

    telemetry
        .histogram(metric::CRITERION_DURATION)
        .record(result.duration.as_secs_f64(), vec![(attr::CRITERION_ID, spec.id.as_str().into())]);
    telemetry.counter(metric::CRITERION_RESULTS).add(
        1,
        vec![
            (attr::CRITERION_ID, spec.id.as_str().into()),
            (attr::OUTCOME, result.outcome.as_str().into()),
            (attr::PASSED, result.passed.into()),
        ],
    );

    result
}

/// Spawn the validator call on its own task so a panic inside it surfaces as
/// a `JoinError` instead of unwinding through the runner.
async fn run_guarded(
    validator: std::sync::Arc<dyn Validator>,
    ctx: ProjectContext,
    opts: ValidatorOptions,
) -> Result<Result<CriterionResult, crate::validators::ValidatorFailure>, tokio::task::JoinError> {
    tokio::spawn(async move { validator.validate(&ctx, &opts).await }).await
}

/// Build a deadline `Instant` that is the earlier of the validator's default
/// timeout and the remaining global run deadline, per the planner's
/// per-criterion deadline rule.
pub fn effective_deadline(default_timeout: Duration, run_deadline: Instant) -> Instant {
    let by_default = Instant::now() + default_timeout;
    by_default.min(run_deadline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::criteria::CriterionRegistry;
    use crate::core::context::Environment;
    use tempfile::TempDir;

    #[tokio::test]
    async fn ok_validator_produces_ok_outcome() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("LICENSE"), b"MIT").unwrap();
        let registry = CriterionRegistry::reference();
        let ctx = ProjectContext::new(dir.path(), Environment::Development, &registry).unwrap();
        let spec = registry.get(crate::core::criteria::CriterionId::Compliance).unwrap();

        let telemetry = TelemetryPort::enabled();
        let opts = ValidatorOptions {
            auto_fix: false,
            include_details: true,
            emit_fix_suggestions: true,
            deadline: Instant::now() + Duration::from_secs(5),
        };

        let result = run_validator(spec, &ctx, opts, &telemetry).await;
        assert_eq!(result.outcome, Outcome::Ok);
    }

    #[tokio::test]
    async fn zero_deadline_times_out() {
        let dir = TempDir::new().unwrap();
        let registry = CriterionRegistry::reference();
        let ctx = ProjectContext::new(dir.path(), Environment::Development, &registry).unwrap();
        let spec = registry.get(crate::core::criteria::CriterionId::Compliance).unwrap();

        let telemetry = TelemetryPort::noop();
        let opts = ValidatorOptions {
            auto_fix: false,
            include_details: false,
            emit_fix_suggestions: false,
            deadline: Instant::now(),
        };

        let result = run_validator(spec, &ctx, opts, &telemetry).await;
        assert_eq!(result.outcome, Outcome::Timeout);
        assert_eq!(result.score, 0.0);
        assert!(!result.passed);
    }
}
