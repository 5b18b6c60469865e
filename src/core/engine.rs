//! Evaluation Engine: drives an [`ExecutionPlan`], enforces the global
//! deadline and cancellation signal, applies the auto-fix mutation
//! exclusion, and aggregates a weighted [`AutomationReport`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinHandle;

use crate::core::context::{Environment, ProjectContext};
use crate::core::criteria::{CriterionId, CriterionRegistry, Priority};
use crate::core::errors::Result;
use crate::core::planner::{self, ExecutionPlan, PlannedCriterion};
use crate::core::report::{AutomationReport, CriterionResult, Outcome};
use crate::core::runtime_config::RuntimeConfig;
use crate::core::telemetry::TelemetryPort;
use crate::core::vocabulary::{attr, span_phase};
use crate::validators::{runner, ValidatorOptions};

/// Everything the caller (the `api` facade) supplies for one run. Built
/// once at the CLI boundary; the engine never reads ambient state.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub root: std::path::PathBuf,
    pub environment: Environment,
    /// `None` means "every registered criterion".
    pub criteria: Option<Vec<String>>,
    pub auto_fix: bool,
    pub parallel: bool,
    pub include_details: bool,
    pub emit_fix_suggestions: bool,
}

/// Drive a full evaluation run and return the resulting report. `top_span`
/// is one of [`crate::core::vocabulary::span::AUTOMATE_COMPLETE`] or
/// [`crate::core::vocabulary::span::VALIDATE`] — the two CLI operations
/// share this entry point per the specification's resolved open question,
/// differing only in how the caller maps the report onto an exit code.
pub async fn run(
    request: RunRequest,
    registry: &CriterionRegistry,
    config: &RuntimeConfig,
    telemetry: &TelemetryPort,
    top_span: &'static str,
    cancel_tx: Option<broadcast::Sender<()>>,
) -> Result<AutomationReport> {
    let ctx = ProjectContext::new(&request.root, request.environment, registry)?;
    let run_start = Instant::now();
    let run_deadline = run_start + config.run_deadline;

    let requested: Vec<String> = request
        .criteria
        .clone()
        .unwrap_or_else(|| CriterionId::ALL.iter().map(|id| id.as_str().to_string()).collect());

    let span = telemetry.span(
        top_span,
        vec![
            (attr::RUN_ID, ctx.run_id.to_string().into()),
            (attr::ENVIRONMENT, request.environment.as_str().into()),
            (attr::AUTO_FIX, request.auto_fix.into()),
            (attr::PARALLEL, request.parallel.into()),
            (attr::CRITERIA_REQUESTED, (requested.len() as i64).into()),
        ],
    );

    let plan: ExecutionPlan = planner::plan(&requested, registry, request.parallel, run_deadline, telemetry);
    if plan.criterion_count() == 0 {
        span.add_event("no criteria to evaluate");
        return Ok(AutomationReport::empty(
            ctx.run_id,
            request.environment,
            request.auto_fix,
            request.parallel,
        ));
    }

    let opts = ValidatorOptionsTemplate {
        auto_fix: request.auto_fix,
        include_details: request.include_details,
        emit_fix_suggestions: request.emit_fix_suggestions,
    };

    let mut criterion_results: HashMap<CriterionId, CriterionResult> = HashMap::new();
    let mut terminated_early = false;
    let mut cancelled_run = false;

    for phase in &plan.phases {
        if Instant::now() >= run_deadline {
            tracing::warn!(tier = phase.priority.as_str(), "global deadline already exhausted; skipping phase");
            fill_remaining_as_cancelled(&mut criterion_results, &plan);
            break;
        }
        if terminated_early && phase.priority == Priority::Optional {
            tracing::info!("early-termination threshold met; skipping optional phase");
            continue;
        }

        let phase_span = telemetry.span(span_phase(phase.priority), vec![]);
        let results = run_phase(phase, registry, &ctx, &opts, telemetry, config, cancel_tx.as_ref()).await;
        phase_span.add_event("phase complete");

        for result in results {
            if result.outcome == Outcome::Cancelled {
                cancelled_run = true;
            }
            criterion_results.insert(result.id, result);
        }

        if config.early_termination_enabled && phase.priority != Priority::Optional {
            let (weighted, weight) = accumulated_ok_weight(&criterion_results, &plan);
            if weight >= config.early_success_min_weight
                && weighted / weight.max(f64::EPSILON) >= config.early_success_threshold
            {
                terminated_early = true;
            }
        }

        if cancelled_run {
            fill_remaining_as_cancelled(&mut criterion_results, &plan);
            break;
        }
    }

    let (overall_score, tier_scores) = aggregate(&criterion_results, &plan, config.score_disabled_as_zero);
    let success = critical_all_ok(&criterion_results, &plan);

    let report = AutomationReport {
        run_id: ctx.run_id,
        overall_score,
        tier_scores,
        criterion_results,
        wall_duration: run_start.elapsed(),
        environment: request.environment,
        auto_fix_applied: request.auto_fix,
        parallel_used: request.parallel,
        terminated_early,
        success,
        no_criteria: false,
    };

    span.set_attribute(attr::REPORT_OVERALL_SCORE, report.overall_score);
    span.set_attribute(attr::REPORT_SUCCESS, report.success);
    Ok(report)
}

/// Minimal options set an engine run varies; the per-criterion deadline is
/// supplied separately from the plan.
struct ValidatorOptionsTemplate {
    auto_fix: bool,
    include_details: bool,
    emit_fix_suggestions: bool,
}

/// Run one phase: criteria whose validator declares `mutates_project()` are
/// serialized relative to each other when `auto_fix` is set (the
/// auto-fix exclusion from the concurrency model); everything else runs
/// concurrently, bounded by `config.max_parallel_criteria`.
async fn run_phase(
    phase: &planner::Phase,
    registry: &CriterionRegistry,
    ctx: &ProjectContext,
    opts: &ValidatorOptionsTemplate,
    telemetry: &TelemetryPort,
    config: &RuntimeConfig,
    cancel_tx: Option<&broadcast::Sender<()>>,
) -> Vec<CriterionResult> {
    if !phase.parallel {
        return run_group(&phase.criteria, registry, ctx, opts, telemetry, 1, cancel_tx, config.cancellation_grace).await;
    }

    if !opts.auto_fix {
        return run_group(
            &phase.criteria,
            registry,
            ctx,
            opts,
            telemetry,
            config.max_parallel_criteria,
            cancel_tx,
            config.cancellation_grace,
        )
        .await;
    }

    let (mutating, non_mutating): (Vec<PlannedCriterion>, Vec<PlannedCriterion>) = phase
        .criteria
        .iter()
        .cloned()
        .partition(|c| registry.get(c.id).map(|s| s.validator.mutates_project()).unwrap_or(false));

    let mut results = run_group(
        &non_mutating,
        registry,
        ctx,
        opts,
        telemetry,
        config.max_parallel_criteria,
        cancel_tx,
        config.cancellation_grace,
    )
    .await;
    results.extend(run_group(&mutating, registry, ctx, opts, telemetry, 1, cancel_tx, config.cancellation_grace).await);
    results
}

/// Run `criteria` with at most `concurrency` validators in flight at once,
/// racing each against `cancel_tx` (if any) and giving in-flight tasks up
/// to `cancellation_grace` to finish cooperatively before the engine aborts
/// them — the engine never leaves an orphaned task behind.
async fn run_group(
    criteria: &[PlannedCriterion],
    registry: &CriterionRegistry,
    ctx: &ProjectContext,
    opts: &ValidatorOptionsTemplate,
    telemetry: &TelemetryPort,
    concurrency: usize,
    cancel_tx: Option<&broadcast::Sender<()>>,
    cancellation_grace: Duration,
) -> Vec<CriterionResult> {
    if criteria.is_empty() {
        return Vec::new();
    }

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles: Vec<(CriterionId, JoinHandle<CriterionResult>)> = Vec::with_capacity(criteria.len());

    for planned in criteria {
        let Some(spec) = registry.get(planned.id) else {
            continue;
        };
        let spec = spec.clone();
        let ctx = ctx.clone();
        let telemetry = telemetry.clone();
        let permit_sem = semaphore.clone();
        let validator_opts = ValidatorOptions {
            auto_fix: opts.auto_fix,
            include_details: opts.include_details,
            emit_fix_suggestions: opts.emit_fix_suggestions,
            deadline: planned.deadline,
        };

        let handle = tokio::spawn(async move {
            let _permit = permit_sem
                .acquire_owned()
                .await
                .expect("semaphore is never closed during a run");
            runner::run_validator(&spec, &ctx, validator_opts, &telemetry).await
        });
        handles.push((planned.id, handle));
    }

    let Some(tx) = cancel_tx else {
        return join_handles(handles).await;
    };
    let mut cancel_rx = tx.subscribe();

    tokio::select! {
        results = join_handles_mut(&mut handles) => results,
        _ = cancel_rx.recv() => {
            match tokio::time::timeout(cancellation_grace, join_handles_mut(&mut handles)).await {
                Ok(results) => results,
                Err(_elapsed) => {
                    let mut results = Vec::with_capacity(handles.len());
                    for (id, handle) in handles {
                        if handle.is_finished() {
                            if let Ok(result) = handle.await {
                                results.push(result);
                                continue;
                            }
                        } else {
                            handle.abort();
                        }
                        results.push(CriterionResult::non_ok(id, Outcome::Cancelled, Duration::ZERO, "cancelled before completion"));
                    }
                    results
                }
            }
        }
    }
}

/// Await every handle, consuming the vector. Used when there is no
/// cancellation signal to race against.
async fn join_handles(handles: Vec<(CriterionId, JoinHandle<CriterionResult>)>) -> Vec<CriterionResult> {
    let mut results = Vec::with_capacity(handles.len());
    for (id, handle) in handles {
        match handle.await {
            Ok(result) => results.push(result),
            Err(_) => results.push(CriterionResult::non_ok(id, Outcome::ValidatorError, Duration::ZERO, "task join failed")),
        }
    }
    results
}

/// Await every handle by mutable reference, leaving the vector intact if
/// this future is dropped (loses a `select!` race) before completing.
async fn join_handles_mut(handles: &mut [(CriterionId, JoinHandle<CriterionResult>)]) -> Vec<CriterionResult> {
    let mut results = Vec::with_capacity(handles.len());
    for (id, handle) in handles.iter_mut() {
        match handle.await {
            Ok(result) => results.push(result),
            Err(_) => results.push(CriterionResult::non_ok(*id, Outcome::ValidatorError, Duration::ZERO, "task join failed")),
        }
    }
    results
}

/// Sum of `(score/100 * weight)` and `(weight)` over criteria already
/// recorded as `ok`, restricted to tiers at or above the current phase
/// (i.e. everything evaluated so far).
fn accumulated_ok_weight(results: &HashMap<CriterionId, CriterionResult>, plan: &ExecutionPlan) -> (f64, f64) {
    let mut weighted = 0.0;
    let mut weight = 0.0;
    for planned in plan.flatten() {
        if let Some(result) = results.get(&planned.id) {
            if result.outcome == Outcome::Ok {
                weighted += result.score / 100.0 * planned.weight;
            }
            weight += planned.weight;
        }
    }
    (weighted, weight)
}

/// Record every criterion in `plan` that has no result yet as `cancelled`.
/// Called before a run exits its phase loop early (global deadline exhausted
/// or a broadcast cancellation observed) so criteria that never got to run
/// still appear in the report instead of being silently absent.
fn fill_remaining_as_cancelled(criterion_results: &mut HashMap<CriterionId, CriterionResult>, plan: &ExecutionPlan) {
    for planned in plan.flatten() {
        criterion_results.entry(planned.id).or_insert_with(|| {
            CriterionResult::non_ok(planned.id, Outcome::Cancelled, Duration::ZERO, "run ended before this criterion executed")
        });
    }
}

/// Weighted overall score and per-tier scores (specification §4.5).
/// `score_disabled_as_zero` only affects criteria that were requested but
/// never produced a result (e.g. skipped by early termination); by default
/// those are omitted from the denominator rather than scored as zero.
fn aggregate(
    results: &HashMap<CriterionId, CriterionResult>,
    plan: &ExecutionPlan,
    score_disabled_as_zero: bool,
) -> (f64, HashMap<Priority, f64>) {
    let mut tier_weighted: HashMap<Priority, f64> = HashMap::new();
    let mut tier_weight: HashMap<Priority, f64> = HashMap::new();
    let mut overall_weighted = 0.0;
    let mut overall_weight = 0.0;

    for planned in plan.flatten() {
        let (score, weight) = match results.get(&planned.id) {
            Some(result) => (result.score, planned.weight),
            None if score_disabled_as_zero => (0.0, planned.weight),
            None => continue,
        };
        overall_weighted += score / 100.0 * weight;
        overall_weight += weight;
        *tier_weighted.entry(planned.priority).or_insert(0.0) += score / 100.0 * weight;
        *tier_weight.entry(planned.priority).or_insert(0.0) += weight;
    }

    let overall_score = if overall_weight > 0.0 {
        100.0 * overall_weighted / overall_weight
    } else {
        0.0
    };

    let mut tier_scores = HashMap::new();
    for tier in [Priority::Critical, Priority::Important, Priority::Optional] {
        let w = tier_weight.get(&tier).copied().unwrap_or(0.0);
        let score = if w > 0.0 {
            100.0 * tier_weighted.get(&tier).copied().unwrap_or(0.0) / w
        } else {
            0.0
        };
        tier_scores.insert(tier, score);
    }

    (overall_score, tier_scores)
}

/// `report.success`: every critical criterion in the plan resolved to
/// `ok` and `passed = true`.
fn critical_all_ok(results: &HashMap<CriterionId, CriterionResult>, plan: &ExecutionPlan) -> bool {
    plan.flatten()
        .into_iter()
        .filter(|c| c.priority == Priority::Critical)
        .all(|c| {
            results
                .get(&c.id)
                .is_some_and(|r| r.outcome == Outcome::Ok && r.passed)
        })
}
