//! Execution Planner: turns a requested criterion subset into an ordered,
//! phased [`ExecutionPlan`] satisfying invariant P1 (canonical tie-break
//! order, no duplicate criteria, serial-vs-parallel phase shape).

use std::time::Instant;

use crate::core::criteria::{CriterionId, CriterionRegistry, CriterionSpec, Priority};
use crate::core::telemetry::TelemetryPort;
use crate::core::vocabulary::metric;

/// One criterion entry within a plan, carrying the absolute deadline the
/// Validator Runner must honor.
#[derive(Debug, Clone)]
pub struct PlannedCriterion {
    pub id: CriterionId,
    pub weight: f64,
    pub priority: Priority,
    pub deadline: Instant,
}

/// A group of criteria that execute together: serially in declared order,
/// or concurrently with results collected as they arrive.
#[derive(Debug, Clone)]
pub struct Phase {
    pub priority: Priority,
    pub parallel: bool,
    pub criteria: Vec<PlannedCriterion>,
}

/// The ordered sequence of phases the Evaluation Engine drives. Phases
/// themselves always execute sequentially; only criteria within a phase may
/// run concurrently.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub phases: Vec<Phase>,
}

impl ExecutionPlan {
    /// Total number of criteria across every phase.
    pub fn criterion_count(&self) -> usize {
        self.phases.iter().map(|p| p.criteria.len()).sum()
    }

    /// Flatten the plan into canonical order, ignoring phase boundaries.
    /// Useful for reporting and for the serial (`parallel = false`) case,
    /// which the planner always represents as a single phase anyway.
    pub fn flatten(&self) -> Vec<&PlannedCriterion> {
        self.phases.iter().flat_map(|p| &p.criteria).collect()
    }
}

/// Build a plan for `requested` criterion ids (by wire string) against
/// `registry`. Unknown ids are dropped silently from the plan but counted
/// via `telemetry`'s `dod.planner.unknown_criterion` counter (rule 1).
///
/// `run_deadline` is the absolute instant the whole run must finish by;
/// each criterion's deadline is `min(default_timeout-from-now, run_deadline)`.
pub fn plan(
    requested: &[String],
    registry: &CriterionRegistry,
    parallel: bool,
    run_deadline: Instant,
    telemetry: &TelemetryPort,
) -> ExecutionPlan {
    let mut specs: Vec<&CriterionSpec> = Vec::new();
    for id_str in requested {
        match CriterionId::parse(id_str) {
            Ok(id) => {
                if let Some(spec) = registry.get(id) {
                    specs.push(spec);
                }
            }
            Err(_) => {
                telemetry.counter(metric::PLANNER_UNKNOWN_CRITERION).add(1, vec![]);
            }
        }
    }

    // Rule 2: (priority rank, -weight, id lexicographic).
    specs.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| a.id.as_str().cmp(b.id.as_str()))
    });

    let planned = |spec: &CriterionSpec| PlannedCriterion {
        id: spec.id,
        weight: spec.weight,
        priority: spec.priority,
        deadline: crate::validators::runner::effective_deadline(spec.default_timeout, run_deadline),
    };

    if !parallel {
        // Rule 3: single serial phase in canonical order.
        let criteria = specs.iter().map(|s| planned(s)).collect();
        return ExecutionPlan {
            phases: vec![Phase {
                priority: Priority::Critical,
                parallel: false,
                criteria,
            }],
        };
    }

    // Rule 4: up to three phases, one per tier, empty tiers omitted.
    let mut phases = Vec::new();
    for tier in [Priority::Critical, Priority::Important, Priority::Optional] {
        let criteria: Vec<PlannedCriterion> = specs
            .iter()
            .filter(|s| s.priority == tier)
            .map(|s| planned(s))
            .collect();
        if !criteria.is_empty() {
            phases.push(Phase {
                priority: tier,
                parallel: true,
                criteria,
            });
        }
    }
    ExecutionPlan { phases }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_ids() -> Vec<String> {
        CriterionId::ALL.iter().map(|id| id.as_str().to_string()).collect()
    }

    #[test]
    fn serial_plan_is_a_single_phase_in_canonical_order() {
        let registry = CriterionRegistry::reference();
        let telemetry = TelemetryPort::noop();
        let deadline = Instant::now() + std::time::Duration::from_secs(60);
        let result = plan(&all_ids(), &registry, false, deadline, &telemetry);

        assert_eq!(result.phases.len(), 1);
        let order: Vec<&str> = result.flatten().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            order,
            vec!["devops", "security", "testing", "code_quality", "documentation", "compliance", "performance"]
        );
    }

    #[test]
    fn parallel_plan_has_one_phase_per_nonempty_tier() {
        let registry = CriterionRegistry::reference();
        let telemetry = TelemetryPort::noop();
        let deadline = Instant::now() + std::time::Duration::from_secs(60);
        let result = plan(&all_ids(), &registry, true, deadline, &telemetry);

        assert_eq!(result.phases.len(), 3);
        assert_eq!(result.phases[0].priority, Priority::Critical);
        assert_eq!(result.phases[1].priority, Priority::Important);
        assert_eq!(result.phases[2].priority, Priority::Optional);
    }

    #[test]
    fn unknown_ids_are_dropped_and_counted() {
        let registry = CriterionRegistry::reference();
        let telemetry = TelemetryPort::enabled();
        let deadline = Instant::now() + std::time::Duration::from_secs(60);
        let requested = vec!["testing".to_string(), "bogus".to_string()];

        let result = plan(&requested, &registry, true, deadline, &telemetry);
        assert_eq!(result.criterion_count(), 1);
        assert_eq!(telemetry.snapshot_count(metric::PLANNER_UNKNOWN_CRITERION), 1);
    }

    #[test]
    fn subset_omits_empty_tiers() {
        let registry = CriterionRegistry::reference();
        let telemetry = TelemetryPort::noop();
        let deadline = Instant::now() + std::time::Duration::from_secs(60);
        let requested = vec!["performance".to_string()];

        let result = plan(&requested, &registry, true, deadline, &telemetry);
        assert_eq!(result.phases.len(), 1);
        assert_eq!(result.phases[0].priority, Priority::Optional);
    }
}
