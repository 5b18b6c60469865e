//! `performance` validator: presence of a benchmark harness.

use async_trait::async_trait;

use crate::core::context::ProjectContext;
use crate::core::criteria::CriterionId;
use crate::core::report::CriterionResult;
use crate::validators::{Validator, ValidatorFailure, ValidatorOptions};

const BENCH_GLOBS: &[&str] = &["benches/**", "benchmarks/**"];

pub struct PerformanceValidator;

#[async_trait]
impl Validator for PerformanceValidator {
    async fn validate(
        &self,
        ctx: &ProjectContext,
        opts: &ValidatorOptions,
    ) -> Result<CriterionResult, ValidatorFailure> {
        let start = std::time::Instant::now();
        let bench_files = super::count_matches(&ctx.root, BENCH_GLOBS)
            .map_err(|e| ValidatorFailure::new(format!("failed to walk benchmark files: {e}")))?;
        let has_criterion_config = ctx
            .join("Cargo.toml")
            .exists()
            .then(|| std::fs::read_to_string(ctx.join("Cargo.toml")).unwrap_or_default())
            .map(|content| content.contains("criterion"))
            .unwrap_or(false);

        let score = if bench_files > 0 && has_criterion_config {
            100.0
        } else if bench_files > 0 {
            60.0
        } else {
            0.0
        };
        let passed = bench_files > 0;

        let mut result = CriterionResult::ok(CriterionId::Performance, score, passed, start.elapsed());
        if opts.include_details {
            result = result.with_details(format!(
                "benchmark files: {bench_files}, criterion harness declared: {has_criterion_config}"
            ));
        }
        if opts.emit_fix_suggestions && !passed {
            result = result.with_fix_suggestions(vec![
                "add a benches/ directory with a benchmark harness (e.g. criterion)".to_string(),
            ]);
        }
        Ok(result)
    }
}

pub fn handle() -> super::ValidatorHandle {
    std::sync::Arc::new(PerformanceValidator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn opts() -> ValidatorOptions {
        ValidatorOptions {
            auto_fix: false,
            include_details: true,
            emit_fix_suggestions: true,
            deadline: Instant::now() + Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn no_benches_fails() {
        let dir = TempDir::new().unwrap();
        let ctx = ProjectContext::for_tests(dir.path()).unwrap();
        let result = PerformanceValidator.validate(&ctx, &opts()).await.unwrap();
        assert!(!result.passed);
    }

    #[tokio::test]
    async fn benches_with_criterion_score_100() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("benches")).unwrap();
        std::fs::write(dir.path().join("benches/bench_main.rs"), "fn main() {}").unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "[dev-dependencies]\ncriterion = \"0.5\"").unwrap();
        let ctx = ProjectContext::for_tests(dir.path()).unwrap();
        let result = PerformanceValidator.validate(&ctx, &opts()).await.unwrap();
        assert!(result.passed);
        assert_eq!(result.score, 100.0);
    }
}
