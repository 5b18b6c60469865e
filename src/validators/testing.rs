//! `testing` validator: presence and apparent coverage of automated tests.

use async_trait::async_trait;

use crate::core::context::ProjectContext;
use crate::core::criteria::CriterionId;
use crate::core::report::CriterionResult;
use crate::validators::{Validator, ValidatorFailure, ValidatorOptions};

const TEST_GLOBS: &[&str] = &["tests/**", "**/*_test.*", "**/test_*.*", "**/*.spec.*"];
const SOURCE_GLOBS: &[&str] = &["src/**/*", "lib/**/*"];
const COVERAGE_REPORTS: &[&str] = &["coverage.xml", "lcov.info", ".coverage"];

pub struct TestingValidator;

#[async_trait]
impl Validator for TestingValidator {
    async fn validate(
        &self,
        ctx: &ProjectContext,
        opts: &ValidatorOptions,
    ) -> Result<CriterionResult, ValidatorFailure> {
        let start = std::time::Instant::now();
        let test_files = super::count_matches(&ctx.root, TEST_GLOBS)
            .map_err(|e| ValidatorFailure::new(format!("failed to walk test files: {e}")))?;
        let source_files = super::count_matches(&ctx.root, SOURCE_GLOBS)
            .map_err(|e| ValidatorFailure::new(format!("failed to walk source files: {e}")))?;
        let has_coverage_report = COVERAGE_REPORTS
            .iter()
            .any(|name| ctx.join(name).exists());

        let ratio = if source_files == 0 {
            if test_files > 0 { 1.0 } else { 0.0 }
        } else {
            (test_files as f64 / source_files as f64).min(1.0)
        };

        let mut score = ratio * 80.0;
        if has_coverage_report {
            score += 20.0;
        }
        let score = score.min(100.0);
        let passed = test_files > 0 && score >= 50.0;

        let mut result = CriterionResult::ok(CriterionId::Testing, score, passed, start.elapsed());
        if opts.include_details {
            result = result.with_details(format!(
                "{test_files} test file(s) against {source_files} source file(s); coverage report present: {has_coverage_report}"
            ));
        }
        if opts.emit_fix_suggestions && !passed {
            let mut suggestions = Vec::new();
            if test_files == 0 {
                suggestions.push("add a tests/ directory with at least one automated test".to_string());
            }
            if !has_coverage_report {
                suggestions.push("generate a coverage report (lcov.info or coverage.xml) in CI".to_string());
            }
            result = result.with_fix_suggestions(suggestions);
        }
        Ok(result)
    }
}

pub fn handle() -> super::ValidatorHandle {
    std::sync::Arc::new(TestingValidator)
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
    async fn no_tests_scores_low() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        let ctx = ProjectContext::for_tests(dir.path()).unwrap();

        let result = TestingValidator.validate(&ctx, &opts()).await.unwrap();
        assert!(!result.passed);
        assert!(!result.fix_suggestions.is_empty());
    }

    #[tokio::test]
    async fn tests_and_coverage_score_well() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::create_dir_all(dir.path().join("tests")).unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        std::fs::write(dir.path().join("tests/smoke_test.rs"), "#[test] fn smoke() {}").unwrap();
        std::fs::write(dir.path().join("lcov.info"), "TN:").unwrap();
        let ctx = ProjectContext::for_tests(dir.path()).unwrap();

        let result = TestingValidator.validate(&ctx, &opts()).await.unwrap();
        assert!(result.passed);
        assert!(result.score > 50.0);
    }
}
