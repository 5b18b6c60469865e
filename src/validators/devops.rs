//! `devops` validator: CI workflows, containerization, prior provisioning.

use async_trait::async_trait;

use crate::core::context::ProjectContext;
use crate::core::criteria::CriterionId;
use crate::core::report::CriterionResult;
use crate::validators::{Validator, ValidatorFailure, ValidatorOptions};

const CI_GLOBS: &[&str] = &[".github/workflows/**", ".gitlab-ci.yml", "azure-pipelines.yml"];

pub struct DevopsValidator;

#[async_trait]
impl Validator for DevopsValidator {
    async fn validate(
        &self,
        ctx: &ProjectContext,
        opts: &ValidatorOptions,
    ) -> Result<CriterionResult, ValidatorFailure> {
        let start = std::time::Instant::now();
        let ci_files = super::count_matches(&ctx.root, CI_GLOBS)
            .map_err(|e| ValidatorFailure::new(format!("failed to walk CI config: {e}")))?;
        let has_dockerfile = ctx.join("Dockerfile").exists();
        let has_exoskeleton = ctx.join(".uvmgr").is_dir();

        let mut score = 0.0;
        if ci_files > 0 {
            score += 50.0;
        }
        if has_dockerfile {
            score += 25.0;
        }
        if has_exoskeleton {
            score += 25.0;
        }
        let passed = ci_files > 0;

        let mut result = CriterionResult::ok(CriterionId::Devops, score, passed, start.elapsed());
        if opts.include_details {
            result = result.with_details(format!(
                "CI workflow files: {ci_files}, Dockerfile: {has_dockerfile}, exoskeleton provisioned: {has_exoskeleton}"
            ));
        }
        if opts.emit_fix_suggestions && !passed {
            result = result.with_fix_suggestions(vec![
                "add a CI workflow under .github/workflows/ (or the equivalent for your provider)".to_string(),
            ]);
        }
        Ok(result)
    }
}

pub fn handle() -> super::ValidatorHandle {
    std::sync::Arc::new(DevopsValidator)
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
    async fn no_ci_fails() {
        let dir = TempDir::new().unwrap();
        let ctx = ProjectContext::for_tests(dir.path()).unwrap();
        let result = DevopsValidator.validate(&ctx, &opts()).await.unwrap();
        assert!(!result.passed);
    }

    #[tokio::test]
    async fn full_devops_stack_scores_100() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".github/workflows")).unwrap();
        std::fs::write(dir.path().join(".github/workflows/ci.yml"), "name: ci").unwrap();
        std::fs::write(dir.path().join("Dockerfile"), "FROM scratch").unwrap();
        std::fs::create_dir_all(dir.path().join(".uvmgr")).unwrap();
        let ctx = ProjectContext::for_tests(dir.path()).unwrap();
        let result = DevopsValidator.validate(&ctx, &opts()).await.unwrap();
        assert!(result.passed);
        assert_eq!(result.score, 100.0);
    }
}
