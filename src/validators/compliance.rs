//! `compliance` validator: license and ownership/contribution policy files.

use async_trait::async_trait;

use crate::core::context::ProjectContext;
use crate::core::criteria::CriterionId;
use crate::core::report::CriterionResult;
use crate::validators::{Validator, ValidatorFailure, ValidatorOptions};

const LICENSE_GLOBS: &[&str] = &["LICENSE*", "LICENCE*"];
const OWNERS_GLOBS: &[&str] = &["CODEOWNERS", ".github/CODEOWNERS", "CONTRIBUTING*"];

pub struct ComplianceValidator;

#[async_trait]
impl Validator for ComplianceValidator {
    async fn validate(
        &self,
        ctx: &ProjectContext,
        opts: &ValidatorOptions,
    ) -> Result<CriterionResult, ValidatorFailure> {
        let start = std::time::Instant::now();
        let has_license = !super::list_matches(&ctx.root, LICENSE_GLOBS)
            .map_err(|e| ValidatorFailure::new(format!("failed to walk LICENSE candidates: {e}")))?
            .is_empty();
        let has_owners_or_contributing = !super::list_matches(&ctx.root, OWNERS_GLOBS)
            .map_err(|e| ValidatorFailure::new(format!("failed to walk CODEOWNERS/CONTRIBUTING candidates: {e}")))?
            .is_empty();

        let mut score = 0.0;
        if has_license {
            score += 70.0;
        }
        if has_owners_or_contributing {
            score += 30.0;
        }
        let passed = has_license;

        let mut result = CriterionResult::ok(CriterionId::Compliance, score, passed, start.elapsed());
        if opts.include_details {
            result = result.with_details(format!(
                "license present: {has_license}, CODEOWNERS/CONTRIBUTING present: {has_owners_or_contributing}"
            ));
        }
        if opts.emit_fix_suggestions && !passed {
            result = result.with_fix_suggestions(vec!["add a LICENSE file".to_string()]);
        }
        Ok(result)
    }
}

pub fn handle() -> super::ValidatorHandle {
    std::sync::Arc::new(ComplianceValidator)
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
    async fn missing_license_fails() {
        let dir = TempDir::new().unwrap();
        let ctx = ProjectContext::for_tests(dir.path()).unwrap();
        let result = ComplianceValidator.validate(&ctx, &opts()).await.unwrap();
        assert!(!result.passed);
    }

    #[tokio::test]
    async fn license_and_contributing_pass() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("LICENSE"), "MIT").unwrap();
        std::fs::write(dir.path().join("CONTRIBUTING.md"), "how to contribute").unwrap();
        let ctx = ProjectContext::for_tests(dir.path()).unwrap();
        let result = ComplianceValidator.validate(&ctx, &opts()).await.unwrap();
        assert!(result.passed);
        assert_eq!(result.score, 100.0);
    }
}
