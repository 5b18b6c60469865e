//! `documentation` validator: README quality, doc-comment density, changelog.

use async_trait::async_trait;

use crate::core::context::ProjectContext;
use crate::core::criteria::CriterionId;
use crate::core::report::CriterionResult;
use crate::validators::{Validator, ValidatorFailure, ValidatorOptions};

const README_GLOBS: &[&str] = &["README*", "readme*"];
const CHANGELOG_GLOBS: &[&str] = &["CHANGELOG*", "changelog*"];
const SOURCE_GLOBS: &[&str] = &["src/**/*"];
const MIN_README_BYTES: u64 = 200;
const SAMPLE_SIZE: usize = 20;

pub struct DocumentationValidator;

#[async_trait]
impl Validator for DocumentationValidator {
    async fn validate(
        &self,
        ctx: &ProjectContext,
        opts: &ValidatorOptions,
    ) -> Result<CriterionResult, ValidatorFailure> {
        let start = std::time::Instant::now();
        let readmes = super::list_matches(&ctx.root, README_GLOBS)
            .map_err(|e| ValidatorFailure::new(format!("failed to walk README candidates: {e}")))?;
        let has_changelog = !super::list_matches(&ctx.root, CHANGELOG_GLOBS)
            .map_err(|e| ValidatorFailure::new(format!("failed to walk CHANGELOG candidates: {e}")))?
            .is_empty();

        let readme_len = readmes
            .first()
            .and_then(|p| std::fs::metadata(ctx.join(p)).ok())
            .map(|m| m.len())
            .unwrap_or(0);
        let has_substantial_readme = readme_len >= MIN_README_BYTES;

        let source_files = super::list_matches(&ctx.root, SOURCE_GLOBS)
            .map_err(|e| ValidatorFailure::new(format!("failed to walk source files: {e}")))?;
        let doc_density = doc_comment_density(&ctx.root, &source_files);

        let mut score = 0.0;
        if has_substantial_readme {
            score += 50.0;
        } else if !readmes.is_empty() {
            score += 15.0;
        }
        if has_changelog {
            score += 15.0;
        }
        score += doc_density * 35.0;
        let score = score.min(100.0);
        let passed = has_substantial_readme && score >= 60.0;

        let mut result = CriterionResult::ok(CriterionId::Documentation, score, passed, start.elapsed());
        if opts.include_details {
            result = result.with_details(format!(
                "README bytes: {readme_len}, changelog: {has_changelog}, doc-comment density: {doc_density:.2}"
            ));
        }
        if opts.emit_fix_suggestions && !passed {
            let mut suggestions = Vec::new();
            if !has_substantial_readme {
                suggestions.push("expand README.md with setup, usage, and project description".to_string());
            }
            if !has_changelog {
                suggestions.push("add a CHANGELOG to track notable changes".to_string());
            }
            if doc_density < 0.2 {
                suggestions.push("add doc comments to public items".to_string());
            }
            result = result.with_fix_suggestions(suggestions);
        }
        Ok(result)
    }
}

/// Fraction of a sample of source files that contain at least one doc
/// comment line (`///` or `//!`). A cheap proxy for documentation coverage
/// that works across languages using `//`-style doc conventions.
fn doc_density(sample: &[String]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    let documented = sample.iter().filter(|s| s.contains("///") || s.contains("//!")).count();
    documented as f64 / sample.len() as f64
}

fn doc_comment_density(root: &std::path::Path, files: &[std::path::PathBuf]) -> f64 {
    let sampled: Vec<String> = files
        .iter()
        .take(SAMPLE_SIZE)
        .filter_map(|p| std::fs::read_to_string(root.join(p)).ok())
        .collect();
    doc_density(&sampled)
}

pub fn handle() -> super::ValidatorHandle {
    std::sync::Arc::new(DocumentationValidator)
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
    async fn missing_readme_fails() {
        let dir = TempDir::new().unwrap();
        let ctx = ProjectContext::for_tests(dir.path()).unwrap();
        let result = DocumentationValidator.validate(&ctx, &opts()).await.unwrap();
        assert!(!result.passed);
    }

    #[tokio::test]
    async fn substantial_readme_and_changelog_pass() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("README.md"), "x".repeat(400)).unwrap();
        std::fs::write(dir.path().join("CHANGELOG.md"), "## 1.0.0").unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/lib.rs"), "//! crate docs\n/// item docs\npub fn f() {}").unwrap();
        let ctx = ProjectContext::for_tests(dir.path()).unwrap();
        let result = DocumentationValidator.validate(&ctx, &opts()).await.unwrap();
        assert!(result.passed);
    }
}
