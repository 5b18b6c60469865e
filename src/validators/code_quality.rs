//! `code_quality` validator: text-based proxies for function length and
//! nesting depth, in the spirit of the teacher's AST complexity detector but
//! without a parser dependency for every supported language.

use async_trait::async_trait;

use crate::core::context::ProjectContext;
use crate::core::criteria::CriterionId;
use crate::core::report::CriterionResult;
use crate::validators::{Validator, ValidatorFailure, ValidatorOptions};

const SOURCE_GLOBS: &[&str] = &["src/**/*", "lib/**/*"];

/// Thresholds mirroring the teacher's `ComplexityThresholds` shape, scaled
/// down to a line-count/brace-depth proxy instead of an AST metric.
struct Thresholds {
    low: f64,
    high: f64,
}

const FILE_LENGTH: Thresholds = Thresholds { low: 200.0, high: 600.0 };
const NESTING_DEPTH: Thresholds = Thresholds { low: 3.0, high: 6.0 };

pub struct CodeQualityValidator;

#[async_trait]
impl Validator for CodeQualityValidator {
    async fn validate(
        &self,
        ctx: &ProjectContext,
        opts: &ValidatorOptions,
    ) -> Result<CriterionResult, ValidatorFailure> {
        let start = std::time::Instant::now();
        let files = super::list_matches(&ctx.root, SOURCE_GLOBS)
            .map_err(|e| ValidatorFailure::new(format!("failed to walk source files: {e}")))?;

        if files.is_empty() {
            let result = CriterionResult::ok(CriterionId::CodeQuality, 0.0, false, start.elapsed())
                .with_details("no source files matched src/** or lib/**".to_string());
            return Ok(result);
        }

        let mut total_lines = 0u64;
        let mut max_lines = 0u64;
        let mut max_depth = 0u32;
        let mut sample_count = 0u64;

        for relative in &files {
            let Ok(content) = std::fs::read_to_string(ctx.join(relative)) else {
                continue;
            };
            let lines = content.lines().count() as u64;
            total_lines += lines;
            max_lines = max_lines.max(lines);
            max_depth = max_depth.max(brace_depth(&content));
            sample_count += 1;
        }

        if sample_count == 0 {
            let result = CriterionResult::ok(CriterionId::CodeQuality, 0.0, false, start.elapsed())
                .with_details("source files were unreadable".to_string());
            return Ok(result);
        }

        let avg_lines = total_lines as f64 / sample_count as f64;
        let length_score = score_against(avg_lines, FILE_LENGTH.low, FILE_LENGTH.high);
        let depth_score = score_against(max_depth as f64, NESTING_DEPTH.low, NESTING_DEPTH.high);
        let score = (length_score * 0.5 + depth_score * 0.5).clamp(0.0, 100.0);
        let passed = score >= 60.0;

        let mut result = CriterionResult::ok(CriterionId::CodeQuality, score, passed, start.elapsed());
        if opts.include_details {
            result = result.with_details(format!(
                "avg file length {avg_lines:.0} lines (max {max_lines}), max nesting depth proxy {max_depth}"
            ));
        }
        if opts.emit_fix_suggestions && !passed {
            let mut suggestions = Vec::new();
            if avg_lines > FILE_LENGTH.low {
                suggestions.push("split oversized source files into smaller modules".to_string());
            }
            if max_depth as f64 > NESTING_DEPTH.low {
                suggestions.push("reduce nesting depth by extracting early returns or helper functions".to_string());
            }
            result = result.with_fix_suggestions(suggestions);
        }
        Ok(result)
    }
}

/// Linear score: 100 at or below `low`, 0 at or above `high`.
fn score_against(value: f64, low: f64, high: f64) -> f64 {
    if value <= low {
        100.0
    } else if value >= high {
        0.0
    } else {
        100.0 * (high - value) / (high - low)
    }
}

/// Crude brace-nesting proxy: the maximum `{` depth reached in the file,
/// ignoring string/comment context. Good enough as a heuristic signal, not a
/// parser replacement.
fn brace_depth(content: &str) -> u32 {
    let mut depth: i32 = 0;
    let mut max_depth: i32 = 0;
    for ch in content.chars() {
        match ch {
            '{' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            '}' => depth = (depth - 1).max(0),
            _ => {}
        }
    }
    max_depth.max(0) as u32
}

pub fn handle() -> super::ValidatorHandle {
    std::sync::Arc::new(CodeQualityValidator)
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
    async fn small_tidy_file_scores_well() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "fn main() {\n    println!(\"hi\");\n}\n").unwrap();
        let ctx = ProjectContext::for_tests(dir.path()).unwrap();
        let result = CodeQualityValidator.validate(&ctx, &opts()).await.unwrap();
        assert!(result.passed);
    }

    #[tokio::test]
    async fn no_source_files_fails() {
        let dir = TempDir::new().unwrap();
        let ctx = ProjectContext::for_tests(dir.path()).unwrap();
        let result = CodeQualityValidator.validate(&ctx, &opts()).await.unwrap();
        assert!(!result.passed);
    }
}
