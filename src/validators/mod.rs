//! The closed Validator registry: one real (if heuristic) implementation per
//! [`CriterionId`](crate::core::criteria::CriterionId), each satisfying the
//! `Validator` capability described in the specification's design notes.
//!
//! Validators return a typed `{ok(CriterionResult) | err(reason)}` outcome
//! rather than throwing — the re-architecture the specification calls for in
//! place of exception-driven control flow. The [`runner`] module still
//! guards every invocation against panics as defense in depth.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::core::context::ProjectContext;
use crate::core::report::CriterionResult;

pub mod code_quality;
pub mod compliance;
pub mod devops;
pub mod documentation;
pub mod performance;
pub mod runner;
pub mod security;
pub mod testing;

/// Options threaded into every validator invocation.
#[derive(Debug, Clone)]
pub struct ValidatorOptions {
    pub auto_fix: bool,
    pub include_details: bool,
    pub emit_fix_suggestions: bool,
    pub deadline: Instant,
}

/// A reason a validator failed to produce a result. Converted by the
/// runner into `CriterionResult { outcome: validator_error, .. }`.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ValidatorFailure(pub String);

impl ValidatorFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Capability every registered validator must satisfy. Whether a validator
/// mutates the project tree (only permitted when `auto_fix = true`, and then
/// only serially with respect to other mutating validators — see the
/// Evaluation Engine's auto-fix exclusion) is declared statically so the
/// engine can plan around it without invoking the validator.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(
        &self,
        ctx: &ProjectContext,
        opts: &ValidatorOptions,
    ) -> Result<CriterionResult, ValidatorFailure>;

    /// Whether this validator writes to the project tree when
    /// `auto_fix = true`. The reference validators are all read-only.
    fn mutates_project(&self) -> bool {
        false
    }
}

/// A shared handle to a validator, stored in the `CriterionSpec`.
pub type ValidatorHandle = Arc<dyn Validator>;

/// An optional collaborator that augments a `CriterionResult` with
/// human-actionable fix suggestions. The core neither depends on nor
/// distinguishes any specific provider; when absent, `fix_suggestions`
/// stays empty.
pub trait SuggestionProvider: Send + Sync {
    fn suggest(&self, result: &CriterionResult) -> Vec<String>;
}

/// Count files under `root` matching any of `globs`. Shared by the
/// file-presence-style validators so each doesn't re-implement the walk.
pub(crate) fn count_matches(root: &std::path::Path, globs: &[&str]) -> std::io::Result<usize> {
    Ok(list_matches(root, globs)?.len())
}

/// List files under `root` matching any of `globs`, relative to `root`,
/// in sorted order.
pub(crate) fn list_matches(
    root: &std::path::Path,
    globs: &[&str],
) -> std::io::Result<Vec<std::path::PathBuf>> {
    let mut builder = globset::GlobSetBuilder::new();
    for pattern in globs {
        if let Ok(glob) = globset::Glob::new(pattern) {
            builder.add(glob);
        }
    }
    let matcher = builder
        .build()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let mut matches: Vec<std::path::PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let relative = e.path().strip_prefix(root).ok()?.to_path_buf();
            matcher.is_match(&relative).then_some(relative)
        })
        .collect();
    matches.sort();
    Ok(matches)
}
