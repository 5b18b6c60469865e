//! Thin façade over the core engine, exoskeleton, and pipeline generator.
//!
//! Every public function here corresponds to one row of the CLI contract:
//! it owns pre-validation (so invalid input never reaches the core engine),
//! builds the runtime configuration, and maps the result onto the types the
//! `dodctl` binary prints and exits with. The CLI itself contains no
//! business logic beyond argument parsing and output formatting.

use std::path::PathBuf;

use tokio::sync::broadcast;

use crate::core::context::Environment;
use crate::core::criteria::CriterionId;
use crate::core::engine::{self, RunRequest};
use crate::core::errors::{DodError, Result};
use crate::core::report::AutomationReport;
use crate::core::runtime_config::RuntimeConfig;
use crate::core::telemetry::TelemetryPort;
use crate::core::vocabulary::span;
use crate::exoskeleton::{self, MaterializationResult, Mode, TemplateId};
use crate::pipeline_gen::{self, Provider};

/// Request for `automate_complete`.
#[derive(Debug, Clone)]
pub struct AutomateCompleteRequest {
    pub root: PathBuf,
    pub environment: Environment,
    pub criteria: Option<Vec<String>>,
    pub auto_fix: bool,
    pub parallel: bool,
}

/// Request for `validate`. Identical shape to [`AutomateCompleteRequest`]
/// minus `auto_fix` — validation never mutates the project.
#[derive(Debug, Clone)]
pub struct ValidateRequest {
    pub root: PathBuf,
    pub environment: Environment,
    pub criteria: Option<Vec<String>>,
    pub parallel: bool,
}

/// Request for `exoskeleton_init`.
#[derive(Debug, Clone)]
pub struct ExoskeletonInitRequest {
    pub root: PathBuf,
    pub template: String,
    pub force: bool,
    pub preview: bool,
}

/// Request for `pipeline_generate`.
#[derive(Debug, Clone)]
pub struct PipelineGenerateRequest {
    pub root: PathBuf,
    pub provider: String,
    /// Criterion ids the generated manifest evaluates. Empty means every
    /// registered criterion.
    pub features: Vec<String>,
    /// Environments the manifest runs against. Empty means `development`.
    pub environments: Vec<String>,
    pub template: String,
    /// Directory the manifest is written under. Defaults to `root` when absent.
    pub output_root: Option<PathBuf>,
    pub force: bool,
}

/// Result of `status`: a fast, read-only summary of a project's DoD
/// configuration, without running any validator.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub environment: Environment,
    pub criteria: Vec<CriterionSummary>,
    pub exoskeleton_present: bool,
}

/// One criterion's registry-level summary, as reported by `status`.
#[derive(Debug, Clone)]
pub struct CriterionSummary {
    pub id: CriterionId,
    pub weight: f64,
    pub priority: &'static str,
}

fn validate_requested_criteria(criteria: &Option<Vec<String>>) -> Result<()> {
    if let Some(ids) = criteria {
        for id in ids {
            CriterionId::parse(id)?;
        }
    }
    Ok(())
}

/// Run a full evaluation and apply auto-fixing where validators support it.
/// Shares its implementation with [`validate`]; the two differ only in
/// `auto_fix` and in how the caller maps the resulting report onto an exit
/// code (specification's resolution of the automate/validate open question).
pub async fn automate_complete(request: AutomateCompleteRequest) -> Result<AutomationReport> {
    validate_requested_criteria(&request.criteria)?;
    let telemetry = TelemetryPort::enabled();
    let registry = RuntimeConfig::resolve_registry(&request.root)?;
    let config = RuntimeConfig::default();

    engine::run(
        RunRequest {
            root: request.root,
            environment: request.environment,
            criteria: request.criteria,
            auto_fix: request.auto_fix,
            parallel: request.parallel,
            include_details: true,
            emit_fix_suggestions: request.auto_fix,
        },
        &registry,
        &config,
        &telemetry,
        span::AUTOMATE_COMPLETE,
        None,
    )
    .await
}

/// Run a read-only evaluation (no auto-fix, regardless of validator
/// capability).
pub async fn validate(request: ValidateRequest) -> Result<AutomationReport> {
    validate_requested_criteria(&request.criteria)?;
    let telemetry = TelemetryPort::enabled();
    let registry = RuntimeConfig::resolve_registry(&request.root)?;
    let config = RuntimeConfig::default();

    engine::run(
        RunRequest {
            root: request.root,
            environment: request.environment,
            criteria: request.criteria,
            auto_fix: false,
            parallel: request.parallel,
            include_details: true,
            emit_fix_suggestions: false,
        },
        &registry,
        &config,
        &telemetry,
        span::VALIDATE,
        None,
    )
    .await
}

/// Run a full evaluation with a caller-supplied cancellation channel (e.g. a
/// Ctrl-C handler). Not part of the CLI contract table directly, but
/// `dodctl`'s interactive mode wires this in instead of the plain
/// [`automate_complete`] path.
pub async fn automate_complete_cancellable(
    request: AutomateCompleteRequest,
    cancel_tx: broadcast::Sender<()>,
) -> Result<AutomationReport> {
    validate_requested_criteria(&request.criteria)?;
    let telemetry = TelemetryPort::enabled();
    let registry = RuntimeConfig::resolve_registry(&request.root)?;
    let config = RuntimeConfig::default();

    engine::run(
        RunRequest {
            root: request.root,
            environment: request.environment,
            criteria: request.criteria,
            auto_fix: request.auto_fix,
            parallel: request.parallel,
            include_details: true,
            emit_fix_suggestions: request.auto_fix,
        },
        &registry,
        &config,
        &telemetry,
        span::AUTOMATE_COMPLETE,
        Some(cancel_tx),
    )
    .await
}

/// Provision the `.uvmgr/` exoskeleton into a project.
pub async fn exoskeleton_init(request: ExoskeletonInitRequest) -> Result<MaterializationResult> {
    let telemetry = TelemetryPort::enabled();
    let _span = telemetry.span(span::EXOSKELETON_INIT, vec![]);

    let template = TemplateId::parse(&request.template)?;
    let mode = match (request.force, request.preview) {
        (_, true) => Mode::Preview,
        (true, false) => Mode::Force,
        (false, false) => Mode::Create,
    };

    exoskeleton::materialize(&request.root, template, mode)
}

/// Render and write a CI pipeline manifest for one provider.
pub async fn pipeline_generate(request: PipelineGenerateRequest) -> Result<PathBuf> {
    let telemetry = TelemetryPort::enabled();
    let _span = telemetry.span(span::PIPELINE_GENERATE, vec![]);

    let provider = Provider::parse(&request.provider)?;
    let template = TemplateId::parse(&request.template)?;
    let ctx = pipeline_gen::resolve(&request.features, &request.environments, template)?;
    let manifest = pipeline_gen::render(provider, &ctx);

    let output_root = request.output_root.as_deref().unwrap_or(&request.root);
    let target = output_root.join(provider.manifest_path());
    if target.exists() && !request.force {
        return Err(DodError::input_field(
            format!(
                "refusing to overwrite '{}': file already exists (pass --force to overwrite)",
                provider.manifest_path()
            ),
            "force",
        ));
    }

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DodError::io(parent, "failed to create parent directory", e))?;
    }
    std::fs::write(&target, manifest).map_err(|e| DodError::io(&target, "failed to write pipeline manifest", e))?;
    Ok(target)
}

/// Summarize a project's criterion registry and exoskeleton presence
/// without running any validator.
pub async fn status(root: PathBuf, environment: Environment) -> Result<StatusReport> {
    let registry = RuntimeConfig::resolve_registry(&root)?;
    let criteria = registry
        .list()
        .into_iter()
        .map(|spec| CriterionSummary {
            id: spec.id,
            weight: spec.weight,
            priority: spec.priority.as_str(),
        })
        .collect();

    Ok(StatusReport {
        environment,
        criteria,
        exoskeleton_present: root.join(".uvmgr").join("exoskeleton").join("config.yaml").exists(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("LICENSE"), "MIT").unwrap();
        std::fs::write(dir.path().join("Cargo.lock"), "# lock").unwrap();
        dir
    }

    #[tokio::test]
    async fn automate_complete_rejects_unknown_criterion_before_running() {
        let dir = sample_project();
        let err = automate_complete(AutomateCompleteRequest {
            root: dir.path().to_path_buf(),
            environment: Environment::Development,
            criteria: Some(vec!["not_real".to_string()]),
            auto_fix: false,
            parallel: true,
        })
        .await;
        assert!(matches!(err, Err(DodError::InputError { .. })));
    }

    #[tokio::test]
    async fn status_reports_every_criterion_without_running_validators() {
        let dir = sample_project();
        let report = status(dir.path().to_path_buf(), Environment::Development).await.unwrap();
        assert_eq!(report.criteria.len(), 7);
        assert!(!report.exoskeleton_present);
    }

    #[tokio::test]
    async fn exoskeleton_init_then_status_sees_it() {
        let dir = sample_project();
        exoskeleton_init(ExoskeletonInitRequest {
            root: dir.path().to_path_buf(),
            template: "standard".to_string(),
            force: false,
            preview: false,
        })
        .await
        .unwrap();

        let report = status(dir.path().to_path_buf(), Environment::Development).await.unwrap();
        assert!(report.exoskeleton_present);
    }

    #[tokio::test]
    async fn pipeline_generate_refuses_to_clobber_without_force() {
        let dir = sample_project();
        let request = || PipelineGenerateRequest {
            root: dir.path().to_path_buf(),
            provider: "github".to_string(),
            features: vec![],
            environments: vec![],
            template: "standard".to_string(),
            output_root: None,
            force: false,
        };
        pipeline_generate(request()).await.unwrap();
        let err = pipeline_generate(request()).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn pipeline_generate_ai_native_template_enables_auto_fix() {
        let dir = sample_project();
        let request = PipelineGenerateRequest {
            root: dir.path().to_path_buf(),
            provider: "github".to_string(),
            features: vec![],
            environments: vec![],
            template: "ai-native".to_string(),
            output_root: None,
            force: false,
        };
        let target = pipeline_generate(request).await.unwrap();
        let manifest = std::fs::read_to_string(target).unwrap();
        assert!(manifest.contains("--auto-fix"));
    }

    #[tokio::test]
    async fn pipeline_generate_writes_under_output_root_when_given() {
        let dir = sample_project();
        let out_dir = tempfile::tempdir().unwrap();
        let request = PipelineGenerateRequest {
            root: dir.path().to_path_buf(),
            provider: "gitlab".to_string(),
            features: vec![],
            environments: vec!["production".to_string()],
            template: "standard".to_string(),
            output_root: Some(out_dir.path().to_path_buf()),
            force: false,
        };
        let target = pipeline_generate(request).await.unwrap();
        assert_eq!(target, out_dir.path().join(".gitlab-ci.yml"));
        assert!(!dir.path().join(".gitlab-ci.yml").exists());
    }
}
