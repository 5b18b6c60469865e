//! Command implementations: thin glue between parsed CLI args and the
//! `dod_engine::api` façade. All business logic lives in the library.

use dod_engine::api::{
    self, AutomateCompleteRequest, ExoskeletonInitRequest, PipelineGenerateRequest, ValidateRequest,
};
use dod_engine::core::context::Environment;

use crate::args::{AutomateCompleteArgs, EnvironmentArg, ExoskeletonInitArgs, PipelineGenerateArgs, ValidateArgs};
use crate::output;

fn environment_of(arg: EnvironmentArg) -> Environment {
    Environment::parse(arg.as_str()).expect("EnvironmentArg variants always parse")
}

/// Run `dodctl automate-complete`. Returns the process exit code.
pub async fn automate_complete(root: std::path::PathBuf, environment: EnvironmentArg, args: AutomateCompleteArgs) -> i32 {
    let request = AutomateCompleteRequest {
        root,
        environment: environment_of(environment),
        criteria: args.criteria,
        auto_fix: args.auto_fix,
        parallel: args.parallel,
    };

    match api::automate_complete(request).await {
        Ok(report) => {
            output::print_report(&report);
            if report.success {
                0
            } else {
                1
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}

/// Run `dodctl validate`. Returns the process exit code.
pub async fn validate(root: std::path::PathBuf, environment: EnvironmentArg, args: ValidateArgs) -> i32 {
    let request = ValidateRequest {
        root,
        environment: environment_of(environment),
        criteria: args.criteria,
        parallel: args.parallel,
    };

    match api::validate(request).await {
        Ok(report) => {
            output::print_report(&report);
            0
        }
        Err(err) => {
            // `validate` is read-only and informational: the CLI contract
            // restricts it to exit codes {0, 2} only, never the generic
            // per-kind mapping other operations use.
            eprintln!("error: {err}");
            2
        }
    }
}

/// Run `dodctl exoskeleton init`. Returns the process exit code.
pub async fn exoskeleton_init(root: std::path::PathBuf, args: ExoskeletonInitArgs) -> i32 {
    let request = ExoskeletonInitRequest {
        root,
        template: args.template.as_str().to_string(),
        force: args.force,
        preview: args.preview,
    };

    match api::exoskeleton_init(request).await {
        Ok(result) => {
            for path in &result.files_created {
                println!("created   {path}");
            }
            for path in &result.files_overwritten {
                println!("overwrote {path}");
            }
            for path in &result.files_skipped {
                println!("unchanged {path}");
            }
            println!();
            println!("workflows created: {}", result.workflows_created);
            println!("ai integrations enabled: {}", result.ai_integrations_enabled);
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}

/// Run `dodctl pipeline generate`. Returns the process exit code.
pub async fn pipeline_generate(root: std::path::PathBuf, args: PipelineGenerateArgs) -> i32 {
    let request = PipelineGenerateRequest {
        root,
        provider: args.provider.as_str().to_string(),
        features: args.features.unwrap_or_default(),
        environments: args.environments.unwrap_or_default(),
        template: args.template.as_str().to_string(),
        output_root: args.output_root,
        force: args.force,
    };

    match api::pipeline_generate(request).await {
        Ok(path) => {
            println!("wrote {}", path.display());
            0
        }
        Err(err) => {
            // Every failure mode of this operation (unsupported provider,
            // unsupported feature, or a conflicting manifest already on
            // disk) maps to exit 1 per the CLI contract, not the generic
            // input/internal-error exit code.
            eprintln!("error: {err}");
            1
        }
    }
}

/// Run `dodctl status`. Returns the process exit code.
pub async fn status(root: std::path::PathBuf, environment: EnvironmentArg) -> i32 {
    match api::status(root, environment_of(environment)).await {
        Ok(report) => {
            output::print_status(&report);
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}
