//! # dod-engine: Definition-of-Done Automation Engine
//!
//! A weighted, closed-registry engine that evaluates a project against a
//! standard set of "done" criteria (testing, security, devops, code
//! quality, documentation, performance, compliance), provisions a
//! repeatable `.uvmgr/` exoskeleton of project configuration, and emits
//! CI pipeline manifests for GitHub Actions, GitLab CI, and Azure
//! Pipelines.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        API Layer                            │
//! ├──────────────┬───────────────┬───────────────┬──────────────┤
//! │ Core Engine  │  Validators   │  Exoskeleton  │ Pipeline Gen │
//! │ • Planner    │ • Testing     │ • Templates   │ • GitHub     │
//! │ • Engine     │ • Security    │ • Materializer│ • GitLab     │
//! │ • Criteria   │ • Devops...   │               │ • Azure      │
//! │ • Telemetry  │               │               │              │
//! └──────────────┴───────────────┴───────────────┴──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dod_engine::api;
//! use dod_engine::core::context::Environment;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = api::automate_complete(api::AutomateCompleteRequest {
//!         root: ".".into(),
//!         environment: Environment::Development,
//!         criteria: None,
//!         auto_fix: false,
//!         parallel: true,
//!     })
//!     .await?;
//!
//!     println!("overall score: {:.1}", report.overall_score);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::suspicious)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::fn_params_excessive_bools)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

#[cfg(feature = "mimalloc")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Core evaluation engine: criterion registry, telemetry, planner, engine,
/// runtime configuration, and the error/report/context types they share.
pub mod core {
    //! Core data model and evaluation machinery.

    pub mod context;
    pub mod criteria;
    pub mod engine;
    pub mod errors;
    pub mod planner;
    pub mod report;
    pub mod runtime_config;
    pub mod telemetry;
    pub mod vocabulary;
}

/// The closed validator registry: one implementation per criterion, plus
/// the runner that invokes them under deadline/panic guards.
pub mod validators;

/// Exoskeleton template definitions and the materializer that provisions
/// `.uvmgr/` into a project.
pub mod exoskeleton;

/// CI pipeline manifest generation for GitHub Actions, GitLab CI, and
/// Azure Pipelines.
pub mod pipeline_gen;

/// Thin, CLI-facing façade over the core engine, exoskeleton, and pipeline
/// generator. Every function here corresponds to one row of the CLI
/// contract.
pub mod api;

pub use api::{
    automate_complete, exoskeleton_init, pipeline_generate, status, validate, AutomateCompleteRequest,
    ExoskeletonInitRequest, PipelineGenerateRequest, StatusReport, ValidateRequest,
};
pub use core::errors::{DodError, Result, ResultExt};
pub use core::report::AutomationReport;

/// Library version, reported by `dodctl --version` and the `status` operation.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
