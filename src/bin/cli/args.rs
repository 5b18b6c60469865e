//! CLI argument structures for `dodctl`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Definition-of-Done automation engine.
#[derive(Parser)]
#[command(name = "dodctl")]
#[command(version = VERSION)]
#[command(about = "Evaluate, fix, and provision the Definition-of-Done for a project")]
#[command(long_about = "
Evaluate a project against a weighted set of Definition-of-Done criteria,
provision a repeatable .uvmgr/ exoskeleton, and generate CI pipeline
manifests.

Common usage:

  # Evaluate every criterion and apply automatic fixes where supported
  dodctl automate-complete

  # Read-only evaluation of a subset of criteria
  dodctl validate --criteria testing,security

  # Provision the standard exoskeleton
  dodctl exoskeleton init

  # Generate a GitHub Actions manifest
  dodctl pipeline generate --provider github
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root to operate on
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Deployment environment context
    #[arg(long, global = true, value_enum, default_value = "development")]
    pub environment: EnvironmentArg,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a full evaluation and apply auto-fixes where validators support it
    #[command(name = "automate-complete")]
    AutomateComplete(AutomateCompleteArgs),

    /// Run a read-only evaluation
    Validate(ValidateArgs),

    /// Provision or regenerate the .uvmgr/ exoskeleton
    #[command(subcommand)]
    Exoskeleton(ExoskeletonCommands),

    /// Generate a CI pipeline manifest
    #[command(subcommand)]
    Pipeline(PipelineCommands),

    /// Summarize a project's criterion registry and exoskeleton presence
    Status,
}

#[derive(Subcommand)]
pub enum ExoskeletonCommands {
    /// Materialize the exoskeleton into the project root
    Init(ExoskeletonInitArgs),
}

#[derive(Subcommand)]
pub enum PipelineCommands {
    /// Render and write a CI pipeline manifest
    Generate(PipelineGenerateArgs),
}

#[derive(Args)]
pub struct AutomateCompleteArgs {
    /// Comma-separated criterion ids to evaluate (default: every criterion)
    #[arg(long, value_delimiter = ',')]
    pub criteria: Option<Vec<String>>,

    /// Apply fixes for validators that support mutation
    #[arg(long)]
    pub auto_fix: bool,

    /// Run eligible criteria concurrently, grouped by priority tier
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Comma-separated criterion ids to evaluate (default: every criterion)
    #[arg(long, value_delimiter = ',')]
    pub criteria: Option<Vec<String>>,

    /// Run eligible criteria concurrently, grouped by priority tier
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Args)]
pub struct ExoskeletonInitArgs {
    /// Template to materialize
    #[arg(long, value_enum, default_value = "standard")]
    pub template: TemplateArg,

    /// Overwrite files that already exist with different content
    #[arg(long)]
    pub force: bool,

    /// Compute the materialization result without writing any file
    #[arg(long)]
    pub preview: bool,
}

#[derive(Args)]
pub struct PipelineGenerateArgs {
    /// CI provider to generate a manifest for
    #[arg(long, value_enum)]
    pub provider: ProviderArg,

    /// Comma-separated criterion ids the manifest evaluates (default: every criterion)
    #[arg(long, value_delimiter = ',')]
    pub features: Option<Vec<String>>,

    /// Comma-separated environments the manifest runs against (default: development)
    #[arg(long, value_delimiter = ',')]
    pub environments: Option<Vec<String>>,

    /// Exoskeleton template the manifest's behavior is derived from (e.g. auto-fix)
    #[arg(long, value_enum, default_value = "standard")]
    pub template: TemplateArg,

    /// Directory the manifest is written under (default: project root)
    #[arg(long)]
    pub output_root: Option<PathBuf>,

    /// Overwrite an existing manifest
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EnvironmentArg {
    Development,
    Staging,
    Production,
}

impl EnvironmentArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TemplateArg {
    Standard,
    Enterprise,
    AiNative,
}

impl TemplateArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Enterprise => "enterprise",
            Self::AiNative => "ai-native",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ProviderArg {
    Github,
    Gitlab,
    Azure,
}

impl ProviderArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::Azure => "azure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_automate_complete_with_criteria_list() {
        let cli = Cli::parse_from(["dodctl", "automate-complete", "--criteria", "testing,security", "--auto-fix"]);
        match cli.command {
            Commands::AutomateComplete(args) => {
                assert_eq!(args.criteria, Some(vec!["testing".to_string(), "security".to_string()]));
                assert!(args.auto_fix);
            }
            _ => panic!("expected AutomateComplete"),
        }
    }

    #[test]
    fn defaults_root_to_current_directory() {
        let cli = Cli::parse_from(["dodctl", "status"]);
        assert_eq!(cli.root, PathBuf::from("."));
    }
}
