//! dodctl - Definition-of-Done automation CLI
//!
//! Thin entry point: parses arguments, initializes logging, and dispatches
//! to `cli::commands`. All business logic lives in the `dod_engine` library.

use clap::Parser;

mod cli;

use cli::args::{Cli, Commands, ExoskeletonCommands, PipelineCommands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).with_target(false).init();

    let exit_code = match cli.command {
        Commands::AutomateComplete(args) => cli::commands::automate_complete(cli.root, cli.environment, args).await,
        Commands::Validate(args) => cli::commands::validate(cli.root, cli.environment, args).await,
        Commands::Exoskeleton(ExoskeletonCommands::Init(args)) => cli::commands::exoskeleton_init(cli.root, args).await,
        Commands::Pipeline(PipelineCommands::Generate(args)) => cli::commands::pipeline_generate(cli.root, args).await,
        Commands::Status => cli::commands::status(cli.root, cli.environment).await,
    };

    std::process::exit(exit_code);
}
