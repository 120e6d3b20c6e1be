use anyhow::Result;
use clap::Parser;

use mixmatch::cli::commands::capture::CaptureCommand;
use mixmatch::cli::commands::catalog::{DeleteCommand, ListCommand};
use mixmatch::cli::commands::config::ConfigCommand;
use mixmatch::cli::commands::{show_how_to_get_started, ClientContext};
use mixmatch::cli::{Cli, Commands};
use mixmatch::{init_telemetry, MixMatchConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    MixMatchConfig::load_env_file()?;
    let config = MixMatchConfig::load()?;
    init_telemetry(&config.observability)?;

    let command = match cli.command {
        // No subcommand: explain how to get started
        None => return show_how_to_get_started(),
        Some(Commands::Config { write }) => return ConfigCommand { write }.execute(&config),
        Some(command) => command,
    };

    let context = ClientContext::connect(config)?;
    let result = tokio::runtime::Runtime::new()?.block_on(async {
        match command {
            Commands::Capture {
                image,
                out,
                save,
                yes,
            } => {
                CaptureCommand {
                    image,
                    out,
                    save,
                    yes,
                }
                .execute(&context)
                .await
            }
            Commands::List { pages, json } => ListCommand { pages, json }.execute(&context).await,
            Commands::Delete { id, yes } => DeleteCommand { id, yes }.execute(&context).await,
            Commands::Config { .. } => Ok(()),
        }
    });

    if cli.stats {
        context.metrics.log_stats();
    }
    result
}
