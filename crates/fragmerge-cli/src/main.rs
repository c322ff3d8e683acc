mod cli;
mod commands;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use commands::OutputOptions;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Merge {
            inputs,
            strategy,
            output,
            pretty,
        } => {
            let options = OutputOptions::new(output.as_deref(), *pretty);
            commands::Merge::execute(inputs, (*strategy).into(), &options)
                .context("Failed to execute merge command")?;
        }
        Commands::Files { inputs } => {
            commands::Files::execute(inputs).context("Failed to execute files command")?;
        }
    }

    Ok(())
}

/// Logs go to stderr, stdout only carries the merged document
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "fragmerge=debug"
    } else {
        "fragmerge=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
