//! Mastery CLI: the `mastery` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Curriculum { source, json } => commands::curriculum::run(source, json),
        Commands::Replay {
            script,
            source,
            json,
        } => commands::replay::run(script, source, json),
        Commands::Repl { source } => commands::repl::run(source),
        Commands::Serve { source, bind } => commands::serve::run(source, bind),
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("MASTERY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
