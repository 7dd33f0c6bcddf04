use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let config =
        config::CliConfig::load(cli.config.as_deref())?.with_state_dir(cli.state_dir.clone());
    init_tracing(&config.log_filter, cli.verbose);
    commands::run_command(cli, config)
}

/// `RUST_LOG` wins over the configured filter; `--verbose` wins over both.
fn init_tracing(configured: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
