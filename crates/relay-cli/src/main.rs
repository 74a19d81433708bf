use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

const DEFAULT_FILTER: &str = "graph_relay=info,relay_server=info,relay_sync=info";
const VERBOSE_FILTER: &str =
    "graph_relay=debug,relay_server=debug,relay_sync=debug,relay_store=debug,tower_http=debug";

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let default = if cli.verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    commands::run_command(cli)
}
