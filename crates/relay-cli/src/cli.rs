use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "graph-relay",
    about = "Relay for versioned graph stores: push, pull, and merge over HTTP",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the relay server
    Serve(ServeArgs),
    /// Decode a bundle file and summarize its contents
    Inspect(InspectArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Listen address, overriding the configuration file
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Store blocks and resolver entries under this directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Largest accepted request body in bytes
    #[arg(long)]
    pub max_bundle_size: Option<usize>,
}

#[derive(Args)]
pub struct InspectArgs {
    pub file: PathBuf,
    /// List every block link
    #[arg(long)]
    pub blocks: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::try_parse_from(["graph-relay", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.config.is_none());
            assert!(args.bind.is_none());
            assert!(args.data_dir.is_none());
            assert!(args.max_bundle_size.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "graph-relay",
            "serve",
            "--config",
            "relay.toml",
            "--bind",
            "0.0.0.0:8080",
            "--data-dir",
            "/var/lib/relay",
            "--max-bundle-size",
            "4096",
        ])
        .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.config, Some(PathBuf::from("relay.toml")));
            assert_eq!(args.bind, Some("0.0.0.0:8080".parse().unwrap()));
            assert_eq!(args.data_dir, Some(PathBuf::from("/var/lib/relay")));
            assert_eq!(args.max_bundle_size, Some(4096));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_serve_rejects_bad_address() {
        assert!(Cli::try_parse_from(["graph-relay", "serve", "--bind", "nowhere"]).is_err());
    }

    #[test]
    fn parse_inspect() {
        let cli = Cli::try_parse_from(["graph-relay", "inspect", "store.bundle", "--blocks"]).unwrap();
        if let Command::Inspect(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("store.bundle"));
            assert!(args.blocks);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn inspect_requires_file() {
        assert!(Cli::try_parse_from(["graph-relay", "inspect"]).is_err());
    }

    #[test]
    fn parse_verbose_and_format() {
        let cli = Cli::try_parse_from(["graph-relay", "-v", "--format", "json", "inspect", "x"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
