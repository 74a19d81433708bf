use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use relay_pack::Bundle;
use relay_server::{RelayServer, ServerConfig, StorageBackend};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Inspect(args) => cmd_inspect(args, &cli.format),
    }
}

/// Layer command-line overrides on top of the file (or default) config.
fn resolve_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = &args.data_dir {
        config.storage.backend = StorageBackend::Filesystem;
        config.storage.data_dir = Some(dir.clone());
    }
    if let Some(limit) = args.max_bundle_size {
        config.max_bundle_size = limit;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let server = RelayServer::new(config)?;
    println!(
        "{} graph relay on {} ({} storage)",
        "▶".green().bold(),
        server.config().bind_addr.to_string().bold(),
        match server.config().storage.backend {
            StorageBackend::Memory => "memory".yellow(),
            StorageBackend::Filesystem => "filesystem".cyan(),
        }
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn read_bundle(path: &Path) -> anyhow::Result<(Bundle, usize)> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "decoding bundle");
    let bundle =
        Bundle::decode(&data).with_context(|| format!("decoding {}", path.display()))?;
    Ok((bundle, data.len()))
}

fn cmd_inspect(args: InspectArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let (bundle, size) = read_bundle(&args.file)?;
    let payload: usize = bundle.blocks().iter().map(|b| b.len()).sum();

    match format {
        OutputFormat::Json => {
            let mut summary = serde_json::json!({
                "kind": bundle.kind().as_str(),
                "roots": bundle.roots(),
                "blockCount": bundle.len(),
                "encodedBytes": size,
                "payloadBytes": payload,
            });
            if args.blocks {
                let links: Vec<_> = bundle.blocks().iter().map(|b| b.link()).collect();
                summary["blocks"] = serde_json::json!(links);
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            println!("{} {}", "Bundle".bold(), args.file.display());
            println!("  Kind:   {}", bundle.kind().as_str().cyan());
            if bundle.roots().is_empty() {
                println!("  Roots:  {}", "none".dimmed());
            }
            for root in bundle.roots() {
                println!("  Root:   {}", root.to_hex().yellow());
            }
            println!("  Blocks: {}", bundle.len().to_string().bold());
            println!("  Size:   {size} bytes encoded, {payload} bytes of block data");
            if args.blocks {
                for block in bundle.blocks() {
                    println!("    {} {}", block.link().short_hex().yellow(), block.len());
                }
            }
        }
    }
    Ok(())
}
