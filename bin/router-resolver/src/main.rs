use anyhow::Result;
use clap::{Parser, ValueEnum};
use router_table::MemoryRoutingTable;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod resolver;

use config::DirectorySeed;
use resolver::Resolver;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Resolve which server handles a client's traffic
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// YAML file with the directory contents
    #[arg(long, env = "ROUTER_DIRECTORY_SEED")]
    seed: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    log_format: Format,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    output: Format,

    client: String,

    /// Resolve the client's route for this service instead of its message server
    service: Option<String>,
}

fn init_tracing(format: Format) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        Format::Text => builder.init(),
        Format::Json => builder.json().init(),
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let table = Arc::new(MemoryRoutingTable::new());
    match &args.seed {
        Some(path) => DirectorySeed::load(path)?.apply(table.as_ref())?,
        None => warn!("No directory seed given; the routing table is empty"),
    }
    info!(
        "Routing table ready ({} clients, {} services)",
        table.client_count(),
        table.service_count()
    );

    let resolver = Resolver::new(table);
    match resolver.resolve(&args.client, args.service.as_deref()) {
        Ok(route) => {
            debug!("Resolved via {}", route.source);
            match args.output {
                Format::Text => println!("{}", route.server),
                Format::Json => println!("{}", serde_json::to_string(&route)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_not_found() => {
            eprintln!("no route: {}", e);
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e.into()),
    }
}
