// src/bin/resolve_commune.rs
use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use commune_finance_lib::api::{HttpRecordSource, PartitionTable};
use commune_finance_lib::matching::name::{generate_search_terms, normalize_commune_name};
use commune_finance_lib::matching::NameResolver;
use commune_finance_lib::utils::config::ApiConfig;
use commune_finance_lib::utils::env::load_env;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct ResolveArgs {
    /// Commune name as typed
    name: String,

    /// Department code narrowing the search
    #[arg(long)]
    department: Option<String>,

    /// Print the variants as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Default log filter when `RUST_LOG` is unset.
fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ResolveArgs::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(args.verbose)))
        .init();
    load_env();

    let config = ApiConfig::from_env().context("Failed to load API configuration")?;
    config.log_config();
    let source = HttpRecordSource::new(config).context("Failed to build HTTP client")?;

    info!(
        "🔤 '{}' normalizes to '{}', search terms {:?}",
        args.name,
        normalize_commune_name(&args.name),
        generate_search_terms(&args.name)
    );

    let mut resolver = NameResolver::new(PartitionTable::default());
    let variants = resolver
        .resolve_variants(&source, &args.name, args.department.as_deref())
        .await;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&variants).context("Failed to serialize variants")?
        );
    } else {
        for (i, variant) in variants.iter().enumerate() {
            println!("{}. {} (department {})", i + 1, variant.name, variant.department);
        }
    }
    info!("{} upstream requests issued", resolver.requests_issued());

    Ok(())
}
