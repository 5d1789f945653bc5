// src/main.rs
use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Instant;

use commune_finance_lib::api::{HttpRecordSource, PartitionTable};
use commune_finance_lib::export::{export_report, ExportFormat};
use commune_finance_lib::finance::summary::summarize;
use commune_finance_lib::finance::{CommuneFetcher, CommuneReport, Topic, TopicTable};
use commune_finance_lib::matching::NameResolver;
use commune_finance_lib::utils::config::ApiConfig;
use commune_finance_lib::utils::env::load_env;
use commune_finance_lib::utils::progress_config::ProgressConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Commune name as typed, e.g. "La Rochelle"
    #[arg(long)]
    commune: String,

    /// Department code, e.g. 17 or 038
    #[arg(long)]
    department: Option<String>,

    /// Budget years to fetch
    #[arg(long, value_delimiter = ',', default_values_t = [2019, 2020, 2021, 2022, 2023])]
    years: Vec<i32>,

    /// Topics to build (all when omitted)
    #[arg(long = "topic")]
    topics: Vec<Topic>,

    /// Write the report into this directory
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Export format
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    format: ExportFormat,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn format_value(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

fn print_table(table: &TopicTable) {
    println!("\n📊 {}", table.topic);
    for row in &table.rows {
        println!("  {} · {} ({})", row.year, row.commune, row.department);
        for (label, value) in table.columns.iter().zip(&row.values) {
            println!("      {:<40} {:>14}", label, format_value(*value));
        }
    }
    if !table.missing_years.is_empty() {
        println!("  ⏭️  No data for {:?}", table.missing_years);
    }

    let evolutions = summarize(table);
    if !evolutions.is_empty() {
        println!("  Evolution:");
        for evolution in evolutions {
            println!("    {}", evolution);
        }
    }
}

fn print_report(report: &CommuneReport) {
    let variants: Vec<String> = report
        .variants
        .iter()
        .map(|v| format!("{} ({})", v.name, v.department))
        .collect();
    println!("🏛️  {} → {}", report.commune, variants.join(", "));
    for table in &report.tables {
        print_table(table);
    }
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
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(args.verbose)))
        .init();
    load_env();
    if args.commune.trim().is_empty() {
        bail!("--commune must not be empty");
    }
    if args.years.is_empty() {
        bail!("--years must list at least one year");
    }
    let topics = if args.topics.is_empty() {
        Topic::ALL.to_vec()
    } else {
        args.topics.clone()
    };

    let config = ApiConfig::from_env().context("Failed to load API configuration")?;
    config.log_config();
    let source = HttpRecordSource::new(config).context("Failed to build HTTP client")?;

    let start_time = Instant::now();
    let mut fetcher = CommuneFetcher::new(source, NameResolver::new(PartitionTable::default()))
        .with_progress(ProgressConfig::from_env());
    let report = fetcher
        .fetch_report(&args.commune, args.department.as_deref(), &args.years, &topics)
        .await;
    info!(
        "✅ Report for '{}' built in {:.2}s ({} upstream requests for name resolution)",
        report.commune,
        start_time.elapsed().as_secs_f32(),
        fetcher.resolver().requests_issued()
    );

    if report.is_empty() {
        println!(
            "No data found for {} in years {:?}",
            report.commune, report.years
        );
        return Ok(());
    }

    print_report(&report);

    if let Some(dir) = &args.export_dir {
        let files = export_report(&report, dir, args.format)
            .with_context(|| format!("Failed to export report to {}", dir.display()))?;
        println!("\n💾 {} file(s) written to {}", files.len(), dir.display());
    }

    Ok(())
}
