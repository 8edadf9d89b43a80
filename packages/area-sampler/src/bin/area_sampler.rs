//! Area Sampler CLI
//!
//! `search` runs a root search against the configured data source and
//! appends new entities to a JSON store. `inspect` summarizes a store.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use area_sampler::config::Config;
use area_sampler::{
    run_search, Coordinates, Distance, DistanceUnit, EntityStore, JsonFileStore, SamplerConfig,
    SearchReport, SearchRequest,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "area-sampler", version, about = "Discover entities around a point")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search an area, refining regions that look truncated
    Search(SearchArgs),
    /// Summarize an existing result store
    Inspect {
        /// Path to the JSON result store
        store: PathBuf,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Category to search for, e.g. "factories"
    category: String,

    /// Center latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Center longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Initial radius
    #[arg(long, default_value_t = 5.0)]
    radius: f64,

    /// Radius unit (km or m)
    #[arg(long, default_value = "km")]
    unit: DistanceUnit,

    /// JSON file new entities are appended to
    #[arg(long, default_value = "GoogleMapsData.json")]
    store: PathBuf,

    /// New entities per region that trigger subdivision
    #[arg(long, default_value_t = 10)]
    saturation_threshold: usize,

    /// Deepest level that may still be subdivided
    #[arg(long, default_value_t = 8)]
    max_depth: u32,

    /// Smallest child radius in meters
    #[arg(long, default_value_t = 25.0)]
    min_radius_m: f64,

    /// Write the per-region report as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,area_sampler=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Search(args) => search(args).await,
        Command::Inspect { store } => inspect(store).await,
    }
}

async fn search(args: SearchArgs) -> Result<()> {
    let config = Config::from_env()?;
    let source = config.data_source();

    let request = SearchRequest::new(
        args.category,
        Distance::new(args.radius, args.unit)?,
        Coordinates::new(args.lat, args.lon)?,
        &args.store,
    )
    .with_config(
        SamplerConfig::new()
            .with_saturation_threshold(args.saturation_threshold)
            .with_max_depth(args.max_depth)
            .with_min_radius_m(args.min_radius_m),
    );

    tracing::info!(
        category = %request.category,
        region = %request.region(),
        store = %request.store_path.display(),
        source = %config.source_url,
        "Starting search"
    );

    let report = run_search(&source, &request).await.with_context(|| {
        format!(
            "search aborted; entities saved so far remain in {}",
            request.store_path.display()
        )
    })?;

    print_summary(&report, &request);

    if let Some(path) = args.report {
        let json = serde_json::to_vec_pretty(&report).context("Failed to serialize report")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn print_summary(report: &SearchReport, request: &SearchRequest) {
    println!("Regions queried:    {}", report.regions_queried());
    println!("Regions subdivided: {}", report.regions_subdivided());
    println!("Regions failed:     {}", report.regions_failed());
    println!("Cut short by limit: {}", report.regions_cut_short());
    println!("Deepest level:      {}", report.max_depth_reached());
    println!("Entities fetched:   {}", report.records_fetched());
    println!("New this run:       {}", report.new_records());
    println!(
        "Saved to store:     {} ({})",
        report.records_written(),
        request.store_path.display()
    );
}

async fn inspect(path: PathBuf) -> Result<()> {
    let store = JsonFileStore::new(&path);
    let records = store.load_all().await;

    println!("{}: {} entities", path.display(), records.len());

    let mut by_service: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &records {
        *by_service
            .entry(record.service.as_deref().unwrap_or("(none)"))
            .or_default() += 1;
    }
    for (service, count) in by_service {
        println!("  {count:>5}  {service}");
    }

    Ok(())
}
