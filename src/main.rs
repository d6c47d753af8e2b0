use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use sealstat::pipeline::fetch_failed;
use sealstat::source::{SEVERITY_FEATURE, encode_records, load_records};
use sealstat::{
    ClusterReport, Config, CryptoContext, MeanReport, Pipeline, Seeding, SimulatedCkks,
    ThreatFeedClient, ThreatRecord,
};

/// Encrypted statistics over threat records
#[derive(Parser)]
#[command(name = "sealstat")]
#[command(version = "0.1.0")]
#[command(about = "Mean and k-means over homomorphically encrypted records")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// TOML config file; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypted mean of scalar values
    Mean {
        /// JSON array of numbers; simulated severities when omitted
        #[arg(long)]
        input: Option<PathBuf>,

        /// Number of simulated values
        #[arg(long, default_value_t = 100_000)]
        count: usize,
    },
    /// Encrypted k-means over scalar values
    Cluster {
        /// JSON array of numbers; a synthetic ramp when omitted
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long, default_value_t = 200)]
        count: usize,

        #[arg(long)]
        k: Option<usize>,

        #[arg(long)]
        rounds: Option<usize>,

        /// Comma-separated initial centroids, one per cluster
        #[arg(long, value_delimiter = ',')]
        seeds: Option<Vec<f64>>,
    },
    /// Fetch threat records, report per-feature means and severity clusters
    Ingest {
        /// Feed URL; overrides `source.endpoint`
        #[arg(long, conflicts_with = "file")]
        endpoint: Option<String>,

        /// Local JSON dump of the feed
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct IngestReport {
    features: MeanReport,
    severity: ClusterReport,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    let start = Instant::now();
    let ctx = CryptoContext::new(SimulatedCkks::new(config.crypto))
        .context("building crypto context")?;
    info!(
        secs = start.elapsed().as_secs_f64(),
        "keys generated"
    );

    match cli.command {
        Commands::Mean { input, count } => {
            let values = match input {
                Some(path) => read_values(&path)?,
                None => (0..count).map(|i| 0.5 + 0.4 * (i as f64).sin()).collect(),
            };

            let report = Pipeline::new(&ctx, config.clustering.clone()).run_mean(&values)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_mean("Mean", &report);
            }
        }
        Commands::Cluster {
            input,
            count,
            k,
            rounds,
            seeds,
        } => {
            let values = match input {
                Some(path) => read_values(&path)?,
                None => (0..count).map(|i| (i % 1000) as f64 / 1000.0).collect(),
            };
            if let Some(k) = k {
                config.clustering.k = k;
            }
            if let Some(rounds) = rounds {
                config.clustering.rounds = rounds;
            }
            let seeding = match seeds {
                Some(seeds) => {
                    config.clustering.k = seeds.len();
                    Seeding::Explicit(seeds.into_iter().map(|s| vec![s]).collect())
                }
                None => Seeding::GlobalMean {
                    offset: config.clustering.seed_offset,
                },
            };
            config.validate()?;

            let points: Vec<Vec<f64>> = values.into_iter().map(|v| vec![v]).collect();
            let report =
                Pipeline::new(&ctx, config.clustering.clone()).run_clustering(&points, &seeding)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_clusters(&report);
            }
        }
        Commands::Ingest { endpoint, file } => {
            let records = fetch(&config, endpoint, file.as_deref())?;
            let points = encode_records(&records).map_err(fetch_failed)?;

            let pipeline = Pipeline::new(&ctx, config.clustering.clone());
            let features = pipeline.run_feature_mean(&points)?;

            let severities: Vec<Vec<f64>> = points
                .iter()
                .map(|p| vec![p[SEVERITY_FEATURE]])
                .collect();
            let seeding = Seeding::GlobalMean {
                offset: config.clustering.seed_offset,
            };
            let severity = pipeline.run_clustering(&severities, &seeding)?;

            let report = IngestReport { features, severity };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_mean("Feature means (ip, attack type, severity, timestamp)", &report.features);
                print_clusters(&report.severity);
            }
        }
    }

    Ok(())
}

fn fetch(
    config: &Config,
    endpoint: Option<String>,
    file: Option<&Path>,
) -> Result<Vec<ThreatRecord>> {
    if let Some(path) = file {
        return Ok(load_records(path).map_err(fetch_failed)?);
    }

    let endpoint = endpoint
        .or_else(|| config.source.endpoint.clone())
        .context("no record source: pass --endpoint or --file, or set source.endpoint")?;
    let client = ThreatFeedClient::with_timeout(
        endpoint,
        Duration::from_secs(config.source.timeout_secs),
    )
    .map_err(fetch_failed)?;

    Ok(client.fetch().map_err(fetch_failed)?)
}

fn read_values(path: &Path) -> Result<Vec<f64>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn print_mean(title: &str, report: &MeanReport) {
    println!("=== {} ===", title);
    println!("Records:          {}", report.records);
    println!("Ciphertexts:      {}", report.ciphertexts);
    for (i, value) in report.mean.iter().enumerate() {
        println!("Mean[{}]:          {:.6}", i, value);
    }
    print_timings(&report.timings);
}

fn print_clusters(report: &ClusterReport) {
    println!("=== Clusters ===");
    println!("Points:           {}", report.points);
    println!("Rounds:           {}", report.rounds_run);
    for cluster in &report.clusters {
        let centroid = cluster
            .centroid
            .iter()
            .map(|v| format!("{:.4}", v))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  Cluster {}: {} points, centroid [{}]",
            cluster.id,
            cluster.point_ids.len(),
            centroid
        );
    }
    print_timings(&report.timings);
}

fn print_timings(timings: &sealstat::StageTimings) {
    println!("Encrypt:          {:.3}s", timings.encrypt_secs);
    println!("Compute:          {:.3}s", timings.compute_secs);
    println!("Decode:           {:.3}s\n", timings.decode_secs);
}
