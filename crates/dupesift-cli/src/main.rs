use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use dupesift_core::{DetectConfig, DetectionReport, Tier, detect_duplicates, report};

mod catalog;

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "dupesift",
    about = "Fuzzy duplicate detection for catalog exports",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect likely duplicates in a catalog export (.json or .csv).
    Detect {
        /// Catalog file to scan.
        input: PathBuf,

        /// TOML file with scoring weights and thresholds.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Drop clusters below this confidence tier.
        #[arg(long, value_enum)]
        min_tier: Option<TierArg>,
    },

    /// Print the default configuration as TOML, ready to edit.
    DefaultConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Clone, Copy, ValueEnum)]
enum TierArg {
    Review,
    HighConfidence,
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Review => Tier::Review,
            TierArg::HighConfidence => Tier::HighConfidence,
        }
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Detect {
            input,
            config,
            output,
            format,
            min_tier,
        } => run_detect(input, config, output, format, min_tier),
        Commands::DefaultConfig => {
            let rendered = toml::to_string_pretty(&DetectConfig::default())?;
            print!("{rendered}");
            Ok(())
        }
    }
}

fn run_detect(
    input: PathBuf,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    format: OutputFormat,
    min_tier: Option<TierArg>,
) -> Result<()> {
    let config = match &config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => DetectConfig::default(),
    };

    let items = catalog::load(&input)?;
    let mut report = detect_duplicates(&items, &config)?;
    tracing::info!(
        items = items.len(),
        clusters = report.clusters.len(),
        warnings = report.warnings.len(),
        "detection complete"
    );
    if let Some(min) = min_tier {
        let min = Tier::from(min);
        report.clusters.retain(|c| c.tier >= min);
    }

    let rendered = match format {
        OutputFormat::Json => report::to_json(&report)?,
        OutputFormat::Table => render_table(&report),
    };
    match &output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write report to {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}

// ─── Table rendering ────────────────────────────────────────────────────────

fn render_table(report: &DetectionReport) -> String {
    let mut out = String::new();
    if report.partial {
        out.push_str("PARTIAL RESULT — run was cancelled before completion\n\n");
    }

    if report.clusters.is_empty() {
        out.push_str("no duplicate clusters found\n");
    } else {
        out.push_str(&format!(
            "{:<16} {:>6}  {:<24} members\n",
            "tier", "score", "representative"
        ));
        for cluster in &report.clusters {
            let members: Vec<&str> = cluster.members.iter().map(|m| m.as_str()).collect();
            out.push_str(&format!(
                "{:<16} {:>6.3}  {:<24} {}\n",
                cluster.tier.to_string(),
                cluster.min_pairwise_score,
                cluster.representative.as_str(),
                members.join(", ")
            ));
        }
    }

    if !report.warnings.is_empty() {
        out.push_str("\nwarnings:\n");
        for warning in &report.warnings {
            out.push_str(&format!("  {}: {}\n", warning.item_id, warning.reason));
        }
    }

    out.push_str(&format!(
        "\n{} items, {} skipped, {} buckets, {} pairs scored, {} linked\n",
        report.stats.items_total,
        report.stats.items_skipped,
        report.stats.buckets,
        report.stats.pairs_scored,
        report.stats.pairs_linked
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dupesift_core::CatalogItem;

    #[test]
    fn table_lists_clusters_and_warnings() {
        let items = vec![
            CatalogItem::new("a", "The Great Gatsby").with_author("F. Scott Fitzgerald"),
            CatalogItem::new("b", "The Great Gatsby").with_author("F. Scott Fitzgerald"),
            CatalogItem::new("w", ""),
        ];
        let report = detect_duplicates(&items, &DetectConfig::default()).unwrap();

        let table = render_table(&report);
        assert!(table.contains("high-confidence"));
        assert!(table.contains("a, b"));
        assert!(table.contains("w: missing title"));
        assert!(table.contains("3 items, 1 skipped"));
    }

    #[test]
    fn empty_catalog_renders_cleanly() {
        let report = detect_duplicates(&[], &DetectConfig::default()).unwrap();
        let table = render_table(&report);
        assert!(table.contains("no duplicate clusters found"));
    }
}
