//! wikichron - wiki edit-history metrics from the command line
//!
//! Lists the metric catalog and runs metrics over revision dumps.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use wikichron_core::analytics::{
    HeatMap, MetricCategory, MetricOutput, MetricRunResult, MetricsEngine, RunStatus, SeriesSet,
    CATALOG_VERSION,
};
use wikichron_core::{Config, Dataset};

#[derive(Parser)]
#[command(name = "wikichron")]
#[command(about = "Compute WikiChron metrics over wiki revision dumps")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the metric catalog
    Metrics {
        /// Only list metrics of this category (e.g. RETENTION)
        #[arg(short, long)]
        category: Option<MetricCategory>,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Run one metric over a revision dump
    Compute {
        /// Path to the revision dump (CSV)
        dump: PathBuf,

        /// Metric code (e.g. 6_edits) or key (e.g. edits)
        #[arg(short, long)]
        metric: String,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Run the whole catalog over a revision dump
    Report {
        /// Path to the revision dump (CSV)
        dump: PathBuf,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Show headline counts of a revision dump
    Summary {
        /// Path to the revision dump (CSV)
        dump: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        wikichron_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let engine = MetricsEngine::default();

    match args.command {
        Command::Metrics { category, format } => list_metrics(&engine, category, &format),
        Command::Compute {
            dump,
            metric,
            format,
        } => {
            let dataset = load_dataset(&dump, &config)?;
            let result = engine
                .run_metric(&metric, &dataset)
                .with_context(|| format!("cannot run metric '{}'", metric))?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_text_result(&engine, &result);
            }
            if result.status == RunStatus::Error {
                anyhow::bail!(
                    "metric {} failed: {}",
                    result.code,
                    result.error_message.unwrap_or_default()
                );
            }
            Ok(())
        }
        Command::Report { dump, format } => {
            let dataset = load_dataset(&dump, &config)?;
            let results = engine.run_all(&dataset);
            if format == "json" {
                print_json_report(&dataset, &results)
            } else {
                print_text_report(&engine, &dataset, &results);
                Ok(())
            }
        }
        Command::Summary { dump } => {
            let dataset = load_dataset(&dump, &config)?;
            print_summary(&dataset);
            Ok(())
        }
    }
}

fn load_dataset(path: &Path, config: &Config) -> Result<Dataset> {
    Dataset::load(path, &config.dataset)
        .with_context(|| format!("failed to load revision dump {}", path.display()))
}

// ============================================
// Catalog listing
// ============================================

fn list_metrics(
    engine: &MetricsEngine,
    category: Option<MetricCategory>,
    format: &str,
) -> Result<()> {
    let grouped = engine.registry().get_metrics_by_category();

    if format == "json" {
        let metrics: Vec<_> = grouped
            .iter()
            .filter(|(c, _)| category.map_or(true, |wanted| **c == wanted))
            .flat_map(|(_, metrics)| metrics.iter())
            .collect();
        let output = serde_json::json!({
            "catalog_version": CATALOG_VERSION,
            "metrics": metrics,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for (cat, metrics) in &grouped {
        if !category.map_or(true, |wanted| wanted == *cat) {
            continue;
        }
        println!("{} ({})", cat.label(), cat.as_str());
        for metric in metrics {
            println!(
                "  {:<60} {:<10} {}",
                metric.code,
                metric.shape.as_str(),
                metric.text
            );
        }
        println!();
    }
    Ok(())
}

// ============================================
// Text output
// ============================================

fn print_text_result(engine: &MetricsEngine, result: &MetricRunResult) {
    let text = engine
        .registry()
        .get_metric_by_code(&result.code)
        .map(|m| m.text)
        .unwrap_or_default();
    println!("{} - {} ({}ms)", result.code, text, result.duration_ms);

    if let Some(ref e) = result.error_message {
        println!("  Error: {}", e);
    }

    match &result.output {
        Some(MetricOutput::Series(set)) => print_series(set),
        Some(MetricOutput::HeatMap(map)) => print_heatmap(map),
        None => {}
    }
}

fn print_series(set: &SeriesSet) {
    let names: Vec<&str> = set.series.iter().map(|s| s.name.as_str()).collect();
    println!("  {:<8} {}", "month", names.join(" | "));
    for (i, month) in set.index.iter().enumerate() {
        let values: Vec<String> = set
            .series
            .iter()
            .map(|s| format_value(s.values.get(i).copied().unwrap_or(0.0)))
            .collect();
        println!("  {:<8} {}", month.to_string(), values.join(" | "));
    }
}

fn print_heatmap(map: &HeatMap) {
    println!("  {} per bucket and month", map.z_label);
    let months: Vec<String> = map.index.iter().map(|m| m.to_string()).collect();
    println!("  {:>8} {}", "bucket", months.join(" "));
    for (bucket, row) in map.buckets.iter().zip(&map.matrix) {
        let cells: Vec<String> = row.iter().map(|n| format!("{:>7}", n)).collect();
        println!("  {:>8} {}", bucket, cells.join(" "));
    }
}

/// Integers print without a fraction, anything else with two decimals.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn print_text_report(engine: &MetricsEngine, dataset: &Dataset, results: &[MetricRunResult]) {
    println!(
        "Dataset: {} ({} revisions, {} months)\n",
        dataset.name,
        dataset.log.len(),
        dataset.index.len()
    );

    for result in results {
        let status_icon = match result.status {
            RunStatus::Success => "+",
            RunStatus::Error => "!",
        };
        let text = engine
            .registry()
            .get_metric_by_code(&result.code)
            .map(|m| m.text)
            .unwrap_or_default();
        println!(
            "  [{}] {} - {} ({}ms)",
            status_icon, result.code, text, result.duration_ms
        );
        if let Some(ref e) = result.error_message {
            println!("      Error: {}", e);
        }
    }

    let failed = results
        .iter()
        .filter(|r| r.status == RunStatus::Error)
        .count();
    println!("\n---");
    println!("Ran {} metric(s), {} failed", results.len(), failed);
}

fn print_json_report(dataset: &Dataset, results: &[MetricRunResult]) -> Result<()> {
    let output = serde_json::json!({
        "dataset": dataset.name,
        "catalog_version": CATALOG_VERSION,
        "index": dataset.index,
        "results": results,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_summary(dataset: &Dataset) {
    let summary = dataset.log.summary();
    let fmt_ts = |ts: Option<chrono::DateTime<chrono::Utc>>| {
        ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    println!("Dataset: {}", dataset.name);
    println!("  Revisions:               {}", summary.revisions);
    println!("  Pages:                   {}", summary.pages);
    println!("  Registered contributors: {}", summary.registered_contributors);
    println!("  Anonymous contributors:  {}", summary.anonymous_contributors);
    println!("  First edit:              {}", fmt_ts(summary.first_edit));
    println!("  Last edit:               {}", fmt_ts(summary.last_edit));
    println!("  Months:                  {}", summary.months);
}
