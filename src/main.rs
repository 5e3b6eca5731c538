use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::Parser;
use log::info;

use district_score::config::{ConfigOverrides, PipelineConfig};
use district_score::run_from_path;
use district_score::utils::logging::print_ranking;
use district_score::writer::{write_breakdown, write_scores};

/// Rank districts by a weighted Z-score of repeat-sale price trend and monthly sales volume
#[derive(Debug, Parser)]
#[command(name = "district-score", version, about)]
struct Cli {
    /// Sales file (.csv, .tsv, .txt, .parquet) or a directory of them
    input: PathBuf,

    /// Where to write the ranking (.csv, .tsv or .parquet)
    #[arg(short, long, default_value = "district_scores.csv")]
    output: PathBuf,

    /// Also write raw metrics and Z-scores per district to this path
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// JSON configuration file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Field delimiter of delimited inputs (detected when omitted)
    #[arg(long)]
    delimiter: Option<char>,

    /// First sale month to include, YYYY-MM
    #[arg(long, value_name = "YYYY-MM")]
    from: Option<String>,

    /// Last sale month to include, YYYY-MM
    #[arg(long, value_name = "YYYY-MM")]
    to: Option<String>,

    /// Weight of the price-trend Z-score
    #[arg(long)]
    price_weight: Option<f64>,

    /// Weight of the sales-volume Z-score
    #[arg(long)]
    volume_weight: Option<f64>,

    /// Drop rows missing a tax key, district or price instead of failing
    #[arg(long)]
    drop_incomplete: bool,

    /// Fail when a metric has zero standard deviation
    #[arg(long)]
    fail_on_zero_stddev: bool,

    /// Number of top districts to print
    #[arg(long, default_value_t = 10)]
    top: usize,
}

impl Cli {
    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let file_config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        let overrides = ConfigOverrides {
            delimiter: self.delimiter,
            from_month: self.from.clone(),
            to_month: self.to.clone(),
            price_weight: self.price_weight,
            volume_weight: self.volume_weight,
            drop_incomplete_rows: self.drop_incomplete,
            fail_on_zero_stddev: self.fail_on_zero_stddev,
        };
        Ok(file_config.with_overrides(&overrides)?)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if !cli.input.exists() {
        bail!("Input not found: {}", cli.input.display());
    }

    let config = cli.pipeline_config()?;
    info!("{config}");

    let start = Instant::now();
    let output = run_from_path(&cli.input, &config)
        .with_context(|| format!("scoring districts from {}", cli.input.display()))?;
    info!("{}", output.report);

    write_scores(&cli.output, &output.scores)
        .with_context(|| format!("writing ranking to {}", cli.output.display()))?;
    if let Some(metrics_path) = &cli.metrics {
        write_breakdown(metrics_path, &output.breakdowns)
            .with_context(|| format!("writing metrics to {}", metrics_path.display()))?;
    }

    if cli.top > 0 && !output.breakdowns.is_empty() {
        print_ranking(&output.breakdowns, cli.top);
    }
    info!(
        "Ranked {} districts in {:?}",
        output.scores.len(),
        start.elapsed()
    );

    Ok(())
}
