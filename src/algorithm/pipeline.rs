//! End-to-end district scoring
//!
//! Runs repeat-sale selection, both aggregations and the scorer over a set
//! of loaded sales, collecting counters for the run as it goes.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use crate::algorithm::price_trend::average_annual_price_increase;
use crate::algorithm::scoring::{combine_metrics, score_districts};
use crate::algorithm::volume::average_monthly_sales;
use crate::config::{PipelineConfig, ScoringConfig};
use crate::error::Result;
use crate::filter::{SaleMonthFilter, apply_filter, repeat_sale_groups};
use crate::loader::load_sales;
use crate::models::{DistrictBreakdown, DistrictMetric, DistrictScore, PropertySale};

/// Counters describing one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Rows read from the input
    pub rows_loaded: usize,
    /// Rows dropped for missing required values
    pub rows_dropped: usize,
    /// Rows left after the sale-month window
    pub rows_in_window: usize,
    /// Distinct properties
    pub properties: usize,
    /// Properties sold more than once
    pub repeat_properties: usize,
    /// Consecutive-sale pairs used for price trends
    pub valid_pairs: usize,
    /// Consecutive-sale pairs within one calendar year, skipped
    pub same_year_pairs: usize,
    /// Districts with at least one sale
    pub districts_with_sales: usize,
    /// Districts with a price-trend metric
    pub districts_with_price_trend: usize,
    /// Districts in the final ranking
    pub districts_scored: usize,
    /// Districts left out for lacking a price-trend metric
    pub excluded_districts: Vec<i64>,
    /// Metrics whose standard deviation was zero
    pub degenerate_metrics: Vec<String>,
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Report:")?;
        writeln!(f, "  Rows Loaded: {}", self.rows_loaded)?;
        if self.rows_dropped > 0 {
            writeln!(f, "  Rows Dropped: {}", self.rows_dropped)?;
        }
        writeln!(f, "  Rows In Window: {}", self.rows_in_window)?;
        writeln!(
            f,
            "  Repeat Properties: {} of {}",
            self.repeat_properties, self.properties
        )?;
        writeln!(
            f,
            "  Sale Pairs: {} used, {} same-year skipped",
            self.valid_pairs, self.same_year_pairs
        )?;
        writeln!(
            f,
            "  Districts: {} with sales, {} with price trend, {} scored",
            self.districts_with_sales, self.districts_with_price_trend, self.districts_scored
        )?;
        if !self.excluded_districts.is_empty() {
            writeln!(f, "  Excluded Districts: {:?}", self.excluded_districts)?;
        }
        if self.degenerate_metrics.is_empty() {
            write!(f, "  Degenerate Metrics: none")
        } else {
            write!(f, "  Degenerate Metrics: {}", self.degenerate_metrics.join(", "))
        }
    }
}

/// Everything a run produces
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Ranked `(district, score)` pairs
    pub scores: Vec<DistrictScore>,
    /// Ranked districts with raw metrics and Z-scores
    pub breakdowns: Vec<DistrictBreakdown>,
    /// Metrics of every district with sales, scored or not
    pub metrics: Vec<DistrictMetric>,
    /// Run counters
    pub report: PipelineReport,
}

/// Score districts from already loaded sales
pub fn run_pipeline(sales: &[PropertySale], config: &ScoringConfig) -> Result<PipelineOutput> {
    let start = Instant::now();
    log::info!("Scoring districts from {} sales", sales.len());

    let (groups, repeat_summary) = repeat_sale_groups(sales);
    log::info!(
        "{} properties sold more than once",
        repeat_summary.repeat_properties
    );

    let (price_trends, trend_summary) = average_annual_price_increase(&groups);
    let volumes = average_monthly_sales(sales);
    let metrics = combine_metrics(&price_trends, &volumes);

    let outcome = score_districts(&metrics, config)?;
    if outcome.breakdowns.is_empty() {
        log::warn!("No district has both a price trend and sales volume; nothing to rank");
    }

    let report = PipelineReport {
        rows_loaded: sales.len(),
        rows_dropped: 0,
        rows_in_window: sales.len(),
        properties: repeat_summary.properties,
        repeat_properties: repeat_summary.repeat_properties,
        valid_pairs: trend_summary.valid_pairs,
        same_year_pairs: trend_summary.same_year_pairs,
        districts_with_sales: volumes.len(),
        districts_with_price_trend: price_trends.len(),
        districts_scored: outcome.breakdowns.len(),
        excluded_districts: outcome.excluded.clone(),
        degenerate_metrics: outcome.degenerate_metrics.clone(),
    };

    log::info!(
        "Scored {} districts in {:?}",
        report.districts_scored,
        start.elapsed()
    );

    Ok(PipelineOutput {
        scores: outcome.scores(),
        breakdowns: outcome.breakdowns,
        metrics,
        report,
    })
}

/// Load sales from `path`, apply the configured sale-month window and score them
pub fn run_from_path(path: &Path, config: &PipelineConfig) -> Result<PipelineOutput> {
    config.validate()?;

    let loaded = load_sales(path, &config.loader)?;
    let rows_loaded = loaded.num_rows();

    let month_filter = SaleMonthFilter::new(config.loader.from_month, config.loader.to_month);
    let batches = if month_filter.is_bounded() {
        let batches = apply_filter(&month_filter, &loaded.batches)?;
        let kept: usize = batches.iter().map(|b| b.num_rows()).sum();
        log::info!("Sale-month window kept {kept} of {rows_loaded} sales");
        batches
    } else {
        loaded.batches
    };

    let sales = PropertySale::from_record_batches(&batches)?;

    let mut output = run_pipeline(&sales, &config.scoring)?;
    output.report.rows_loaded = rows_loaded;
    output.report.rows_dropped = loaded.dropped_rows;
    output.report.rows_in_window = sales.len();
    Ok(output)
}
