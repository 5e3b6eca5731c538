//! Normalization, weighting and ranking of district metrics

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::algorithm::price_trend::DistrictPriceTrend;
use crate::algorithm::stats::{Moments, population_moments, round_to};
use crate::algorithm::volume::DistrictVolume;
use crate::config::ScoringConfig;
use crate::error::{Error, Result};
use crate::models::{DistrictBreakdown, DistrictMetric, DistrictScore};

/// Name of the price-trend metric in reports and logs
pub const PRICE_METRIC: &str = "avg_annual_price_increase";
/// Name of the sales-volume metric in reports and logs
pub const VOLUME_METRIC: &str = "avg_monthly_sales";

/// Decimal places of the final score
pub const SCORE_DECIMALS: i32 = 2;

/// Result of scoring a set of district metrics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringOutcome {
    /// Ranked districts with their intermediate values
    pub breakdowns: Vec<DistrictBreakdown>,
    /// Districts left out because they have no price-trend metric
    pub excluded: Vec<i64>,
    /// Metrics whose standard deviation was zero; their Z-scores are all 0
    pub degenerate_metrics: Vec<String>,
}

impl ScoringOutcome {
    /// The ranking as `(district, score)` pairs
    #[must_use]
    pub fn scores(&self) -> Vec<DistrictScore> {
        self.breakdowns.iter().map(DistrictScore::from).collect()
    }
}

/// Join the two per-district metrics. Every district with sales appears; the
/// price metric is `None` where no valid repeat-sale pair exists.
#[must_use]
pub fn combine_metrics(
    price: &BTreeMap<i64, DistrictPriceTrend>,
    volume: &BTreeMap<i64, DistrictVolume>,
) -> Vec<DistrictMetric> {
    volume
        .iter()
        .map(|(&district, volume)| {
            let trend = price.get(&district);
            DistrictMetric {
                district,
                avg_annual_price_increase: trend.map(|t| t.avg_annual_price_increase),
                avg_monthly_sales: volume.avg_monthly_sales,
                sale_count: volume.sale_count,
                month_count: volume.month_count,
                price_pair_count: trend.map_or(0, |t| t.pair_count),
            }
        })
        .collect()
}

/// Z-scores of one metric over the scored population.
///
/// A degenerate spread gives all-zero scores, or an error when configured to fail.
fn normalize(
    metric: &str,
    values: &[f64],
    config: &ScoringConfig,
    degenerate: &mut Vec<String>,
) -> Result<Vec<f64>> {
    let Some(moments) = population_moments(values) else {
        return Ok(Vec::new());
    };

    if moments.is_degenerate() {
        if config.fail_on_zero_stddev {
            return Err(Error::DegenerateMetric {
                metric: metric.to_string(),
                stddev: moments.stddev,
            });
        }
        log::warn!(
            "Standard deviation of {metric} is {} across {} districts; its Z-scores are set to 0",
            moments.stddev,
            values.len()
        );
        degenerate.push(metric.to_string());
        return Ok(vec![0.0; values.len()]);
    }

    log_moments(metric, &moments);
    Ok(values
        .iter()
        .map(|v| (v - moments.mean) / moments.stddev)
        .collect())
}

fn log_moments(metric: &str, moments: &Moments) {
    log::debug!(
        "{metric}: mean {:.4}, population stddev {:.4}",
        moments.mean,
        moments.stddev
    );
}

/// Normalize both metrics, weight them and rank the districts.
///
/// Only districts with both metrics are scored, and the means and standard
/// deviations are taken over exactly those districts.
pub fn score_districts(metrics: &[DistrictMetric], config: &ScoringConfig) -> Result<ScoringOutcome> {
    let (scored, excluded): (Vec<&DistrictMetric>, Vec<&DistrictMetric>) = metrics
        .iter()
        .partition(|m| m.avg_annual_price_increase.is_some());

    let excluded: Vec<i64> = excluded.iter().map(|m| m.district).collect();
    if !excluded.is_empty() {
        log::warn!(
            "{} districts have no repeat-sale pair spanning calendar years and are not scored: {:?}",
            excluded.len(),
            excluded
        );
    }

    let price: Vec<f64> = scored
        .iter()
        .filter_map(|m| m.avg_annual_price_increase)
        .collect();
    let volume: Vec<f64> = scored.iter().map(|m| m.avg_monthly_sales).collect();

    let mut degenerate_metrics = Vec::new();
    let z_price = normalize(PRICE_METRIC, &price, config, &mut degenerate_metrics)?;
    let z_volume = normalize(VOLUME_METRIC, &volume, config, &mut degenerate_metrics)?;

    let mut breakdowns: Vec<DistrictBreakdown> = scored
        .iter()
        .zip(price.iter().zip(&volume))
        .zip(z_price.iter().zip(&z_volume))
        .map(|((metric, (&price, &volume)), (&z_price, &z_volume))| {
            let score = config.price_weight * z_price + config.volume_weight * z_volume;
            DistrictBreakdown {
                rank: 0,
                district: metric.district,
                avg_annual_price_increase: price,
                avg_monthly_sales: volume,
                z_price,
                z_volume,
                investment_score: round_to(score, SCORE_DECIMALS),
            }
        })
        .collect();

    rank_scores(&mut breakdowns);

    Ok(ScoringOutcome {
        breakdowns,
        excluded,
        degenerate_metrics,
    })
}

/// Order by score descending, then district ascending, and assign 1-based ranks
pub fn rank_scores(breakdowns: &mut [DistrictBreakdown]) {
    breakdowns.sort_by(compare_ranked);
    for (idx, breakdown) in breakdowns.iter_mut().enumerate() {
        breakdown.rank = u32::try_from(idx + 1).unwrap_or(u32::MAX);
    }
}

fn compare_ranked(a: &DistrictBreakdown, b: &DistrictBreakdown) -> Ordering {
    b.investment_score
        .total_cmp(&a.investment_score)
        .then_with(|| a.district.cmp(&b.district))
}
