//! Per-district metrics and scores

use serde::{Deserialize, Serialize};

/// Aggregated metrics for one district
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictMetric {
    /// District code
    pub district: i64,
    /// Mean annualized price change over repeat-sale pairs; `None` without a valid pair
    pub avg_annual_price_increase: Option<f64>,
    /// Mean number of sales per month with at least one sale
    pub avg_monthly_sales: f64,
    /// Sales in the district
    pub sale_count: usize,
    /// Distinct months with at least one sale
    pub month_count: usize,
    /// Repeat-sale pairs that contributed to the price metric
    pub price_pair_count: usize,
}

/// Final score of a district
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistrictScore {
    /// District code
    pub district: i64,
    /// Weighted Z-score sum, rounded to two decimals
    pub investment_score: f64,
}

/// Full scoring detail for one ranked district
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictBreakdown {
    /// 1-based position in the ranking
    pub rank: u32,
    /// District code
    pub district: i64,
    /// Raw price-trend metric
    pub avg_annual_price_increase: f64,
    /// Raw sales-volume metric
    pub avg_monthly_sales: f64,
    /// Z-score of the price-trend metric
    pub z_price: f64,
    /// Z-score of the sales-volume metric
    pub z_volume: f64,
    /// Weighted score, rounded to two decimals
    pub investment_score: f64,
}

impl From<&DistrictBreakdown> for DistrictScore {
    fn from(breakdown: &DistrictBreakdown) -> Self {
        Self {
            district: breakdown.district,
            investment_score: breakdown.investment_score,
        }
    }
}
