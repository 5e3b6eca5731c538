//! Repeat-sale price trends
//!
//! Consecutive sales of the same property give a price change per elapsed
//! calendar year; the mean of those changes is the district's price metric.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::models::{RepeatSaleGroup, SaleEvent};

/// Price-trend metric of one district
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistrictPriceTrend {
    /// Mean annualized price change
    pub avg_annual_price_increase: f64,
    /// Pairs that contributed
    pub pair_count: usize,
}

/// Counts of consecutive-sale pairs seen by the aggregator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceTrendSummary {
    /// Pairs with a positive year gap
    pub valid_pairs: usize,
    /// Pairs sold within the same calendar year, excluded from the average
    pub same_year_pairs: usize,
}

/// Annualized price change between two consecutive sales.
///
/// The gap is the difference of calendar years, so sales in the same year
/// have no defined rate and yield `None`.
#[must_use]
pub fn annualized_change(prev: &SaleEvent, next: &SaleEvent) -> Option<f64> {
    let year_gap = next.year() - prev.year();
    if year_gap == 0 {
        return None;
    }
    let price_change = next.sale_price as f64 - prev.sale_price as f64;
    Some(price_change / f64::from(year_gap))
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

/// Mean annualized price change per district.
///
/// A pair is credited to the district recorded on its later sale. Districts
/// without a valid pair are absent from the result.
#[must_use]
pub fn average_annual_price_increase(
    groups: &[RepeatSaleGroup],
) -> (BTreeMap<i64, DistrictPriceTrend>, PriceTrendSummary) {
    let mut by_district: BTreeMap<i64, Accumulator> = BTreeMap::new();
    let mut summary = PriceTrendSummary::default();

    for group in groups {
        for (prev, next) in group.events().iter().tuple_windows() {
            match annualized_change(prev, next) {
                Some(change) => {
                    let acc = by_district.entry(next.district).or_default();
                    acc.sum += change;
                    acc.count += 1;
                    summary.valid_pairs += 1;
                }
                None => summary.same_year_pairs += 1,
            }
        }
    }

    if summary.same_year_pairs > 0 {
        log::info!(
            "Excluded {} repeat-sale pairs sold within the same calendar year",
            summary.same_year_pairs
        );
    }

    let trends = by_district
        .into_iter()
        .map(|(district, acc)| {
            let trend = DistrictPriceTrend {
                avg_annual_price_increase: acc.sum / acc.count as f64,
                pair_count: acc.count,
            };
            log::debug!(
                "District {district}: {} pairs, mean annual change {:.2}",
                trend.pair_count,
                trend.avg_annual_price_increase
            );
            (district, trend)
        })
        .collect();

    (trends, summary)
}
