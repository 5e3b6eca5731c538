//! Repeat-sale selection
//!
//! Groups sales by tax key and keeps the properties that sold more than once.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::models::{PropertySale, RepeatSaleGroup, SaleEvent};

/// Counts describing a repeat-sale selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepeatSaleSummary {
    /// Distinct tax keys in the input
    pub properties: usize,
    /// Tax keys with more than one sale
    pub repeat_properties: usize,
    /// Sales belonging to repeat properties
    pub repeat_sales: usize,
}

/// Group sales by tax key, keeping only properties with at least two sales.
///
/// Groups are returned sorted by tax key; events within a group are in date
/// order, ties in input order.
#[must_use]
pub fn repeat_sale_groups(sales: &[PropertySale]) -> (Vec<RepeatSaleGroup>, RepeatSaleSummary) {
    let mut by_taxkey: FxHashMap<&str, SmallVec<[SaleEvent; 4]>> = FxHashMap::default();
    for sale in sales {
        by_taxkey
            .entry(sale.taxkey.as_str())
            .or_default()
            .push(sale.event());
    }

    let properties = by_taxkey.len();
    let mut groups: Vec<RepeatSaleGroup> = by_taxkey
        .into_iter()
        .filter_map(|(taxkey, events)| RepeatSaleGroup::new(taxkey.to_string(), events))
        .collect();
    groups.sort_unstable_by(|a, b| a.taxkey().cmp(b.taxkey()));

    let summary = RepeatSaleSummary {
        properties,
        repeat_properties: groups.len(),
        repeat_sales: groups.iter().map(RepeatSaleGroup::len).sum(),
    };

    log::debug!(
        "{} of {} properties sold more than once ({} sales)",
        summary.repeat_properties,
        summary.properties,
        summary.repeat_sales
    );

    (groups, summary)
}
