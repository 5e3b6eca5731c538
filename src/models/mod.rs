//! Domain models for the district scoring pipeline
//!
//! Loaded sales, the derived repeat-sale groups, and the per-district
//! metrics and scores produced from them.

pub mod district;
pub mod sale;

pub use district::{DistrictBreakdown, DistrictMetric, DistrictScore};
pub use sale::{PropertySale, RepeatSaleGroup, SaleEvent};
