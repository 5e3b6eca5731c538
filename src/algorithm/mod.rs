//! Aggregation and scoring stages of the district pipeline
//!
//! Each stage is a pure function over the loaded sales or the output of the
//! previous stage; [`pipeline`] runs them in order.

pub mod pipeline;
pub mod price_trend;
pub mod scoring;
pub mod stats;
pub mod volume;

pub use pipeline::{PipelineOutput, PipelineReport, run_from_path, run_pipeline};
pub use price_trend::{DistrictPriceTrend, PriceTrendSummary, annualized_change, average_annual_price_increase};
pub use scoring::{ScoringOutcome, combine_metrics, rank_scores, score_districts};
pub use volume::{DistrictVolume, average_monthly_sales, monthly_sales_counts};
