//! District investment scores from historical property sales.
//!
//! Sales are loaded into Arrow record batches, properties sold more than once
//! yield an annualized price trend per district, monthly sale counts yield a
//! volume metric, and both are Z-normalized and combined into a weighted,
//! ranked score.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod models;
pub mod schema;
pub mod utils;
pub mod writer;

// Core types
pub use config::{LoaderConfig, PipelineConfig, ScoringConfig};
pub use error::{Error, Result};
pub use models::{DistrictBreakdown, DistrictMetric, DistrictScore, PropertySale, RepeatSaleGroup};

// Pipeline entry points
pub use algorithm::{PipelineOutput, PipelineReport, run_from_path, run_pipeline};
pub use loader::{LoadedSales, load_sales};
pub use writer::{write_breakdown, write_scores};

// Arrow types
pub use arrow::record_batch::RecordBatch;
