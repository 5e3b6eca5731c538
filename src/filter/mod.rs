//! Row selection over loaded sales
//!
//! Batch-level filters run on Arrow record batches before records are
//! extracted; the repeat-sale filter groups extracted sales by property.

pub mod core;
pub mod date;
pub mod repeat;

pub use self::core::{BatchFilter, apply_filter, filter_record_batch};
pub use date::SaleMonthFilter;
pub use repeat::{RepeatSaleSummary, repeat_sale_groups};
