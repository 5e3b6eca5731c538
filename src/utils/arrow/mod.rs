//! Arrow data handling utilities
//!
//! Helpers for locating, casting and reading typed columns of record batches.

pub mod array_utils;
pub mod extractors;

pub use array_utils::{cast_column, cast_column_lenient, downcast_array};
pub use extractors::{
    date32_column, float64_column, int64_column, optional_date, optional_f64, optional_i64,
    optional_string, string_column,
};
