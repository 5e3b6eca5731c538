//! Field extraction utilities for Arrow record batches
//!
//! Column accessors return `None` when a column is absent so optional fields
//! can be read without special-casing; the per-row helpers then treat a
//! missing column like a null cell.

use arrow::array::{Array, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use crate::error::Result;
use crate::schema::dates::days_to_date;
use crate::utils::arrow::array_utils::downcast_array;

/// Borrow a Utf8 column by name
pub fn string_column<'a>(batch: &'a RecordBatch, column_name: &str) -> Result<Option<&'a StringArray>> {
    batch
        .column_by_name(column_name)
        .map(|array| downcast_array::<StringArray>(array.as_ref(), column_name, "Utf8"))
        .transpose()
}

/// Borrow an Int64 column by name
pub fn int64_column<'a>(batch: &'a RecordBatch, column_name: &str) -> Result<Option<&'a Int64Array>> {
    batch
        .column_by_name(column_name)
        .map(|array| downcast_array::<Int64Array>(array.as_ref(), column_name, "Int64"))
        .transpose()
}

/// Borrow a Float64 column by name
pub fn float64_column<'a>(
    batch: &'a RecordBatch,
    column_name: &str,
) -> Result<Option<&'a Float64Array>> {
    batch
        .column_by_name(column_name)
        .map(|array| downcast_array::<Float64Array>(array.as_ref(), column_name, "Float64"))
        .transpose()
}

/// Borrow a Date32 column by name
pub fn date32_column<'a>(
    batch: &'a RecordBatch,
    column_name: &str,
) -> Result<Option<&'a Date32Array>> {
    batch
        .column_by_name(column_name)
        .map(|array| downcast_array::<Date32Array>(array.as_ref(), column_name, "Date32"))
        .transpose()
}

/// Non-empty string at `row`, if any
#[must_use]
pub fn optional_string(array: Option<&StringArray>, row: usize) -> Option<String> {
    let array = array?;
    if array.is_null(row) {
        return None;
    }
    let value = array.value(row);
    (!value.is_empty()).then(|| value.to_string())
}

/// Integer at `row`, if any
#[must_use]
pub fn optional_i64(array: Option<&Int64Array>, row: usize) -> Option<i64> {
    array.filter(|a| !a.is_null(row)).map(|a| a.value(row))
}

/// Float at `row`, if any
#[must_use]
pub fn optional_f64(array: Option<&Float64Array>, row: usize) -> Option<f64> {
    array.filter(|a| !a.is_null(row)).map(|a| a.value(row))
}

/// Date at `row`, if any
#[must_use]
pub fn optional_date(array: Option<&Date32Array>, row: usize) -> Option<NaiveDate> {
    array
        .filter(|a| !a.is_null(row))
        .and_then(|a| days_to_date(a.value(row)))
}
