//! Sale-date conversion between `YYYY-MM` text and Arrow Date32.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Date32Array, StringArray};
use chrono::{Datelike, NaiveDate};

use crate::error::{Error, Result};

/// Days from 0001-01-01 (CE day 1) to the Unix epoch
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parse a strict `YYYY-MM` string into the first day of that month.
///
/// Surrounding whitespace is ignored. Anything else (a day component, a
/// single-digit month, a month outside 1..=12) is rejected.
#[must_use]
pub fn parse_year_month(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let bytes = value.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return None;
    }
    if !bytes[..4].iter().chain(&bytes[5..]).all(u8::is_ascii_digit) {
        return None;
    }

    let year: i32 = value[..4].parse().ok()?;
    let month: u32 = value[5..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Truncate a date to the first day of its month
#[must_use]
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Days since the Unix epoch, as stored in a Date32 array
#[must_use]
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Inverse of [`date_to_days`]
#[must_use]
pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

/// Convert a `YYYY-MM` string column into a Date32 column with the day fixed to 1.
///
/// A null or malformed value fails the conversion; `row_offset` and
/// `source_name` locate the offending row in the error.
pub fn year_month_to_date32(
    array: &ArrayRef,
    row_offset: usize,
    source_name: &str,
) -> Result<ArrayRef> {
    let string_array = array
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| {
            Error::Validation(format!(
                "sale date column in {source_name} is {:?}, expected text",
                array.data_type()
            ))
        })?;

    let mut builder = Date32Array::builder(string_array.len());

    for i in 0..string_array.len() {
        let raw = (!string_array.is_null(i)).then(|| string_array.value(i));
        match raw.and_then(parse_year_month) {
            Some(date) => builder.append_value(date_to_days(date)),
            None => {
                return Err(Error::InvalidSaleDate {
                    value: raw.map(str::to_string),
                    row: row_offset + i,
                    source_name: source_name.to_string(),
                });
            }
        }
    }

    Ok(Arc::new(builder.finish()) as ArrayRef)
}

/// Truncate every date in a Date32 column to the first of its month.
///
/// Used for inputs that already carry typed dates. Nulls are rejected the same
/// way malformed strings are.
pub fn truncate_date32_to_month(
    array: &ArrayRef,
    row_offset: usize,
    source_name: &str,
) -> Result<ArrayRef> {
    let date_array = array
        .as_any()
        .downcast_ref::<Date32Array>()
        .ok_or_else(|| {
            Error::Validation(format!(
                "sale date column in {source_name} is {:?}, expected Date32",
                array.data_type()
            ))
        })?;

    let mut builder = Date32Array::builder(date_array.len());
    for i in 0..date_array.len() {
        let date = (!date_array.is_null(i))
            .then(|| days_to_date(date_array.value(i)))
            .flatten();
        match date {
            Some(date) => builder.append_value(date_to_days(month_start(date))),
            None => {
                return Err(Error::InvalidSaleDate {
                    value: None,
                    row: row_offset + i,
                    source_name: source_name.to_string(),
                });
            }
        }
    }

    Ok(Arc::new(builder.finish()) as ArrayRef)
}
