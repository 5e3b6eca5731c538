//! Sale-month window filtering
//!
//! Restricts loaded sales to an inclusive range of months.

use std::collections::HashSet;

use arrow::array::{BooleanArray, Date32Array};
use arrow::compute::kernels::{boolean, cmp};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::filter::core::{BatchFilter, filter_record_batch};
use crate::schema::SALE_DATE;
use crate::schema::dates::{date_to_days, month_start};

/// Keeps rows whose sale month lies within `[start, end]`
#[derive(Debug, Clone)]
pub struct SaleMonthFilter {
    /// The name of the date column
    date_column: String,

    /// First month kept
    start: Option<NaiveDate>,

    /// Last month kept
    end: Option<NaiveDate>,
}

impl SaleMonthFilter {
    /// Create a filter on the sale date column. Bounds are truncated to the
    /// first of their month, so any day of a month selects the whole month.
    #[must_use]
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            date_column: SALE_DATE.to_string(),
            start: start.map(month_start),
            end: end.map(month_start),
        }
    }

    /// Whether any bound is set
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

impl BatchFilter for SaleMonthFilter {
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let date_array = batch
            .column_by_name(&self.date_column)
            .ok_or_else(|| {
                Error::Validation(format!("Date column '{}' not found", self.date_column))
            })?
            .as_any()
            .downcast_ref::<Date32Array>()
            .ok_or_else(|| {
                Error::Validation(format!("Column '{}' is not a Date32 array", self.date_column))
            })?;

        let mut in_range = BooleanArray::from(vec![true; batch.num_rows()]);

        if let Some(start) = self.start {
            let start_days = Date32Array::new_scalar(date_to_days(start));
            let ge_result = cmp::gt_eq(date_array, &start_days)?;
            in_range = boolean::and(&in_range, &ge_result)?;
        }

        if let Some(end) = self.end {
            let end_days = Date32Array::new_scalar(date_to_days(end));
            let le_result = cmp::lt_eq(date_array, &end_days)?;
            in_range = boolean::and(&in_range, &le_result)?;
        }

        filter_record_batch(batch, &in_range)
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::from([self.date_column.clone()])
    }
}
