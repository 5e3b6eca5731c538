//! Core filtering functionality for record batches

use std::collections::HashSet;

use arrow::array::{ArrayRef, BooleanArray};
use arrow::compute::filter as arrow_filter;
use arrow::record_batch::RecordBatch;

use crate::error::{Error, Result};

/// Filter a record batch based on a boolean mask
///
/// Rows where the mask is false or null are removed.
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(Error::Validation(format!(
            "Mask length ({}) doesn't match batch row count ({})",
            mask.len(),
            batch.num_rows()
        )));
    }

    let filtered_columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|col| arrow_filter(col, mask))
        .collect::<arrow::error::Result<_>>()?;

    Ok(RecordBatch::try_new(batch.schema(), filtered_columns)?)
}

/// Trait for objects that can filter record batches
pub trait BatchFilter: std::fmt::Debug {
    /// Filter a record batch
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch>;

    /// Returns the set of column names required by this filter
    fn required_columns(&self) -> HashSet<String>;
}

/// Apply a filter to every batch, dropping batches left empty
pub fn apply_filter(filter: &dyn BatchFilter, batches: &[RecordBatch]) -> Result<Vec<RecordBatch>> {
    for column in filter.required_columns() {
        if let Some(batch) = batches.first() {
            if batch.schema().index_of(&column).is_err() {
                return Err(Error::Validation(format!(
                    "Filter {filter:?} needs column '{column}', which the input does not have"
                )));
            }
        }
    }

    let mut filtered = Vec::with_capacity(batches.len());
    for batch in batches {
        let batch = filter.filter(batch)?;
        if batch.num_rows() > 0 {
            filtered.push(batch);
        }
    }
    Ok(filtered)
}
