//! Utilities for working with Arrow arrays.

use arrow::array::{Array, ArrayRef};
use arrow::compute::{CastOptions, cast_with_options};
use arrow::datatypes::DataType;

use crate::error::{Error, Result};

/// Downcast a dynamically typed array, naming the column in the error
pub fn downcast_array<'a, T: Array + 'static>(
    array: &'a dyn Array,
    column_name: &str,
    expected: &str,
) -> Result<&'a T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        Error::Validation(format!(
            "Column '{column_name}' is {:?}, expected {expected}",
            array.data_type()
        ))
    })
}

/// Cast a column to `target`, failing on values that cannot be represented.
///
/// Runs with `safe: false`, so an unparseable value is an error rather than a null.
pub fn cast_column(array: &ArrayRef, target: &DataType, column_name: &str) -> Result<ArrayRef> {
    if array.data_type() == target {
        return Ok(array.clone());
    }

    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    cast_with_options(array, target, &options).map_err(|e| {
        Error::Validation(format!(
            "Cannot convert column '{column_name}' from {:?} to {target:?}: {e}",
            array.data_type()
        ))
    })
}

/// Cast a column to `target`, turning values that cannot be represented into nulls.
///
/// Returns the cast column and the number of non-null values that became null.
pub fn cast_column_lenient(
    array: &ArrayRef,
    target: &DataType,
    column_name: &str,
) -> Result<(ArrayRef, usize)> {
    if array.data_type() == target {
        return Ok((array.clone(), 0));
    }

    let cast = cast_with_options(array, target, &CastOptions::default()).map_err(|e| {
        Error::Validation(format!(
            "Cannot convert column '{column_name}' from {:?} to {target:?}: {e}",
            array.data_type()
        ))
    })?;
    let nulled = cast.null_count().saturating_sub(array.null_count());
    Ok((cast, nulled))
}
