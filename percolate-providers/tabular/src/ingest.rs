//! Helpers for ingesting Parquet coordinate columns into row pairs.
use arrow_array::{Array, ArrayRef, Float32Array, Float64Array, RecordBatch};
use arrow_schema::{DataType, Schema};
use percolate_core::CoordinatePair;

use crate::{COORDINATE_COLUMNS, errors::TabularError};

/// Resolves the four coordinate columns and checks their types.
pub(crate) fn validate_coordinate_columns(schema: &Schema) -> Result<[usize; 4], TabularError> {
    let mut indices = [0_usize; 4];
    for (slot, column) in indices.iter_mut().zip(COORDINATE_COLUMNS) {
        let index = schema
            .index_of(column)
            .map_err(|_| TabularError::ColumnNotFound {
                column: column.to_owned(),
            })?;
        match schema.field(index).data_type() {
            DataType::Float32 | DataType::Float64 => *slot = index,
            other => {
                return Err(TabularError::InvalidColumnType {
                    column: column.to_owned(),
                    actual: other.clone(),
                });
            }
        }
    }
    Ok(indices)
}

/// Appends every row of `batch` to `out`.
pub(crate) fn append_batch(
    batch: &RecordBatch,
    indices: [usize; 4],
    start_row: usize,
    out: &mut Vec<CoordinatePair>,
) -> Result<(), TabularError> {
    let mut columns = Vec::with_capacity(indices.len());
    for (index, column) in indices.into_iter().zip(COORDINATE_COLUMNS) {
        columns.push(column_values(batch.column(index), column, start_row)?);
    }
    let [x1, y1, x2, y2] = columns.as_slice() else {
        return Ok(());
    };
    out.reserve(batch.num_rows());
    out.extend(
        x1.iter()
            .zip(y1)
            .zip(x2)
            .zip(y2)
            .map(|(((&x1, &y1), &x2), &y2)| CoordinatePair::new(x1, y1, x2, y2)),
    );
    Ok(())
}

pub(crate) fn column_values(
    array: &ArrayRef,
    column: &str,
    start_row: usize,
) -> Result<Vec<f64>, TabularError> {
    if array.null_count() > 0 {
        let row = (0..array.len())
            .find(|&index| array.is_null(index))
            .unwrap_or_default();
        return Err(TabularError::NullValue {
            column: column.to_owned(),
            row: start_row + row,
        });
    }
    let invalid = || TabularError::InvalidColumnType {
        column: column.to_owned(),
        actual: array.data_type().clone(),
    };
    match array.data_type() {
        DataType::Float64 => {
            let floats = array
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(invalid)?;
            Ok(floats.values().to_vec())
        }
        DataType::Float32 => {
            let floats = array
                .as_any()
                .downcast_ref::<Float32Array>()
                .ok_or_else(invalid)?;
            Ok(floats.values().iter().copied().map(f64::from).collect())
        }
        _ => Err(invalid()),
    }
}
