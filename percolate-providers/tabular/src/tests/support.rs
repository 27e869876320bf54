use std::sync::Arc;

use arrow_array::{ArrayRef, Float32Array, Float64Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use bytes::Bytes;
use parquet::arrow::arrow_writer::ArrowWriter;

use crate::COORDINATE_COLUMNS;

/// Builds a batch of non-null `Float64` coordinate columns.
pub(crate) fn float64_batch(rows: &[[f64; 4]]) -> RecordBatch {
    let columns = (0..4)
        .map(|column| {
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|row| row[column])))
                as ArrayRef
        })
        .collect();
    batch_with_type(DataType::Float64, columns)
}

/// Builds a batch of non-null `Float32` coordinate columns.
pub(crate) fn float32_batch(rows: &[[f32; 4]]) -> RecordBatch {
    let columns = (0..4)
        .map(|column| {
            Arc::new(Float32Array::from_iter_values(rows.iter().map(|row| row[column])))
                as ArrayRef
        })
        .collect();
    batch_with_type(DataType::Float32, columns)
}

pub(crate) fn batch_with_type(data_type: DataType, columns: Vec<ArrayRef>) -> RecordBatch {
    let fields = COORDINATE_COLUMNS
        .iter()
        .zip(&columns)
        .map(|(name, column)| Field::new(*name, data_type.clone(), column.null_count() > 0))
        .collect::<Vec<_>>();
    batch_from_fields(fields, columns)
}

pub(crate) fn batch_from_fields(fields: Vec<Field>, columns: Vec<ArrayRef>) -> RecordBatch {
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).expect("batch")
}

pub(crate) fn write_parquet(batches: &[RecordBatch]) -> Bytes {
    let schema = batches.first().expect("at least one batch").schema();
    let mut buffer = Vec::new();
    {
        let mut writer = ArrowWriter::try_new(&mut buffer, schema, None).expect("writer");
        for batch in batches {
            writer.write(batch).expect("write");
        }
        writer.close().expect("close");
    }
    Bytes::from(buffer)
}
