use arrow_schema::{ArrowError, DataType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TabularError {
    #[error("input contains no coordinate rows")]
    EmptyInput,
    #[error("column `{column}` not found in Parquet schema")]
    ColumnNotFound { column: String },
    #[error("column `{column}` must be Float32 or Float64 but found {actual:?}")]
    InvalidColumnType { column: String, actual: DataType },
    #[error("column `{column}` is null at row {row}")]
    NullValue { column: String, row: usize },
    #[error("line {line} has {actual} fields but expected 4")]
    FieldCount { line: usize, actual: usize },
    #[error("line {line}: `{value}` is not a number")]
    InvalidNumber { line: usize, value: String },
    #[error("cannot derive a dataset name from `{path}`")]
    UnnamedPath { path: String },
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl TabularError {
    /// Returns a stable, machine-readable code for the error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyInput => "TABULAR_EMPTY_INPUT",
            Self::ColumnNotFound { .. } => "TABULAR_COLUMN_NOT_FOUND",
            Self::InvalidColumnType { .. } => "TABULAR_INVALID_COLUMN_TYPE",
            Self::NullValue { .. } => "TABULAR_NULL_VALUE",
            Self::FieldCount { .. } => "TABULAR_FIELD_COUNT",
            Self::InvalidNumber { .. } => "TABULAR_INVALID_NUMBER",
            Self::UnnamedPath { .. } => "TABULAR_UNNAMED_PATH",
            Self::Arrow(_) => "TABULAR_ARROW",
            Self::Parquet(_) => "TABULAR_PARQUET",
            Self::Io(_) => "TABULAR_IO",
        }
    }
}
