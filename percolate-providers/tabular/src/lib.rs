//! Tabular coordinate providers for empirical proximity graphs.
//!
//! Loads `(x1, y1, x2, y2)` rows from Parquet files or delimited text and
//! exposes them through [`percolate_core::CoordinateSource`].

mod delimited;
mod errors;
mod ingest;
mod table;

pub use errors::TabularError;
pub use table::{CoordinateTable, dataset_name};

/// Column names read from Parquet input, in row order.
pub const COORDINATE_COLUMNS: [&str; 4] = ["x1", "y1", "x2", "y2"];

#[cfg(test)]
mod tests;
