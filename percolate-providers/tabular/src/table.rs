//! In-memory coordinate table and its loaders.
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use arrow_array::RecordBatchReader;
use parquet::{
    arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder},
    file::reader::ChunkReader,
};
use percolate_core::{CoordinatePair, CoordinateSource, DataSourceError};
use tracing::{info, instrument};

use crate::{
    COORDINATE_COLUMNS, delimited::read_pairs, errors::TabularError,
    ingest::{append_batch, validate_coordinate_columns},
};

/// Named table of `(x1, y1, x2, y2)` rows.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateTable {
    name: String,
    pairs: Vec<CoordinatePair>,
}

impl CoordinateTable {
    /// Creates a table from rows already in memory.
    ///
    /// # Errors
    /// Returns [`TabularError::EmptyInput`] when `pairs` is empty.
    ///
    /// # Examples
    /// ```
    /// use percolate_core::{CoordinatePair, CoordinateSource};
    /// use percolate_providers_tabular::CoordinateTable;
    ///
    /// let table = CoordinateTable::new("demo", vec![CoordinatePair::new(0.0, 0.0, 1.0, 1.0)])?;
    /// assert_eq!(table.len(), 1);
    /// assert_eq!(table.name(), "demo");
    /// # Ok::<(), percolate_providers_tabular::TabularError>(())
    /// ```
    pub fn new(name: impl Into<String>, pairs: Vec<CoordinatePair>) -> Result<Self, TabularError> {
        if pairs.is_empty() {
            return Err(TabularError::EmptyInput);
        }
        Ok(Self {
            name: name.into(),
            pairs,
        })
    }

    /// Loads a table from `path`, choosing the format by extension.
    ///
    /// `.parquet` files are read as Parquet; anything else is parsed as
    /// delimited text. The table is named after the file stem.
    ///
    /// # Errors
    /// Returns [`TabularError::UnnamedPath`] when the path has no file stem,
    /// otherwise any error of the selected loader.
    #[instrument(name = "tabular.load", err, skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TabularError> {
        let path = path.as_ref();
        let name = dataset_name(path)?;
        let is_parquet = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("parquet"));
        let table = if is_parquet {
            Self::from_parquet_path(name, path)?
        } else {
            Self::from_delimited_path(name, path)?
        };
        info!(name = %table.name, rows = table.pairs.len(), "coordinate table loaded");
        Ok(table)
    }

    /// Loads `x1`, `y1`, `x2`, `y2` columns from a Parquet file.
    ///
    /// # Errors
    /// See [`CoordinateTable::from_parquet_reader`].
    pub fn from_parquet_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, TabularError> {
        let file = File::open(path)?;
        Self::from_parquet_reader(name, file)
    }

    /// Loads `x1`, `y1`, `x2`, `y2` columns from a Parquet reader.
    ///
    /// Columns may be `Float32` or `Float64`; nulls are rejected.
    ///
    /// # Errors
    /// Returns [`TabularError::ColumnNotFound`],
    /// [`TabularError::InvalidColumnType`] or [`TabularError::NullValue`] for
    /// malformed columns, [`TabularError::EmptyInput`] when no rows are read,
    /// and wraps Arrow and Parquet failures.
    pub fn from_parquet_reader<R>(name: impl Into<String>, reader: R) -> Result<Self, TabularError>
    where
        R: ChunkReader + Send + 'static,
    {
        let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
        let mask = ProjectionMask::columns(builder.parquet_schema(), COORDINATE_COLUMNS);
        let reader = builder.with_projection(mask).build()?;
        let indices = validate_coordinate_columns(&reader.schema())?;
        let mut pairs = Vec::new();
        for batch in reader {
            let batch = batch?;
            append_batch(&batch, indices, pairs.len(), &mut pairs)?;
        }
        Self::new(name, pairs)
    }

    /// Loads delimited text from a file.
    ///
    /// # Errors
    /// See [`CoordinateTable::from_delimited_reader`].
    pub fn from_delimited_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, TabularError> {
        let file = File::open(path)?;
        Self::from_delimited_reader(name, BufReader::new(file))
    }

    /// Parses comma, semicolon, tab or whitespace separated rows.
    ///
    /// Blank lines and lines starting with `#` are ignored, as is a leading
    /// header row with no numeric fields.
    ///
    /// # Errors
    /// Returns [`TabularError::FieldCount`] or [`TabularError::InvalidNumber`]
    /// for malformed rows, [`TabularError::EmptyInput`] when no rows remain,
    /// and [`TabularError::Io`] when reading fails.
    ///
    /// # Examples
    /// ```
    /// use percolate_core::CoordinateSource;
    /// use percolate_providers_tabular::CoordinateTable;
    ///
    /// let text = "x1,y1,x2,y2\n0,0,3,4\n# trailing note\n";
    /// let table = CoordinateTable::from_delimited_reader("demo", text.as_bytes())?;
    /// assert_eq!(table.len(), 1);
    /// assert_eq!(table.rows()[0].length(), 5.0);
    /// # Ok::<(), percolate_providers_tabular::TabularError>(())
    /// ```
    pub fn from_delimited_reader<R: BufRead>(
        name: impl Into<String>,
        reader: R,
    ) -> Result<Self, TabularError> {
        Self::new(name, read_pairs(reader)?)
    }

    /// Replaces the dataset name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the loaded rows.
    #[must_use]
    #[rustfmt::skip]
    pub fn rows(&self) -> &[CoordinatePair] { &self.pairs }
}

impl CoordinateSource for CoordinateTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.pairs.len()
    }

    fn pair(&self, index: usize) -> Result<CoordinatePair, DataSourceError> {
        self.pairs
            .get(index)
            .copied()
            .ok_or(DataSourceError::OutOfBounds { index })
    }
}

/// Derives a dataset name from a file path's stem.
///
/// # Errors
/// Returns [`TabularError::UnnamedPath`] when the path has no UTF-8 file stem.
///
/// # Examples
/// ```
/// use percolate_providers_tabular::dataset_name;
///
/// assert_eq!(dataset_name("data/street-network.csv".as_ref())?, "street-network");
/// # Ok::<(), percolate_providers_tabular::TabularError>(())
/// ```
pub fn dataset_name(path: &Path) -> Result<String, TabularError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_owned)
        .ok_or_else(|| TabularError::UnnamedPath {
            path: path.display().to_string(),
        })
}
