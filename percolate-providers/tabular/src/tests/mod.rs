pub(crate) use super::{CoordinateTable, TabularError};

mod support;
