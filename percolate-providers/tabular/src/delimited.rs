//! Line-oriented parsing of delimited coordinate tables.
use std::io::BufRead;

use percolate_core::CoordinatePair;
use tracing::debug;

use crate::errors::TabularError;

/// Field separator, detected from the first data line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Delimiter {
    Comma,
    Semicolon,
    Tab,
    Whitespace,
}

impl Delimiter {
    pub(crate) fn detect(line: &str) -> Self {
        if line.contains(',') {
            Self::Comma
        } else if line.contains(';') {
            Self::Semicolon
        } else if line.contains('\t') {
            Self::Tab
        } else {
            Self::Whitespace
        }
    }

    fn split(self, line: &str) -> Vec<&str> {
        match self {
            Self::Comma => line.split(',').map(str::trim).collect(),
            Self::Semicolon => line.split(';').map(str::trim).collect(),
            Self::Tab => line.split('\t').map(str::trim).collect(),
            Self::Whitespace => line.split_whitespace().collect(),
        }
    }
}

/// Reads `x1 y1 x2 y2` rows, skipping blank lines, `#` comments and a
/// leading header row.
pub(crate) fn read_pairs<R: BufRead>(reader: R) -> Result<Vec<CoordinatePair>, TabularError> {
    let mut delimiter = None;
    let mut first_row = true;
    let mut pairs = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let text = line?;
        let content = text.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }
        let line_number = index + 1;
        let fields = delimiter
            .get_or_insert_with(|| Delimiter::detect(content))
            .split(content);
        if first_row && fields.iter().all(|field| field.parse::<f64>().is_err()) {
            debug!(line = line_number, "skipping header row");
            first_row = false;
            continue;
        }
        first_row = false;
        pairs.push(parse_row(&fields, line_number)?);
    }
    Ok(pairs)
}

fn parse_row(fields: &[&str], line: usize) -> Result<CoordinatePair, TabularError> {
    let values = fields
        .iter()
        .map(|field| {
            field.parse::<f64>().map_err(|_| TabularError::InvalidNumber {
                line,
                value: (*field).to_owned(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let [x1, y1, x2, y2] = <[f64; 4]>::try_from(values).map_err(|values| {
        TabularError::FieldCount {
            line,
            actual: values.len(),
        }
    })?;
    Ok(CoordinatePair::new(x1, y1, x2, y2))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("1,2,3,4", Delimiter::Comma)]
    #[case("1;2;3;4", Delimiter::Semicolon)]
    #[case("1\t2\t3\t4", Delimiter::Tab)]
    #[case("1 2  3 4", Delimiter::Whitespace)]
    fn detects_delimiter(#[case] line: &str, #[case] expected: Delimiter) {
        assert_eq!(Delimiter::detect(line), expected);
        assert_eq!(expected.split(line).len(), 4);
    }

    #[rstest]
    fn field_count_is_checked_after_parsing() {
        let err = parse_row(&["1", "2", "3"], 7).expect_err("three fields");
        assert!(matches!(err, TabularError::FieldCount { line: 7, actual: 3 }));
    }
}
