//! Text-decoded result rows.
//!
//! Both drivers hand back values in their text form, which keeps the
//! [`Connection`](super::Connection) trait free of driver-specific types.

use crate::error::ConnError;

/// One result row; `None` marks SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<Option<String>>,
}

impl Row {
    /// Create a row from its column values.
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw text value of a column.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).and_then(|v| v.as_deref())
    }

    /// Decode a non-null integer column.
    pub fn get_i64(&self, idx: usize) -> Result<i64, ConnError> {
        let text = match self.values.get(idx) {
            Some(Some(text)) => text,
            Some(None) => {
                return Err(ConnError::Decode {
                    column: idx,
                    message: "unexpected NULL".to_string(),
                })
            }
            None => {
                return Err(ConnError::Decode {
                    column: idx,
                    message: format!("row has only {} columns", self.values.len()),
                })
            }
        };

        text.trim().parse().map_err(|e| ConnError::Decode {
            column: idx,
            message: format!("'{}' is not an integer: {}", text, e),
        })
    }
}

impl From<Vec<Option<String>>> for Row {
    fn from(values: Vec<Option<String>>) -> Self {
        Self::new(values)
    }
}

/// A fully fetched result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rows {
    rows: Vec<Row>,
}

impl Rows {
    /// Create a result set from fetched rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the query returned no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Consume the result set, returning the first row or [`ConnError::NoRows`].
    pub fn into_first(self) -> Result<Row, ConnError> {
        self.rows.into_iter().next().ok_or(ConnError::NoRows)
    }
}

impl IntoIterator for Rows {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Rows {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl FromIterator<Row> for Rows {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_i64() {
        let row = Row::new(vec![Some("42".to_string()), None, Some("abc".to_string())]);
        assert_eq!(row.get_i64(0).unwrap(), 42);
        assert!(matches!(row.get_i64(1), Err(ConnError::Decode { column: 1, .. })));
        assert!(matches!(row.get_i64(2), Err(ConnError::Decode { column: 2, .. })));
        assert!(matches!(row.get_i64(3), Err(ConnError::Decode { column: 3, .. })));
    }

    #[test]
    fn test_get_i64_trims_padding() {
        // Some ODBC drivers pad fixed-width numeric text
        let row = Row::new(vec![Some(" 20 ".to_string())]);
        assert_eq!(row.get_i64(0).unwrap(), 20);
    }

    #[test]
    fn test_into_first_distinguishes_no_rows() {
        let empty = Rows::default();
        assert!(empty.into_first().unwrap_err().is_not_found());

        let rows: Rows = vec![Row::new(vec![Some("1".into())])].into_iter().collect();
        assert_eq!(rows.into_first().unwrap().get(0), Some("1"));
    }
}
