//! Query result models.

use std::fmt;

/// The one statement the console can run.
pub const FIXED_QUERY: &str = "SELECT * FROM PADRON";

/// One row returned by a query.
///
/// Values are in the server's text format, in column order; `None` is SQL NULL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultRow {
    values: Vec<Option<String>>,
}

impl ResultRow {
    /// Create a row from its column values.
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// Get a single value; `None` if out of range or NULL.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).and_then(|v| v.as_deref())
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<Option<S>> for ResultRow {
    fn from_iter<I: IntoIterator<Item = Option<S>>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|v| v.map(Into::into)).collect())
    }
}

/// Renders as a tuple, e.g. `(1, Ana, NULL)`.
impl fmt::Display for ResultRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                Some(v) => f.write_str(v)?,
                None => f.write_str("NULL")?,
            }
        }
        f.write_str(")")
    }
}
