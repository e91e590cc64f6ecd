//! # Row Export
//!
//! Turns any list of serializable rows (records or aggregate rows) into a
//! titled table and hands it to a print sink.
//!
//! - Columns are every field of the first row except `id`, in declaration
//!   order (serde_json is built with `preserve_order`).
//! - Cells are plain text: `null` becomes empty, whole numbers print without
//!   a fractional part, NaN prints as empty (it is stored as `null`).
//!
//! Document rendering is the sink's business; the core only supplies rows.

use crate::LedgerError;
use serde::Serialize;
use serde_json::Value;

/// The column that is never exported.
const HIDDEN_COLUMN: &str = "id";

/// A titled table of text cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportTable {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    /// Build an export table from serializable rows, without the `id` column.
    ///
    /// Every row must serialize to a JSON object. An empty input gives a
    /// table with no columns and no rows.
    pub fn from_rows<T: Serialize>(title: impl Into<String>, rows: &[T]) -> Result<Self, LedgerError> {
        Self::build(title.into(), rows, false)
    }

    /// Like `from_rows`, but keeps the `id` column (interactive listings).
    pub fn listing<T: Serialize>(title: impl Into<String>, rows: &[T]) -> Result<Self, LedgerError> {
        Self::build(title.into(), rows, true)
    }

    fn build<T: Serialize>(title: String, rows: &[T], keep_id: bool) -> Result<Self, LedgerError> {
        let mut objects = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::to_value(row) {
                Ok(Value::Object(map)) => objects.push(map),
                Ok(other) => {
                    return Err(LedgerError::SerializationError(format!(
                        "Export row is not an object: {}",
                        other
                    )));
                }
                Err(e) => return Err(LedgerError::SerializationError(e.to_string())),
            }
        }

        let columns: Vec<String> = objects
            .first()
            .map(|first| {
                first
                    .keys()
                    .filter(|k| keep_id || k.as_str() != HIDDEN_COLUMN)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let rows = objects
            .iter()
            .map(|object| {
                columns
                    .iter()
                    .map(|column| object.get(column).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(Self {
            title,
            columns,
            rows,
        })
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Render one JSON value as a table cell.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u.to_string()
            } else if let Some(i) = n.as_i64() {
                i.to_string()
            } else {
                // Display for f64 omits a trailing ".0"
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        other => other.to_string(),
    }
}

// =============================================================================
// PRINT SINK
// =============================================================================

/// Destination for exported tables.
pub trait PrintSink {
    /// Render or store one table.
    fn print(&mut self, table: &ExportTable) -> Result<(), LedgerError>;
}

/// A sink that keeps every table it receives.
impl PrintSink for Vec<ExportTable> {
    fn print(&mut self, table: &ExportTable) -> Result<(), LedgerError> {
        self.push(table.clone());
        Ok(())
    }
}

/// Build a table from `rows` and hand it to `sink`.
pub fn export_rows<T: Serialize>(
    sink: &mut dyn PrintSink,
    title: &str,
    rows: &[T],
) -> Result<ExportTable, LedgerError> {
    let table = ExportTable::from_rows(title, rows)?;
    sink.print(&table)?;
    tracing::debug!(title, rows = table.len(), "table exported");
    Ok(table)
}

// =============================================================================
// TESTS
// =============================================================================
