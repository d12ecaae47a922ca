use crate::Value;
use std::sync::Arc;

/// Shared column name list, one allocation per result set.
pub type ColumnNames = Arc<[String]>;

/// A result row with its column labels.
#[derive(Debug, Clone)]
pub struct Row {
    pub columns: ColumnNames,
    pub values: Box<[Value]>,
}

impl Row {
    pub fn new(columns: ColumnNames, values: Box<[Value]>) -> Self {
        Self { columns, values }
    }

    /// Looks a cell up by column name. Absent columns read as `None`; a
    /// stored NULL reads as `Some(Value::Null)`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }
}

/// A materialized result set, the raw-path analog of a data table.
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    pub columns: ColumnNames,
    pub rows: Vec<Box<[Value]>>,
}

impl DataTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Iterates the rows with their labels attached.
    pub fn iter(&self) -> impl Iterator<Item = Row> + '_ {
        self.rows
            .iter()
            .map(|values| Row::new(self.columns.clone(), values.clone()))
    }

    /// The first cell of the first row, the shape scalar queries produce.
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }
}
