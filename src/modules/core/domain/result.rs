//! Result rows and client-side cursors

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// One result row: values in column order, sharing the column list of its
/// result set
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the first column with this name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    pub fn get_index(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Convert to a JSON object keyed by column name
    pub fn to_map(&self) -> serde_json::Map<String, Value> {
        self.columns
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.columns.iter().zip(&self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Result of one executed statement
///
/// Rows are buffered when the statement runs and handed out in result-set
/// order; each fetch advances the cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorResult {
    columns: Arc<Vec<String>>,
    rows: VecDeque<Row>,
    rows_affected: u64,
}

impl CursorResult {
    pub fn new(columns: Arc<Vec<String>>, rows: Vec<Row>, rows_affected: u64) -> Self {
        Self {
            columns,
            rows: rows.into(),
            rows_affected,
        }
    }

    /// Result of a statement that returned no rows
    pub fn from_rows_affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Rows not yet fetched
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn fetch_one(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    /// Up to `size` rows
    pub fn fetch_many(&mut self, size: usize) -> Vec<Row> {
        let take = size.min(self.rows.len());
        self.rows.drain(..take).collect()
    }

    pub fn fetch_all(&mut self) -> Vec<Row> {
        self.rows.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(n: i64) -> CursorResult {
        let columns = Arc::new(vec!["id".to_string(), "name".to_string()]);
        let rows = (0..n)
            .map(|i| Row::new(columns.clone(), vec![json!(i), json!(format!("row-{}", i))]))
            .collect();
        CursorResult::new(columns, rows, 0)
    }

    #[test]
    fn test_fetch_advances() {
        let mut cursor = result(5);
        assert_eq!(cursor.fetch_one().unwrap().get("id"), Some(&json!(0)));
        let page = cursor.fetch_many(3);
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].get_index(0), Some(&json!(1)));
        assert_eq!(cursor.remaining(), 1);
        assert_eq!(cursor.fetch_many(3).len(), 1);
        assert!(cursor.is_exhausted());
        assert!(cursor.fetch_many(3).is_empty());
        assert!(cursor.fetch_one().is_none());
    }

    #[test]
    fn test_fetch_all_drains() {
        let mut cursor = result(3);
        cursor.fetch_one();
        assert_eq!(cursor.fetch_all().len(), 2);
        assert!(cursor.fetch_all().is_empty());
    }

    #[test]
    fn test_row_access_and_serialization() {
        let mut cursor = result(1);
        let row = cursor.fetch_one().unwrap();
        assert_eq!(row.get("name"), Some(&json!("row-0")));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.columns(), &["id".to_string(), "name".to_string()]);

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":0,"name":"row-0"}"#);
        assert_eq!(row.to_map().len(), 2);
    }

    #[test]
    fn test_rows_affected_only() {
        let mut cursor = CursorResult::from_rows_affected(4);
        assert_eq!(cursor.rows_affected(), 4);
        assert!(cursor.columns().is_empty());
        assert!(cursor.fetch_one().is_none());
    }
}
