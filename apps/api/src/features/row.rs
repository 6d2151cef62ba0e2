use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::features::FeatureError;

/// One talent/job pair encoded in the configured column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    columns: Arc<[String]>,
    values: Vec<f64>,
}

impl FeatureRow {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<f64>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Serializes as a JSON object whose keys follow column order.
impl Serialize for FeatureRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, &value)?;
        }
        map.end()
    }
}

/// Rows stacked vertically under a single column set.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Arc<[String]>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn new(columns: Arc<[String]>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Arc<[String]>, rows: Vec<Vec<f64>>) -> Result<Self, FeatureError> {
        if let Some(bad) = rows.iter().find(|r| r.len() != columns.len()) {
            return Err(FeatureError::ColumnMismatch {
                expected: columns.len(),
                found: bad.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    pub fn single(row: FeatureRow) -> Self {
        Self {
            columns: row.columns,
            rows: vec![row.values],
        }
    }

    /// Appends a row; its columns must be exactly the matrix columns.
    pub fn push(&mut self, row: FeatureRow) -> Result<(), FeatureError> {
        if !Arc::ptr_eq(&self.columns, &row.columns) && self.columns != row.columns {
            return Err(FeatureError::ColumnMismatch {
                expected: self.columns.len(),
                found: row.columns.len(),
            });
        }
        self.rows.push(row.values);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// New matrix holding the given rows, in the given order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            columns: Arc::clone(&self.columns),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}
