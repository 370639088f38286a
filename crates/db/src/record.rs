//! Named access to row values.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("{columns} column names but {values} values")]
    LengthMismatch { columns: usize, values: usize },
}

/// Ordered mapping from column name to value.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<V> {
    fields: Vec<(String, V)>,
}

impl<V> Record<V> {
    pub fn get(&self, column: &str) -> Option<&V> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Pair each column name with the value at the same position.
pub fn map_record<V>(columns: &[&str], values: Vec<V>) -> Result<Record<V>, RecordError> {
    if columns.len() != values.len() {
        return Err(RecordError::LengthMismatch {
            columns: columns.len(),
            values: values.len(),
        });
    }

    let fields = columns
        .iter()
        .map(|name| name.to_string())
        .zip(values)
        .collect();

    Ok(Record { fields })
}
