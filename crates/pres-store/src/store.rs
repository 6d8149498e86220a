//! Record-store session handle and row queries

use std::fmt;

use async_trait::async_trait;
use pres_types::EntityId;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Identity of an open record-store session as known to the native engine
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreKey(String);

impl StoreKey {
    /// Create a store key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the string form of the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoreKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A bound parameter or a returned column value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Null,
    Integer(i64),
    Text(String),
    Id(EntityId),
}

impl QueryValue {
    /// Text content of a text or id value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Text(text) => Some(text),
            QueryValue::Id(id) => Some(id.as_str()),
            QueryValue::Null | QueryValue::Integer(_) => None,
        }
    }
}

/// One row returned by a query, columns in select order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    values: Vec<QueryValue>,
}

impl Row {
    /// Create a row from column values.
    pub fn new(values: Vec<QueryValue>) -> Self {
        Self { values }
    }

    /// Value of the column at `index`.
    pub fn get(&self, index: usize) -> Option<&QueryValue> {
        self.values.get(index)
    }

    /// Text value of the column at `index`.
    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(QueryValue::as_str)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An open record-store session.
///
/// The handle is borrowed by the presentation manager for the duration of a
/// single call; it is never retained.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Key the native engine uses to address this session.
    fn key(&self) -> &StoreKey;

    /// Run a prepared single-statement query with positional parameters
    /// (1-based, in `params` order) and return its first row, if any.
    async fn query_row(&self, sql: &str, params: &[QueryValue]) -> Result<Option<Row>>;
}
