//! In-memory record store.
//!
//! Rows are keyed by statement text and the text of the first bound
//! parameter, which covers the single-id lookups the presentation layer runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pres_store::{Error, QueryValue, RecordStore, Result, Row, StoreKey};

/// [`RecordStore`] answering from canned rows
#[derive(Debug)]
pub struct MemoryRecordStore {
    key: StoreKey,
    rows: HashMap<(String, String), Row>,
    failure: Option<String>,
    queries: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn new(key: &str) -> Self {
        Self {
            key: StoreKey::from(key),
            rows: HashMap::new(),
            failure: None,
            queries: AtomicUsize::new(0),
        }
    }

    /// Return `row` for `sql` when the first parameter is `param`.
    pub fn with_row(mut self, sql: &str, param: &str, row: Row) -> Self {
        self.rows.insert((sql.to_string(), param.to_string()), row);
        self
    }

    /// Fail every query with `message`.
    pub fn with_failure(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Number of queries run so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn key(&self) -> &StoreKey {
        &self.key
    }

    async fn query_row(&self, sql: &str, params: &[QueryValue]) -> Result<Option<Row>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(Error::Query {
                sql: sql.to_string(),
                message: message.clone(),
            });
        }

        let param = params
            .first()
            .and_then(QueryValue::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(self.rows.get(&(sql.to_string(), param)).cloned())
    }
}
