//! Paging options and paged responses

use serde::{Deserialize, Serialize};

/// Page of results to request. A `size` of 0 means "everything from `start`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageOptions {
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub size: u64,
}

impl PageOptions {
    /// Create paging options.
    pub fn new(start: u64, size: u64) -> Self {
        Self { start, size }
    }

    /// Check whether the page extends to the end of the result set.
    pub fn is_unbounded(&self) -> bool {
        self.size == 0
    }
}

/// A page of items together with the total item count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> PagedResponse<T> {
    /// `{ total: 0, items: [] }`
    pub fn empty() -> Self {
        Self {
            total: 0,
            items: Vec::new(),
        }
    }
}
