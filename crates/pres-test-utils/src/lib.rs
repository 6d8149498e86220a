//! Shared test doubles for the presentation orchestration workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`engine`]: [`MockEngine`], a scriptable native engine that records requests
//! - [`store`]: [`MemoryRecordStore`], canned query rows keyed by statement and id
//! - [`selection`]: [`StaticSelectionScopes`], a fixed selection scope provider

pub mod engine;
pub mod selection;
pub mod store;

pub use engine::{MockEngine, RecordedRequest};
pub use selection::StaticSelectionScopes;
pub use store::MemoryRecordStore;
