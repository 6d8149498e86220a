//! Record-store boundary for the presentation orchestration layer
//!
//! The record store itself lives outside this workspace. This crate defines
//! what the orchestration layer needs from it:
//!
//! - [`RecordStore`]: a session handle able to run prepared, parameterized
//!   single-statement row queries
//! - [`StoreKey`]: the identity the native engine uses to address a session
//! - [`StoreOpenedEvents`]: notifications about newly opened stores
//! - [`SelectionScopesProvider`]: computes selections over a store

pub mod error;
pub mod events;
pub mod selection;
pub mod store;

pub use error::{Error, Result};
pub use events::StoreOpenedEvents;
pub use selection::SelectionScopesProvider;
pub use store::{QueryValue, RecordStore, Row, StoreKey};
