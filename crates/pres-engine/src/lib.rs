//! Native engine boundary for the presentation orchestration layer
//!
//! The native engine is a long-lived, stateful rules-evaluation process or
//! library. It accepts serialized request envelopes and answers with
//! serialized JSON, or fails. This crate defines:
//!
//! - [`NativeEngine`]: the engine handle trait
//! - [`RequestKind`] and [`RequestEnvelope`]: the request protocol
//! - [`UpdateInfo`]: accumulated change notifications reported by the engine
//!
//! ```text
//!   pres-core (PresentationManager)
//!        | RequestEnvelope { requestId, params }  (JSON string)
//!        v
//!   NativeEngine::handle_request(store key, envelope)
//!        |
//!        v
//!   JSON payload | nothing | EngineError
//! ```

pub mod engine;
pub mod error;
pub mod options;
pub mod request;
pub mod updates;

pub use engine::NativeEngine;
pub use error::{EngineError, Result};
pub use options::{EngineOptions, SessionMode};
pub use request::{RequestEnvelope, RequestKind};
pub use updates::{
    ContentUpdateInfo, FullUpdate, HierarchyUpdateInfo, RulesetUpdateInfo, UpdateEvent, UpdateInfo,
    parse_update_info,
};
