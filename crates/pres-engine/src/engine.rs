//! NativeEngine trait

use std::path::PathBuf;

use async_trait::async_trait;
use pres_store::StoreKey;

use crate::Result;
use crate::options::EngineOptions;

/// Handle to a running native rules engine.
///
/// Implementations must accept concurrent calls; the presentation manager
/// does not queue requests.
#[async_trait]
pub trait NativeEngine: Send + Sync {
    /// Apply start-up options. Called once before any other call.
    async fn configure(&self, options: &EngineOptions) -> Result<()>;

    /// Submit a serialized request envelope against the store identified by
    /// `store`.
    ///
    /// # Returns
    ///
    /// The serialized JSON response, or `None` when the engine produced no
    /// payload.
    async fn handle_request(&self, store: &StoreKey, envelope: &str) -> Result<Option<String>>;

    /// Register a serialized ruleset. Returns the engine's unique identifier
    /// for it.
    async fn add_ruleset(&self, serialized: &str) -> Result<String>;

    /// Unregister a ruleset. Returns whether the engine knew it.
    async fn remove_ruleset(&self, id: &str, hash: &str) -> Result<bool>;

    async fn clear_rulesets(&self) -> Result<()>;

    async fn setup_ruleset_directories(&self, paths: &[PathBuf]) -> Result<()>;

    async fn setup_supplemental_ruleset_directories(&self, paths: &[PathBuf]) -> Result<()>;

    /// Pending update information accumulated since the previous call, if any.
    async fn get_update_info(&self) -> Result<Option<String>>;

    /// Load all schemas of a store ahead of the first request.
    async fn force_load_schemas(&self, store: &StoreKey) -> Result<()>;

    /// Release the engine. Further calls fail with [`EngineError::Released`].
    ///
    /// [`EngineError::Released`]: crate::EngineError::Released
    fn dispose(&self);
}
