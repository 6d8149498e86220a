//! Scriptable in-memory native engine.
//!
//! [`MockEngine`] records every call it receives and answers requests from
//! scripted responses: first from a per-kind queue, then from a per-kind
//! default. Kinds with neither answer with no payload.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use pres_engine::{EngineError, EngineOptions, NativeEngine, RequestKind, Result};
use pres_store::StoreKey;
use pres_types::Ruleset;
use serde_json::Value;

/// A request received by [`MockEngine`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub store: StoreKey,
    pub kind: RequestKind,
    /// The decoded `{ requestId, params }` envelope
    pub envelope: Value,
}

#[derive(Debug, Clone)]
enum Scripted {
    Respond(Option<String>),
    Fail(String),
}

impl Scripted {
    fn into_result(self) -> Result<Option<String>> {
        match self {
            Scripted::Respond(payload) => Ok(payload),
            Scripted::Fail(message) => Err(EngineError::failed(message)),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    options: Option<EngineOptions>,
    requests: Vec<RecordedRequest>,
    queued: HashMap<RequestKind, VecDeque<Scripted>>,
    defaults: HashMap<RequestKind, Scripted>,
    add_ruleset_calls: usize,
    add_ruleset_failure: Option<String>,
    remove_ruleset_calls: Vec<(String, String)>,
    remove_ruleset_failures: VecDeque<String>,
    clear_rulesets_calls: usize,
    clear_rulesets_failures: VecDeque<String>,
    ruleset_directories: Vec<Vec<PathBuf>>,
    supplemental_ruleset_directories: Vec<Vec<PathBuf>>,
    update_info: VecDeque<String>,
    update_info_failure: Option<String>,
    update_info_calls: usize,
    schema_loads: Vec<StoreKey>,
    dispose_calls: usize,
}

/// In-memory [`NativeEngine`] for tests
#[derive(Debug, Default)]
pub struct MockEngine {
    state: Mutex<MockState>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // Scripting

    /// Answer every `kind` request with `payload` unless a queued answer exists.
    pub fn respond(&self, kind: RequestKind, payload: &str) {
        self.state()
            .defaults
            .insert(kind, Scripted::Respond(Some(payload.to_string())));
    }

    /// Fail every `kind` request unless a queued answer exists.
    pub fn fail(&self, kind: RequestKind, message: &str) {
        self.state()
            .defaults
            .insert(kind, Scripted::Fail(message.to_string()));
    }

    /// Answer the next `kind` request with `payload` (`None` for no payload).
    pub fn push_response(&self, kind: RequestKind, payload: Option<&str>) {
        self.state()
            .queued
            .entry(kind)
            .or_default()
            .push_back(Scripted::Respond(payload.map(str::to_string)));
    }

    /// Fail the next `kind` request.
    pub fn push_failure(&self, kind: RequestKind, message: &str) {
        self.state()
            .queued
            .entry(kind)
            .or_default()
            .push_back(Scripted::Fail(message.to_string()));
    }

    pub fn fail_add_ruleset(&self, message: &str) {
        self.state().add_ruleset_failure = Some(message.to_string());
    }

    /// Fail the next `remove_ruleset` call. The attempt is not recorded.
    pub fn push_remove_ruleset_failure(&self, message: &str) {
        self.state()
            .remove_ruleset_failures
            .push_back(message.to_string());
    }

    /// Fail the next `clear_rulesets` call. The attempt is not counted.
    pub fn push_clear_rulesets_failure(&self, message: &str) {
        self.state()
            .clear_rulesets_failures
            .push_back(message.to_string());
    }

    /// Queue update information for the next `get_update_info` call.
    pub fn push_update_info(&self, payload: &str) {
        self.state().update_info.push_back(payload.to_string());
    }

    pub fn fail_update_info(&self, message: &str) {
        self.state().update_info_failure = Some(message.to_string());
    }

    // Inspection

    pub fn configured_options(&self) -> Option<EngineOptions> {
        self.state().options.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    pub fn requests_of(&self, kind: RequestKind) -> Vec<RecordedRequest> {
        self.state()
            .requests
            .iter()
            .filter(|request| request.kind == kind)
            .cloned()
            .collect()
    }

    pub fn add_ruleset_calls(&self) -> usize {
        self.state().add_ruleset_calls
    }

    /// `(id, hash)` of each `remove_ruleset` call.
    pub fn remove_ruleset_calls(&self) -> Vec<(String, String)> {
        self.state().remove_ruleset_calls.clone()
    }

    pub fn clear_rulesets_calls(&self) -> usize {
        self.state().clear_rulesets_calls
    }

    pub fn ruleset_directories(&self) -> Vec<Vec<PathBuf>> {
        self.state().ruleset_directories.clone()
    }

    pub fn supplemental_ruleset_directories(&self) -> Vec<Vec<PathBuf>> {
        self.state().supplemental_ruleset_directories.clone()
    }

    pub fn update_info_calls(&self) -> usize {
        self.state().update_info_calls
    }

    pub fn schema_loads(&self) -> Vec<StoreKey> {
        self.state().schema_loads.clone()
    }

    pub fn dispose_calls(&self) -> usize {
        self.state().dispose_calls
    }

    fn ensure_live(state: &MockState) -> Result<()> {
        if state.dispose_calls > 0 {
            return Err(EngineError::Released);
        }
        Ok(())
    }
}

#[async_trait]
impl NativeEngine for MockEngine {
    async fn configure(&self, options: &EngineOptions) -> Result<()> {
        let mut state = self.state();
        Self::ensure_live(&state)?;
        state.options = Some(options.clone());
        Ok(())
    }

    async fn handle_request(&self, store: &StoreKey, envelope: &str) -> Result<Option<String>> {
        let envelope: Value = serde_json::from_str(envelope)?;
        let kind: RequestKind = serde_json::from_value(envelope["requestId"].clone())?;

        let mut state = self.state();
        Self::ensure_live(&state)?;
        state.requests.push(RecordedRequest {
            store: store.clone(),
            kind,
            envelope,
        });

        let scripted = state
            .queued
            .get_mut(&kind)
            .and_then(VecDeque::pop_front)
            .or_else(|| state.defaults.get(&kind).cloned())
            .unwrap_or(Scripted::Respond(None));
        scripted.into_result()
    }

    async fn add_ruleset(&self, serialized: &str) -> Result<String> {
        let mut state = self.state();
        Self::ensure_live(&state)?;
        state.add_ruleset_calls += 1;
        if let Some(message) = &state.add_ruleset_failure {
            return Err(EngineError::failed(message.clone()));
        }
        let ruleset =
            Ruleset::from_json(serialized).map_err(|e| EngineError::failed(e.to_string()))?;
        Ok(ruleset.content_hash())
    }

    async fn remove_ruleset(&self, id: &str, hash: &str) -> Result<bool> {
        let mut state = self.state();
        Self::ensure_live(&state)?;
        if let Some(message) = state.remove_ruleset_failures.pop_front() {
            return Err(EngineError::failed(message));
        }
        state
            .remove_ruleset_calls
            .push((id.to_string(), hash.to_string()));
        Ok(true)
    }

    async fn clear_rulesets(&self) -> Result<()> {
        let mut state = self.state();
        Self::ensure_live(&state)?;
        if let Some(message) = state.clear_rulesets_failures.pop_front() {
            return Err(EngineError::failed(message));
        }
        state.clear_rulesets_calls += 1;
        Ok(())
    }

    async fn setup_ruleset_directories(&self, paths: &[PathBuf]) -> Result<()> {
        self.state().ruleset_directories.push(paths.to_vec());
        Ok(())
    }

    async fn setup_supplemental_ruleset_directories(&self, paths: &[PathBuf]) -> Result<()> {
        self.state()
            .supplemental_ruleset_directories
            .push(paths.to_vec());
        Ok(())
    }

    async fn get_update_info(&self) -> Result<Option<String>> {
        let mut state = self.state();
        Self::ensure_live(&state)?;
        state.update_info_calls += 1;
        if let Some(message) = &state.update_info_failure {
            return Err(EngineError::failed(message.clone()));
        }
        Ok(state.update_info.pop_front())
    }

    async fn force_load_schemas(&self, store: &StoreKey) -> Result<()> {
        let mut state = self.state();
        Self::ensure_live(&state)?;
        state.schema_loads.push(store.clone());
        Ok(())
    }

    fn dispose(&self) {
        self.state().dispose_calls += 1;
    }
}
