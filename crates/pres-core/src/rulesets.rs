//! Ruleset registration
//!
//! Rulesets are registered with the engine by content: the dispatch id of a
//! ruleset is the identifier the engine returns for its content hash, so two
//! rulesets with identical rules and different declared ids share one
//! registration.
//!
//! A declared id may be used with several contents over time, e.g. the two
//! sides of a hierarchy comparison. Every content stays registered while any
//! declared id references it; only [`RulesetManager::remove`] and
//! [`RulesetManager::clear`] unregister content from the engine.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use pres_engine::NativeEngine;
use pres_types::{Ruleset, RulesetOrId};
use tokio::sync::Mutex;

use crate::{Error, Result};

/// Supplemental ruleset directory shipped with the engine assets
pub const BUILTIN_SUPPLEMENTAL_DIRECTORY: &str = "assets/supplemental-presentation-rules";

/// A ruleset known to the engine
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredRuleset {
    pub ruleset: Ruleset,
    /// Content hash computed locally
    pub hash: String,
    /// Identifier returned by the engine; dispatched as `rulesetId`
    pub unique_identifier: String,
}

#[derive(Debug)]
struct Registration {
    /// Declared id the content was first registered under
    registered_id: String,
    unique_identifier: String,
    /// Declared ids referencing this content
    ids: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct RulesetState {
    by_hash: HashMap<String, Registration>,
    /// Most recently added content per declared id
    latest: HashMap<String, RegisteredRuleset>,
    directories_applied: bool,
}

/// Registers, resolves and removes rulesets
pub struct RulesetManager {
    engine: Arc<dyn NativeEngine>,
    // Held across the engine registration await so concurrent adds of the
    // same content register once.
    state: Mutex<RulesetState>,
}

impl RulesetManager {
    pub fn new(engine: Arc<dyn NativeEngine>) -> Self {
        Self {
            engine,
            state: Mutex::new(RulesetState::default()),
        }
    }

    /// Apply ruleset directories. Only the first call has any effect.
    ///
    /// Primary directories are de-duplicated preserving order; supplemental
    /// directories always start with [`BUILTIN_SUPPLEMENTAL_DIRECTORY`].
    pub async fn setup_directories(
        &self,
        primary: &[PathBuf],
        supplemental: &[PathBuf],
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.directories_applied {
            tracing::debug!("Ruleset directories already applied");
            return Ok(());
        }

        let primary = dedup_paths(primary.iter().cloned());
        let supplemental = supplemental_directories(supplemental);

        self.engine
            .setup_ruleset_directories(&primary)
            .await
            .map_err(|e| Error::engine("setupRulesetDirectories", e))?;
        self.engine
            .setup_supplemental_ruleset_directories(&supplemental)
            .await
            .map_err(|e| Error::engine("setupSupplementalRulesetDirectories", e))?;

        state.directories_applied = true;
        tracing::debug!(
            primary = primary.len(),
            supplemental = supplemental.len(),
            "Applied ruleset directories"
        );
        Ok(())
    }

    /// Register a ruleset, reusing an existing registration with the same
    /// content.
    ///
    /// Adding a declared id with new content makes it the id's current
    /// content; the previous content stays registered until the id is
    /// removed.
    pub async fn add(&self, ruleset: Ruleset) -> Result<RegisteredRuleset> {
        let mut state = self.state.lock().await;
        let hash = ruleset.content_hash();

        let unique_identifier = match state.by_hash.get_mut(&hash) {
            Some(registration) => {
                registration.ids.insert(ruleset.id.clone());
                tracing::debug!(
                    id = %ruleset.id,
                    registered_as = %registration.registered_id,
                    "Ruleset content already registered"
                );
                registration.unique_identifier.clone()
            }
            None => {
                let serialized = ruleset.to_json()?;
                let unique_identifier = self
                    .engine
                    .add_ruleset(&serialized)
                    .await
                    .map_err(|e| Error::engine("addRuleset", e))?;
                tracing::info!(id = %ruleset.id, hash = %hash, "Registered ruleset");
                state.by_hash.insert(
                    hash.clone(),
                    Registration {
                        registered_id: ruleset.id.clone(),
                        unique_identifier: unique_identifier.clone(),
                        ids: BTreeSet::from([ruleset.id.clone()]),
                    },
                );
                unique_identifier
            }
        };

        let registered = RegisteredRuleset {
            ruleset,
            hash,
            unique_identifier,
        };
        if let Some(previous) = state
            .latest
            .insert(registered.ruleset.id.clone(), registered.clone())
            && previous.hash != registered.hash
        {
            tracing::debug!(id = %registered.ruleset.id, "Ruleset content changed");
        }
        Ok(registered)
    }

    /// Current content of a declared id.
    pub async fn get(&self, id: &str) -> Option<RegisteredRuleset> {
        self.state.lock().await.latest.get(id).cloned()
    }

    /// Drop a declared id. Returns `false` when the id was not registered.
    ///
    /// Content no other declared id references is unregistered from the
    /// engine. If the engine fails, content it still holds stays registered
    /// here and the id keeps referencing it.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let Some(current) = state.latest.get(id).map(|latest| latest.hash.clone()) else {
            return Ok(false);
        };

        let mut orphaned: Vec<String> = state
            .by_hash
            .iter()
            .filter(|(_, registration)| {
                registration.ids.len() == 1 && registration.ids.contains(id)
            })
            .map(|(hash, _)| hash.clone())
            .collect();
        // Current content goes last so a failure never leaves `get` pointing
        // at released content
        orphaned.sort_by_key(|hash| (*hash == current, hash.clone()));

        for hash in orphaned {
            let Some(registration) = state.by_hash.get(&hash) else {
                continue;
            };
            let registered_id = registration.registered_id.clone();
            let unique_identifier = registration.unique_identifier.clone();
            let removed = self
                .engine
                .remove_ruleset(&registered_id, &unique_identifier)
                .await
                .map_err(|e| Error::engine("removeRuleset", e))?;
            state.by_hash.remove(&hash);
            tracing::info!(id = %registered_id, hash = %hash, removed, "Unregistered ruleset");
        }

        for registration in state.by_hash.values_mut() {
            registration.ids.remove(id);
        }
        state.latest.remove(id);
        Ok(true)
    }

    /// Drop every registration. Local state is kept when the engine fails.
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.engine
            .clear_rulesets()
            .await
            .map_err(|e| Error::engine("clearRulesets", e))?;
        state.latest.clear();
        state.by_hash.clear();
        tracing::info!("Cleared rulesets");
        Ok(())
    }

    /// Number of declared ids currently registered.
    pub async fn len(&self) -> usize {
        self.state.lock().await.latest.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of distinct contents registered with the engine.
    pub async fn registration_count(&self) -> usize {
        self.state.lock().await.by_hash.len()
    }

    /// The `rulesetId` to dispatch for a request.
    ///
    /// Content is registered on first use. An id naming a registered ruleset
    /// resolves to its unique identifier; any other id is passed through for
    /// the engine to find in its ruleset directories.
    pub async fn resolve_id(&self, ruleset: &RulesetOrId) -> Result<String> {
        match ruleset {
            RulesetOrId::Ruleset(ruleset) => Ok(self.add(ruleset.clone()).await?.unique_identifier),
            RulesetOrId::Id(id) => Ok(self
                .get(id)
                .await
                .map(|registered| registered.unique_identifier)
                .unwrap_or_else(|| id.clone())),
        }
    }
}

/// Remove duplicate paths, keeping the first occurrence.
pub fn dedup_paths(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();
    for path in paths {
        if !result.contains(&path) {
            result.push(path);
        }
    }
    result
}

/// The built-in supplemental directory followed by `supplied`.
pub fn supplemental_directories(supplied: &[PathBuf]) -> Vec<PathBuf> {
    dedup_paths(
        std::iter::once(PathBuf::from(BUILTIN_SUPPLEMENTAL_DIRECTORY)).chain(supplied.iter().cloned()),
    )
}
