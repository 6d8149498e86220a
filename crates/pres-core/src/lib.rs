//! Presentation orchestration layer
//!
//! `pres-core` sits between application code and a native rules engine. It
//! turns typed hierarchy, content and label queries into engine requests
//! and hands typed results back.
//!
//! ```text
//!   caller
//!     |  get_nodes / get_content / get_display_label_definitions / ...
//!     v
//!   PresentationManager
//!     |-- ElementKeyResolver   abstract element keys -> concrete keys
//!     |-- RulesetManager       content-hash registration
//!     |-- RulesetVariablesManager
//!     |-- RequestDispatcher    { requestId, params } -> NativeEngine
//!     |-- UpdatePoller         read-write sessions only
//!     v
//!   NativeEngine
//! ```
//!
//! # Example
//!
//! ```ignore
//! let manager = PresentationManager::builder(engine)
//!     .config(ManagerConfig::load(Path::new("presentation.toml"))?)
//!     .build()
//!     .await?;
//!
//! let options = RequestOptions::new(&store, "my-hierarchy");
//! let page = manager
//!     .get_nodes_and_count(&options, None, Some(PageOptions::new(0, 20)))
//!     .await?;
//! ```

pub mod compare;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod labels;
pub mod logging;
pub mod manager;
pub mod options;
pub mod params;
pub mod poller;
pub mod resolver;
pub mod rulesets;
pub mod selection;
pub mod variables;

pub use compare::{HierarchyComparator, changed_variables};
pub use config::ManagerConfig;
pub use dispatcher::RequestDispatcher;
pub use error::{Error, ErrorKind, Result};
pub use labels::{DISPLAY_LABEL_RULESET_ID, LABEL_BATCH_SIZE, reconcile_labels};
pub use manager::{ContentAndSize, PresentationManager, PresentationManagerBuilder};
pub use options::{HierarchyCompareOptions, HierarchyState, RequestOptions, StoreRequestOptions};
pub use poller::UpdatePoller;
pub use resolver::{CONCRETE_CLASS_QUERY, DEFAULT_ABSTRACT_CLASS, ElementKeyResolver};
pub use rulesets::{BUILTIN_SUPPLEMENTAL_DIRECTORY, RegisteredRuleset, RulesetManager};
pub use selection::{ElementSelectionScopes, PARENT_QUERY};
pub use variables::{RulesetVariables, RulesetVariablesManager};

pub use pres_store::SelectionScopesProvider;
