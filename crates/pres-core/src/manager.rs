//! PresentationManager - the orchestration entry point
//!
//! The manager owns the engine handle together with the ruleset, variables
//! and update-polling state, and exposes typed hierarchy, content and label
//! operations on top of the engine request protocol.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use pres_engine::{NativeEngine, RequestKind, UpdateEvent};
use pres_store::{SelectionScopesProvider, StoreOpenedEvents};
use pres_types::{
    Content, ContentFlags, Descriptor, DescriptorOrOverrides, DisplayValueGroup, EntityId,
    EntityKey, FieldDescriptor, KeySet, LabelDefinition, Node, NodeKey, NodePathElement,
    PageOptions, PagedResponse, PartialHierarchyModification, SelectionInfo, SelectionScope,
    UnitSystem, display_types,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::compare::HierarchyComparator;
use crate::config::ManagerConfig;
use crate::dispatcher::{RequestDispatcher, join_results};
use crate::labels::{DISPLAY_LABEL_RULESET_ID, LABEL_BATCH_SIZE, reconcile_labels};
use crate::options::{HierarchyCompareOptions, RequestOptions, StoreRequestOptions};
use crate::params::{
    CommonParams, ContentDescriptorParams, ContentParams, DisplayLabelParams,
    DistinctValuesParams, FilteredNodePathsParams, NodePathsParams, NodesParams,
    PagedDistinctValuesParams,
};
use crate::poller::UpdatePoller;
use crate::resolver::ElementKeyResolver;
use crate::rulesets::RulesetManager;
use crate::selection::ElementSelectionScopes;
use crate::variables::{RulesetVariables, RulesetVariablesManager};
use crate::{Error, Result};

/// Buffered update events per subscriber
const UPDATE_EVENTS_CAPACITY: usize = 64;

/// Content page together with the total size of the content set
#[derive(Debug, Clone, PartialEq)]
pub struct ContentAndSize {
    pub size: u64,
    /// `None` when the engine produced no content for the request
    pub content: Option<Content>,
}

/// Builder for [`PresentationManager`]
pub struct PresentationManagerBuilder {
    engine: Arc<dyn NativeEngine>,
    config: ManagerConfig,
    selection_scopes: Option<Arc<dyn SelectionScopesProvider>>,
    store_events: Option<StoreOpenedEvents>,
    resolver: ElementKeyResolver,
}

impl PresentationManagerBuilder {
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom selection scope provider instead of
    /// [`ElementSelectionScopes`].
    pub fn selection_scopes(mut self, provider: Arc<dyn SelectionScopesProvider>) -> Self {
        self.selection_scopes = Some(provider);
        self
    }

    /// Source of store-opened notifications, used for schema preloading.
    pub fn store_opened_events(mut self, events: StoreOpenedEvents) -> Self {
        self.store_events = Some(events);
        self
    }

    pub fn key_resolver(mut self, resolver: ElementKeyResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Configure the engine and create the manager.
    ///
    /// Must be called within a tokio runtime when update polling or schema
    /// preloading is enabled.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid or the engine rejects its
    /// start-up calls.
    pub async fn build(self) -> Result<PresentationManager> {
        let config = self.config;
        let engine = self.engine;

        engine
            .configure(&config.engine_options()?)
            .await
            .map_err(|e| Error::engine("configure", e))?;

        let rulesets = RulesetManager::new(engine.clone());
        rulesets
            .setup_directories(
                &config.ruleset_directories,
                &config.supplemental_ruleset_directories,
            )
            .await?;

        let (update_events, _) = broadcast::channel(UPDATE_EVENTS_CAPACITY);
        let poller = config
            .poll_interval()
            .map(|interval| UpdatePoller::start(engine.clone(), interval, update_events.clone()));

        let schema_preload = match (&self.store_events, config.schemas_preload) {
            (Some(events), true) => Some(spawn_schema_preload(engine.clone(), events)),
            (None, true) => {
                tracing::warn!("Schema preloading requested without store-opened events");
                None
            }
            _ => None,
        };

        tracing::info!(
            id = config.id.as_deref().unwrap_or(""),
            mode = %config.mode,
            polling = poller.is_some(),
            "Presentation manager created"
        );

        Ok(PresentationManager {
            dispatcher: RequestDispatcher::new(engine.clone()),
            engine,
            rulesets,
            variables: RulesetVariablesManager::new(),
            resolver: self.resolver,
            selection_scopes: self
                .selection_scopes
                .unwrap_or_else(|| Arc::new(ElementSelectionScopes::new())),
            poller,
            update_events,
            schema_preload: Mutex::new(schema_preload),
            active_locale: RwLock::new(config.active_locale),
            active_unit_system: RwLock::new(config.active_unit_system),
            disposed: AtomicBool::new(false),
        })
    }
}

fn spawn_schema_preload(engine: Arc<dyn NativeEngine>, events: &StoreOpenedEvents) -> JoinHandle<()> {
    let mut opened = events.subscribe();
    tokio::spawn(async move {
        loop {
            match opened.recv().await {
                Ok(store) => {
                    if let Err(e) = engine.force_load_schemas(&store).await {
                        tracing::warn!(store = %store, error = %e, "Schema preload failed");
                    } else {
                        tracing::debug!(store = %store, "Preloaded schemas");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Missed store-opened notifications");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Orchestrates presentation requests against a native engine
pub struct PresentationManager {
    engine: Arc<dyn NativeEngine>,
    rulesets: RulesetManager,
    variables: RulesetVariablesManager,
    resolver: ElementKeyResolver,
    dispatcher: RequestDispatcher,
    selection_scopes: Arc<dyn SelectionScopesProvider>,
    poller: Option<UpdatePoller>,
    update_events: broadcast::Sender<UpdateEvent>,
    schema_preload: Mutex<Option<JoinHandle<()>>>,
    active_locale: RwLock<Option<String>>,
    active_unit_system: RwLock<Option<UnitSystem>>,
    disposed: AtomicBool,
}

impl PresentationManager {
    /// Start building a manager for `engine`.
    pub fn builder(engine: Arc<dyn NativeEngine>) -> PresentationManagerBuilder {
        PresentationManagerBuilder {
            engine,
            config: ManagerConfig::default(),
            selection_scopes: None,
            store_events: None,
            resolver: ElementKeyResolver::new(),
        }
    }

    // Session state

    pub fn active_locale(&self) -> Option<String> {
        self.active_locale
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_active_locale(&self, locale: Option<String>) {
        *self.active_locale.write().unwrap_or_else(PoisonError::into_inner) = locale;
    }

    pub fn active_unit_system(&self) -> Option<UnitSystem> {
        *self
            .active_unit_system
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_active_unit_system(&self, unit_system: Option<UnitSystem>) {
        *self
            .active_unit_system
            .write()
            .unwrap_or_else(PoisonError::into_inner) = unit_system;
    }

    /// Ruleset registrations.
    pub fn rulesets(&self) -> &RulesetManager {
        &self.rulesets
    }

    /// Variables of one ruleset.
    pub fn vars(&self, ruleset_id: impl Into<String>) -> RulesetVariables<'_> {
        self.variables.scoped(ruleset_id)
    }

    /// Subscribe to update events. Only read-write sessions with polling
    /// enabled ever publish any.
    pub fn on_updated(&self) -> broadcast::Receiver<UpdateEvent> {
        self.update_events.subscribe()
    }

    /// Check whether the update poller is running.
    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(UpdatePoller::is_running)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    // Hierarchies

    /// Root nodes, or children of `parent_key`.
    pub async fn get_nodes(
        &self,
        options: &RequestOptions<'_>,
        parent_key: Option<&NodeKey>,
        paging: Option<PageOptions>,
    ) -> Result<Vec<Node>> {
        self.ensure_active()?;
        let params = self.nodes_params(options, parent_key, paging).await?;
        self.dispatcher
            .send_typed(options.store.key(), nodes_request(parent_key), &params)
            .await
    }

    pub async fn get_nodes_count(
        &self,
        options: &RequestOptions<'_>,
        parent_key: Option<&NodeKey>,
    ) -> Result<u64> {
        self.ensure_active()?;
        let params = self.nodes_params(options, parent_key, None).await?;
        self.dispatcher
            .send_typed(options.store.key(), nodes_count_request(parent_key), &params)
            .await
    }

    /// A page of nodes and the total node count, fetched concurrently.
    pub async fn get_nodes_and_count(
        &self,
        options: &RequestOptions<'_>,
        parent_key: Option<&NodeKey>,
        paging: Option<PageOptions>,
    ) -> Result<PagedResponse<Node>> {
        self.ensure_active()?;
        let params = self.nodes_params(options, parent_key, paging).await?;
        self.dispatcher
            .send_paged(
                options.store.key(),
                nodes_request(parent_key),
                nodes_count_request(parent_key),
                &params,
            )
            .await
    }

    /// Paths to nodes whose labels match `filter_text`.
    pub async fn get_filtered_node_paths(
        &self,
        options: &RequestOptions<'_>,
        filter_text: &str,
    ) -> Result<Vec<NodePathElement>> {
        self.ensure_active()?;
        let params = FilteredNodePathsParams {
            common: self.common_params(options).await?,
            filter_text: filter_text.to_string(),
        };
        self.dispatcher
            .send_typed(options.store.key(), RequestKind::GetFilteredNodePaths, &params)
            .await
    }

    /// Node paths for key paths; the path at `marked_index` is marked.
    pub async fn get_node_paths(
        &self,
        options: &RequestOptions<'_>,
        paths: &[Vec<EntityKey>],
        marked_index: usize,
    ) -> Result<Vec<NodePathElement>> {
        self.ensure_active()?;
        let params = NodePathsParams {
            common: self.common_params(options).await?,
            paths: paths.to_vec(),
            marked_index,
        };
        self.dispatcher
            .send_typed(options.store.key(), RequestKind::GetNodePaths, &params)
            .await
    }

    /// Make the engine build and cache the whole hierarchy.
    pub async fn load_hierarchy(&self, options: &RequestOptions<'_>) -> Result<()> {
        self.ensure_active()?;
        let params = self.common_params(options).await?;
        self.dispatcher
            .send(options.store.key(), RequestKind::LoadHierarchy, &params)
            .await?;
        tracing::debug!(ruleset = %options.ruleset.declared_id(), "Loaded hierarchy");
        Ok(())
    }

    /// Edits turning the previous hierarchy into the current one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RulesetMismatch`] without dispatching when the two
    /// states declare different rulesets.
    pub async fn compare_hierarchies(
        &self,
        options: &HierarchyCompareOptions<'_>,
    ) -> Result<Vec<PartialHierarchyModification>> {
        self.ensure_active()?;
        HierarchyComparator::new(&self.rulesets, &self.dispatcher)
            .compare(options, self.active_locale())
            .await
    }

    // Content

    /// Content descriptor for `keys`, or `None` when the rules produce no
    /// content for them.
    pub async fn get_content_descriptor(
        &self,
        options: &RequestOptions<'_>,
        display_type: &str,
        keys: &KeySet,
        selection: Option<&SelectionInfo>,
    ) -> Result<Option<Descriptor>> {
        self.ensure_active()?;
        let params = ContentDescriptorParams {
            common: self.common_params(options).await?,
            display_type: display_type.to_string(),
            keys: self.resolver.resolve_key_set(options.store, keys).await?,
            selection: selection.cloned(),
            content_flags: None,
        };
        self.dispatcher
            .send_optional(options.store.key(), RequestKind::GetContentDescriptor, &params)
            .await
    }

    pub async fn get_content_set_size(
        &self,
        options: &RequestOptions<'_>,
        descriptor: &DescriptorOrOverrides,
        keys: &KeySet,
    ) -> Result<u64> {
        self.ensure_active()?;
        let params = self.content_params(options, descriptor, keys, None).await?;
        self.dispatcher
            .send_typed(options.store.key(), RequestKind::GetContentSetSize, &params)
            .await
    }

    /// A page of content, or `None` when the rules produce no content.
    pub async fn get_content(
        &self,
        options: &RequestOptions<'_>,
        descriptor: &DescriptorOrOverrides,
        keys: &KeySet,
        paging: Option<PageOptions>,
    ) -> Result<Option<Content>> {
        self.ensure_active()?;
        let params = self.content_params(options, descriptor, keys, paging).await?;
        self.dispatcher
            .send_optional(options.store.key(), RequestKind::GetContent, &params)
            .await
    }

    /// A page of content and the content set size, fetched concurrently.
    pub async fn get_content_and_size(
        &self,
        options: &RequestOptions<'_>,
        descriptor: &DescriptorOrOverrides,
        keys: &KeySet,
        paging: Option<PageOptions>,
    ) -> Result<ContentAndSize> {
        self.ensure_active()?;
        let params = self.content_params(options, descriptor, keys, paging).await?;
        let store = options.store.key();
        let (content, size) = join_results(tokio::join!(
            self.dispatcher
                .send_optional::<Content, _>(store, RequestKind::GetContent, &params),
            self.dispatcher
                .send_typed::<u64, _>(store, RequestKind::GetContentSetSize, &params),
        ))?;
        Ok(ContentAndSize { size, content })
    }

    /// Distinct display values of a field (unpaged).
    ///
    /// An empty `field_name` or key set still produces a request; a
    /// `maximum_value_count` of 0 means no limit.
    pub async fn get_distinct_values(
        &self,
        options: &RequestOptions<'_>,
        descriptor: &DescriptorOrOverrides,
        keys: &KeySet,
        field_name: &str,
        maximum_value_count: u64,
    ) -> Result<Vec<String>> {
        self.ensure_active()?;
        let params = DistinctValuesParams {
            common: self.common_params(options).await?,
            descriptor_overrides: descriptor.to_overrides(),
            keys: self.resolver.resolve_key_set(options.store, keys).await?,
            field_name: field_name.to_string(),
            maximum_value_count,
        };
        self.dispatcher
            .send_typed(options.store.key(), RequestKind::GetDistinctValues, &params)
            .await
    }

    /// A page of distinct values grouped by display value.
    ///
    /// Fields nested inside nested-content fields have no distinct values;
    /// for them the result is empty and the engine is not contacted.
    pub async fn get_paged_distinct_values(
        &self,
        options: &RequestOptions<'_>,
        descriptor: &DescriptorOrOverrides,
        keys: &KeySet,
        field_descriptor: &FieldDescriptor,
        paging: Option<PageOptions>,
    ) -> Result<PagedResponse<DisplayValueGroup>> {
        self.ensure_active()?;
        if field_descriptor.is_nested() {
            tracing::debug!(
                parent = field_descriptor.parent().unwrap_or(""),
                "Nested field has no distinct values"
            );
            return Ok(PagedResponse::empty());
        }

        let params = PagedDistinctValuesParams {
            common: self.common_params(options).await?,
            descriptor_overrides: descriptor.to_overrides(),
            keys: self.resolver.resolve_key_set(options.store, keys).await?,
            field_descriptor: field_descriptor.clone(),
            paging,
        };
        self.dispatcher
            .send_typed(options.store.key(), RequestKind::GetPagedDistinctValues, &params)
            .await
    }

    // Labels

    /// Display label of one record. The empty label is returned when the
    /// engine has none.
    pub async fn get_display_label_definition(
        &self,
        options: &StoreRequestOptions<'_>,
        key: &EntityKey,
    ) -> Result<LabelDefinition> {
        self.ensure_active()?;
        let params = DisplayLabelParams {
            key: self.resolver.resolve_key(options.store, key).await?,
            locale: options.locale.clone().or_else(|| self.active_locale()),
            unit_system: options.unit_system.or_else(|| self.active_unit_system()),
        };
        Ok(self
            .dispatcher
            .send_optional(options.store.key(), RequestKind::GetDisplayLabel, &params)
            .await?
            .unwrap_or_else(LabelDefinition::empty))
    }

    /// Display labels of many records, in the order of `keys`.
    ///
    /// Keys the engine has no label for get the empty label.
    pub async fn get_display_label_definitions(
        &self,
        options: &StoreRequestOptions<'_>,
        keys: &[EntityKey],
    ) -> Result<Vec<LabelDefinition>> {
        self.ensure_active()?;
        let resolved = self.resolver.resolve_all(options.store, keys).await?;

        let mut labels = Vec::with_capacity(resolved.len());
        for batch in resolved.chunks(LABEL_BATCH_SIZE) {
            let params = ContentParams {
                common: CommonParams {
                    ruleset_id: DISPLAY_LABEL_RULESET_ID.to_string(),
                    locale: options.locale.clone().or_else(|| self.active_locale()),
                    unit_system: options.unit_system.or_else(|| self.active_unit_system()),
                    ruleset_variables: Vec::new(),
                },
                descriptor_overrides: pres_types::DescriptorOverrides::new(
                    display_types::LIST,
                    ContentFlags::SHOW_LABELS | ContentFlags::NO_FIELDS,
                ),
                keys: batch.iter().cloned().collect(),
                paging: None,
            };
            let content: Option<Content> = self
                .dispatcher
                .send_optional(options.store.key(), RequestKind::GetContent, &params)
                .await?;
            labels.extend(reconcile_labels(batch, content.as_ref()));
        }
        Ok(labels)
    }

    // Selection

    pub async fn get_selection_scopes(
        &self,
        options: &StoreRequestOptions<'_>,
    ) -> Result<Vec<SelectionScope>> {
        self.ensure_active()?;
        let locale = options.locale.clone().or_else(|| self.active_locale());
        Ok(self
            .selection_scopes
            .get_selection_scopes(options.store, locale.as_deref())
            .await?)
    }

    pub async fn compute_selection(
        &self,
        options: &StoreRequestOptions<'_>,
        ids: &[EntityId],
        scope_id: &str,
    ) -> Result<KeySet> {
        self.ensure_active()?;
        Ok(self
            .selection_scopes
            .compute_selection(options.store, ids, scope_id)
            .await?)
    }

    // Lifecycle

    /// Release the engine and stop background work.
    ///
    /// Safe to call more than once; only the first call has an effect. Any
    /// operation called afterwards fails with [`Error::Disposed`].
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(poller) = &self.poller {
            poller.stop();
        }
        self.unsubscribe_store_events();
        self.engine.dispose();
        tracing::info!("Presentation manager disposed");
    }

    fn unsubscribe_store_events(&self) {
        if let Some(task) = self
            .schema_preload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_disposed() {
            return Err(Error::Disposed);
        }
        Ok(())
    }

    async fn common_params(&self, options: &RequestOptions<'_>) -> Result<CommonParams> {
        Ok(CommonParams {
            ruleset_id: self.rulesets.resolve_id(&options.ruleset).await?,
            locale: options.locale.clone().or_else(|| self.active_locale()),
            unit_system: options.unit_system.or_else(|| self.active_unit_system()),
            ruleset_variables: self
                .variables
                .request_variables(options.ruleset.declared_id(), &options.variables),
        })
    }

    async fn nodes_params(
        &self,
        options: &RequestOptions<'_>,
        parent_key: Option<&NodeKey>,
        paging: Option<PageOptions>,
    ) -> Result<NodesParams> {
        Ok(NodesParams {
            common: self.common_params(options).await?,
            node_key: parent_key.cloned(),
            paging,
        })
    }

    async fn content_params(
        &self,
        options: &RequestOptions<'_>,
        descriptor: &DescriptorOrOverrides,
        keys: &KeySet,
        paging: Option<PageOptions>,
    ) -> Result<ContentParams> {
        Ok(ContentParams {
            common: self.common_params(options).await?,
            descriptor_overrides: descriptor.to_overrides(),
            keys: self.resolver.resolve_key_set(options.store, keys).await?,
            paging,
        })
    }
}

impl Drop for PresentationManager {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn nodes_request(parent_key: Option<&NodeKey>) -> RequestKind {
    match parent_key {
        Some(_) => RequestKind::GetChildren,
        None => RequestKind::GetRootNodes,
    }
}

fn nodes_count_request(parent_key: Option<&NodeKey>) -> RequestKind {
    match parent_key {
        Some(_) => RequestKind::GetChildrenCount,
        None => RequestKind::GetRootNodesCount,
    }
}
