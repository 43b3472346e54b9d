//! Response lifecycle for story-embedded quiz and poll widgets.
//!
//! The [`InteractiveWidget`] controller owns the one-way
//! `AwaitingSelection -> Locked` state machine, reconciles remotely
//! retrieved aggregates with the local optimistic tally, and guarantees
//! at-most-once submission of the user's choice. Rendering, analytics,
//! font loading, and transport all sit behind trait seams so hosts can
//! wire their own implementations.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use apportion::percentages;
use async_trait::async_trait;
use chrono::Utc;
use shared::{
    domain::{InteractiveType, OptionBounds, OptionRecord, SelectionState, WidgetId},
    error::ConfigError,
    protocol::{AggregateEntry, SelectionEvent},
};
use thiserror::Error;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{info, warn};

pub mod fonts;
mod http_backend;

pub use http_backend::HttpResponseBackend;

use fonts::FontService;

/// Failures at the network boundary. Absorbed and logged by the
/// controller; they never surface to the host or roll back local state.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("endpoint returned status {0}")]
    Status(u16),
    #[error("malformed aggregate payload: {0}")]
    MalformedPayload(String),
}

/// Remote datastore for aggregate response counts.
#[async_trait]
pub trait ResponseBackend: Send + Sync {
    async fn fetch_aggregates(&self) -> Result<Vec<AggregateEntry>, BackendError>;

    /// Best-effort, at-most-once vote submission. Callers never await the
    /// outcome beyond logging and must not retry.
    async fn submit_selection(&self, option_index: usize) -> Result<(), BackendError>;
}

/// Capability interface for the per-variant presentation layer (quiz and
/// poll render differently; the lifecycle does not care). All calls are
/// one-way.
pub trait WidgetPresentation: Send + Sync {
    /// Build the pre-selection visuals.
    fn build(&self);

    /// Display percentages, one entry per option in option-index order.
    fn apply_percentages(&self, percentages: &[u8]);

    /// Switch to post-selection visuals. `has_aggregate_data` tells the
    /// variant whether community counts exist to show alongside.
    fn show_post_selection(&self, selected_index: usize, has_aggregate_data: bool);
}

/// Sink for user-initiated selection events.
pub trait AnalyticsSink: Send + Sync {
    fn selection_made(&self, event: SelectionEvent);
}

/// Null sink for hosts without analytics wiring.
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn selection_made(&self, _event: SelectionEvent) {}
}

/// Parsed widget configuration, immutable after validation.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub widget_id: WidgetId,
    pub interactive_type: InteractiveType,
    pub options: Vec<OptionRecord>,
    pub bounds: OptionBounds,
}

impl WidgetConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.bounds.contains(self.options.len()) {
            return Err(ConfigError::OptionCountOutOfBounds {
                count: self.options.len(),
                min: self.bounds.min,
                max: self.bounds.max,
            });
        }
        for (position, option) in self.options.iter().enumerate() {
            if option.index != position {
                return Err(ConfigError::NonContiguousOptionIndex {
                    position,
                    index: option.index,
                });
            }
        }
        Ok(())
    }
}

/// Per-option aggregate tallies plus the current user's selection flag.
///
/// The store performs no re-entrancy checking of its own; the controller's
/// `SelectionState` is the sole guard against repeated local selection.
#[derive(Debug, Default)]
pub struct ResponseStore {
    entries: Option<Vec<AggregateEntry>>,
}

impl ResponseStore {
    /// Bulk replace from a trusted remote source. Entries beyond the
    /// visible option count come from stale or over-provisioned responses
    /// and are discarded; options the payload omits tally as zero.
    pub fn record(&mut self, entries: Vec<AggregateEntry>, visible_options: usize) {
        let mut normalized: Vec<AggregateEntry> = (0..visible_options)
            .map(AggregateEntry::zeroed)
            .collect();
        for entry in entries {
            let option_index = entry.option_index;
            if option_index < visible_options {
                normalized[option_index] = entry;
            }
        }
        self.entries = Some(normalized);
    }

    /// Optimistic local increment. Synthesizes a zeroed entry set first
    /// when no remote data exists, in which case this call is the sole
    /// source of truth for counts.
    pub fn apply_local_selection(&mut self, option_index: usize, visible_options: usize) {
        let entries = self
            .entries
            .get_or_insert_with(|| (0..visible_options).map(AggregateEntry::zeroed).collect());
        if let Some(entry) = entries.get_mut(option_index) {
            entry.total_count += 1;
            entry.selected_by_user = true;
        }
    }

    /// Merge a late-arriving remote payload under an existing local
    /// selection: remote counts win, local selection identity wins. The
    /// optimistic +1 is re-applied unless the payload already credits this
    /// client with a recorded vote.
    pub fn reconcile(
        &mut self,
        remote: Vec<AggregateEntry>,
        chosen_index: usize,
        visible_options: usize,
    ) {
        let already_credited = remote
            .iter()
            .any(|entry| entry.selected_by_user && entry.option_index < visible_options);
        self.record(remote, visible_options);
        if let Some(entries) = self.entries.as_mut() {
            for entry in entries.iter_mut() {
                entry.selected_by_user = false;
            }
            if let Some(entry) = entries.get_mut(chosen_index) {
                if !already_credited {
                    entry.total_count += 1;
                }
                entry.selected_by_user = true;
            }
        }
    }

    pub fn has_data(&self) -> bool {
        self.entries.is_some()
    }

    pub fn counts(&self) -> Option<Vec<u64>> {
        self.entries
            .as_ref()
            .map(|entries| entries.iter().map(|entry| entry.total_count).collect())
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.entries.as_ref().and_then(|entries| {
            entries
                .iter()
                .find(|entry| entry.selected_by_user)
                .map(|entry| entry.option_index)
        })
    }

    pub fn entries(&self) -> Option<&[AggregateEntry]> {
        self.entries.as_deref()
    }
}

struct WidgetState {
    selection: SelectionState,
    selected_index: Option<usize>,
    remote_seen: bool,
    store: ResponseStore,
    retrieval_task: Option<JoinHandle<()>>,
}

/// Lifecycle controller for one widget instance.
pub struct InteractiveWidget {
    config: WidgetConfig,
    backend: Option<Arc<dyn ResponseBackend>>,
    presentation: Arc<dyn WidgetPresentation>,
    analytics: Arc<dyn AnalyticsSink>,
    fonts: Arc<FontService>,
    live: AtomicBool,
    inner: Mutex<WidgetState>,
}

impl InteractiveWidget {
    /// Validates the configuration and builds the controller. A `backend`
    /// of `None` means no remote endpoint is configured: the widget counts
    /// locally and never issues requests.
    pub fn new(
        config: WidgetConfig,
        backend: Option<Arc<dyn ResponseBackend>>,
        presentation: Arc<dyn WidgetPresentation>,
        analytics: Arc<dyn AnalyticsSink>,
        fonts: Arc<FontService>,
    ) -> Result<Arc<Self>, ConfigError> {
        config.validate()?;
        Ok(Arc::new(Self {
            config,
            backend,
            presentation,
            analytics,
            fonts,
            live: AtomicBool::new(true),
            inner: Mutex::new(WidgetState {
                selection: SelectionState::AwaitingSelection,
                selected_index: None,
                remote_seen: false,
                store: ResponseStore::default(),
                retrieval_task: None,
            }),
        }))
    }

    /// Builds the presentation and, when a backend is configured, spawns
    /// the aggregate retrieval. The retrieval never blocks interaction:
    /// taps landing before it resolves are honored immediately and the
    /// late payload only refreshes counts.
    pub async fn attach(self: &Arc<Self>) {
        if let Err(err) = self.fonts.ensure_loaded().await {
            warn!(
                widget = %self.config.widget_id.0,
                "font preload failed, continuing without custom fonts: {err:#}"
            );
        }
        self.presentation.build();

        let Some(backend) = self.backend.clone() else {
            return;
        };
        let widget = Arc::clone(self);
        let task = tokio::spawn(async move {
            match backend.fetch_aggregates().await {
                Ok(entries) => widget.ingest_aggregates(entries).await,
                Err(err) => {
                    warn!(
                        widget = %widget.config.widget_id.0,
                        "aggregate retrieval failed, degrading to local-only counting: {err}"
                    );
                }
            }
        });
        self.inner.lock().await.retrieval_task = Some(task);
    }

    /// Tap handler. The first in-range tap locks the widget, records the
    /// optimistic tally, emits exactly one analytics event, renders the
    /// post-selection view, and fires the submission without awaiting it.
    /// Every later tap is a no-op.
    pub async fn tap_option(&self, option_index: usize) {
        if option_index >= self.config.options.len() {
            return;
        }

        // Check-then-set stays inside one lock acquisition with no await
        // points, so a reentrant tap can never slip through.
        let mut inner = self.inner.lock().await;
        if inner.selection == SelectionState::Locked {
            return;
        }
        inner.selection = SelectionState::Locked;
        inner.selected_index = Some(option_index);

        self.analytics.selection_made(SelectionEvent {
            widget_id: self.config.widget_id.clone(),
            interactive_type: self.config.interactive_type,
            option_index,
            occurred_at: Utc::now(),
        });

        inner
            .store
            .apply_local_selection(option_index, self.config.options.len());
        let counts = inner.store.counts().unwrap_or_default();
        self.presentation
            .show_post_selection(option_index, inner.remote_seen);
        self.presentation.apply_percentages(&percentages(&counts));
        info!(
            widget = %self.config.widget_id.0,
            option = option_index,
            "selection locked"
        );
        drop(inner);

        if let Some(backend) = self.backend.clone() {
            let widget_id = self.config.widget_id.clone();
            tokio::spawn(async move {
                if let Err(err) = backend.submit_selection(option_index).await {
                    warn!(
                        widget = %widget_id.0,
                        option = option_index,
                        "selection submission failed, keeping local state: {err}"
                    );
                }
            });
        }
    }

    /// Marks the widget dead and aborts any in-flight retrieval so its
    /// continuation can no longer mutate state.
    pub async fn detach(&self) {
        self.live.store(false, Ordering::SeqCst);
        let task = self.inner.lock().await.retrieval_task.take();
        if let Some(task) = task {
            task.abort();
        }
    }

    pub async fn selection_state(&self) -> SelectionState {
        self.inner.lock().await.selection
    }

    pub async fn selected_option(&self) -> Option<usize> {
        self.inner.lock().await.selected_index
    }

    pub async fn aggregates(&self) -> Option<Vec<AggregateEntry>> {
        self.inner
            .lock()
            .await
            .store
            .entries()
            .map(<[AggregateEntry]>::to_vec)
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    async fn ingest_aggregates(&self, entries: Vec<AggregateEntry>) {
        if !self.live.load(Ordering::SeqCst) {
            return;
        }
        let mut inner = self.inner.lock().await;
        inner.remote_seen = true;
        let visible = self.config.options.len();

        match inner.selection {
            SelectionState::AwaitingSelection => {
                inner.store.record(entries, visible);
                let Some(selected) = inner.store.selected_index() else {
                    return;
                };
                // The aggregate says this user already responded in a
                // prior session: lock and replay the post-selection
                // visuals, but emit no analytics event for it.
                inner.selection = SelectionState::Locked;
                inner.selected_index = Some(selected);
                let counts = inner.store.counts().unwrap_or_default();
                self.presentation.show_post_selection(selected, true);
                self.presentation.apply_percentages(&percentages(&counts));
                info!(
                    widget = %self.config.widget_id.0,
                    option = selected,
                    "selection restored from aggregate data"
                );
            }
            SelectionState::Locked => {
                // The user tapped while the fetch was in flight. Their own
                // selection is authoritative; the remote payload only
                // refreshes counts.
                let Some(chosen) = inner.selected_index else {
                    return;
                };
                inner.store.reconcile(entries, chosen, visible);
                let counts = inner.store.counts().unwrap_or_default();
                self.presentation.apply_percentages(&percentages(&counts));
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
