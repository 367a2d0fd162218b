//! Settings coordination
//!
//! Applies a batch of settings changes (models, dataset, hidden modules,
//! layout) in an order that never lets a mounted module observe a half
//! applied state:
//!
//! 1. Clear the layout and render it, unmounting every module.
//! 2. Wait one rendering frame so the cleared layout is committed.
//! 3. Resolve the request against current state and diff it.
//! 4. Apply models, then dataset (clearing the selection first), then the
//!    layout name (full layout reinitialization), then hidden modules.
//! 5. Recompute and render the layout from the updated state.
//!
//! Comparison-mode toggles skip all of the above and only run step 5.

use futures::channel::mpsc::UnboundedReceiver;
use indexmap::IndexSet;
use shared::{DatasetSpec, UpdateRequest};
use std::sync::{Arc, Weak};

use super::compare::{same_multiset, same_set};
use super::resolved::{ResolvedSettings, SettingsDiff};
use crate::dataflow::{Relay, Subscription, relay};
use crate::error::SettingsError;
use crate::platform::FrameClock;
use crate::stores::{AppState, ModelSpecs, ModuleLayoutManager, SelectionStore};

/// Orchestrates settings updates across the application stores.
///
/// Holds no state of its own beyond the comparison-mode subscription, which
/// lives exactly as long as the coordinator. Only one `update_settings` call
/// may run at a time; callers serialize them.
pub struct SettingsCoordinator<A, L, S, F>
where
    A: AppState + Send + Sync + 'static,
    L: ModuleLayoutManager + Send + Sync + 'static,
    S: SelectionStore,
    F: FrameClock,
{
    app_state: Arc<A>,
    layout: Arc<L>,
    selection: Arc<S>,
    frame_clock: F,
    settings_applied_relay: Relay<SettingsDiff>,
    compare_examples_subscription: Option<Subscription>,
}

impl<A, L, S, F> SettingsCoordinator<A, L, S, F>
where
    A: AppState + Send + Sync + 'static,
    L: ModuleLayoutManager + Send + Sync + 'static,
    S: SelectionStore,
    F: FrameClock,
{
    /// Create the coordinator and register the comparison-mode observer.
    ///
    /// Returns the stream of applied [`SettingsDiff`]s alongside.
    pub fn new(
        app_state: Arc<A>,
        layout: Arc<L>,
        selection: Arc<S>,
        frame_clock: F,
    ) -> (Self, UnboundedReceiver<SettingsDiff>) {
        let (settings_applied_relay, settings_applied_stream) = relay();

        let weak_app_state: Weak<A> = Arc::downgrade(&app_state);
        let weak_layout: Weak<L> = Arc::downgrade(&layout);
        let compare_examples_subscription =
            app_state.on_compare_examples_changed(Box::new(move |compare_examples: bool| {
                let (Some(app_state), Some(layout)) = (weak_app_state.upgrade(), weak_layout.upgrade())
                else {
                    return;
                };
                log::debug!("Comparison mode changed to {compare_examples}, refreshing layout");
                refresh_layout(&*app_state, &*layout, compare_examples);
            }));

        let coordinator = Self {
            app_state,
            layout,
            selection,
            frame_clock,
            settings_applied_relay,
            compare_examples_subscription: Some(compare_examples_subscription),
        };
        (coordinator, settings_applied_stream)
    }

    pub fn app_state(&self) -> &Arc<A> {
        &self.app_state
    }

    pub fn layout(&self) -> &Arc<L> {
        &self.layout
    }

    pub fn selection(&self) -> &Arc<S> {
        &self.selection
    }

    /// True iff every model lists `dataset` among its supported datasets.
    ///
    /// Models without metadata support nothing. An empty model list accepts
    /// any dataset.
    pub fn is_dataset_valid_for_models(&self, dataset: &str, models: &[String]) -> bool {
        dataset_valid_for_models(&*self.app_state, dataset, models)
    }

    /// Datasets compatible with every model in `models`, in metadata order.
    pub fn valid_datasets_for_models(&self, models: &[String]) -> Vec<String> {
        self.app_state
            .dataset_names()
            .into_iter()
            .filter(|dataset| self.is_dataset_valid_for_models(dataset, models))
            .collect()
    }

    /// Apply a batch of settings changes.
    ///
    /// Errors from the model or dataset setters propagate unchanged. Nothing
    /// is rolled back, and the layout stays cleared when a setter fails.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use frontend::config::WorkspaceCoordinator;
    /// # use frontend::platform::YieldFrame;
    /// use shared::UpdateRequest;
    ///
    /// # async fn switch(coordinator: &WorkspaceCoordinator<YieldFrame>) -> Result<(), frontend::SettingsError> {
    /// let request = UpdateRequest::default()
    ///     .with_models(["sst2-tiny", "sst2-base"])
    ///     .with_dataset("sst_dev");
    /// let diff = coordinator.update_settings(request).await?;
    /// assert!(!diff.layout_changed);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn update_settings(&self, request: UpdateRequest) -> Result<SettingsDiff, SettingsError> {
        // Unmount every module before touching shared state.
        self.layout
            .update_render_layout(&ModelSpecs::new(), &DatasetSpec::default(), false);
        self.layout.render_modules();

        self.frame_clock.next_frame().await;

        let resolved = ResolvedSettings::resolve(request, &*self.app_state, &*self.layout);
        let current_models = self.app_state.current_models();
        let current_dataset = self.app_state.current_dataset();

        let mut diff = SettingsDiff {
            models_changed: !same_multiset(&resolved.models, &current_models),
            dataset_changed: resolved.dataset != current_dataset && !resolved.dataset.is_empty(),
            ..SettingsDiff::default()
        };
        log::debug!(
            "Settings diff: models {:?} -> {:?} ({}), dataset '{}' -> '{}' ({})",
            current_models,
            resolved.models,
            diff.models_changed,
            current_dataset,
            resolved.dataset,
            diff.dataset_changed,
        );

        if diff.models_changed {
            log::info!("Switching models to {:?}", resolved.models);
            self.app_state.set_models(resolved.models.clone()).await?;
        }

        if diff.dataset_changed {
            if !self.is_dataset_valid_for_models(&resolved.dataset, &resolved.models) {
                log::warn!(
                    "Dataset '{}' is not supported by every model in {:?}",
                    resolved.dataset,
                    resolved.models
                );
            }
            // Stale ids from the old dataset must never reach a module.
            self.selection.select_ids(IndexSet::new());
            log::info!("Switching dataset to '{}'", resolved.dataset);
            self.app_state.set_dataset(resolved.dataset.clone(), true).await?;
        }

        if resolved.layout_name != self.app_state.layout_name() {
            diff.layout_changed = true;
            log::info!("Switching layout to '{}'", resolved.layout_name);
            self.app_state.set_layout_name(resolved.layout_name.clone());
            self.reinitialize_layout(&resolved.layout_name);
        }

        if !same_set(&resolved.hidden_module_keys, &self.layout.hidden_module_keys()) {
            diff.hidden_modules_changed = true;
            log::debug!("Hiding modules {:?}", resolved.hidden_module_keys);
            self.layout.set_hidden_module_keys(resolved.hidden_module_keys);
        }

        refresh_layout(
            &*self.app_state,
            &*self.layout,
            self.app_state.compare_examples_enabled(),
        );

        self.settings_applied_relay.send(diff);
        Ok(diff)
    }

    fn reinitialize_layout(&self, layout_name: &str) {
        let Some(definition) = self.app_state.layout_definition(layout_name) else {
            log::warn!("No layout named '{layout_name}', keeping current module instances");
            return;
        };
        self.layout.initialize_layout(
            &definition,
            &self.app_state.current_model_specs(),
            &self.app_state.current_dataset_spec(),
            self.app_state.compare_examples_enabled(),
        );
    }

    /// Unregister the comparison-mode observer.
    ///
    /// Dropping the coordinator does the same; this makes teardown explicit
    /// at the call site.
    pub fn dispose(mut self) {
        self.unsubscribe_compare_examples();
    }

    fn unsubscribe_compare_examples(&mut self) {
        if let Some(subscription) = self.compare_examples_subscription.take() {
            log::debug!("Removing comparison-mode observer");
            subscription.unsubscribe();
        }
    }
}

impl<A, L, S, F> Drop for SettingsCoordinator<A, L, S, F>
where
    A: AppState + Send + Sync + 'static,
    L: ModuleLayoutManager + Send + Sync + 'static,
    S: SelectionStore,
    F: FrameClock,
{
    fn drop(&mut self) {
        self.unsubscribe_compare_examples();
    }
}

/// Fast path: recompute and render, reusing module instances.
fn refresh_layout<A, L>(app_state: &A, layout: &L, compare_examples: bool)
where
    A: AppState + ?Sized,
    L: ModuleLayoutManager + ?Sized,
{
    layout.update_render_layout(
        &app_state.current_model_specs(),
        &app_state.current_dataset_spec(),
        compare_examples,
    );
    layout.render_modules();
}

fn dataset_valid_for_models<A>(app_state: &A, dataset: &str, models: &[String]) -> bool
where
    A: AppState + ?Sized,
{
    models.iter().all(|model| {
        app_state
            .model_datasets(model)
            .is_some_and(|datasets| datasets.iter().any(|name| name == dataset))
    })
}
