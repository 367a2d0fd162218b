//! In-memory application state backed by static metadata

use shared::{AppMetadata, DatasetSpec, LayoutDefinition};

use super::{AppState, CompareExamplesListener, ModelSpecs, StoreError};
use crate::dataflow::{Atom, Subscription};

/// Application state whose metadata is known up front.
///
/// Model and dataset switches are validated against the metadata; nothing
/// is fetched. The most recently loaded dataset is tracked so callers can
/// tell a load apart from a plain switch.
#[derive(Debug)]
pub struct AppStateStore {
    metadata: AppMetadata,
    models: Atom<Vec<String>>,
    dataset: Atom<String>,
    layout_name: Atom<String>,
    compare_examples: Atom<bool>,
    loaded_dataset: Atom<Option<String>>,
}

impl AppStateStore {
    pub fn new(metadata: AppMetadata) -> Self {
        let layout_name = Atom::new(metadata.default_layout.clone());
        Self {
            metadata,
            models: Atom::default(),
            dataset: Atom::default(),
            layout_name,
            compare_examples: Atom::new(false),
            loaded_dataset: Atom::new(None),
        }
    }

    pub fn metadata(&self) -> &AppMetadata {
        &self.metadata
    }

    /// Toggle side-by-side comparison. Listeners fire only on a real change.
    pub fn set_compare_examples(&self, enabled: bool) {
        self.compare_examples.set_neq(enabled);
    }

    pub fn loaded_dataset(&self) -> Option<String> {
        self.loaded_dataset.get_cloned()
    }
}

impl AppState for AppStateStore {
    fn current_models(&self) -> Vec<String> {
        self.models.get_cloned()
    }

    fn current_dataset(&self) -> String {
        self.dataset.get_cloned()
    }

    fn layout_name(&self) -> String {
        self.layout_name.get_cloned()
    }

    fn layout_definition(&self, name: &str) -> Option<LayoutDefinition> {
        self.metadata.layouts.get(name).cloned()
    }

    fn current_model_specs(&self) -> ModelSpecs {
        self.models.with(|models| {
            models
                .iter()
                .filter_map(|name| {
                    self.metadata
                        .models
                        .get(name)
                        .map(|info| (name.clone(), info.spec.clone()))
                })
                .collect()
        })
    }

    fn current_dataset_spec(&self) -> DatasetSpec {
        self.dataset.with(|dataset| {
            self.metadata
                .datasets
                .get(dataset)
                .map(|info| info.spec.clone())
                .unwrap_or_default()
        })
    }

    fn compare_examples_enabled(&self) -> bool {
        self.compare_examples.get_cloned()
    }

    fn model_datasets(&self, model: &str) -> Option<Vec<String>> {
        self.metadata.models.get(model).map(|info| info.datasets.clone())
    }

    fn dataset_names(&self) -> Vec<String> {
        self.metadata.datasets.keys().cloned().collect()
    }

    async fn set_models(&self, models: Vec<String>) -> Result<(), StoreError> {
        if let Some(unknown) = models.iter().find(|name| !self.metadata.models.contains_key(*name)) {
            return Err(StoreError::UnknownModel(unknown.clone()));
        }
        self.models.set_neq(models);
        Ok(())
    }

    async fn set_dataset(&self, dataset: String, load_data: bool) -> Result<(), StoreError> {
        if !self.metadata.datasets.contains_key(&dataset) {
            return Err(StoreError::UnknownDataset(dataset));
        }
        if load_data {
            self.loaded_dataset.set(Some(dataset.clone()));
        }
        self.dataset.set_neq(dataset);
        Ok(())
    }

    fn set_layout_name(&self, name: String) {
        self.layout_name.set_neq(name);
    }

    fn on_compare_examples_changed(&self, listener: CompareExamplesListener) -> Subscription {
        self.compare_examples.subscribe(move |enabled| listener(*enabled))
    }
}
