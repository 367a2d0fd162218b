//! State collaborators of the settings coordinator
//!
//! The coordinator owns no state. It reads and mutates three stores through
//! the traits below:
//!
//! - **[`AppState`]** - active models, dataset, layout name, comparison mode,
//!   and the metadata describing which datasets each model supports
//! - **[`ModuleLayoutManager`]** - hidden module keys and the computed and
//!   rendered module layout
//! - **[`SelectionStore`]** - ids of the currently selected data points
//!
//! Simple in-memory implementations live in the submodules; applications
//! with richer stores implement the traits directly.

use indexmap::{IndexMap, IndexSet};
use shared::{DatasetSpec, LayoutDefinition, ModelSpec};

use crate::dataflow::Subscription;

pub mod app_state;
pub mod module_layout;
pub mod selection;

pub use app_state::AppStateStore;
pub use module_layout::{ComputedLayout, ModuleLayout};
pub use selection::SelectionSet;

/// Specs of the active models keyed by model name, in selection order.
pub type ModelSpecs = IndexMap<String, ModelSpec>;

/// Callback invoked with the new comparison-mode flag.
pub type CompareExamplesListener = Box<dyn Fn(bool) + Send + Sync>;

/// Failures reported by the model and dataset setters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("unknown model '{0}'")]
    UnknownModel(String),
    #[error("unknown dataset '{0}'")]
    UnknownDataset(String),
    /// Model metadata (spec, supported datasets) could not be retrieved.
    #[error("failed to fetch metadata for model '{model}': {reason}")]
    MetadataFetch { model: String, reason: String },
    /// Dataset examples could not be loaded.
    #[error("failed to load dataset '{dataset}': {reason}")]
    DataLoad { dataset: String, reason: String },
}

/// Active selection plus the metadata it is validated against.
///
/// Reads are synchronous snapshots. Only the model and dataset setters may
/// suspend, since real stores fetch metadata or examples there.
#[allow(async_fn_in_trait)]
pub trait AppState {
    /// Active model names, in selection order. May contain duplicates.
    fn current_models(&self) -> Vec<String>;

    /// Active dataset name; empty when none is loaded.
    fn current_dataset(&self) -> String;

    /// Name of the active layout. It may name a layout with no definition.
    fn layout_name(&self) -> String;

    /// Layout definition registered under `name`, if any.
    fn layout_definition(&self, name: &str) -> Option<LayoutDefinition>;

    /// Specs of the active models that have metadata.
    fn current_model_specs(&self) -> ModelSpecs;

    /// Spec of the active dataset; empty when no dataset is active.
    fn current_dataset_spec(&self) -> DatasetSpec;

    /// Whether examples are shown side by side.
    fn compare_examples_enabled(&self) -> bool;

    /// Datasets a model supports, or `None` when the model has no metadata.
    fn model_datasets(&self, model: &str) -> Option<Vec<String>>;

    /// Every dataset known to the metadata, in metadata order.
    fn dataset_names(&self) -> Vec<String>;

    /// Switch the active models. May fetch model metadata.
    async fn set_models(&self, models: Vec<String>) -> Result<(), StoreError>;

    /// Switch the active dataset, fetching its examples when `load_data` is set.
    async fn set_dataset(&self, dataset: String, load_data: bool) -> Result<(), StoreError>;

    /// Record the active layout name. Does not touch module instances.
    fn set_layout_name(&self, name: String);

    /// Register a listener for comparison-mode changes.
    fn on_compare_examples_changed(&self, listener: CompareExamplesListener) -> Subscription;
}

/// Owner of the module grid: which modules exist and which are shown.
pub trait ModuleLayoutManager {
    /// Module keys the user chose to hide.
    fn hidden_module_keys(&self) -> IndexSet<String>;

    /// Replace the hidden keys. Takes effect on the next recompute.
    fn set_hidden_module_keys(&self, keys: IndexSet<String>);

    /// Recompute which modules show, reusing existing module instances.
    fn update_render_layout(&self, models: &ModelSpecs, dataset: &DatasetSpec, compare_examples: bool);

    /// Install a layout definition and allocate fresh per-module state.
    fn initialize_layout(
        &self,
        layout: &LayoutDefinition,
        models: &ModelSpecs,
        dataset: &DatasetSpec,
        compare_examples: bool,
    );

    /// Push the last computed layout to the screen.
    fn render_modules(&self);
}

/// Ids of the selected data points of the active dataset.
pub trait SelectionStore {
    fn selected_ids(&self) -> IndexSet<String>;

    /// Replace the selection. An empty set clears it.
    fn select_ids(&self, ids: IndexSet<String>);
}
