//! In-memory module layout
//!
//! Keeps the active layout definition and hidden module keys, and derives a
//! flat list of visible modules from them. Placement within the grid is left
//! to the renderer.

use indexmap::IndexSet;
use shared::{DatasetSpec, LayoutDefinition};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{ModelSpecs, ModuleLayoutManager};
use crate::dataflow::{Atom, Subscription};

/// Result of one layout computation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedLayout {
    pub modules: Vec<String>,
    pub compare_examples: bool,
    /// Module instance generation the layout was computed against.
    pub generation: u64,
}

impl ComputedLayout {
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[derive(Debug, Default)]
struct LayoutState {
    definition: Option<LayoutDefinition>,
    generation: u64,
    computed: ComputedLayout,
    render_count: u64,
}

/// Module grid state: hidden keys, the active definition, and the layout
/// most recently pushed to the screen.
///
/// ```rust
/// use frontend::stores::{ModuleLayout, ModuleLayoutManager};
///
/// let layout = ModuleLayout::new();
/// layout.render_modules();
/// assert!(layout.rendered().is_some_and(|rendered| rendered.is_empty()));
/// ```
#[derive(Debug, Default)]
pub struct ModuleLayout {
    hidden_module_keys: Atom<IndexSet<String>>,
    rendered: Atom<Option<ComputedLayout>>,
    state: Mutex<LayoutState>,
}

impl ModuleLayout {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LayoutState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// What the screen currently shows, if anything was rendered yet.
    pub fn rendered(&self) -> Option<ComputedLayout> {
        self.rendered.get_cloned()
    }

    /// Observable render output, for binding module containers to it.
    pub fn rendered_atom(&self) -> &Atom<Option<ComputedLayout>> {
        &self.rendered
    }

    /// Register a listener called after every render.
    pub fn on_render(&self, listener: impl Fn(&ComputedLayout) + Send + Sync + 'static) -> Subscription {
        self.rendered.subscribe(move |rendered| {
            if let Some(rendered) = rendered {
                listener(rendered);
            }
        })
    }

    pub fn render_count(&self) -> u64 {
        self.lock().render_count
    }

    /// Bumped each time the layout is reinitialized.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn compute(&self, state: &mut LayoutState, models: &ModelSpecs, dataset: &DatasetSpec, compare_examples: bool) {
        // Nothing to show without a model or a dataset.
        let modules: Vec<String> = match &state.definition {
            Some(definition) if !(models.is_empty() && dataset.is_empty()) => {
                self.hidden_module_keys.with(|hidden| {
                    definition
                        .module_keys()
                        .filter(|key| !hidden.contains(*key))
                        .cloned()
                        .collect::<IndexSet<_>>()
                        .into_iter()
                        .collect()
                })
            }
            _ => Vec::new(),
        };

        state.computed = ComputedLayout {
            modules,
            compare_examples,
            generation: state.generation,
        };
    }
}

impl ModuleLayoutManager for ModuleLayout {
    fn hidden_module_keys(&self) -> IndexSet<String> {
        self.hidden_module_keys.get_cloned()
    }

    fn set_hidden_module_keys(&self, keys: IndexSet<String>) {
        self.hidden_module_keys.set(keys);
    }

    fn update_render_layout(&self, models: &ModelSpecs, dataset: &DatasetSpec, compare_examples: bool) {
        let mut state = self.lock();
        self.compute(&mut state, models, dataset, compare_examples);
    }

    fn initialize_layout(
        &self,
        layout: &LayoutDefinition,
        models: &ModelSpecs,
        dataset: &DatasetSpec,
        compare_examples: bool,
    ) {
        let mut state = self.lock();
        state.definition = Some(layout.clone());
        state.generation += 1;
        self.compute(&mut state, models, dataset, compare_examples);
    }

    fn render_modules(&self) {
        let computed = {
            let mut state = self.lock();
            state.render_count += 1;
            state.computed.clone()
        };
        self.rendered.set(Some(computed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use shared::ModelSpec;

    fn layout() -> LayoutDefinition {
        let mut upper = IndexMap::new();
        upper.insert("Main".to_string(), vec!["embeddings".to_string(), "data-table".to_string()]);
        let mut lower = IndexMap::new();
        lower.insert("Predictions".to_string(), vec!["classification".to_string(), "data-table".to_string()]);
        LayoutDefinition {
            description: None,
            upper,
            lower,
        }
    }

    fn models() -> ModelSpecs {
        let mut models = ModelSpecs::new();
        models.insert("bert".to_string(), ModelSpec::default());
        models
    }

    #[test]
    fn test_hidden_modules_are_filtered_and_duplicates_dropped() {
        let manager = ModuleLayout::new();
        manager.set_hidden_module_keys(IndexSet::from(["embeddings".to_string()]));
        manager.initialize_layout(&layout(), &models(), &DatasetSpec::default(), false);
        manager.render_modules();

        let rendered = manager.rendered().unwrap();
        assert_eq!(rendered.modules, vec!["data-table", "classification"]);
        assert_eq!(rendered.generation, 1);
    }

    #[test]
    fn test_empty_inputs_compute_empty_layout() {
        let manager = ModuleLayout::new();
        manager.initialize_layout(&layout(), &models(), &DatasetSpec::default(), true);
        manager.update_render_layout(&ModelSpecs::new(), &DatasetSpec::default(), false);
        manager.render_modules();

        let rendered = manager.rendered().unwrap();
        assert!(rendered.is_empty());
        assert!(!rendered.compare_examples);
    }

    #[test]
    fn test_render_listeners_see_each_render() {
        let manager = ModuleLayout::new();
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let sink = std::sync::Arc::clone(&seen);
        let subscription = manager.on_render(move |rendered| {
            sink.lock().unwrap().push(rendered.modules.len());
        });

        manager.update_render_layout(&ModelSpecs::new(), &DatasetSpec::default(), false);
        manager.render_modules();
        manager.initialize_layout(&layout(), &models(), &DatasetSpec::default(), false);
        manager.render_modules();
        subscription.unsubscribe();
        manager.render_modules();

        assert_eq!(*seen.lock().unwrap(), vec![0, 3]);
        assert_eq!(manager.render_count(), 3);
    }

    #[test]
    fn test_update_keeps_generation() {
        let manager = ModuleLayout::new();
        manager.initialize_layout(&layout(), &models(), &DatasetSpec::default(), false);
        manager.update_render_layout(&models(), &DatasetSpec::default(), true);
        manager.render_modules();

        assert_eq!(manager.generation(), 1);
        assert_eq!(manager.render_count(), 1);
        assert!(manager.rendered().unwrap().compare_examples);
    }
}
