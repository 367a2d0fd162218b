use indexmap::IndexSet;
use serde::Serialize;
use shared::UpdateRequest;

use crate::stores::{AppState, ModuleLayoutManager};

/// An [`UpdateRequest`] with every missing field filled from current state.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub models: Vec<String>,
    pub dataset: String,
    pub hidden_module_keys: IndexSet<String>,
    pub layout_name: String,
}

impl ResolvedSettings {
    pub fn resolve<A, L>(request: UpdateRequest, app_state: &A, layout: &L) -> Self
    where
        A: AppState + ?Sized,
        L: ModuleLayoutManager + ?Sized,
    {
        let UpdateRequest {
            models,
            dataset,
            hidden_module_keys,
            layout_name,
        } = request;

        Self {
            models: models.unwrap_or_else(|| app_state.current_models()),
            dataset: dataset.unwrap_or_else(|| app_state.current_dataset()),
            hidden_module_keys: hidden_module_keys.unwrap_or_else(|| layout.hidden_module_keys()),
            layout_name: layout_name.unwrap_or_else(|| app_state.layout_name()),
        }
    }
}

/// Which parts of the application a settings update actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SettingsDiff {
    pub models_changed: bool,
    pub dataset_changed: bool,
    pub layout_changed: bool,
    pub hidden_modules_changed: bool,
}

impl SettingsDiff {
    pub fn is_unchanged(&self) -> bool {
        *self == Self::default()
    }
}
