//! Startup configuration
//!
//! Builds the in-memory stores from an [`AppConfig`] and applies the saved
//! workspace selection through the coordinator, so startup follows the same
//! ordering rules as any later settings change.

use futures::channel::mpsc::UnboundedReceiver;
use shared::AppConfig;
use std::sync::Arc;

use crate::error::SettingsError;
use crate::platform::FrameClock;
use crate::settings::{SettingsCoordinator, SettingsDiff};
use crate::stores::{AppState, AppStateStore, ModuleLayout, ModuleLayoutManager, SelectionSet};

pub type WorkspaceCoordinator<F> = SettingsCoordinator<AppStateStore, ModuleLayout, SelectionSet, F>;

/// Stores and coordinator wired together for one application instance.
pub struct Workspace<F: FrameClock> {
    pub app_state: Arc<AppStateStore>,
    pub layout: Arc<ModuleLayout>,
    pub selection: Arc<SelectionSet>,
    pub coordinator: WorkspaceCoordinator<F>,
    pub settings_applied: UnboundedReceiver<SettingsDiff>,
}

pub async fn bootstrap_from_toml<F: FrameClock>(input: &str, frame_clock: F) -> Result<Workspace<F>, SettingsError> {
    let config = AppConfig::from_toml_str(input)?;
    bootstrap(config, frame_clock).await
}

pub async fn bootstrap<F: FrameClock>(config: AppConfig, frame_clock: F) -> Result<Workspace<F>, SettingsError> {
    log::debug!("Bootstrapping workspace from config version {}", config.app.version);
    let startup_request = config.startup_request();
    let app_state = Arc::new(AppStateStore::new(config.metadata));
    app_state.set_compare_examples(config.workspace.compare_examples);

    let layout = Arc::new(ModuleLayout::new());
    let default_layout = app_state.layout_name();
    match app_state.layout_definition(&default_layout) {
        Some(definition) => layout.initialize_layout(
            &definition,
            &app_state.current_model_specs(),
            &app_state.current_dataset_spec(),
            app_state.compare_examples_enabled(),
        ),
        None => log::warn!("Default layout '{default_layout}' is not defined"),
    }

    let selection = Arc::new(SelectionSet::new());
    let (coordinator, settings_applied) = SettingsCoordinator::new(
        Arc::clone(&app_state),
        Arc::clone(&layout),
        Arc::clone(&selection),
        frame_clock,
    );

    log::info!("Applying startup settings");
    coordinator.update_settings(startup_request).await?;

    Ok(Workspace {
        app_state,
        layout,
        selection,
        coordinator,
        settings_applied,
    })
}
