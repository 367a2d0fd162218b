//! End-to-end settings flows over the in-memory stores.

use frontend::config::{Workspace, bootstrap_from_toml};
use frontend::platform::YieldFrame;
use frontend::stores::{AppState, ModuleLayoutManager, SelectionStore, StoreError};
use frontend::{SettingsDiff, SettingsError};
use futures::StreamExt;
use indexmap::IndexSet;
use shared::UpdateRequest;
use std::sync::{Arc, Mutex};

const CONFIG: &str = r#"
[app]
version = "1.0.0"

[workspace]
models = ["sst2-tiny"]
dataset = "sst_dev"

[metadata]
default_layout = "default"

[metadata.models.sst2-tiny]
datasets = ["sst_dev", "sst_train"]
spec = { input = ["sentence"], output = ["probas"] }

[metadata.models.sst2-base]
datasets = ["sst_dev"]
spec = { input = ["sentence"], output = ["probas", "cls_emb"] }

[metadata.datasets.sst_dev]
size = 872
spec = { fields = ["sentence", "label"] }

[metadata.datasets.sst_train]
size = 67349
spec = { fields = ["sentence", "label"] }

[metadata.layouts.default.upper]
Main = ["embeddings", "data-table", "datapoint-editor"]

[metadata.layouts.default.lower]
Predictions = ["classification", "salience"]

[metadata.layouts.simple.upper]
Editor = ["datapoint-editor"]

[metadata.layouts.simple.lower]
Predictions = ["classification"]
"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn workspace() -> Workspace<YieldFrame> {
    init_logging();
    let mut workspace = bootstrap_from_toml(CONFIG, YieldFrame).await.unwrap();
    let startup = workspace.settings_applied.next().await.unwrap();
    assert!(startup.models_changed && startup.dataset_changed);
    workspace
}

fn ids<const N: usize>(values: [&str; N]) -> IndexSet<String> {
    values.into_iter().map(str::to_string).collect()
}

#[tokio::test]
async fn test_bootstrap_applies_workspace_selection() {
    let workspace = workspace().await;

    assert_eq!(workspace.app_state.current_models(), vec!["sst2-tiny"]);
    assert_eq!(workspace.app_state.current_dataset(), "sst_dev");
    assert_eq!(workspace.app_state.loaded_dataset().as_deref(), Some("sst_dev"));

    let rendered = workspace.layout.rendered().unwrap();
    assert_eq!(rendered.modules.len(), 5);
    assert_eq!(rendered.generation, 1);
}

#[tokio::test]
async fn test_dataset_switch_never_renders_stale_selection() {
    let workspace = workspace().await;
    workspace.selection.select_ids(ids(["12", "40"]));

    // The selection is already empty while the old dataset is still active.
    let selection_changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&selection_changes);
    let selection = Arc::clone(&workspace.selection);
    let app_state = Arc::clone(&workspace.app_state);
    let subscription = workspace.selection.on_selection_changed(move |selected| {
        sink.lock()
            .unwrap()
            .push((app_state.current_dataset(), selected.len(), selection.is_empty()));
    });

    let diff = workspace
        .coordinator
        .update_settings(UpdateRequest::default().with_dataset("sst_train"))
        .await
        .unwrap();

    assert!(diff.dataset_changed);
    assert!(workspace.selection.selected_ids().is_empty());
    assert_eq!(
        *selection_changes.lock().unwrap(),
        vec![("sst_dev".to_string(), 0, true)]
    );
    subscription.unsubscribe();
}

#[tokio::test]
async fn test_reordered_models_keep_state() {
    let workspace = workspace().await;
    workspace
        .coordinator
        .update_settings(UpdateRequest::default().with_models(["sst2-tiny", "sst2-base"]))
        .await
        .unwrap();

    let diff = workspace
        .coordinator
        .update_settings(UpdateRequest::default().with_models(["sst2-base", "sst2-tiny"]))
        .await
        .unwrap();

    assert_eq!(diff, SettingsDiff::default());
    assert_eq!(workspace.app_state.current_models(), vec!["sst2-tiny", "sst2-base"]);
}

#[tokio::test]
async fn test_layout_switch_allocates_fresh_modules() {
    let workspace = workspace().await;
    let renders_before = workspace.layout.render_count();

    let diff = workspace
        .coordinator
        .update_settings(UpdateRequest::default().with_layout_name("simple"))
        .await
        .unwrap();

    assert!(diff.layout_changed);
    assert_eq!(workspace.app_state.layout_name(), "simple");
    let rendered = workspace.layout.rendered().unwrap();
    assert_eq!(rendered.generation, 2);
    assert_eq!(rendered.modules, vec!["datapoint-editor", "classification"]);
    assert_eq!(workspace.layout.render_count(), renders_before + 2);
}

#[tokio::test]
async fn test_hidden_modules_are_removed_from_render() {
    let workspace = workspace().await;

    let diff = workspace
        .coordinator
        .update_settings(UpdateRequest::default().with_hidden_module_keys(["salience", "embeddings"]))
        .await
        .unwrap();

    assert!(diff.hidden_modules_changed);
    let rendered = workspace.layout.rendered().unwrap();
    assert_eq!(rendered.modules, vec!["data-table", "datapoint-editor", "classification"]);

    let again = workspace
        .coordinator
        .update_settings(UpdateRequest::default().with_hidden_module_keys(["embeddings", "salience"]))
        .await
        .unwrap();
    assert!(!again.hidden_modules_changed);
    assert_eq!(workspace.layout.hidden_module_keys(), ids(["salience", "embeddings"]));
}

#[tokio::test]
async fn test_compare_toggle_rerenders_without_reinitializing() {
    let workspace = workspace().await;
    let renders_before = workspace.layout.render_count();

    workspace.app_state.set_compare_examples(true);

    let rendered = workspace.layout.rendered().unwrap();
    assert!(rendered.compare_examples);
    assert!(!rendered.is_empty());
    assert_eq!(rendered.generation, 1);
    assert_eq!(workspace.layout.render_count(), renders_before + 1);
}

#[tokio::test]
async fn test_dropped_coordinator_no_longer_renders_on_compare_toggle() {
    let Workspace {
        app_state,
        layout,
        coordinator,
        ..
    } = workspace().await;
    let renders_before = layout.render_count();

    drop(coordinator);
    app_state.set_compare_examples(true);

    assert_eq!(layout.render_count(), renders_before);
    assert!(!layout.rendered().unwrap().compare_examples);
}

#[tokio::test]
async fn test_dataset_switch_renders_cleared_layout_first() {
    let workspace = workspace().await;
    let renders = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&renders);
    let subscription = workspace.layout.on_render(move |rendered| {
        sink.lock().unwrap().push(rendered.modules.len());
    });

    workspace
        .coordinator
        .update_settings(UpdateRequest::default().with_dataset("sst_train"))
        .await
        .unwrap();

    assert_eq!(*renders.lock().unwrap(), vec![0, 5]);
    subscription.unsubscribe();
}

#[tokio::test]
async fn test_unknown_model_leaves_layout_cleared() {
    let workspace = workspace().await;

    let result = workspace
        .coordinator
        .update_settings(UpdateRequest::default().with_models(["gpt"]))
        .await;

    assert!(matches!(
        result,
        Err(SettingsError::Store(StoreError::UnknownModel(name))) if name == "gpt"
    ));
    assert!(workspace.layout.rendered().unwrap().is_empty());
    assert_eq!(workspace.app_state.current_models(), vec!["sst2-tiny"]);
}

#[tokio::test]
async fn test_dialog_offers_datasets_valid_for_all_models() {
    let workspace = workspace().await;
    let coordinator = &workspace.coordinator;

    let tiny = vec!["sst2-tiny".to_string()];
    let both = vec!["sst2-tiny".to_string(), "sst2-base".to_string()];

    assert_eq!(coordinator.valid_datasets_for_models(&tiny), vec!["sst_dev", "sst_train"]);
    assert_eq!(coordinator.valid_datasets_for_models(&both), vec!["sst_dev"]);
    assert!(!coordinator.is_dataset_valid_for_models("sst_train", &both));
}

#[tokio::test]
async fn test_request_from_json_drives_update() {
    let workspace = workspace().await;
    let request = UpdateRequest::from_json_str(r#"{"layout_name": "simple", "hidden_module_keys": ["classification"]}"#)
        .unwrap();

    let diff = workspace.coordinator.update_settings(request).await.unwrap();

    assert!(diff.layout_changed && diff.hidden_modules_changed);
    assert_eq!(workspace.layout.rendered().unwrap().modules, vec!["datapoint-editor"]);
    assert_eq!(
        serde_json::to_value(diff).unwrap()["layout_changed"],
        serde_json::Value::Bool(true)
    );
}

#[tokio::test]
async fn test_unsupported_config_version_fails_bootstrap() {
    init_logging();
    let result = bootstrap_from_toml("[app]\nversion = \"0.1.0\"\n", YieldFrame).await;
    assert!(matches!(result, Err(SettingsError::Config(_))));
}
