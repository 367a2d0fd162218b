//! Prism frontend state layer
//!
//! Coordinates settings changes (active models, dataset, hidden modules,
//! layout) across the application stores of the model-inspection UI.
//!
//! ```rust,no_run
//! use frontend::config::bootstrap_from_toml;
//! use frontend::platform::YieldFrame;
//! use shared::UpdateRequest;
//!
//! # async fn run(config: &str) -> Result<(), frontend::SettingsError> {
//! let workspace = bootstrap_from_toml(config, YieldFrame).await?;
//! let diff = workspace
//!     .coordinator
//!     .update_settings(UpdateRequest::default().with_dataset("sst_dev"))
//!     .await?;
//! println!("{diff:?}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dataflow;
pub mod error;
pub mod platform;
pub mod settings;
pub mod stores;

pub use error::SettingsError;
pub use settings::{SettingsCoordinator, SettingsDiff};
