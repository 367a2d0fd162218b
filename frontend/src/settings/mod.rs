//! Settings domain
//!
//! - **[`SettingsCoordinator`]** - applies settings batches in a safe order
//! - **[`ResolvedSettings`]** - a request with gaps filled from current state
//! - **[`SettingsDiff`]** - what an update actually changed

pub mod compare;
pub mod coordinator;
pub mod resolved;

pub use compare::{same_multiset, same_set};
pub use coordinator::SettingsCoordinator;
pub use resolved::{ResolvedSettings, SettingsDiff};
