use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

// ===== SETTINGS REQUEST =====

/// Pending settings changes. A `None` field means "keep the current value".
///
/// Field names are snake_case; kebab-case spellings are accepted on input
/// (URL query state uses them).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct UpdateRequest {
    pub models: Option<Vec<String>>,
    pub dataset: Option<String>,
    #[serde(alias = "hidden-module-keys")]
    pub hidden_module_keys: Option<IndexSet<String>>,
    #[serde(alias = "layout-name")]
    pub layout_name: Option<String>,
}

impl UpdateRequest {
    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = Some(models.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    pub fn with_hidden_module_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_module_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_layout_name(mut self, layout_name: impl Into<String>) -> Self {
        self.layout_name = Some(layout_name.into());
        self
    }

    /// True when no field requests a change.
    pub fn is_empty(&self) -> bool {
        self.models.is_none()
            && self.dataset.is_none()
            && self.hidden_module_keys.is_none()
            && self.layout_name.is_none()
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }
}

// ===== METADATA TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ModelSpec {
    pub input: Vec<String>,
    pub output: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DatasetSpec {
    pub fields: Vec<String>,
}

impl DatasetSpec {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ModelInfo {
    pub spec: ModelSpec,
    pub datasets: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DatasetInfo {
    pub size: usize,
    pub spec: DatasetSpec,
}

/// Named module arrangement. Tab groups map a tab title to module keys.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LayoutDefinition {
    pub description: Option<String>,
    pub upper: IndexMap<String, Vec<String>>,
    pub lower: IndexMap<String, Vec<String>>,
}

impl LayoutDefinition {
    /// Module keys in upper-then-lower, tab order.
    pub fn module_keys(&self) -> impl Iterator<Item = &String> {
        self.upper.values().chain(self.lower.values()).flatten()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppMetadata {
    pub models: IndexMap<String, ModelInfo>,
    pub datasets: IndexMap<String, DatasetInfo>,
    pub layouts: IndexMap<String, LayoutDefinition>,
    pub default_layout: String,
}

// ===== CONFIG TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub app: AppSection,
    #[serde(default)]
    pub workspace: WorkspaceSection,
    #[serde(default)]
    pub metadata: AppMetadata,
}

impl AppConfig {
    /// Parse and version-check a TOML config.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(input)?;
        match config.app.get_migration_strategy() {
            MigrationStrategy::Recreate => Err(ConfigError::UnsupportedVersion(config.app.version)),
            MigrationStrategy::None => Ok(config),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Startup selection expressed as a regular settings update.
    pub fn startup_request(&self) -> UpdateRequest {
        let workspace = &self.workspace;
        UpdateRequest {
            models: (!workspace.models.is_empty()).then(|| workspace.models.clone()),
            dataset: workspace.dataset.clone(),
            hidden_module_keys: (!workspace.hidden_modules.is_empty())
                .then(|| workspace.hidden_modules.clone()),
            layout_name: workspace.layout.clone(),
        }
    }
}

// AppSection carries the config format version for migrations
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSection {
    pub version: String,
}

impl AppSection {
    /// Current configuration format version
    pub const CURRENT_VERSION: &'static str = "1.0.0";

    pub fn get_migration_strategy(&self) -> MigrationStrategy {
        match self.version.as_str() {
            Self::CURRENT_VERSION => MigrationStrategy::None,
            _ => MigrationStrategy::Recreate,
        }
    }
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MigrationStrategy {
    None,
    /// Unknown format; the config must be written anew.
    Recreate,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct WorkspaceSection {
    pub models: Vec<String>,
    pub dataset: Option<String>,
    pub layout: Option<String>,
    pub hidden_modules: IndexSet<String>,
    pub compare_examples: bool,
}

// ===== ERRORS =====

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config version '{0}'")]
    UnsupportedVersion(String),
}
