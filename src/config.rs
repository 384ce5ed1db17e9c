// Configuration for employeestore

use crate::export::QuoteStyle;
use crate::store::{DEFAULT_EXPORT_FILE_NAME, SchemaPolicy, StoreOptions};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the database
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default)]
    pub export: ExportConfig,

    /// Behavior when the database was written by another schema version
    #[serde(default)]
    pub schema_policy: SchemaPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Export directory (default: `exports/` under the store path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    #[serde(default = "default_export_file_name")]
    pub file_name: String,

    #[serde(default)]
    pub quote_style: QuoteStyle,
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("employeestore")
}

fn default_export_file_name() -> String {
    DEFAULT_EXPORT_FILE_NAME.to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file_name: default_export_file_name(),
            quote_style: QuoteStyle::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            export: ExportConfig::default(),
            schema_policy: SchemaPolicy::default(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::load_file(config_path);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("employeestore").join("config.yml")),
            Some(PathBuf::from("employeestore.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::load_file(path);
            }
        }

        Ok(Config::default())
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).context(format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Options for [`crate::Store::open_with`]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            schema_policy: self.schema_policy,
            export_dir: self.export.dir.clone(),
            export_file_name: self.export.file_name.clone(),
            quote_style: self.export.quote_style,
        }
    }
}
