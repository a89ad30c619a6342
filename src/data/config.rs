use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, SearchError};

use super::indexer;
use super::model::AttributeValueSet;
use super::schema::{CategorySchema, CATEGORIES};

/// Overrides the base directory when set.
pub const BASE_DIR_ENV: &str = "FLOOD_SEARCH_BASE_DIR";

const CONFIG_FILE_NAME: &str = "dropdown_config.json";

// ---------------------------------------------------------------------------
// AppPaths – where the datasets and the cache live
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub base_dir: PathBuf,
}

impl AppPaths {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// `$FLOOD_SEARCH_BASE_DIR`, else the executable's directory, else `.`.
    pub fn discover() -> Self {
        if let Some(dir) = std::env::var_os(BASE_DIR_ENV) {
            return Self::new(dir);
        }
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self::new(exe_dir.unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn category_dir(&self, schema: &CategorySchema) -> PathBuf {
        self.base_dir.join(schema.dir_name)
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE_NAME)
    }
}

// ---------------------------------------------------------------------------
// ConfigCache – persisted dropdown options
// ---------------------------------------------------------------------------

/// category name → attribute value sets, as stored in `dropdown_config.json`.
pub type DropdownConfig = BTreeMap<String, AttributeValueSet>;

pub struct ConfigCache;

impl ConfigCache {
    /// Index every category and overwrite the cache file.
    pub fn build(paths: &AppPaths) -> Result<DropdownConfig> {
        let config: DropdownConfig = CATEGORIES
            .iter()
            .map(|schema| {
                let values = indexer::index(&paths.category_dir(schema), schema);
                (schema.name.to_string(), values)
            })
            .collect();

        let path = paths.config_path();
        let json = serde_json::to_string_pretty(&config).map_err(|e| SearchError::ConfigUnavailable {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|e| SearchError::io(e, &path))?;

        log::info!("Wrote dropdown config to {}", path.display());
        Ok(config)
    }

    /// Read the cache written by [`ConfigCache::build`].
    pub fn load(paths: &AppPaths) -> Result<DropdownConfig> {
        let path = paths.config_path();
        let unavailable = |reason: String| SearchError::ConfigUnavailable {
            path: path.clone(),
            reason,
        };

        let text = std::fs::read_to_string(&path).map_err(|e| unavailable(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| unavailable(e.to_string()))
    }
}
