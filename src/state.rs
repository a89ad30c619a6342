use std::path::{Path, PathBuf};

use crate::data::config::{AppPaths, ConfigCache, DropdownConfig};
use crate::data::export::export;
use crate::data::filter::{resolve, AttributeFilter, Selection, ALL};
use crate::data::model::ResultTable;
use crate::data::query::{Coordinates, QueryContext};
use crate::data::schema::{CategorySchema, CATEGORIES};
use crate::error::{Result, SearchError};

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Warning(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub paths: AppPaths,

    /// Query engine settings, owned for the lifetime of the app.
    pub query: QueryContext,

    /// Dropdown options per category, read back from the cache.
    pub dropdowns: DropdownConfig,

    /// Active dataset category.
    pub category: &'static CategorySchema,

    /// Raw text of the coordinate fields.
    pub latitude: String,
    pub longitude: String,

    /// Per-attribute dropdown choices for the active category.
    pub selection: Selection,

    /// Result of the last successful search.
    pub results: Option<ResultTable>,

    /// Status / error message shown in the UI.
    pub status_message: Option<StatusMessage>,
}

impl AppState {
    /// Rebuild the dropdown cache under `paths` and start on the first category.
    pub fn open(paths: AppPaths, query: QueryContext) -> Result<Self> {
        ConfigCache::build(&paths)?;
        let dropdowns = ConfigCache::load(&paths)?;
        Ok(Self::new(paths, query, dropdowns))
    }

    pub fn new(paths: AppPaths, query: QueryContext, dropdowns: DropdownConfig) -> Self {
        let category = CATEGORIES[0];
        Self {
            paths,
            query,
            dropdowns,
            category,
            latitude: String::new(),
            longitude: String::new(),
            selection: Selection::all(category),
            results: None,
            status_message: None,
        }
    }

    /// Switch category; every dropdown goes back to "All".
    pub fn set_category(&mut self, category: &'static CategorySchema) {
        if self.category != category {
            self.category = category;
            self.selection = Selection::all(category);
        }
    }

    /// Dropdown entries for one attribute: "All" then the discovered values.
    pub fn options(&self, attr: &str) -> Vec<String> {
        let discovered = self
            .dropdowns
            .get(self.category.name)
            .and_then(|attrs| attrs.get(attr))
            .into_iter()
            .flatten()
            .cloned();
        std::iter::once(ALL.to_string()).chain(discovered).collect()
    }

    pub fn choose(&mut self, attr: &str, choice: &str) {
        self.selection.set(attr, AttributeFilter::from_choice(choice));
    }

    /// Point the app at another base directory and rebuild its cache.
    ///
    /// On failure the current directory and options are kept.
    pub fn open_base_dir(&mut self, base_dir: PathBuf) -> Result<()> {
        let paths = AppPaths::new(base_dir);
        ConfigCache::build(&paths)?;
        self.dropdowns = ConfigCache::load(&paths)?;
        self.paths = paths;
        self.selection = Selection::all(self.category);
        self.results = None;
        Ok(())
    }

    /// Run one search and replace the last result table.
    ///
    /// Coordinates are validated before any file is touched. On error the
    /// previous result table is left as it was.
    pub fn search(&mut self) -> Result<usize> {
        let coords = Coordinates::parse(&self.latitude, &self.longitude)?;
        let dir = self.paths.category_dir(self.category);
        let resolution = resolve(&dir, self.category, &self.selection)?;

        log::info!(
            "Searching {} ({}, {}) over {} file(s){}",
            self.category.name,
            coords.latitude,
            coords.longitude,
            resolution.candidates.len(),
            if resolution.exact_file.is_some() { ", exact match" } else { "" }
        );

        let table = self
            .query
            .execute(&resolution.candidates, &self.selection, coords)?;
        let rows = table.len();
        self.results = Some(table);
        Ok(rows)
    }

    /// Write the last result table into `out_dir`.
    pub fn export(&self, out_dir: &Path) -> Result<PathBuf> {
        export(self.results.as_ref(), out_dir)
    }

    /// [`AppState::search`], reporting the outcome on the status line.
    pub fn run_search(&mut self) {
        self.status_message = Some(match self.search() {
            Ok(0) => StatusMessage::Info("No matching records found.".to_string()),
            Ok(n) => StatusMessage::Info(format!("{n} matching record(s).")),
            Err(e) => {
                log::error!("Search failed: {e}");
                StatusMessage::Error(e.to_string())
            }
        });
    }

    /// [`AppState::export`] into the working directory, reporting the outcome.
    pub fn run_export(&mut self) {
        let result = std::env::current_dir()
            .map_err(|e| SearchError::io(e, "."))
            .and_then(|dir| self.export(&dir));

        self.status_message = Some(match result {
            Ok(path) => StatusMessage::Info(format!("Results exported to {}", path.display())),
            Err(SearchError::NoResults) => {
                StatusMessage::Warning("No search results to export.".to_string())
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                StatusMessage::Error(e.to_string())
            }
        });
    }
}
