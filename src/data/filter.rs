use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, SearchError};

use super::indexer::{file_name, list_csv_files};
use super::schema::CategorySchema;

/// Dropdown label meaning "no constraint".
pub const ALL: &str = "All";

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// The user's choice for one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttributeFilter {
    #[default]
    All,
    Value(String),
}

impl AttributeFilter {
    /// Map a dropdown label back to a filter; `"All"` is the wildcard.
    pub fn from_choice(choice: &str) -> Self {
        if choice == ALL {
            AttributeFilter::All
        } else {
            AttributeFilter::Value(choice.to_string())
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            AttributeFilter::All => None,
            AttributeFilter::Value(v) => Some(v),
        }
    }

    pub fn label(&self) -> &str {
        self.value().unwrap_or(ALL)
    }
}

/// attribute name → filter. Attributes that are absent count as "All".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    filters: BTreeMap<String, AttributeFilter>,
}

impl Selection {
    /// Every attribute of the schema set to "All".
    pub fn all(schema: &CategorySchema) -> Self {
        Self {
            filters: schema
                .attributes
                .iter()
                .map(|attr| (attr.to_string(), AttributeFilter::All))
                .collect(),
        }
    }

    pub fn set(&mut self, attr: &str, filter: AttributeFilter) {
        self.filters.insert(attr.to_string(), filter);
    }

    /// Builder form of [`Selection::set`] with a concrete value.
    pub fn with(mut self, attr: &str, value: &str) -> Self {
        self.set(attr, AttributeFilter::Value(value.to_string()));
        self
    }

    pub fn get(&self, attr: &str) -> &AttributeFilter {
        const WILDCARD: &AttributeFilter = &AttributeFilter::All;
        self.filters.get(attr).unwrap_or(WILDCARD)
    }

    /// `(attribute, value)` for every non-"All" entry.
    pub fn concrete(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters
            .iter()
            .filter_map(|(attr, f)| f.value().map(|v| (attr.as_str(), v)))
    }
}

// ---------------------------------------------------------------------------
// Candidate resolution
// ---------------------------------------------------------------------------

/// Which files a search should read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Set when every attribute was concrete and the rebuilt filename exists.
    pub exact_file: Option<PathBuf>,
    pub candidates: Vec<PathBuf>,
}

/// Pick the candidate files in `dir` for a selection.
///
/// 1. Fully specified selection whose rebuilt filename exists → that file only.
/// 2. Otherwise keep files whose name contains every concrete value as a
///    plain substring. Boundary-unaware: "2030" also admits "22030". The
///    query's equality predicates remove such rows later.
/// 3. If step 2 keeps nothing, fall back to every file in the directory.
pub fn resolve(dir: &Path, schema: &CategorySchema, selection: &Selection) -> Result<Resolution> {
    if !dir.is_dir() {
        return Err(SearchError::CategoryDirectoryMissing {
            category: schema.name.to_string(),
            path: dir.to_path_buf(),
        });
    }

    if let Some(target) = schema.target_filename(|attr| selection.get(attr).value()) {
        let path = dir.join(&target);
        if path.is_file() {
            log::debug!("{}: exact match {target}", schema.name);
            return Ok(Resolution {
                exact_file: Some(path.clone()),
                candidates: vec![path],
            });
        }
        log::debug!("{}: {target} not found, filtering listing", schema.name);
    }

    let all_files = list_csv_files(dir);
    let filtered: Vec<PathBuf> = all_files
        .iter()
        .filter(|path| {
            let name = file_name(path);
            selection.concrete().all(|(_, value)| name.contains(value))
        })
        .cloned()
        .collect();

    let candidates = if filtered.is_empty() {
        log::debug!(
            "{}: no filename matched, using all {} files",
            schema.name,
            all_files.len()
        );
        all_files
    } else {
        filtered
    };

    Ok(Resolution {
        exact_file: None,
        candidates,
    })
}
