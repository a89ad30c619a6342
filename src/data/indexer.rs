use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use super::model::AttributeValueSet;
use super::schema::CategorySchema;

// ---------------------------------------------------------------------------
// Directory listing
// ---------------------------------------------------------------------------

/// All `*.csv` files directly inside `dir`, sorted by path.
///
/// A missing directory yields an empty list. Hidden files are not matched.
pub fn list_csv_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let pattern = format!("{}/*.csv", Pattern::escape(&dir.to_string_lossy()));
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let paths = match glob::glob_with(&pattern, options) {
        Ok(paths) => paths,
        Err(e) => {
            log::warn!("Invalid listing pattern {pattern}: {e}");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}

pub(crate) fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

// ---------------------------------------------------------------------------
// Attribute indexing
// ---------------------------------------------------------------------------

/// Collect the distinct attribute values encoded in the filenames of `dir`.
///
/// Every attribute of the schema gets an entry, even when nothing was found.
/// Files with too few tokens are skipped.
pub fn index(dir: &Path, schema: &CategorySchema) -> AttributeValueSet {
    let mut values: AttributeValueSet = schema
        .attributes
        .iter()
        .map(|attr| (attr.to_string(), Default::default()))
        .collect();

    let files = list_csv_files(dir);
    let mut indexed = 0usize;
    for path in &files {
        let name = file_name(path);
        let Some(parsed) = schema.parse_filename(name) else {
            log::debug!("{}: skipping {name}, not enough filename tokens", schema.name);
            continue;
        };
        for (attr, value) in parsed {
            values.entry(attr.to_string()).or_default().insert(value);
        }
        indexed += 1;
    }

    log::info!(
        "Indexed {indexed}/{} {} files in {}",
        files.len(),
        schema.name,
        dir.display()
    );
    values
}
