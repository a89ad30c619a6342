use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::{Result, SearchError};

use super::model::ResultTable;

/// Write `table` to `out_dir/search_results_<YYYYMMDD_HHMMSS>.csv`.
///
/// Fails with [`SearchError::NoResults`] (and writes nothing) when there is no
/// table or it has no rows.
pub fn export(table: Option<&ResultTable>, out_dir: &Path) -> Result<PathBuf> {
    let table = table
        .filter(|t| !t.is_empty())
        .ok_or(SearchError::NoResults)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = out_dir.join(format!("search_results_{timestamp}.csv"));
    if let Err(e) = write_csv(table, &path) {
        // Do not leave a truncated export behind.
        match std::fs::remove_file(&path) {
            Err(rm) if rm.kind() != std::io::ErrorKind::NotFound => {
                log::warn!("Could not remove partial export {}: {rm}", path.display());
            }
            _ => {}
        }
        return Err(e);
    }

    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(path)
}

fn write_csv(table: &ResultTable, path: &Path) -> Result<()> {
    let csv_err = |e: csv::Error| SearchError::io(e.into(), path);

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(&table.columns).map_err(csv_err)?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|e| SearchError::io(e, path))
}
