use std::path::PathBuf;

/// Result alias used by the data layer.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Everything that can go wrong between scanning a folder and writing an export.
///
/// All variants are recoverable from the UI's point of view except
/// `ConfigUnavailable` at startup.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The category's data directory does not exist.
    #[error("{category} directory not found: {}", path.display())]
    CategoryDirectoryMissing { category: String, path: PathBuf },

    /// Latitude or longitude is missing or not a number.
    #[error("{field} is required and must be numeric (got '{input}')")]
    InvalidCoordinate { field: &'static str, input: String },

    /// The dropdown cache could not be read back.
    #[error("dropdown config unavailable at {}: {reason}", path.display())]
    ConfigUnavailable { path: PathBuf, reason: String },

    /// The CSV reader or a compute kernel failed.
    #[error("query failed: {0}")]
    QueryExecution(String),

    /// Nothing to export.
    #[error("no search results to export")]
    NoResults,

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SearchError {
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        SearchError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        SearchError::QueryExecution(message.into())
    }
}

impl From<arrow::error::ArrowError> for SearchError {
    fn from(e: arrow::error::ArrowError) -> Self {
        SearchError::QueryExecution(e.to_string())
    }
}
