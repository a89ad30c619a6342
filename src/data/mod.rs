/// Data layer: filename indexing, candidate resolution, querying, export.
///
/// Architecture:
/// ```text
///  Coastal/*.csv   Riverine/*.csv
///        │
///        ▼
///   ┌──────────┐
///   │ indexer   │  filename tokens → attribute value sets
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  config   │  dropdown_config.json (rebuilt at startup)
///   └──────────┘
///        │   user selection
///        ▼
///   ┌──────────┐
///   │  filter   │  exact filename or substring-filtered listing
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  query    │  Arrow CSV read + equality kernels → ResultTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  search_results_<timestamp>.csv
///   └──────────┘
/// ```

pub mod config;
pub mod export;
pub mod filter;
pub mod indexer;
pub mod model;
pub mod query;
pub mod schema;
