/// Data layer: core types, loading, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, selection domains
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ aggregate   │  filter by selection, group and sum → AggregatedView
///   └────────────┘
/// ```
pub mod aggregate;
pub mod loader;
pub mod model;
