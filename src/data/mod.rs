/// Data layer: core types, loading, averaging and reshaping.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  per-category row slice → metric means
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ reshape   │  display order × metrics → Vec<LongRecord>
///   └──────────┘
/// ```

pub mod aggregate;
pub mod loader;
pub mod model;
pub mod reshape;
