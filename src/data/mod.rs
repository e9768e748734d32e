/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  semicolon CSV (Latin-1 / UTF-8)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode + normalize headers + coerce fields
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ InvoiceDataset │  Vec<Invoice>, value indices, spans (cached per session)
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply the predicate → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  derived tables: metrics, totals, shares, histogram
///   └───────────┘
/// ```
pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
