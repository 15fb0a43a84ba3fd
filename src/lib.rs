//! Global disaster risk monitor.
//!
//! ```text
//!   events CSV
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse rows → RawEvent
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ pipeline  │  month repair, date, severity score → EnrichedDataset
//!   └──────────┘
//!        │            (held once by DatasetCache)
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterSpec → FilteredSubset
//!   └──────────┘
//!        │
//!        ▼
//!   aggregates → reports → output
//! ```

pub mod aggregates;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod types;
pub mod util;

pub use dataset::{DatasetCache, EnrichedDataset};
pub use error::{Error, Result};
pub use filter::{apply, CountrySelection, FilterSpec, FilteredSubset};
