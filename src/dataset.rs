use crate::error::Result;
use crate::loader::LoadReport;
use crate::pipeline;
use crate::types::EventRecord;
use once_cell::sync::OnceCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Sentinel shown at the top of the country picker.
pub const ALL_WORLD: &str = "All World";

/// How many types the dashboard preselects.
pub const DEFAULT_TYPE_COUNT: usize = 5;

/// The full table after enrichment. Every severity score in it shares one
/// normalization basis; the dataset is never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedDataset {
    records: Vec<EventRecord>,
}

impl EnrichedDataset {
    pub(crate) fn new(records: Vec<EventRecord>) -> Self {
        EnrichedDataset { records }
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest and largest known year, `None` when no record has one.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().filter_map(|r| r.year).min()?;
        let max = self.records.iter().filter_map(|r| r.year).max()?;
        Some((min, max))
    }

    /// Distinct disaster types, sorted.
    pub fn disaster_types(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.disaster_type.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// The first few sorted types, the dashboard's initial selection.
    pub fn default_types(&self) -> Vec<String> {
        self.disaster_types()
            .into_iter()
            .take(DEFAULT_TYPE_COUNT)
            .collect()
    }

    /// Country picker entries: the `All World` sentinel, then sorted countries.
    pub fn countries(&self) -> Vec<String> {
        let sorted: BTreeSet<&str> = self.records.iter().map(|r| r.country.as_str()).collect();
        std::iter::once(ALL_WORLD.to_string())
            .chain(sorted.into_iter().map(str::to_string))
            .collect()
    }
}

/// Process-scoped owner of the enriched dataset.
///
/// The source is read and enriched at most once; every caller gets a handle
/// to the same value. A failed load is not cached, so a later call retries.
#[derive(Debug)]
pub struct DatasetCache {
    source: PathBuf,
    cell: OnceCell<(Arc<EnrichedDataset>, LoadReport)>,
}

impl DatasetCache {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        DatasetCache {
            source: source.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn get(&self) -> Result<Arc<EnrichedDataset>> {
        self.get_with_report().map(|(ds, _)| ds)
    }

    pub fn get_with_report(&self) -> Result<(Arc<EnrichedDataset>, LoadReport)> {
        let (ds, report) = self.cell.get_or_try_init(|| {
            log::info!("loading dataset from {}", self.source.display());
            pipeline::load_enriched(&self.source).map(|(ds, report)| (Arc::new(ds), report))
        })?;
        Ok((Arc::clone(ds), report.clone()))
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}
