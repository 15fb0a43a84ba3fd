use std::collections::BTreeSet;
use std::fmt;

use crate::dataset::{EnrichedDataset, ALL_WORLD};
use crate::types::EventRecord;

// ---------------------------------------------------------------------------
// Filter specification
// ---------------------------------------------------------------------------

/// Country picker value. `All World` disables the country predicate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CountrySelection {
    #[default]
    AllWorld,
    Country(String),
}

impl From<&str> for CountrySelection {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s == ALL_WORLD {
            CountrySelection::AllWorld
        } else {
            CountrySelection::Country(s.to_string())
        }
    }
}

impl fmt::Display for CountrySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountrySelection::AllWorld => f.write_str(ALL_WORLD),
            CountrySelection::Country(c) => f.write_str(c),
        }
    }
}

/// One filtering request. Every field is a no-op at its default and the
/// active predicates are ANDed.
///
/// An empty `disaster_types` set means "all types", not "no types".
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    /// Inclusive on both ends.
    pub year_range: Option<(i32, i32)>,
    pub disaster_types: BTreeSet<String>,
    pub country: CountrySelection,
    /// Inclusive lower bound on `severity_score`.
    pub severity_floor: f64,
}

impl Default for FilterSpec {
    fn default() -> Self {
        FilterSpec {
            year_range: None,
            disaster_types: BTreeSet::new(),
            country: CountrySelection::AllWorld,
            severity_floor: 0.0,
        }
    }
}

impl FilterSpec {
    /// The dashboard's opening state: full year range, the first few types,
    /// every country.
    pub fn dashboard_default(dataset: &EnrichedDataset) -> Self {
        FilterSpec {
            year_range: dataset.year_bounds(),
            disaster_types: dataset.default_types().into_iter().collect(),
            ..FilterSpec::default()
        }
    }

    pub fn with_years(self, lo: i32, hi: i32) -> Self {
        FilterSpec {
            year_range: Some((lo, hi)),
            ..self
        }
    }

    pub fn with_types<I, S>(self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterSpec {
            disaster_types: types.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn with_country(self, country: impl Into<CountrySelection>) -> Self {
        FilterSpec {
            country: country.into(),
            ..self
        }
    }

    pub fn with_severity_floor(self, floor: f64) -> Self {
        FilterSpec {
            severity_floor: floor,
            ..self
        }
    }

    /// Cheap numeric checks run before the string comparisons.
    pub fn matches(&self, record: &EventRecord) -> bool {
        if let Some((lo, hi)) = self.year_range {
            // an undated record is outside every range
            if !record.year.is_some_and(|y| (lo..=hi).contains(&y)) {
                return false;
            }
        }
        if record.severity_score < self.severity_floor {
            return false;
        }
        if let CountrySelection::Country(c) = &self.country {
            if record.country != *c {
                return false;
            }
        }
        if !self.disaster_types.is_empty()
            && !self.disaster_types.contains(&record.disaster_type)
        {
            return false;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Filtered subset
// ---------------------------------------------------------------------------

/// Rows of an enriched dataset that pass a [`FilterSpec`], in source order.
/// Borrows the dataset; owns no scores of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSubset<'a> {
    rows: Vec<&'a EventRecord>,
}

impl<'a> FilteredSubset<'a> {
    /// Every row of the dataset, unfiltered.
    pub fn all(dataset: &'a EnrichedDataset) -> Self {
        FilteredSubset {
            rows: dataset.records().iter().collect(),
        }
    }

    pub fn rows(&self) -> &[&'a EventRecord] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a EventRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Filter an already filtered subset further.
    pub fn refine(&self, spec: &FilterSpec) -> FilteredSubset<'a> {
        filter_records(self.rows.iter().copied(), spec)
    }
}

pub fn filter_records<'a, I>(rows: I, spec: &FilterSpec) -> FilteredSubset<'a>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    FilteredSubset {
        rows: rows.into_iter().filter(|r| spec.matches(r)).collect(),
    }
}

/// Produce the working subset every view reads from.
pub fn apply<'a>(dataset: &'a EnrichedDataset, spec: &FilterSpec) -> FilteredSubset<'a> {
    let subset = filter_records(dataset.records(), spec);
    log::debug!(
        "filter years={:?} types={:?} country={} floor={} -> {} of {} rows",
        spec.year_range,
        spec.disaster_types,
        spec.country,
        spec.severity_floor,
        subset.len(),
        dataset.len()
    );
    subset
}
