//! Aggregates over a filtered subset.
//!
//! These are the only numbers reporting code is allowed to show. Each one
//! is total over an empty subset: sums are zero, means are `None`, and the
//! seasonal view always has twelve entries.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::filter::FilteredSubset;
use crate::types::EventRecord;
use crate::util::{mean, median, quantile};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Metric {
    Casualties,
    EconomicLoss,
    Events,
    Severity,
}

impl Metric {
    pub fn value(self, record: &EventRecord) -> f64 {
        match self {
            Metric::Casualties => record.casualties_or_zero(),
            Metric::EconomicLoss => record.economic_loss_or_zero(),
            Metric::Events => 1.0,
            Metric::Severity => record.severity_score,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Casualties => "casualties",
            Metric::EconomicLoss => "economic loss (USD)",
            Metric::Events => "events",
            Metric::Severity => "summed severity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub count: usize,
    pub total_casualties: f64,
    pub total_economic_loss: f64,
    /// `None` for an empty subset.
    pub avg_severity: Option<f64>,
}

impl Totals {
    pub fn economic_loss_billions(&self) -> f64 {
        self.total_economic_loss / 1e9
    }
}

pub fn totals(subset: &FilteredSubset<'_>) -> Totals {
    let scores: Vec<f64> = subset.iter().map(|r| r.severity_score).collect();
    Totals {
        count: subset.len(),
        total_casualties: subset.iter().map(EventRecord::casualties_or_zero).sum(),
        total_economic_loss: subset.iter().map(EventRecord::economic_loss_or_zero).sum(),
        avg_severity: mean(&scores),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryTotal {
    pub country: String,
    pub total: f64,
    pub events: usize,
}

/// Sum `metric` per country and keep the `n` largest.
///
/// Ties keep the order in which countries first appear in the subset.
pub fn top_n_by_country(
    subset: &FilteredSubset<'_>,
    metric: Metric,
    n: usize,
) -> Vec<CountryTotal> {
    let mut groups: Vec<CountryTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for r in subset.iter() {
        let slot = *index.entry(r.country.as_str()).or_insert_with(|| {
            groups.push(CountryTotal {
                country: r.country.clone(),
                total: 0.0,
                events: 0,
            });
            groups.len() - 1
        });
        groups[slot].total += metric.value(r);
        groups[slot].events += 1;
    }
    // `sort_by` is stable, so equal totals stay in first-seen order.
    groups.sort_by(|a, b| b.total.total_cmp(&a.total));
    groups.truncate(n);
    groups
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// First day of the bucket's month.
    pub month: NaiveDate,
    pub count: usize,
}

/// Event counts per calendar month, oldest first. Rows without a date are skipped.
pub fn monthly_activity_series(subset: &FilteredSubset<'_>) -> Vec<MonthlyCount> {
    let mut buckets: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for date in subset.iter().filter_map(|r| r.date) {
        if let Some(bucket) = date.with_day(1) {
            *buckets.entry(bucket).or_default() += 1;
        }
    }
    buckets
        .into_iter()
        .map(|(month, count)| MonthlyCount { month, count })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonalCount {
    pub month: u32,
    pub label: &'static str,
    pub count: usize,
}

/// Counts per `month_clean` regardless of year, always January..December.
///
/// Out-of-range months have no slot and are not counted.
pub fn seasonal_distribution(subset: &FilteredSubset<'_>) -> [SeasonalCount; 12] {
    let mut counts = [0usize; 12];
    for r in subset.iter() {
        if (1..=12).contains(&r.month_clean) {
            counts[(r.month_clean - 1) as usize] += 1;
        }
    }
    std::array::from_fn(|i| SeasonalCount {
        month: i as u32 + 1,
        label: MONTH_LABELS[i],
        count: counts[i],
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
    pub disaster_type: String,
    pub casualties: f64,
    pub severity_score: f64,
}

/// Located events for the bubble map. Rows missing either coordinate are left out.
pub fn geo_points(subset: &FilteredSubset<'_>) -> Vec<GeoPoint> {
    subset
        .iter()
        .filter_map(|r| {
            let (latitude, longitude) = r.coordinates()?;
            Some(GeoPoint {
                latitude,
                longitude,
                country: r.country.clone(),
                disaster_type: r.disaster_type.clone(),
                casualties: r.casualties_or_zero(),
                severity_score: r.severity_score,
            })
        })
        .collect()
}

/// Event counts by disaster type (rows) and year (columns), zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeYearMatrix {
    pub types: Vec<String>,
    pub years: Vec<i32>,
    pub counts: Vec<Vec<usize>>,
}

impl TypeYearMatrix {
    pub fn get(&self, disaster_type: &str, year: i32) -> usize {
        let row = self.types.iter().position(|t| t == disaster_type);
        let col = self.years.iter().position(|y| *y == year);
        match (row, col) {
            (Some(r), Some(c)) => self.counts[r][c],
            _ => 0,
        }
    }
}

/// Records without a year have no column and are left out.
pub fn type_year_matrix(subset: &FilteredSubset<'_>) -> TypeYearMatrix {
    let dated: Vec<(&str, i32)> = subset
        .iter()
        .filter_map(|r| r.year.map(|y| (r.disaster_type.as_str(), y)))
        .collect();
    let types: Vec<String> = dated
        .iter()
        .map(|(t, _)| *t)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let years: Vec<i32> = dated
        .iter()
        .map(|(_, y)| *y)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut counts = vec![vec![0usize; years.len()]; types.len()];
    for (disaster_type, year) in &dated {
        // both lookups succeed: the axes were built from these rows
        if let (Ok(t), Ok(y)) = (
            types.binary_search_by(|t| t.as_str().cmp(disaster_type)),
            years.binary_search(year),
        ) {
            counts[t][y] += 1;
        }
    }
    TypeYearMatrix {
        types,
        years,
        counts,
    }
}

/// Histogram over log-spaced bins with the median's bin marked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogHistogram {
    /// `counts.len() + 1` ascending edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    pub median: f64,
    pub median_bin: usize,
}

impl LogHistogram {
    fn bin_of(&self, v: f64) -> usize {
        let last = self.counts.len() - 1;
        self.edges
            .partition_point(|e| *e <= v)
            .saturating_sub(1)
            .min(last)
    }
}

/// Build a log-scale histogram of the strictly positive `values`.
///
/// Values above the `clip_q` quantile are pulled down to it before binning.
/// Returns `None` when there is nothing positive to show.
pub fn log_histogram<I>(values: I, bins: usize, clip_q: Option<f64>) -> Option<LogHistogram>
where
    I: IntoIterator<Item = f64>,
{
    let mut positive: Vec<f64> = values
        .into_iter()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    if positive.is_empty() {
        return None;
    }
    if let Some(q) = clip_q {
        let cap = quantile(positive.clone(), q)?;
        positive = positive.into_iter().map(|v| v.min(cap)).collect();
    }

    let bins = bins.max(1);
    let lo = positive.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = positive.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (hi.ln() - lo.ln()) / bins as f64;
    let mut edges: Vec<f64> = (0..=bins)
        .map(|i| (lo.ln() + step * i as f64).exp())
        .collect();
    edges[0] = lo;
    edges[bins] = hi;

    let median = median(positive.clone())?;
    let mut hist = LogHistogram {
        edges,
        counts: vec![0; bins],
        median,
        median_bin: 0,
    };
    for v in &positive {
        let b = hist.bin_of(*v);
        hist.counts[b] += 1;
    }
    hist.median_bin = hist.bin_of(median);
    Some(hist)
}
