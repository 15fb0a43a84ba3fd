//! Feature pipeline: raw events in, enriched events out.
//!
//! Each stage is a pure function over an immutable input so it can be tested
//! on its own. Severity normalization needs the whole table, so it runs over
//! the full dataset once and never over a filtered view.

use crate::dataset::EnrichedDataset;
use crate::error::Result;
use crate::loader::{self, LoadReport};
use crate::types::{EventRecord, RawEvent};
use chrono::NaiveDate;
use std::path::Path;

/// `None` and `0` become January. Anything else, including months outside
/// 1..=12, is passed through untouched and left for date construction to
/// absorb.
pub fn repair_month(month: Option<i32>) -> i32 {
    match month {
        None | Some(0) => 1,
        Some(m) => m,
    }
}

/// First day of `year`-`month`, falling back to the first day of `year`.
///
/// Only a year outside chrono's range yields `None`.
pub fn normalize_date(year: i32, month_clean: i32) -> Option<NaiveDate> {
    month_start(year, month_clean).or_else(|| NaiveDate::from_ymd_opt(year, 1, 1))
}

fn month_start(year: i32, month: i32) -> Option<NaiveDate> {
    u32::try_from(month)
        .ok()
        .and_then(|m| NaiveDate::from_ymd_opt(year, m, 1))
}

/// `ln(1 + casualties) + ln(1 + loss)`. Missing and negative values count as 0.
pub fn raw_severity(casualties: Option<f64>, economic_loss_usd: Option<f64>) -> f64 {
    let term = |v: Option<f64>| v.filter(|x| *x > 0.0).map_or(0.0, f64::ln_1p);
    term(casualties) + term(economic_loss_usd)
}

/// Scale raw scores onto 0..=100 against their maximum. All zeros when the
/// maximum is not strictly positive.
pub fn normalize_severity(raw: &[f64]) -> Vec<f64> {
    let max = raw.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return vec![0.0; raw.len()];
    }
    raw.iter()
        .map(|r| (r / max * 100.0).clamp(0.0, 100.0))
        .collect()
}

fn dated(event: RawEvent) -> (EventRecord, bool, bool) {
    let month_clean = repair_month(event.month);
    let repaired = event.month != Some(month_clean);
    // no year, no date; that is not a month fallback
    let fell_back = event
        .year
        .is_some_and(|y| month_start(y, month_clean).is_none());
    let date = event.year.and_then(|y| normalize_date(y, month_clean));
    let record = EventRecord {
        year: event.year,
        month: event.month,
        country: event.country,
        disaster_type: event.disaster_type,
        casualties: event.casualties,
        economic_loss_usd: event.economic_loss_usd,
        latitude: event.latitude,
        longitude: event.longitude,
        month_clean,
        date,
        severity_score: 0.0,
    };
    (record, repaired, fell_back)
}

/// Run every stage over the full raw table.
pub fn enrich(raw: Vec<RawEvent>) -> EnrichedDataset {
    enrich_with_report(raw, LoadReport::default()).0
}

fn enrich_with_report(
    raw: Vec<RawEvent>,
    mut report: LoadReport,
) -> (EnrichedDataset, LoadReport) {
    let mut staged = Vec::with_capacity(raw.len());
    for event in raw {
        let (record, repaired, fell_back) = dated(event);
        if repaired {
            report.month_repairs += 1;
        }
        if fell_back {
            log::warn!(
                "year {} month {} is not a valid date; using January 1st",
                record.year.unwrap_or_default(),
                record.month_clean
            );
            report.date_fallbacks += 1;
        }
        staged.push(record);
    }

    let raw_scores: Vec<f64> = staged
        .iter()
        .map(|r| raw_severity(r.casualties, r.economic_loss_usd))
        .collect();
    let scores = normalize_severity(&raw_scores);

    let records: Vec<EventRecord> = staged
        .into_iter()
        .zip(scores)
        .map(|(record, severity_score)| EventRecord {
            severity_score,
            ..record
        })
        .collect();

    log::info!(
        "enriched {} events ({} months repaired, {} date fallbacks)",
        records.len(),
        report.month_repairs,
        report.date_fallbacks
    );
    (EnrichedDataset::new(records), report)
}

/// Read and enrich in one step. A load failure produces no dataset.
pub fn load_enriched(path: &Path) -> Result<(EnrichedDataset, LoadReport)> {
    let (raw, report) = loader::read_raw(path)?;
    Ok(enrich_with_report(raw, report))
}
