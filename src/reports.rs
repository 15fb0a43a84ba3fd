use crate::aggregates::{
    CountryTotal, LogHistogram, Metric, MonthlyCount, SeasonalCount, Totals, TypeYearMatrix,
};
use crate::filter::FilteredSubset;
use crate::types::{
    CountryRankingRow, HistogramRow, KpiRow, MonthlyActivityRow, SeasonalRow, SummaryStats,
};
use crate::util::{format_int, format_number, human_int};
use std::collections::HashSet;

/// Shown wherever a value is undefined for an empty selection.
pub const PLACEHOLDER: &str = "—";

pub fn kpi_row(totals: &Totals) -> KpiRow {
    KpiRow {
        total_events: format_int(totals.count),
        casualties: format_number(totals.total_casualties, 0),
        economic_loss: format!("${} B", format_number(totals.economic_loss_billions(), 2)),
        avg_severity: totals
            .avg_severity
            .map(|v| format_number(v, 1))
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
    }
}

fn format_metric(metric: Metric, v: f64) -> String {
    match metric {
        Metric::Casualties | Metric::Events => format_number(v, 0),
        Metric::EconomicLoss => format!("${}", human_int(v)),
        Metric::Severity => format_number(v, 1),
    }
}

pub fn country_ranking(top: &[CountryTotal], metric: Metric) -> Vec<CountryRankingRow> {
    top.iter()
        .enumerate()
        .map(|(idx, c)| CountryRankingRow {
            rank: idx + 1,
            country: c.country.clone(),
            total: format_metric(metric, c.total),
            events: c.events,
        })
        .collect()
}

pub fn monthly_rows(series: &[MonthlyCount]) -> Vec<MonthlyActivityRow> {
    series
        .iter()
        .map(|m| MonthlyActivityRow {
            month: m.month.format("%Y-%m").to_string(),
            events: m.count,
        })
        .collect()
}

pub fn seasonal_rows(seasonal: &[SeasonalCount; 12]) -> Vec<SeasonalRow> {
    let total: usize = seasonal.iter().map(|s| s.count).sum();
    seasonal
        .iter()
        .map(|s| {
            let share = if total == 0 {
                0.0
            } else {
                s.count as f64 / total as f64 * 100.0
            };
            SeasonalRow {
                month: s.label.to_string(),
                events: s.count,
                share: format_number(share, 1),
            }
        })
        .collect()
}

/// One row per bin; the median's bin carries the median label.
pub fn histogram_rows(hist: &LogHistogram, prefix: &str) -> Vec<HistogramRow> {
    hist.counts
        .iter()
        .enumerate()
        .map(|(i, count)| HistogramRow {
            bin: format!(
                "{prefix}{} – {prefix}{}",
                human_int(hist.edges[i]),
                human_int(hist.edges[i + 1])
            ),
            events: *count,
            median: if i == hist.median_bin {
                format!("{prefix}{}", human_int(hist.median))
            } else {
                String::new()
            },
        })
        .collect()
}

/// Header row of years, then one row per disaster type.
pub fn heatmap_records(matrix: &TypeYearMatrix) -> Vec<Vec<String>> {
    let header: Vec<String> = std::iter::once("Type".to_string())
        .chain(matrix.years.iter().map(|y| y.to_string()))
        .collect();
    let body = matrix.types.iter().zip(&matrix.counts).map(|(t, row)| {
        std::iter::once(t.clone())
            .chain(row.iter().map(|c| c.to_string()))
            .collect::<Vec<String>>()
    });
    std::iter::once(header).chain(body).collect()
}

pub fn summary_stats(subset: &FilteredSubset<'_>, totals: &Totals) -> SummaryStats {
    let countries: HashSet<&str> = subset.iter().map(|r| r.country.as_str()).collect();
    let types: HashSet<&str> = subset.iter().map(|r| r.disaster_type.as_str()).collect();
    SummaryStats {
        total_events: totals.count,
        total_casualties: totals.total_casualties,
        total_economic_loss_usd: totals.total_economic_loss,
        avg_severity: totals.avg_severity,
        countries: countries.len(),
        disaster_types: types.len(),
        located_events: subset.iter().filter(|r| r.coordinates().is_some()).count(),
        first_date: subset.iter().filter_map(|r| r.date).min(),
        last_date: subset.iter().filter_map(|r| r.date).max(),
    }
}
