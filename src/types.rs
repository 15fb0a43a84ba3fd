use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One CSV row exactly as read. Every cell stays a string until the loader
/// decides how forgiving to be with it.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub year: Option<String>,
    pub month: Option<String>,
    pub country: Option<String>,
    pub disaster_type: Option<String>,
    pub casualties: Option<String>,
    pub economic_loss_usd: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// A typed event before feature engineering.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub country: String,
    pub disaster_type: String,
    pub casualties: Option<f64>,
    pub economic_loss_usd: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl RawEvent {
    pub fn new(year: i32, country: &str, disaster_type: &str) -> Self {
        RawEvent {
            year: Some(year),
            month: None,
            country: country.to_string(),
            disaster_type: disaster_type.to_string(),
            casualties: None,
            economic_loss_usd: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Same event with its year cell unreadable.
    pub fn without_year(self) -> Self {
        RawEvent { year: None, ..self }
    }

    pub fn with_month(self, month: i32) -> Self {
        RawEvent { month: Some(month), ..self }
    }

    pub fn with_impact(self, casualties: f64, economic_loss_usd: f64) -> Self {
        RawEvent {
            casualties: Some(casualties),
            economic_loss_usd: Some(economic_loss_usd),
            ..self
        }
    }

    pub fn with_coordinates(self, latitude: f64, longitude: f64) -> Self {
        RawEvent {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..self
        }
    }
}

/// An event after the feature pipeline has run. The derived fields are
/// only ever set by `pipeline::enrich`. `date` is `None` exactly when the
/// year could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub country: String,
    pub disaster_type: String,
    pub casualties: Option<f64>,
    pub economic_loss_usd: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub month_clean: i32,
    pub date: Option<NaiveDate>,
    pub severity_score: f64,
}

impl EventRecord {
    pub fn casualties_or_zero(&self) -> f64 {
        self.casualties.unwrap_or(0.0)
    }

    pub fn economic_loss_or_zero(&self) -> f64 {
        self.economic_loss_usd.unwrap_or(0.0)
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    pub fn to_export_row(&self) -> ExportRow<'_> {
        ExportRow {
            year: self.year,
            month: self.month,
            country: &self.country,
            disaster_type: &self.disaster_type,
            casualties: self.casualties,
            economic_loss_usd: self.economic_loss_usd,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Download shape: the source columns, in source order.
#[derive(Debug, Serialize)]
pub struct ExportRow<'a> {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub country: &'a str,
    pub disaster_type: &'a str,
    pub casualties: Option<f64>,
    pub economic_loss_usd: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiRow {
    #[serde(rename = "TotalEvents")]
    #[tabled(rename = "Total Events")]
    pub total_events: String,
    #[serde(rename = "Casualties")]
    #[tabled(rename = "Casualties")]
    pub casualties: String,
    #[serde(rename = "EconomicLoss")]
    #[tabled(rename = "Economic Loss")]
    pub economic_loss: String,
    #[serde(rename = "AvgSeverity")]
    #[tabled(rename = "Avg Severity")]
    pub avg_severity: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CountryRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: String,
    #[serde(rename = "Events")]
    #[tabled(rename = "Events")]
    pub events: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthlyActivityRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Events")]
    #[tabled(rename = "Events")]
    pub events: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SeasonalRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Events")]
    #[tabled(rename = "Events")]
    pub events: usize,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share %")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct HistogramRow {
    #[serde(rename = "Bin")]
    #[tabled(rename = "Bin")]
    pub bin: String,
    #[serde(rename = "Events")]
    #[tabled(rename = "Events")]
    pub events: usize,
    #[serde(rename = "Median")]
    #[tabled(rename = "Median")]
    pub median: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_events: usize,
    pub total_casualties: f64,
    pub total_economic_loss_usd: f64,
    pub avg_severity: Option<f64>,
    pub countries: usize,
    pub disaster_types: usize,
    pub located_events: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}
