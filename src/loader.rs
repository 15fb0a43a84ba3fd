use crate::error::{Error, Result};
use crate::types::{RawEvent, RawRow};
use crate::util::{parse_f64_safe, parse_i32_safe, parse_month};
use csv::ReaderBuilder;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 3] = ["year", "country", "disaster_type"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub missing_years: usize,
    pub month_repairs: usize,
    pub date_fallbacks: usize,
    pub defaulted_impacts: usize,
    pub located_rows: usize,
}

/// Read the raw event table. Any structural problem aborts the whole load:
/// callers get either every row or an error, never a partial table. Bad
/// cells inside a row are not structural; the row is kept with the cell
/// treated as missing.
pub fn read_raw(path: &Path) -> Result<(Vec<RawEvent>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = rdr.headers().map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let mut report = LoadReport::default();
    let mut events = Vec::new();

    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        // 1-based, counting the header line
        let row_no = idx + 2;
        let row = result.map_err(|source| Error::Malformed {
            path: path.to_path_buf(),
            row: row_no,
            source,
        })?;
        report.total_rows += 1;

        let year = parse_i32_safe(row.year.as_deref());
        if year.is_none() {
            log::warn!(
                "{} row {}: unusable year {:?}; the event stays undated",
                path.display(),
                row_no,
                row.year.as_deref().unwrap_or_default()
            );
            report.missing_years += 1;
        }

        let casualties = parse_f64_safe(row.casualties.as_deref());
        let economic_loss_usd = parse_f64_safe(row.economic_loss_usd.as_deref());
        if casualties.is_none() || economic_loss_usd.is_none() {
            report.defaulted_impacts += 1;
        }

        let latitude = parse_f64_safe(row.latitude.as_deref());
        let longitude = parse_f64_safe(row.longitude.as_deref());
        if latitude.is_some() && longitude.is_some() {
            report.located_rows += 1;
        }

        events.push(RawEvent {
            year,
            month: parse_month(row.month.as_deref()),
            country: text_or_unknown(row.country),
            disaster_type: text_or_unknown(row.disaster_type),
            casualties,
            economic_loss_usd,
            latitude,
            longitude,
        });
    }

    log::info!(
        "read {} rows from {} ({} with coordinates, {} with defaulted impact fields)",
        report.total_rows,
        path.display(),
        report.located_rows,
        report.defaulted_impacts
    );
    Ok((events, report))
}

fn text_or_unknown(cell: Option<String>) -> String {
    match cell.map(|s| s.trim().to_string()) {
        Some(s) if !s.is_empty() => s,
        _ => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_rows_with_defaults() {
        let file = write_csv(
            "year,month,country,disaster_type,casualties,economic_loss_usd,latitude,longitude\n\
             2020,3.0,Japan,Earthquake,12,\"1,500\",35.6,139.7\n\
             2021,,, Flood ,,,,\n",
        );
        let (events, report) = read_raw(file.path()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].month, Some(3));
        assert_eq!(events[0].economic_loss_usd, Some(1500.0));
        assert_eq!(events[1].country, "Unknown");
        assert_eq!(events[1].disaster_type, "Flood");
        assert_eq!(events[1].casualties, None);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.located_rows, 1);
        assert_eq!(report.defaulted_impacts, 1);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let file = write_csv("year,country,disaster_type\n2019,Chile,Wildfire\n");
        let (events, _) = read_raw(file.path()).unwrap();
        assert_eq!(events[0].month, None);
        assert_eq!(events[0].latitude, None);
    }

    #[test]
    fn missing_required_column_is_a_load_failure() {
        let file = write_csv("year,month,disaster_type\n2020,1,Flood\n");
        let err = read_raw(file.path()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { column: "country", .. }));
        assert!(err.is_load_failure());
    }

    #[test]
    fn unusable_year_keeps_the_row() {
        let file = write_csv(
            "year,country,disaster_type\n2020,Peru,Flood\nabc,Chile,Flood\n,Peru,Storm\n",
        );
        let (events, report) = read_raw(file.path()).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].year, Some(2020));
        assert_eq!(events[1].year, None);
        assert_eq!(events[1].country, "Chile");
        assert_eq!(events[2].year, None);
        assert_eq!(report.missing_years, 2);
    }

    #[test]
    fn missing_year_header_is_a_load_failure() {
        let file = write_csv("month,country,disaster_type\n4,Peru,Flood\n");
        let err = read_raw(file.path()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { column: "year", .. }));
    }

    #[test]
    fn missing_file_is_a_load_failure() {
        let err = read_raw(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, Error::Open { .. }));
    }
}
