use crate::error::{Error, Result};
use crate::filter::FilteredSubset;
use serde::Serialize;
use std::io;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Column order of the source table, reused for downloads.
pub const EXPORT_COLUMNS: [&str; 8] = [
    "year",
    "month",
    "country",
    "disaster_type",
    "casualties",
    "economic_loss_usd",
    "latitude",
    "longitude",
];

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write the subset in the source's shape. The header is written even when
/// no rows matched.
pub fn export_subset_to<W: io::Write>(writer: W, subset: &FilteredSubset<'_>) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(EXPORT_COLUMNS)?;
    for r in subset.iter() {
        wtr.serialize(r.to_export_row())?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_subset(path: &Path, subset: &FilteredSubset<'_>) -> Result<()> {
    let file = std::fs::File::create(path)?;
    export_subset_to(file, subset).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("exported {} rows to {}", subset.len(), path.display());
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no data)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Print a table whose columns are only known at runtime. The first record
/// is the header.
pub fn preview_grid(records: Vec<Vec<String>>) {
    if records.len() <= 1 {
        println!("(no data)\n");
        return;
    }
    let mut builder = Builder::default();
    for record in records {
        builder.push_record(record);
    }
    let table_str = builder.build().with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{apply, FilterSpec};
    use crate::pipeline::enrich;
    use crate::types::RawEvent;

    #[test]
    fn export_keeps_source_columns_and_order() {
        let ds = enrich(vec![
            RawEvent::new(2020, "Peru", "Flood").with_month(4).with_impact(3.0, 1500.0),
            RawEvent::new(2021, "Chile", "Storm"),
            RawEvent::new(2022, "Peru", "Storm").with_coordinates(-12.5, -77.25),
        ]);
        let subset = apply(&ds, &FilterSpec::default().with_country("Peru"));
        let mut buf = Vec::new();
        export_subset_to(&mut buf, &subset).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], EXPORT_COLUMNS.join(","));
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2020,4,Peru,Flood,3"));
        assert!(lines[2].starts_with("2022,,Peru,Storm,,,-12.5,-77.25"));
    }

    #[test]
    fn empty_export_still_has_header() {
        let ds = enrich(vec![RawEvent::new(2020, "Peru", "Flood")]);
        let subset = apply(&ds, &FilterSpec::default().with_years(1900, 1901));
        let mut buf = Vec::new();
        export_subset_to(&mut buf, &subset).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().trim_end(), EXPORT_COLUMNS.join(","));
    }
}
