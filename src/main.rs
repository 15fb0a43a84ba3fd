// Entry point and high-level CLI flow.
//
// The binary loads the event table once through `DatasetCache`, then either
// prints a single report for the filters given on the command line or, with
// `--interactive`, keeps a menu open so filters can be changed and the
// report recomputed without reloading.
use anyhow::{Context, Result};
use clap::Parser;
use disaster_monitor::aggregates::{self, Metric};
use disaster_monitor::dataset::{DatasetCache, EnrichedDataset};
use disaster_monitor::filter::{self, FilterSpec};
use disaster_monitor::{output, reports, util};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "disaster-monitor")]
#[command(about = "Global disaster risk monitor (2018-2024): filter events and report impact")]
#[command(version)]
struct Cli {
    /// Cleaned events CSV
    #[arg(long, env = "DISASTER_DATA", default_value = "data/cleaned_data_final.csv")]
    data: PathBuf,

    /// First year to keep (inclusive). Defaults to the earliest year in the data
    #[arg(long)]
    from_year: Option<i32>,

    /// Last year to keep (inclusive). Defaults to the latest year in the data
    #[arg(long)]
    to_year: Option<i32>,

    /// Disaster type to keep; repeat for several. None means every type
    #[arg(long = "type", value_name = "TYPE")]
    types: Vec<String>,

    /// Preselect the first five types when no --type is given
    #[arg(long)]
    default_types: bool,

    /// Country to keep, or "All World"
    #[arg(long, default_value = disaster_monitor::dataset::ALL_WORLD)]
    country: String,

    /// Minimum severity score (0-100, inclusive)
    #[arg(long, default_value_t = 0.0)]
    min_severity: f64,

    /// Metric used to rank countries
    #[arg(long, value_enum, default_value_t = Metric::Casualties)]
    rank_by: Metric,

    /// Number of countries in the ranking
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Write the filtered events to this CSV
    #[arg(long)]
    export: Option<PathBuf>,

    /// Write summary statistics to this JSON file
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Keep a menu open to adjust filters
    #[arg(long, short = 'i')]
    interactive: bool,
}

impl Cli {
    fn filter_spec(&self, dataset: &EnrichedDataset) -> FilterSpec {
        let bounds = dataset.year_bounds();
        let lo = self.from_year.or(bounds.map(|b| b.0));
        let hi = self.to_year.or(bounds.map(|b| b.1));
        let types = if self.types.is_empty() && self.default_types {
            dataset.default_types()
        } else {
            self.types.clone()
        };
        let spec = FilterSpec::default()
            .with_types(types)
            .with_country(self.country.as_str())
            .with_severity_floor(self.min_severity);
        match (lo, hi) {
            (Some(lo), Some(hi)) => spec.with_years(lo, hi),
            _ => spec,
        }
    }
}

/// Load (or fetch from the cache) and print what happened.
fn handle_load(cache: &DatasetCache) -> Result<std::sync::Arc<EnrichedDataset>> {
    let (dataset, report) = cache.get_with_report().with_context(|| {
        format!(
            "could not load {}; check --data or DISASTER_DATA",
            cache.source().display()
        )
    })?;
    println!(
        "Processing dataset... ({} events loaded, {} with coordinates)",
        util::format_int(report.total_rows),
        util::format_int(report.located_rows)
    );
    if report.missing_years > 0 {
        println!(
            "Note: {} events have no usable year; they stay undated.",
            util::format_int(report.missing_years)
        );
    }
    if report.month_repairs > 0 {
        println!(
            "Note: {} events had no month and were placed in January.",
            util::format_int(report.month_repairs)
        );
    }
    if report.date_fallbacks > 0 {
        println!(
            "Note: {} events had an invalid month; dated to January 1st.",
            util::format_int(report.date_fallbacks)
        );
    }
    println!();
    Ok(dataset)
}

/// Print every view over the filtered subset and write the requested files.
fn handle_generate_reports(dataset: &EnrichedDataset, spec: &FilterSpec, cli: &Cli) -> Result<()> {
    let subset = filter::apply(dataset, spec);

    println!("Global Impact Overview");
    println!(
        "(Years {}, {} types, {}, severity >= {})\n",
        spec.year_range
            .map(|(lo, hi)| format!("{lo}–{hi}"))
            .unwrap_or_else(|| "all".to_string()),
        if spec.disaster_types.is_empty() {
            "all".to_string()
        } else {
            spec.disaster_types.len().to_string()
        },
        spec.country,
        util::format_number(spec.severity_floor, 1)
    );
    let totals = aggregates::totals(&subset);
    output::preview_table_rows(&[reports::kpi_row(&totals)], 1);

    println!("Top {} Countries by {}\n", cli.top, cli.rank_by.label());
    let top = aggregates::top_n_by_country(&subset, cli.rank_by, cli.top);
    output::preview_table_rows(&reports::country_ranking(&top, cli.rank_by), cli.top);

    println!("Monthly Activity\n");
    let monthly = reports::monthly_rows(&aggregates::monthly_activity_series(&subset));
    output::preview_table_rows(&monthly, monthly.len());

    println!("Seasonal Distribution\n");
    let seasonal = reports::seasonal_rows(&aggregates::seasonal_distribution(&subset));
    output::preview_table_rows(&seasonal, seasonal.len());

    println!("Events by Type and Year\n");
    output::preview_grid(reports::heatmap_records(&aggregates::type_year_matrix(&subset)));

    println!("Economic Loss Distribution (log scale, median marked)\n");
    let losses = subset.iter().map(|r| r.economic_loss_or_zero());
    match aggregates::log_histogram(losses, 12, Some(0.99)) {
        Some(hist) => {
            let rows = reports::histogram_rows(&hist, "$");
            output::preview_table_rows(&rows, rows.len());
        }
        None => println!("(no positive data)\n"),
    }

    println!(
        "Located events for the map: {}\n",
        util::format_int(aggregates::geo_points(&subset).len())
    );

    if let Some(path) = &cli.export {
        output::export_subset(path, &subset)
            .with_context(|| format!("could not export to {}", path.display()))?;
        println!("(Filtered events exported to {})\n", path.display());
    }
    if let Some(path) = &cli.summary {
        let summary = reports::summary_stats(&subset, &totals);
        output::write_json(path, &summary)
            .with_context(|| format!("could not write {}", path.display()))?;
        println!("(Summary written to {})\n", path.display());
    }
    Ok(())
}

/// Read a single line of input after printing `prompt`. `None` once stdin is closed.
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn ask(prompt: &str) -> String {
    read_line(prompt).unwrap_or_default()
}

fn run_menu(cache: &DatasetCache, cli: &Cli) -> Result<()> {
    let dataset = handle_load(cache)?;
    let mut spec = cli.filter_spec(&dataset);
    loop {
        println!("Select an action:");
        println!("[1] Year range");
        println!("[2] Disaster types");
        println!("[3] Country");
        println!("[4] Minimum severity");
        println!("[5] Show report");
        println!("[0] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => {
                let (min, max) = dataset.year_bounds().unwrap_or((0, 0));
                let lo = util::parse_i32_safe(Some(ask(&format!("From year [{min}]: ")).as_str()));
                let hi = util::parse_i32_safe(Some(ask(&format!("To year [{max}]: ")).as_str()));
                spec = spec.with_years(lo.unwrap_or(min), hi.unwrap_or(max));
            }
            "2" => {
                println!("Available: {}", dataset.disaster_types().join(", "));
                let line = ask("Types (comma separated, empty for all): ");
                spec = spec.with_types(
                    line.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                );
            }
            "3" => {
                let line = ask("Country (empty for All World): ");
                spec = spec.with_country(line.as_str());
            }
            "4" => {
                let floor = util::parse_f64_safe(Some(ask("Minimum severity [0]: ").as_str()));
                spec = spec.with_severity_floor(floor.unwrap_or(0.0));
            }
            "5" => {
                println!();
                handle_generate_reports(&dataset, &spec, cli)?;
            }
            "0" => {
                println!("Exiting the program.");
                return Ok(());
            }
            _ => println!("Invalid choice. Please enter 0-5.\n"),
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let cache = DatasetCache::new(&cli.data);
    if cli.interactive {
        return run_menu(&cache, cli);
    }
    let dataset = handle_load(&cache)?;
    let spec = cli.filter_spec(&dataset);
    handle_generate_reports(&dataset, &spec, cli)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
