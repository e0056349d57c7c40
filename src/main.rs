// Entry point and interactive CLI flow.
//
// - [1]/[2] fetch, parse and aggregate the renewable share dataset,
//   from the cache when it is fresh or straight from the sources.
// - [3] prints previews of every report and exports them to files.
// - [4] shows one country's rank and history; [5] lists stored records
//   for a country or a year.
// - [6] shows or clears the dataset cache.
mod aggregate;
mod cache;
mod config;
mod error;
mod loader;
mod metrics;
mod output;
mod pipeline;
mod regions;
mod reports;
mod source;
mod store;
mod types;
mod util;

use cache::format_age;
use config::AppConfig;
use once_cell::sync::Lazy;
use pipeline::{DataOrigin, Dashboard, Pipeline};
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use store::RecordStore;
use tracing::error;
use tracing_subscriber::EnvFilter;

// The latest dashboard plus the stored copy of its observations. A refresh
// replaces both at once.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        dashboard: None,
        store: RecordStore::new(),
    })
});

struct AppState {
    dashboard: Option<Dashboard>,
    store: RecordStore,
}

fn app_state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Print `prompt` and read one trimmed line from stdin.
fn read_input(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn loaded_dashboard() -> Option<Dashboard> {
    let dashboard = app_state().dashboard.clone();
    if dashboard.is_none() {
        println!("Error: No data loaded. Please load the data first (option 1).\n");
    }
    dashboard
}

/// Handle options [1] and [2]: run a refresh and replace the app state.
fn handle_load(pipeline: &Pipeline, force: bool) {
    let outcome = match pipeline.refresh(force) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Failed to load data: {}\n", e);
            return;
        }
    };

    match &outcome.origin {
        DataOrigin::Cache => println!("Using cached data."),
        DataOrigin::Source { location, attempt } => {
            if *attempt > 0 {
                println!("Primary source unavailable, used fallback {}.", location);
            } else {
                println!("Fetched {}.", location);
            }
        }
        DataOrigin::Unavailable => {
            println!("Warning: no data source could be reached; showing an empty dataset.")
        }
    }
    if let Some(report) = &outcome.report {
        println!(
            "Processing dataset... ({} rows read, {} kept)",
            util::format_int(report.total_rows),
            util::format_int(report.accepted_rows)
        );
        println!(
            "Note: {} rows skipped.",
            util::format_int(report.rejected_rows())
        );
        for (reason, count) in &report.rejected {
            println!("  - {}: {}", reason, util::format_int(*count));
        }
    }

    let dashboard = outcome.dashboard;
    println!(
        "{} countries across {} regions.",
        util::format_int(dashboard.countries.len()),
        util::format_int(dashboard.regions.len())
    );

    let mut state = app_state();
    // Only a successful import replaces the stored records.
    if outcome.origin != DataOrigin::Unavailable {
        state.store.replace_all(&dashboard.observations);
    }
    println!("Stored {} records.\n", util::format_int(state.store.len()));
    state.dashboard = Some(dashboard);
}

/// Handle option [3]: preview every report and export the files.
fn handle_generate_reports(config: &AppConfig) {
    let Some(dashboard) = loaded_dashboard() else {
        return;
    };
    let out = |name: &str| config.output_dir.join(name);

    println!(
        "Generating reports... (data as of {})\n",
        dashboard.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    if dashboard.is_empty() {
        println!("Dataset is empty; KPIs are shown as placeholders.\n");
    }

    let summary = reports::generate_summary(&dashboard);
    output::preview_table(
        "Global Renewable Electricity KPIs",
        None,
        &reports::kpi_rows(&summary),
        10,
    );

    let r1 = reports::country_ranking(&dashboard);
    let file1 = out("report1_country_ranking.csv");
    if let Err(e) = output::write_csv(&file1, &r1) {
        eprintln!("Write error: {}", e);
    }
    output::preview_table(
        "Report 1: Country Ranking by Renewable Electricity Share",
        Some("Latest year per country, change over 5 years"),
        &r1,
        5,
    );
    println!("(Full table exported to {})\n", file1.display());

    let r2 = reports::regional_summary(&dashboard);
    let file2 = out("report2_regional_summary.csv");
    if let Err(e) = output::write_csv(&file2, &r2) {
        eprintln!("Write error: {}", e);
    }
    output::preview_table("Report 2: Regional Averages", None, &r2, 10);
    println!("(Full table exported to {})\n", file2.display());

    let r3 = reports::performers(&dashboard, config.top_count);
    let file3 = out("report3_performers.csv");
    if let Err(e) = output::write_csv(&file3, &r3) {
        eprintln!("Write error: {}", e);
    }
    output::preview_table(
        "Report 3: Top and Bottom Performers",
        None,
        &r3,
        config.top_count * 2,
    );
    println!("(Full table exported to {})\n", file3.display());

    let majors = reports::major_countries(&dashboard, &config.major_countries);
    output::preview_table("Major Countries", None, &majors, majors.len());

    let records_file = out("records.json");
    let write_records = {
        let state = app_state();
        output::write_json(&records_file, &state.store.all())
    };
    if let Err(e) = write_records {
        eprintln!("Write error: {}", e);
    }

    let summary_file = out("summary.json");
    if let Err(e) = output::write_json(&summary_file, &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats ({}):", summary_file.display());
    println!(
        "{{\"global_average\": \"{}\", \"total_countries\": \"{}\"}}\n",
        summary.global_average, summary.total_countries
    );
}

/// Handle option [4]: one country's summary, rank and history.
fn handle_country_detail() {
    let Some(dashboard) = loaded_dashboard() else {
        return;
    };
    let name = read_input("Country name: ");
    let Some(detail) = dashboard.country_detail(&name) else {
        println!("No data for \"{}\".\n", name);
        return;
    };

    let rank = detail
        .rank
        .map(|r| format!("#{} of {}", r, detail.ranked_total))
        .unwrap_or_else(|| util::PLACEHOLDER.to_string());
    println!("\n{}", detail.summary.country);
    println!(
        "Region: {}",
        detail.summary.region.as_deref().unwrap_or(util::PLACEHOLDER)
    );
    println!(
        "Latest ({}): {}",
        detail.summary.latest_year,
        util::format_percent(detail.summary.latest_value)
    );
    println!("5-year change: {}", util::format_change(detail.summary.growth_rate));
    println!("Global rank: {}\n", rank);
    let history = reports::observation_rows(&detail.history);
    output::preview_table("History", None, &history, history.len());
}

/// Handle option [5]: stored records for a year (numeric input) or a
/// country (anything else).
fn handle_records_lookup() {
    let input = read_input("Country or year: ");
    if input.is_empty() {
        println!("Nothing to look up.\n");
        return;
    }
    let (rows, years) = {
        let state = app_state();
        let records = match util::parse_i32_safe(Some(&input)) {
            Some(year) => state.store.by_year(year),
            None => state.store.by_country(&input),
        };
        (reports::stored_rows(&records), state.store.years())
    };
    if rows.is_empty() {
        match (years.first(), years.last()) {
            (Some(first), Some(last)) => {
                println!("No records for \"{}\" (stored years: {}-{}).\n", input, first, last)
            }
            _ => println!("No records stored yet.\n"),
        }
        return;
    }
    output::preview_table(&format!("Records for {}", input), None, &rows, rows.len());
}

/// Handle option [6]: cache status, with the option to clear it.
fn handle_cache(pipeline: &Pipeline) {
    let Some(cache) = pipeline.cache() else {
        println!("Caching is disabled.\n");
        return;
    };
    let status = cache.status();
    match status.age {
        Some(age) if status.has_cache => {
            println!("Cache: {} (updated {})", cache.path().display(), format_age(age))
        }
        _ => println!("Cache: empty"),
    }
    if status.has_cache && read_input("Clear cache (Y/N): ").eq_ignore_ascii_case("y") {
        match cache.clear() {
            Ok(()) => println!("Cache cleared."),
            Err(e) => eprintln!("Failed to clear cache: {}", e),
        }
    }
    println!();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let pipeline = match Pipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Failed to set up data sources: {}", e);
            std::process::exit(1);
        }
    };

    loop {
        println!("Renewable Electricity Dashboard");
        println!("[1] Load data");
        println!("[2] Refresh data (skip cache)");
        println!("[3] Generate reports");
        println!("[4] Country detail");
        println!("[5] Stored records by country or year");
        println!("[6] Cache status");
        println!("[0] Exit\n");
        match read_input("Enter choice: ").as_str() {
            "1" => handle_load(&pipeline, false),
            "2" => handle_load(&pipeline, true),
            "3" => handle_generate_reports(&config),
            "4" => handle_country_detail(),
            "5" => handle_records_lookup(),
            "6" => handle_cache(&pipeline),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-6.\n"),
        }
    }
}
