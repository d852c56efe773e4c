//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `homeval predict`: run the predictor form once and show the valuation
//! - `homeval metadata`: list locations and model info
//! - `homeval market`: market statistics dashboard
//! - `homeval health`: check backend, config, request log
//! - `homeval requests`: summarize the request log
//! - `homeval config show|init|set|reset`: configuration management

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api::{ApiClient, MetadataResponse, PredictionResponse, PriceApi};
use crate::config;
use crate::dashboard::{Dashboard, DashboardState};
use crate::predictor::{Completion, FormField, FormState, PredictorForm};
use crate::telemetry::logger::RequestLog;
use crate::telemetry::reporter::{self, RequestReport};
use crate::utils::format::{format_inr, format_lakhs, format_number, truncate};

/// Width of a dashboard bar in terminal cells.
const BAR_CELLS: usize = 30;

/// Output format for report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// homeval predict
// ---------------------------------------------------------------------------

/// Load metadata, apply the given field edits, submit once, and print the
/// outcome. Returns an error when the form ends in a failure state so the
/// process exits non-zero.
pub fn run_predict(edits: &[(FormField, String)], format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let client = ApiClient::from_config(&cfg);
    let mut form = PredictorForm::from_config(&cfg.predictor);

    if let FormState::MetadataFailed { message } = form.load_metadata(&client) {
        anyhow::bail!("{message} (backend: {})", client.base_url());
    }

    for (field, value) in edits {
        form.edit(*field, value)
            .with_context(|| format!("invalid value for --{}", field.name().replace('_', "-")))?;
    }

    if let Some(meta) = form.metadata()
        && !meta.locations.contains(&form.request().location)
    {
        eprintln!(
            "{} '{}' is not one of the known locations; the backend may reject it",
            "warning:".yellow().bold(),
            form.request().location
        );
    }

    if format == OutputFormat::Table {
        println!(
            "{}",
            format!("Running valuation for {}…", form.request().location).dimmed()
        );
    }

    if form.submit(&client)? != Completion::Applied {
        anyhow::bail!("prediction was superseded before it completed");
    }

    match form.state() {
        FormState::ResultShown { result } => match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
            OutputFormat::Csv => print_prediction_csv(result),
            OutputFormat::Table => print_prediction_table(result),
        },
        FormState::ErrorShown { message } => anyhow::bail!("{message}"),
        other => anyhow::bail!("prediction ended in unexpected state: {}", other.name()),
    }

    Ok(())
}

fn print_prediction_table(result: &PredictionResponse) {
    println!("{}", "Valuation Summary".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {} {}", "Location:       ".bold(), result.location);
    println!(
        "  {} {} sq.ft, {} BHK",
        "Unit:           ".bold(),
        result.area_sqft,
        result.bhk
    );
    println!();
    println!(
        "  {} {}",
        "Estimate:       ".bold(),
        format_lakhs(result.predicted_price_inr).green().bold()
    );
    println!(
        "  {} {}",
        "               ".bold(),
        format!("INR {}", format_inr(result.predicted_price_inr)).dimmed()
    );
    println!(
        "  {} {} / sq.ft",
        "Unit valuation: ".bold(),
        format_inr(result.price_per_sqft_inr)
    );
    println!(
        "  {} ₹{:.2}L – ₹{:.2}L",
        "Range:          ".bold(),
        result.confidence_range.lower_lakhs,
        result.confidence_range.upper_lakhs
    );
    if let Some(version) = &result.model_version {
        println!("  {} {}", "Model version:  ".bold(), version.dimmed());
    }
}

fn print_prediction_csv(result: &PredictionResponse) {
    println!(
        "location,area_sqft,bhk,predicted_price_inr,predicted_price_lakhs,predicted_price_crores,price_per_sqft_inr,lower_lakhs,upper_lakhs"
    );
    println!(
        "{},{},{},{:.2},{:.2},{:.4},{:.2},{:.2},{:.2}",
        csv_field(&result.location),
        result.area_sqft,
        result.bhk,
        result.predicted_price_inr,
        result.predicted_price_lakhs,
        result.predicted_price_crores,
        result.price_per_sqft_inr,
        result.confidence_range.lower_lakhs,
        result.confidence_range.upper_lakhs,
    );
}

// ---------------------------------------------------------------------------
// homeval metadata
// ---------------------------------------------------------------------------

/// Print the backend's location choices and model info.
pub fn run_metadata(format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let client = ApiClient::from_config(&cfg);
    let meta = client
        .fetch_metadata()
        .with_context(|| format!("backend at {}", client.base_url()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&meta)?),
        OutputFormat::Csv => {
            println!("location");
            for location in &meta.locations {
                println!("{}", csv_field(location));
            }
        }
        OutputFormat::Table => print_metadata_table(&meta),
    }
    Ok(())
}

fn print_metadata_table(meta: &MetadataResponse) {
    println!("{}", "Model Metadata".bold().cyan());
    println!("{}", "=".repeat(40));
    println!("  {} {}", "Algorithm:".bold(), meta.algorithm);
    if let Some(r2) = meta.test_r2 {
        println!("  {} {:.2}", "Test R²:  ".bold(), r2);
    }
    if let Some(samples) = meta.training_samples {
        println!("  {} {}", "Samples:  ".bold(), format_number(samples));
    }
    let bhk: Vec<String> = meta.bhk_options.iter().map(u8::to_string).collect();
    println!("  {} {}", "BHK:      ".bold(), bhk.join(", "));
    println!();
    println!("{}", "Locations".bold().cyan());
    for (i, location) in meta.locations.iter().enumerate() {
        let marker = if i == 0 { " (default)" } else { "" };
        println!("  {location}{}", marker.dimmed());
    }
}

// ---------------------------------------------------------------------------
// homeval market
// ---------------------------------------------------------------------------

/// Mount the dashboard and print it.
pub fn run_market(format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let client = ApiClient::from_config(&cfg);
    let mut dashboard = Dashboard::from_config(&cfg.dashboard);

    if let DashboardState::Failed { message } = dashboard.mount(&client) {
        anyhow::bail!("market statistics unavailable: {message}");
    }

    match format {
        OutputFormat::Json => {
            let stats = dashboard.stats().context("dashboard has no statistics")?;
            println!("{}", serde_json::to_string_pretty(stats)?);
        }
        OutputFormat::Csv => {
            println!("location,avg_price_sqft,width_pct");
            for row in dashboard.rows() {
                println!(
                    "{},{:.0},{:.1}",
                    csv_field(&row.location),
                    row.avg_price_sqft,
                    row.width_pct
                );
            }
        }
        OutputFormat::Table => print_dashboard_table(&dashboard),
    }
    Ok(())
}

fn print_dashboard_table(dashboard: &Dashboard) {
    println!("{}", "Market Intelligence".bold().cyan());
    println!("{}", "=".repeat(60));
    for tile in dashboard.tiles() {
        println!(
            "  {:<18} {:>12}  {}",
            tile.label,
            tile.value,
            tile.caption.dimmed()
        );
    }
    println!();

    let rows = dashboard.rows();
    if rows.is_empty() {
        println!("  {}", "No per-location statistics available.".yellow());
        return;
    }

    println!(
        "{}",
        format!(
            "Average price per sq.ft (bar = ₹{} ceiling)",
            format_number(dashboard.price_ceiling_sqft() as u64)
        )
        .bold()
        .cyan()
    );
    for row in rows {
        println!(
            "  {:<16} {} {:>9}",
            truncate(&row.location, 16),
            render_bar(row.width_pct, BAR_CELLS).yellow(),
            format_inr(row.avg_price_sqft)
        );
    }
}

/// Render a proportional bar of `cells` terminal cells.
fn render_bar(width_pct: f64, cells: usize) -> String {
    let filled = ((width_pct / 100.0) * cells as f64).round() as usize;
    let filled = filled.min(cells);
    format!("{}{}", "█".repeat(filled), "░".repeat(cells - filled))
}

// ---------------------------------------------------------------------------
// homeval health
// ---------------------------------------------------------------------------

/// Check backend reachability, config files, and the request log.
pub fn run_health() -> Result<()> {
    println!("{}", "homeval Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.homeval/config.toml found"
        } else {
            "not found (run `homeval config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".homeval.toml found"
        } else {
            "none (optional)"
        },
    );

    let cfg = config::load();
    let client = ApiClient::from_config(&cfg);
    match client.fetch_health() {
        Ok(health) => {
            print_health_item(
                "Backend",
                health.status == "ok",
                &format!("{} at {}", health.status, client.base_url()),
            );
            print_health_item(
                "Model",
                health.model_loaded,
                &if health.model_loaded {
                    format!("loaded (v{})", health.model_version)
                } else {
                    "not loaded".to_string()
                },
            );
        }
        Err(e) => print_health_item("Backend", false, &e.user_message()),
    }

    let log = RequestLog::from_config(&cfg.logging);
    match log.path() {
        Some(path) if path.exists() => print_health_item(
            "Request log",
            true,
            &format!("{} entries", log.read_all().len()),
        ),
        Some(_) => print_health_item("Request log", true, "no log file yet"),
        None => print_health_item("Request log", true, "disabled"),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// homeval requests
// ---------------------------------------------------------------------------

/// Summarize outbound calls from the request log.
pub fn run_requests(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let cfg = config::load();
    let log = RequestLog::from_config(&cfg.logging);
    let report = reporter::summarize(&log.read_since_days(days));

    if report.total_calls == 0 {
        println!(
            "{}",
            "No requests logged yet. Run `homeval predict` or `homeval market` first.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_requests_json(&report)?,
        OutputFormat::Csv => print_requests_csv(&report),
        OutputFormat::Table => print_requests_table(&report),
    }
    Ok(())
}

fn print_requests_table(report: &RequestReport) {
    println!("{}", "Backend Requests".bold().cyan());
    println!("{}", "=".repeat(60));
    println!(
        "  {} {}   {} {}",
        "Calls:".bold(),
        report.total_calls,
        "Failures:".bold(),
        report.total_failures
    );
    println!();
    println!(
        "  {:<14} {:>6} {:>9} {:>9} {:>9}  Last failure",
        "Endpoint", "Calls", "Failed %", "Avg ms", "Max ms"
    );
    println!("  {}", "-".repeat(58));
    for (i, e) in report.endpoints.iter().enumerate() {
        let line = format!(
            "  {:<14} {:>6} {:>8.1}% {:>9} {:>9}  {}",
            e.endpoint,
            e.calls,
            e.failure_pct(),
            e.avg_latency_ms,
            e.max_latency_ms,
            e.last_failure.as_deref().unwrap_or("-"),
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_requests_json(report: &RequestReport) -> Result<()> {
    let value = serde_json::json!({
        "total_calls": report.total_calls,
        "total_failures": report.total_failures,
        "endpoints": report.endpoints.iter().map(|e| serde_json::json!({
            "endpoint": e.endpoint,
            "calls": e.calls,
            "failures": e.failures,
            "avg_latency_ms": e.avg_latency_ms,
            "max_latency_ms": e.max_latency_ms,
            "last_failure": e.last_failure,
        })).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_requests_csv(report: &RequestReport) {
    println!("endpoint,calls,failures,avg_latency_ms,max_latency_ms");
    for e in &report.endpoints {
        println!(
            "{},{},{},{},{}",
            e.endpoint, e.calls, e.failures, e.avg_latency_ms, e.max_latency_ms
        );
    }
}

// ---------------------------------------------------------------------------
// homeval config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective homeval Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.homeval/config.toml", global_exists);
    print_source(".homeval.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "HOMEVAL_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.homeval/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Quote a CSV field when it contains a separator or quote.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
