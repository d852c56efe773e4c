use anyhow::Result;
use clap::{Parser, Subcommand};

use homeval::cli;
use homeval::predictor::FormField;
use homeval::web;

#[derive(Debug, Parser)]
#[command(name = "homeval")]
#[command(about = "Property price estimates and market statistics from a prediction backend")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Estimate the price of one property
    Predict {
        /// Location cluster (default: first location the backend lists)
        #[arg(long)]
        location: Option<String>,
        /// Carpet area in square feet
        #[arg(long)]
        area: Option<f64>,
        /// Bedroom count
        #[arg(long)]
        bhk: Option<u8>,
        /// Bathroom count
        #[arg(long)]
        bathrooms: Option<f64>,
        /// Floor the unit is on
        #[arg(long, allow_hyphen_values = true)]
        floor: Option<i32>,
        /// Floors in the building
        #[arg(long)]
        total_floors: Option<i32>,
        /// Age of the property in years
        #[arg(long)]
        age: Option<u32>,
        /// Unit has no reserved parking
        #[arg(long)]
        no_parking: bool,
        /// Building has no lift
        #[arg(long)]
        no_lift: bool,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List locations and model information from the backend
    Metadata {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show the market statistics dashboard
    Market {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check system health: backend, config, request log
    Health,
    /// Launch the web UI
    Web {
        /// Address to bind (default: from config, 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Summarize logged backend requests
    Requests {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default config file to ~/.homeval/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `api.timeout_ms 5000`
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Predict {
            location,
            area,
            bhk,
            bathrooms,
            floor,
            total_floors,
            age,
            no_parking,
            no_lift,
            format,
        } => {
            let mut edits: Vec<(FormField, String)> = Vec::new();
            if let Some(v) = location {
                edits.push((FormField::Location, v));
            }
            if let Some(v) = area {
                edits.push((FormField::AreaSqft, v.to_string()));
            }
            if let Some(v) = bhk {
                edits.push((FormField::Bhk, v.to_string()));
            }
            if let Some(v) = bathrooms {
                edits.push((FormField::Bathrooms, v.to_string()));
            }
            if let Some(v) = floor {
                edits.push((FormField::Floor, v.to_string()));
            }
            if let Some(v) = total_floors {
                edits.push((FormField::TotalFloors, v.to_string()));
            }
            if let Some(v) = age {
                edits.push((FormField::AgeOfProperty, v.to_string()));
            }
            if no_parking {
                edits.push((FormField::Parking, "false".to_string()));
            }
            if no_lift {
                edits.push((FormField::Lift, "false".to_string()));
            }
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_predict(&edits, fmt)
        }
        Commands::Metadata { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_metadata(fmt)
        }
        Commands::Market { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_market(fmt)
        }
        Commands::Health => cli::run_health(),
        Commands::Web { addr } => web::serve(addr.as_deref()),
        Commands::Requests { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_requests(fmt, days)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
