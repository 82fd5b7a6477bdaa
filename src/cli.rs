use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cropcast", version, about = "Crop yield prediction TUI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Validate config and test connections
    Check,
    /// Run one prediction and print the analysis
    Predict(PredictArgs),
    /// List, export or prune the prediction history
    History(HistoryArgs),
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    #[arg(long)]
    pub year: String,

    /// Average rainfall, mm/year
    #[arg(long, allow_hyphen_values = true)]
    pub rainfall: String,

    /// Pesticide use, tonnes
    #[arg(long, allow_hyphen_values = true)]
    pub pesticides: String,

    /// Average temperature, °C
    #[arg(long, allow_hyphen_values = true)]
    pub avg_temp: String,

    #[arg(long)]
    pub country: String,

    /// Crop item, e.g. "Rice, paddy"
    #[arg(long)]
    pub item: String,

    /// Current relative humidity, percent
    #[arg(long, conflicts_with = "live_weather")]
    pub humidity: Option<u8>,

    /// Current temperature, °C
    #[arg(long, allow_hyphen_values = true, requires = "humidity")]
    pub weather_temp: Option<f64>,

    /// Rain over the last hour, mm
    #[arg(long, requires = "humidity")]
    pub weather_rain: Option<f64>,

    /// Fetch current weather for the configured location
    #[arg(long)]
    pub live_weather: bool,

    /// Do not record this prediction in the history log
    #[arg(long)]
    pub no_history: bool,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Write the log as CSV
    #[arg(long, value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// Write the log as a printable HTML report
    #[arg(long, value_name = "PATH")]
    pub export_html: Option<PathBuf>,

    /// Delete a single record by id
    #[arg(long, value_name = "ID")]
    pub delete: Option<String>,

    /// Delete every record
    #[arg(long, conflicts_with = "delete")]
    pub clear: bool,
}
