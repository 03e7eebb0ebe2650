use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tradeplan-sync")]
#[command(about = "Apply a CSV trade plan to the Toolbox SQLite database")]
pub struct Args {
    /// Trade plan CSV path (overrides config)
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Toolbox database path (overrides config)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Override the Qty column for every row
    #[arg(long)]
    pub qty: Option<i64>,

    /// Redistribute quantities by the "PnL Rank" column
    #[arg(long)]
    pub distribution: bool,

    /// Create missing templates/schedules/conditions, keeping existing rows
    #[arg(long)]
    pub initialize: bool,

    /// Wipe and rebuild the grid for N plans (N defaults to 1)
    #[arg(long, value_name = "PLANS", num_args = 0..=1, default_missing_value = "1")]
    pub force_initialize: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}
