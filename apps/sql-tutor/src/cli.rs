use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the fixture and run every subquery scenario
    RunDemo(RunDemoArgs),

    /// List the registered scenarios
    Scenarios {
        /// Print each scenario's SQL and expected rows
        #[arg(long)]
        show_sql: bool,
    },
}

#[derive(Args)]
pub struct RunDemoArgs {
    /// Query interface adapter
    #[arg(long, default_value = "sqlite")]
    pub dialect: String,

    /// Database file (in-memory when omitted)
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Write a JSON pass/fail report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Run only the named scenarios (repeatable)
    #[arg(long)]
    pub scenario: Vec<String>,

    /// Per-query timeout in milliseconds (0 = unbounded)
    #[arg(long, default_value_t = 5000)]
    pub query_timeout_ms: u64,

    /// Whole-run timeout in milliseconds (0 = unbounded)
    #[arg(long, default_value_t = 30000)]
    pub run_timeout_ms: u64,

    /// Absolute tolerance for numeric comparisons
    #[arg(long, default_value_t = 1e-6)]
    pub tolerance: f64,
}
