//! CLI for the SQL subquery tutorial.
//!
//! Provides commands for:
//! - Loading the tutorial fixture and running every scenario (`run-demo`)
//! - Listing the registered scenarios and their SQL (`scenarios`)

mod cli;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::Level;
use tutor_core::engine::format_row;
use tutor_core::report::{RunReport, ScenarioStatus};
use tutor_core::scenario::ScenarioRegistry;
use tutor_core::{DemoRunner, Dialect, RunConfig};

use cli::{Cli, Commands, RunDemoArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::RunDemo(args) => run_demo(args),
        Commands::Scenarios { show_sql } => {
            list_scenarios(show_sql);
            Ok(0)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run_demo(args: RunDemoArgs) -> anyhow::Result<u8> {
    let dialect: Dialect = args.dialect.parse()?;
    let config = RunConfig {
        dialect,
        database: args.database,
        query_timeout_ms: args.query_timeout_ms,
        run_timeout_ms: args.run_timeout_ms,
        tolerance: args.tolerance,
    };

    let mut registry = ScenarioRegistry::standard();
    if !args.scenario.is_empty() {
        registry = registry.select(args.scenario.as_slice())?;
    }

    tracing::info!(
        "Running {} scenarios on {} (query timeout {} ms, run timeout {} ms)",
        registry.len(),
        config.dialect,
        config.query_timeout_ms,
        config.run_timeout_ms
    );
    let report = DemoRunner::new(config).with_registry(registry).execute();
    print_report(&report);

    if let Some(path) = &args.report {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    Ok(report.exit_code() as u8)
}

fn print_report(report: &RunReport) {
    if let Some(fatal) = &report.fatal {
        println!("Fixture could not be loaded: {}", fatal);
        return;
    }

    for scenario in &report.scenarios {
        println!(
            "[{:>5}] {:<28} {:>4} ms  {}",
            scenario.status.label(),
            scenario.name,
            scenario.duration_ms,
            scenario.pattern
        );
        match &scenario.status {
            ScenarioStatus::Passed => {}
            ScenarioStatus::Failed(failure) => {
                println!("        {}", failure);
                for line in failure.describe().lines() {
                    println!("        {}", line);
                }
            }
            ScenarioStatus::Errored { error } => println!("        {}", error),
            ScenarioStatus::Skipped { reason } => println!("        {}", reason),
        }
    }

    if report.fatal.is_none() {
        if !report.isolation_verified() {
            println!("Dataset isolation could not be verified");
        } else if !report.dataset_unchanged() {
            println!("Dataset changed while scenarios ran");
        }
    }

    let s = &report.summary;
    println!("{}", "-".repeat(60));
    println!(
        "{} scenarios: {} passed, {} failed, {} errored, {} skipped ({} ms)",
        s.total, s.passed, s.failed, s.errored, s.skipped, report.duration_ms
    );
}

fn list_scenarios(show_sql: bool) {
    let registry = ScenarioRegistry::standard();
    for (i, scenario) in registry.iter().enumerate() {
        println!("{}. {} ({})", i + 1, scenario.name, scenario.pattern);
        println!("   {}", scenario.description);
        if show_sql {
            println!();
            for line in scenario.query.lines() {
                println!("   {}", line.trim_end());
            }
            println!();
            println!("   Expected ({}):", scenario.columns.join(", "));
            for row in &scenario.expected {
                println!("   {}", format_row(row));
            }
            println!();
        }
    }
}
