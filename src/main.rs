use anyhow::Context;
use clap::Parser;
use colored::*;
use gauge_boundary::BoundaryError;
use gauge_boundary::cli::{Args, setup_logging};
use gauge_boundary::models::ProcessingStats;
use gauge_boundary::processor::BoundaryProcessor;
use gauge_boundary::progress::{Outcome, Spinner};
use std::process;

fn main() {
    let args = Args::parse();
    setup_logging(&args);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(run(&args)) {
        Ok(stats) => {
            if args.show_progress() {
                print_summary(&stats);
            }
            process::exit(0);
        }
        Err(error) => {
            let typed = error.downcast_ref::<BoundaryError>();
            let category = typed.map_or("internal", BoundaryError::category);
            let code = typed.map_or(1, BoundaryError::exit_code);

            eprintln!("{} [{}]: {:#}", "Error".bright_red().bold(), category, error);
            process::exit(code);
        }
    }
}

/// Load the configuration and run the pipeline behind a spinner
async fn run(args: &Args) -> anyhow::Result<ProcessingStats> {
    let (config, previous_output_removed) = args.load_config()?;
    let processor = BoundaryProcessor::new(config)?;

    let spinner = Spinner::start("Working", args.show_progress());
    let result = tokio::task::spawn_blocking(move || processor.process())
        .await
        .context("Boundary pipeline task did not complete")?;

    let outcome = if result.is_ok() {
        Outcome::Done
    } else {
        Outcome::Failed
    };
    spinner.finish(outcome).await;

    let mut stats = result?;
    stats.previous_output_removed |= previous_output_removed;
    Ok(stats)
}

fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Boundary File Summary".bright_green().bold());
    if stats.previous_output_removed {
        println!("  {}", "Previous output file deleted".bright_yellow());
    }
    println!(
        "  {} {}",
        "Stations:".bright_cyan(),
        stats.stations_processed.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Samples read:".bright_cyan(),
        stats.samples_read.to_string().bright_white()
    );
    println!(
        "  {} {} (from {})",
        "Output rows:".bright_cyan(),
        stats.output_rows.to_string().bright_white().bold(),
        stats.reference_station.bright_white()
    );
    println!(
        "  {} {}",
        "Output:".bright_cyan(),
        stats.output_path.display()
    );
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
}
