use anyhow::Context;
use clap::Parser;
use colored::*;
use std::process;
use thermo_pipeline::cli::{Args, setup_logging};
use thermo_pipeline::processor::{BatchProcessor, print_summary};
use thermo_pipeline::PipelineError;

fn main() {
    let args = Args::parse();
    setup_logging(&args);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let shutdown_signal = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");
        };

        tokio::select! {
            result = run(&args) => result,
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(anyhow::Error::from(PipelineError::Interrupted {
                    reason: "Processing interrupted by user".to_string(),
                }))
            }
        }
    });

    if let Err(error) = result {
        eprintln!("{} {:#}", "Error:".bright_red().bold(), error);
        process::exit(1);
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.to_config();

    println!(
        "{}",
        "Starting sensor calibration batch".bright_green().bold()
    );
    println!("  {} {}", "Raw data:".bright_cyan(), config.raw_dir.display());
    println!(
        "  {} {} / {}",
        "Calibration:".bright_cyan(),
        config.calibration_low,
        config.calibration_high
    );
    println!("  {} {} °C", "Alert threshold:".bright_cyan(), config.threshold);

    let processor = BatchProcessor::new(config)
        .context("Invalid batch configuration")?
        .with_progress(args.show_progress());

    let result = processor
        .process()
        .await
        .context("Batch processing failed")?;

    print_summary(&result.summary);
    Ok(())
}
