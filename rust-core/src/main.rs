use anyhow::{Context, Result};
use band_scan::args::Cli;
use band_scan::scan::run_scan;
use band_scan::signal;
use clap::Parser;
use std::process;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.to_scan_config();
    config.validate().context("Invalid scan configuration")?;

    println!("type:     {}", cli.format);
    println!("file:     {}", cli.signal_file.display());
    println!("Fs:       {:.6} Hz", config.sample_rate);
    println!("order:    {}", config.filter_order);
    println!("bands:    {}", config.num_bands);

    let samples = signal::load(cli.format, &cli.signal_file)
        .with_context(|| format!("Unable to load or map {}", cli.signal_file.display()))?;

    let outcome = run_scan(&config, samples).context("Band scan failed")?;

    log::info!(
        "Removed DC {:.6} in {:?}; filtering took {:?} on {} workers, analysis {:?}",
        outcome.dc_removed,
        outcome.timing.preprocess,
        outcome.timing.filtering,
        outcome.workers.started(),
        outcome.timing.analysis
    );
    println!("{}", outcome.verdict);

    Ok(())
}
