//! Connects to the first RF Explorer spectrum analyzer found and
//! prints incoming sweeps.
//!
//! Run with `RUST_LOG=rfe_driver=debug` to watch the reader loop.

use anyhow::Context;
use rfe_driver::SpectrumAnalyzer;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let rfe = SpectrumAnalyzer::connect().context("no RF Explorer spectrum analyzer found")?;

    println!("Port:       {}", rfe.port_name());
    println!("Firmware:   {}", rfe.firmware_version());
    if let Ok(serial_number) = rfe.serial_number() {
        println!("Serial:     {serial_number}");
    }
    if let Some(config) = rfe.config() {
        println!("Sweeping:   {} - {}", config.start, config.stop);
    }

    for _ in 0..10 {
        let sweep = rfe.wait_for_next_sweep()?;
        let peak = sweep
            .amplitudes_dbm()
            .iter()
            .cloned()
            .fold(f32::NEG_INFINITY, f32::max);
        println!("{} points, peak {peak:.1} dBm", sweep.len());
    }

    Ok(())
}
