//! Streams sweeps through a registered callback for five seconds.

use std::time::Duration;

use anyhow::Context;
use rfe_driver::SpectrumAnalyzer;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let rfe = SpectrumAnalyzer::connect().context("no RF Explorer spectrum analyzer found")?;
    println!("connected on {}", rfe.port_name());

    rfe.set_sweep_callback(|sweep| {
        println!("sweep with {} points", sweep.len());
    });

    std::thread::sleep(Duration::from_secs(5));
    rfe.remove_sweep_callback();

    Ok(())
}
