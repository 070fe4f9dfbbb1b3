//! Minimal driver: `cargo run --example dining -- [philosophers] [delay_ms]`
//!
//! Ctrl-C requests a cooperative stop; the run also ends on its own once
//! every philosopher has starved.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use symposium::{Config, LogWriter, Table};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let mut args = env::args().skip(1);
    let philosophers: usize = match args.next() {
        Some(raw) => raw.parse()?,
        None => 5,
    };
    let delay_ms: u64 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 500,
    };

    let cfg = Config::new(philosophers, Duration::from_millis(delay_ms));
    let table = Table::new(cfg, vec![Arc::new(LogWriter)])?;
    table.start_simulation()?;

    let signals = {
        let table = Arc::clone(&table);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                table.stop_simulation();
            }
        })
    };

    table.join().await?;
    signals.abort();

    println!("simulation over: {} deaths recorded", table.deaths().len());
    Ok(())
}
