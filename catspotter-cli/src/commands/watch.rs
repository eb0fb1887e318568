//! `catspotter watch` - continuous position updates.
//!
//! Prints every update and error until Ctrl-C or until `--count` updates
//! have arrived, then clears the watch.

use catspotter::location::{AcquisitionError, LocationFailure, PositionReading, WATCH_STRATEGY};
use clap::Args;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::reading_lines;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `catspotter watch`.
#[derive(Debug, Default, Args)]
pub struct WatchArgs {
    /// Stop after this many position updates
    #[arg(long, value_name = "N")]
    pub count: Option<usize>,
}

enum WatchEvent {
    Update(PositionReading),
    Error(AcquisitionError),
}

/// Run `catspotter watch`.
pub async fn run(runner: &CliRunner, args: WatchArgs) -> Result<(), CliError> {
    let acquisition = runner.acquisition();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let error_tx = tx.clone();

    let handle = acquisition
        .watch_position(
            move |reading| {
                let _ = tx.send(WatchEvent::Update(reading));
            },
            move |error| {
                let _ = error_tx.send(WatchEvent::Error(error));
            },
            WATCH_STRATEGY,
        )
        .map_err(|error| LocationFailure {
            error,
            message: acquisition.describe_error(error),
        })?;

    info!(subscription = %handle.id(), "Watching position");
    println!("Watching position (Ctrl-C to stop)...");

    let mut updates = 0usize;
    loop {
        let event = tokio::select! {
            event = rx.recv() => event,
            _ = tokio::signal::ctrl_c() => None,
        };

        match event {
            Some(WatchEvent::Update(reading)) => {
                updates += 1;
                println!();
                println!("Update {}:", updates);
                for line in reading_lines(&reading) {
                    println!("  {}", line);
                }
                if args.count.is_some_and(|count| updates >= count) {
                    break;
                }
            }
            Some(WatchEvent::Error(error)) => {
                warn!(%error, "Watch error");
                println!();
                println!("! {}", acquisition.describe_error(error));
            }
            None => break,
        }
    }

    acquisition.clear_watch(handle);
    info!(updates, "Watch stopped");
    println!();
    println!("Stopped after {} update(s).", updates);

    Ok(())
}
