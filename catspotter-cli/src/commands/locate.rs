//! `catspotter locate` - one-shot "use my location".
//!
//! Without flags this runs the same flow the map uses: permission pre-check,
//! then the mobile cascade or a single desktop request depending on the
//! configured environment. Any strategy flag switches to exactly one request
//! built from `[acquisition]` with the flags applied on top.

use std::time::Duration;

use catspotter::location::{locate_user, AcquisitionStrategy, LocationFailure, StrategyOverrides};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::reading_lines;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `catspotter locate`.
#[derive(Debug, Default, Args)]
pub struct LocateArgs {
    /// Make exactly one request with the configured strategy
    #[arg(long)]
    pub single: bool,

    /// Accept coarse positioning (2-D fix); implies --single
    #[arg(long)]
    pub low_accuracy: bool,

    /// Request deadline in milliseconds; implies --single
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,

    /// Oldest cached fix to accept, in milliseconds; implies --single
    #[arg(long, value_name = "MS")]
    pub max_age_ms: Option<u64>,
}

impl LocateArgs {
    fn is_single(&self) -> bool {
        self.single || self.low_accuracy || self.timeout_ms.is_some() || self.max_age_ms.is_some()
    }

    fn overrides(&self) -> StrategyOverrides {
        StrategyOverrides {
            high_accuracy: self.low_accuracy.then_some(false),
            timeout: self.timeout_ms.map(Duration::from_millis),
            max_cached_age: self.max_age_ms.map(Duration::from_millis),
        }
    }

    /// Strategy for a single request over the configured base.
    fn strategy(&self, base: AcquisitionStrategy) -> AcquisitionStrategy {
        self.overrides().resolve_over(base)
    }
}

/// Run `catspotter locate`.
pub async fn run(runner: &CliRunner, args: LocateArgs) -> Result<(), CliError> {
    let acquisition = runner.acquisition();

    if !args.is_single() {
        let located = tokio::select! {
            result = locate_user(&acquisition) => result?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                return Ok(());
            }
        };

        println!("Located:");
        for line in reading_lines(&located.reading) {
            println!("  {}", line);
        }
        println!("{}", located.badge());
        if let Some(advisory) = located.advisory {
            println!();
            println!("{}", advisory);
        }
        return Ok(());
    }

    let strategy = args.strategy(runner.config().acquisition.strategy());
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let result = acquisition
        .acquire_single_cancellable(strategy, &cancel)
        .await;
    watcher.abort();

    let reading = result.map_err(|error| LocationFailure {
        error,
        message: acquisition.describe_error(error),
    })?;

    println!("Located (single request):");
    for line in reading_lines(&reading) {
        println!("  {}", line);
    }
    if !reading.is_acceptable() {
        println!();
        println!("{}", catspotter::location::LOW_ACCURACY_ADVISORY);
    }

    Ok(())
}
