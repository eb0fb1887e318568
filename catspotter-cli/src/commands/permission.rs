//! `catspotter permission` - location permission pre-check.

use catspotter::location::{PermissionProbe, PermissionState};
use clap::Args;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `catspotter permission`.
#[derive(Debug, Default, Args)]
pub struct PermissionArgs {
    /// If the state cannot be queried, make a short position request to find
    /// out (may trigger an OS prompt)
    #[arg(long)]
    pub provoke: bool,
}

impl PermissionArgs {
    fn probe(&self, configured: PermissionProbe) -> PermissionProbe {
        if self.provoke {
            PermissionProbe::ProvokeRequest
        } else {
            configured
        }
    }
}

/// Run `catspotter permission`.
pub async fn run(runner: &CliRunner, args: PermissionArgs) -> Result<(), CliError> {
    let acquisition = runner.acquisition();
    let probe = args.probe(runner.config().permission.probe());

    let state = acquisition.query_permission_state(probe).await;
    println!("Location permission: {}", state);
    if state == PermissionState::Unknown && probe == PermissionProbe::IntrospectOnly {
        println!("(run with --provoke to test with a short position request)");
    }

    Ok(())
}
