//! Status Command Handler
//!
//! Probes the tape device with `mt status` and reports accessibility,
//! the same check the validator applies before an extraction run.

use crate::commands::extract::{EXIT_DEVICE_INACCESSIBLE, EXIT_SUCCESS};
use crate::config::Defaults;
use crate::error::Result;
use crate::exec::{CommandRunner, SystemCommandRunner};
use crate::logger;
use tracing::info;

pub async fn execute(device: Option<String>, verbose: bool) -> Result<i32> {
    logger::init(verbose, None)?;

    let defaults = Defaults::load()?;
    let device = device.unwrap_or(defaults.device);
    info!("Checking tape device: {}", device);

    let probe_device = device.clone();
    let output = tokio::task::spawn_blocking(move || {
        SystemCommandRunner.execute(
            "mt",
            &[
                "-f".to_string(),
                probe_device,
                "status".to_string(),
            ],
        )
    })
    .await
    .map_err(|e| anyhow::anyhow!("status probe failed: {}", e))?;

    if output.success() {
        println!("Device {} is accessible", device);
        if !output.stdout.is_empty() {
            println!("{}", output.stdout.trim_end());
        }
        Ok(EXIT_SUCCESS)
    } else {
        eprintln!(
            "ERROR: cannot access tape device {}. Check that the device exists and that \
             the current user has permission to use it",
            device
        );
        Ok(EXIT_DEVICE_INACCESSIBLE)
    }
}
