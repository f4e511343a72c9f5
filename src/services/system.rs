//! Host tool checks

use tokio::process::Command;
use tracing::info;

/// Check that an external program can be executed on this host
pub async fn check_command_available(program: &str) -> Result<(), String> {
    Command::new(program)
        .arg("--version")
        .output()
        .await
        .map_err(|_| format!("{} is not available. Alarms will be silent.", program))?;

    info!("{} is available", program);
    Ok(())
}
