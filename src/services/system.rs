//! System probes run at startup

use tokio::process::Command;
use tracing::info;

/// Check if the configured audio player can be executed
pub async fn check_player_available(program: &str) -> Result<(), String> {
    Command::new(program)
        .arg("--version")
        .output()
        .await
        .map_err(|e| format!("{} is not available: {}", program, e))?;

    info!("{} is available", program);
    Ok(())
}
