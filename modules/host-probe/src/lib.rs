//! Host liveness probe via httprobe, bounded by a timeout.

use intro_core::exec::{capture, ToolCommand};
use intro_core::{ReconContext, ToolError};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// `httprobe -prefer-https`, with the bare target written to stdin.
pub fn probe_command(ctx: &ReconContext) -> ToolCommand {
    ToolCommand::new(&ctx.tools.httprobe)
        .arg("-prefer-https")
        .stdin(ctx.host())
}

/// Probe the target and return the prober's trimmed output. Callers treat
/// [`ToolError::Timeout`] as fatal; every other error is recoverable.
pub async fn probe_host(ctx: &ReconContext, limit: Duration) -> Result<String, ToolError> {
    info!("Running: httprobe to check host");
    probe_with(&probe_command(ctx), limit).await
}

pub async fn probe_with(cmd: &ToolCommand, limit: Duration) -> Result<String, ToolError> {
    let out = capture(cmd, Some(limit)).await?;
    let host = out.trim().to_string();
    info!("Host resolved to: {}", host);
    Ok(host)
}
