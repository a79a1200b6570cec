//! Template-based vulnerability scan via nuclei.

use intro_core::exec::{status, ToolCommand};
use intro_core::ReconContext;
use tracing::{error, info};

pub fn nuclei_command(ctx: &ReconContext) -> ToolCommand {
    ToolCommand::new(&ctx.tools.nuclei)
        .arg("-u")
        .arg(&ctx.url)
        .arg("-silent")
        .arg("-o")
        .arg(ctx.result_path("nuclei").to_string_lossy())
}

pub async fn scan_vulns(ctx: &ReconContext) -> bool {
    info!("Running: nuclei for vulnerability detection...");
    match status(&nuclei_command(ctx)).await {
        Ok(()) => {
            info!("Nuclei results saved to {}", ctx.result_path("nuclei").display());
            true
        }
        Err(e) => {
            error!("Error while running nuclei: {}", e);
            false
        }
    }
}
