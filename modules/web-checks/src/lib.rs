//! WAF fingerprinting (wafw00f) and security header checks (shcheck).
//!
//! Both tools are classified the same way: output containing
//! [`NOT_DETECTED`] is [`Verdict::Clear`], anything else is [`Verdict::Flagged`].

use intro_core::exec::{capture, ToolCommand};
use intro_core::{ReconContext, ToolError, OK_TARGET};
use std::path::Path;
use tracing::{error, info, warn};

pub const NOT_DETECTED: &str = "not detected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Flagged,
    Clear,
}

pub fn classify(output: &str) -> Verdict {
    if output.contains(NOT_DETECTED) { Verdict::Clear } else { Verdict::Flagged }
}

pub fn waf_command(ctx: &ReconContext) -> ToolCommand {
    ToolCommand::new(&ctx.tools.wafw00f).arg(&ctx.url)
}

pub fn header_command(ctx: &ReconContext) -> ToolCommand {
    ToolCommand::new(&ctx.tools.shcheck).arg("-d").arg(&ctx.url)
}

/// Run wafw00f against the normalized URL. Returns `None` when the tool or the
/// result file failed; the failure has already been logged.
pub async fn check_waf(ctx: &ReconContext) -> Option<Verdict> {
    info!("Running: wafw00f to check for WAF...");
    check_waf_with(&waf_command(ctx), &ctx.result_path("wafw00f")).await
}

pub async fn check_waf_with(cmd: &ToolCommand, dest: &Path) -> Option<Verdict> {
    match waf_inner(cmd, dest).await {
        Ok((verdict, out)) => {
            match verdict {
                Verdict::Clear => info!(target: OK_TARGET, "No WAF detected."),
                Verdict::Flagged => warn!("WAF Detected:\n{}", out.trim()),
            }
            Some(verdict)
        }
        Err(e @ ToolError::Io { .. }) => {
            error!("File operation error: {}", e);
            None
        }
        Err(e) => {
            error!("Error while running wafw00f: {}", e);
            None
        }
    }
}

async fn waf_inner(cmd: &ToolCommand, dest: &Path) -> Result<(Verdict, String), ToolError> {
    // The result file exists (empty) even if wafw00f fails.
    write_result(dest, "")?;
    let out = capture(cmd, None).await?;
    write_result(dest, &out)?;
    Ok((classify(&out), out))
}

/// Run shcheck against the normalized URL. The result file is written only
/// when the tool succeeds.
pub async fn check_headers(ctx: &ReconContext) -> Option<Verdict> {
    info!("Running: shcheck.py to check for security headers...");
    check_headers_with(&header_command(ctx), &ctx.result_path("shcheck")).await
}

pub async fn check_headers_with(cmd: &ToolCommand, dest: &Path) -> Option<Verdict> {
    let out = match capture(cmd, None).await {
        Ok(out) => out,
        Err(e) => {
            error!("Error while running shcheck.py: {}", e);
            return None;
        }
    };
    if let Err(e) = write_result(dest, &out) {
        error!("File operation error: {}", e);
        return None;
    }
    let verdict = classify(&out);
    // Labels follow the established output: a "not detected" marker is reported
    // as a header issue, even though the marker more plausibly means none was found.
    match verdict {
        Verdict::Clear => info!(target: OK_TARGET, "Header issue detected."),
        Verdict::Flagged => warn!("Security headers:\n{}", out.trim()),
    }
    Some(verdict)
}

fn write_result(dest: &Path, contents: &str) -> Result<(), ToolError> {
    std::fs::write(dest, contents).map_err(|source| ToolError::Io { path: dest.to_path_buf(), source })
}
