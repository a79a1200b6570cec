//! Service/version port scan via nmap. nmap writes the result file itself (`-oN`).

use intro_core::exec::{status, ToolCommand};
use intro_core::ReconContext;
use std::num::ParseIntError;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortSpecError {
    #[error("invalid port number `{0}`: {1}")]
    Number(String, ParseIntError),
    #[error("invalid port: {0}")]
    Zero(String),
    #[error("invalid port range: {0}")]
    Range(String),
}

/// Which ports nmap should cover.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PortSelection {
    /// nmap's fast set (`-F`).
    #[default]
    Fast,
    Explicit(Vec<u16>),
}

/// Parse a comma-separated list of ports/ranges (e.g., "22,80,443", "1-1024,8080").
pub fn parse_ports(spec: &str) -> Result<Vec<u16>, PortSpecError> {
    let num = |s: &str| s.parse::<u16>().map_err(|e| PortSpecError::Number(s.to_string(), e));
    let mut ports = Vec::new();
    for part in spec.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if let Some((start, end)) = part.split_once('-') {
            let s = num(start.trim())?;
            let e = num(end.trim())?;
            if s == 0 || e == 0 || s > e {
                return Err(PortSpecError::Range(part.to_string()));
            }
            ports.extend(s..=e);
        } else {
            let p = num(part)?;
            if p == 0 {
                return Err(PortSpecError::Zero(part.to_string()));
            }
            ports.push(p);
        }
    }
    ports.sort_unstable();
    ports.dedup();
    Ok(ports)
}

/// Render sorted, deduplicated ports in nmap's `-p` syntax, collapsing runs into ranges.
pub fn format_ports(ports: &[u16]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut i = 0;
    while i < ports.len() {
        let start = ports[i];
        let mut end = start;
        while i + 1 < ports.len() && ports[i + 1] == end.saturating_add(1) {
            end = ports[i + 1];
            i += 1;
        }
        if start == end { parts.push(start.to_string()); } else { parts.push(format!("{}-{}", start, end)); }
        i += 1;
    }
    parts.join(",")
}

pub fn nmap_command(ctx: &ReconContext, ports: &PortSelection) -> ToolCommand {
    let out = ctx.result_path("nmap");
    let cmd = ToolCommand::new(&ctx.tools.nmap)
        .arg(ctx.host())
        .arg("-oN")
        .arg(out.to_string_lossy());
    let cmd = match ports {
        PortSelection::Fast => cmd.arg("-F"),
        PortSelection::Explicit(list) if list.is_empty() => cmd.arg("-F"),
        PortSelection::Explicit(list) => cmd.arg("-p").arg(format_ports(list)),
    };
    cmd.arg("-sV")
}

/// Run the scan; failures are logged and reported as `false`.
pub async fn scan_ports(ctx: &ReconContext, ports: &PortSelection) -> bool {
    info!("Scanning ports using Nmap...");
    let cmd = nmap_command(ctx, ports);
    match status(&cmd).await {
        Ok(()) => {
            info!("Nmap results saved to {}", ctx.result_path("nmap").display());
            true
        }
        Err(e) => {
            error!("Error while running Nmap: {}", e);
            false
        }
    }
}
