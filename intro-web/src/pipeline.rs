//! The fixed recon sequence: probe, WAF, headers, ports, subdomains, vulns.

use crate::config::Settings;
use intro_core::exec::ToolCommand;
use intro_core::{ReconContext, ToolError};
use subdomains::EnumerationReport;
use tracing::{error, info, warn};
use web_checks::Verdict;

/// Per-phase outcomes. `None`/`false` means the phase failed and was logged.
#[derive(Debug)]
pub struct RunSummary {
    pub host: Option<String>,
    pub waf: Option<Verdict>,
    pub headers: Option<Verdict>,
    pub ports: bool,
    pub subdomains: EnumerationReport,
    pub vulns: bool,
}

impl RunSummary {
    pub const PHASES: usize = 6;

    pub fn failed_phases(&self) -> usize {
        let subdomains_ok =
            self.subdomains.outcomes.iter().all(|o| o.succeeded) && self.subdomains.combined.is_ok();
        [
            self.host.is_some(),
            self.waf.is_some(),
            self.headers.is_some(),
            self.ports,
            subdomains_ok,
            self.vulns,
        ]
        .iter()
        .filter(|ok| !**ok)
        .count()
    }
}

/// Run every phase in order. Only a host-probe timeout ends the run early,
/// returned as `Err`; all other failures are logged and recorded in the summary.
pub async fn run(ctx: &ReconContext, settings: &Settings) -> Result<RunSummary, ToolError> {
    run_with_probe(ctx, settings, &host_probe::probe_command(ctx)).await
}

async fn run_with_probe(
    ctx: &ReconContext,
    settings: &Settings,
    probe: &ToolCommand,
) -> Result<RunSummary, ToolError> {
    info!("Running: httprobe to check host");
    let host = match host_probe::probe_with(probe, settings.probe_timeout).await {
        Ok(h) => Some(h),
        Err(e) if e.is_timeout() => {
            error!("Command 'httprobe' timed out after {} seconds.", settings.probe_timeout.as_secs());
            return Err(e);
        }
        Err(e) => {
            warn!("Host probe failed: {}", e);
            None
        }
    };

    let waf = web_checks::check_waf(ctx).await;
    let headers = web_checks::check_headers(ctx).await;
    let ports = port_scan::scan_ports(ctx, &settings.ports).await;
    let subdomains = subdomains::enumerate(ctx).await;
    let vulns = vuln_scan::scan_vulns(ctx).await;

    Ok(RunSummary { host, waf, headers, ports, subdomains, vulns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use intro_core::ToolPaths;
    use port_scan::PortSelection;
    use std::path::PathBuf;
    use std::time::Duration;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("intro-web-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn settings(dir: &std::path::Path, tools: ToolPaths) -> Settings {
        Settings {
            out_dir: dir.to_path_buf(),
            probe_timeout: Duration::from_secs(5),
            ports: PortSelection::Fast,
            tools,
        }
    }

    fn missing_tools() -> ToolPaths {
        let n = |s: &str| format!("intro-web-missing-{}", s);
        ToolPaths {
            httprobe: n("httprobe"),
            wafw00f: n("wafw00f"),
            shcheck: n("shcheck"),
            nmap: n("nmap"),
            subfinder: n("subfinder"),
            assetfinder: n("assetfinder"),
            amass: n("amass"),
            nuclei: n("nuclei"),
        }
    }

    #[tokio::test]
    async fn every_phase_failing_still_completes() {
        let dir = scratch("all-fail");
        let s = settings(&dir, missing_tools());
        let ctx = ReconContext::new("example.com").with_out_dir(&dir).with_tools(s.tools.clone());
        let summary = run(&ctx, &s).await.unwrap();
        assert_eq!(summary.failed_phases(), RunSummary::PHASES);
        assert!(summary.host.is_none());
        // Wrapper-created files exist even though each tool failed, so the merge works.
        assert!(summary.subdomains.combined.is_ok());
        assert!(dir.join("wafw00f-results-example.com.txt").exists());
        assert!(dir.join("subfinder-results-example.com.txt").exists());
        assert!(dir.join("subdomains-results-example.com.txt").exists());
    }

    #[tokio::test]
    async fn probe_timeout_aborts_before_other_phases() {
        let dir = scratch("probe-timeout");
        let mut s = settings(&dir, missing_tools());
        s.probe_timeout = Duration::from_millis(200);
        let ctx = ReconContext::new("example.com").with_out_dir(&dir).with_tools(s.tools.clone());
        let _ = std::fs::remove_file(dir.join("wafw00f-results-example.com.txt"));
        let slow = ToolCommand::new("sh").arg("-c").arg("sleep 5").stdin(ctx.host());
        let err = run_with_probe(&ctx, &s, &slow).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(!dir.join("wafw00f-results-example.com.txt").exists());
    }
}
