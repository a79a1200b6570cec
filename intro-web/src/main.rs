use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use intro_core::ReconContext;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Instant;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{info, warn};

mod config;
mod logging;
mod pipeline;

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| String::new())
}

#[derive(Debug, Parser)]
#[command(
    name = "intro-web",
    version,
    about = "Web recon orchestrator: probes, fingerprints and scans one target with external tools",
    override_usage = "intro-web -u target.com"
)]
struct Cli {
    /// Target hostname or URL (flag is case-insensitive: -U / --URL also work)
    #[arg(short = 'u', long = "url", value_name = "TARGET")]
    url: String,
    /// Optional config file (YAML). If omitted, loads ./intro-web.yaml if present.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Directory for result files (default: current directory)
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
    /// Host probe timeout in seconds (default: 15)
    #[arg(long, value_name = "SECS")]
    probe_timeout: Option<u64>,
    /// Ports for nmap instead of its fast set (e.g., 22,80,443 or 1-1024,8080)
    #[arg(long)]
    ports: Option<String>,
}

impl Cli {
    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            out_dir: self.out_dir.clone(),
            probe_timeout_secs: self.probe_timeout,
            ports: self.ports.clone(),
        }
    }
}

/// Lower-case the target flag so `-U`, `-U=...`, `-Uvalue`, `--URL`, `--Url=...`
/// parse like `-u`/`--url`.
fn normalize_flag_case<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|a| {
            let Some(s) = a.to_str() else { return a };
            if let Some(rest) = s.strip_prefix("-U") {
                return OsString::from(format!("-u{}", rest));
            }
            let (flag, value) = match s.split_once('=') {
                Some((f, v)) => (f, Some(v)),
                None => (s, None),
            };
            if !flag.eq_ignore_ascii_case("--url") {
                return a;
            }
            match value {
                Some(v) => OsString::from(format!("--url={}", v)),
                None => OsString::from("--url"),
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::try_parse_from(normalize_flag_case(std::env::args_os())).unwrap_or_else(|e| e.exit());
    logging::init_logging();

    let cfg = config::load_config(cli.config.as_deref())?;
    let settings = config::Settings::resolve(cli.overrides(), cfg)?;
    std::fs::create_dir_all(&settings.out_dir)
        .with_context(|| format!("creating output directory {}", settings.out_dir.display()))?;

    let ctx = ReconContext::new(cli.url)
        .with_out_dir(settings.out_dir.clone())
        .with_tools(settings.tools.clone());

    println!("{}", format!("\n\t[*] Starting recon on {}:", ctx.target).bold().cyan());
    info!("Started at {} (intro-core {})", now_rfc3339(), intro_core::version());
    let started = Instant::now();

    let summary = match pipeline::run(&ctx, &settings).await {
        Ok(s) => s,
        Err(_) => std::process::exit(1),
    };

    let failed = summary.failed_phases();
    if failed > 0 {
        warn!("{} of {} phases reported errors", failed, pipeline::RunSummary::PHASES);
    }
    info!(
        "Results in {} ({:.1}s)",
        ctx.out_dir().display(),
        started.elapsed().as_secs_f64()
    );
    println!("{}", "[*] Recon completed successfully!".bold().green());
    Ok(())
}
