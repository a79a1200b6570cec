use anyhow::{Context, Result};
use intro_core::ToolPaths;
use port_scan::{parse_ports, PortSelection};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "intro-web.yaml";

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub output_dir: Option<PathBuf>,
    pub probe_timeout_secs: Option<u64>,
    pub ports: Option<String>,
    pub tools: Option<ToolPaths>,
}

/// Load the YAML config. An explicit path must exist; without one,
/// `./intro-web.yaml` is used when present.
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(DEFAULT_CONFIG_FILE);
            if p.exists() { p.to_path_buf() } else { return Ok(None); }
        }
    };
    let s = fs::read_to_string(&path).with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&s).with_context(|| format!("parsing config {}", path.display())).map(Some)
}

pub fn parse_config(s: &str) -> Result<Config> {
    // An empty document deserializes to unit, not to a struct.
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(s)?)
}

/// Values given on the command line; each wins over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub out_dir: Option<PathBuf>,
    pub probe_timeout_secs: Option<u64>,
    pub ports: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub out_dir: PathBuf,
    pub probe_timeout: Duration,
    pub ports: PortSelection,
    pub tools: ToolPaths,
}

impl Settings {
    pub fn resolve(cli: Overrides, cfg: Option<Config>) -> Result<Settings> {
        let cfg = cfg.unwrap_or_default();
        let out_dir = cli.out_dir.or(cfg.output_dir).unwrap_or_else(|| PathBuf::from("."));
        let probe_timeout = cli
            .probe_timeout_secs
            .or(cfg.probe_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(host_probe::DEFAULT_PROBE_TIMEOUT);
        let ports = match cli.ports.or(cfg.ports) {
            Some(spec) => PortSelection::Explicit(
                parse_ports(&spec).with_context(|| format!("invalid port list `{}`", spec))?,
            ),
            None => PortSelection::Fast,
        };
        Ok(Settings { out_dir, probe_timeout, ports, tools: cfg.tools.unwrap_or_default() })
    }
}
