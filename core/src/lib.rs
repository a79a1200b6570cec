//! Core utilities and shared types for the recon pipeline.

pub mod error;
pub mod exec;

pub use error::ToolError;
pub use exec::ToolCommand;

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Event target for positive outcomes; the CLI renders these with a `[+]` marker.
pub const OK_TARGET: &str = "intro::ok";

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Target exactly as the caller supplied it (hostname or URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target(pub String);

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        Target(s.to_string())
    }
}

impl From<String> for Target {
    fn from(s: String) -> Self {
        Target(s)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Target {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Component used in result file names. Path separators are replaced so a
    /// URL-shaped target still maps to a single file.
    pub fn file_component(&self) -> String {
        self.0.replace(['/', '\\'], "_")
    }
}

/// Prefix `https://` unless the value already carries an http(s) scheme.
pub fn ensure_https(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Program names (or absolute paths) of the external tools.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub httprobe: String,
    pub wafw00f: String,
    pub shcheck: String,
    pub nmap: String,
    pub subfinder: String,
    pub assetfinder: String,
    pub amass: String,
    pub nuclei: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        ToolPaths {
            httprobe: "httprobe".into(),
            wafw00f: "wafw00f".into(),
            shcheck: "shcheck.py".into(),
            nmap: "nmap".into(),
            subfinder: "subfinder".into(),
            assetfinder: "assetfinder".into(),
            amass: "amass".into(),
            nuclei: "nuclei".into(),
        }
    }
}

/// Immutable per-run state handed to every phase.
#[derive(Debug, Clone)]
pub struct ReconContext {
    pub target: Target,
    /// Scheme-qualified form of `target` for tools that want a URL.
    pub url: String,
    pub out_dir: PathBuf,
    pub tools: ToolPaths,
}

impl ReconContext {
    pub fn new(target: impl Into<Target>) -> Self {
        let target = target.into();
        let url = ensure_https(target.as_str());
        ReconContext { target, url, out_dir: PathBuf::from("."), tools: ToolPaths::default() }
    }

    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    pub fn with_tools(mut self, tools: ToolPaths) -> Self {
        self.tools = tools;
        self
    }

    pub fn host(&self) -> &str {
        self.target.as_str()
    }

    /// `<out_dir>/<tool>-results-<target>.txt`
    pub fn result_path(&self, tool: &str) -> PathBuf {
        self.out_dir.join(format!("{}-results-{}.txt", tool, self.target.file_component()))
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}
