//! Concurrent subdomain enumeration (subfinder, assetfinder, amass) with an
//! ordered merge of their result files.

use intro_core::exec::{execute, ToolCommand};
use intro_core::{ReconContext, OK_TARGET};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info};

/// One enumerator and the file its stdout is captured into.
#[derive(Debug, Clone)]
pub struct Enumerator {
    pub name: String,
    pub command: ToolCommand,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub name: String,
    pub succeeded: bool,
}

#[derive(Debug, Error)]
pub enum CombineError {
    #[error("cannot create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
pub struct EnumerationReport {
    /// In declared enumerator order.
    pub outcomes: Vec<ToolOutcome>,
    pub combined: Result<PathBuf, CombineError>,
}

/// Enumerators in the order their results appear in the combined file.
pub fn default_enumerators(ctx: &ReconContext) -> Vec<Enumerator> {
    let host = ctx.host();
    let t = &ctx.tools;
    vec![
        Enumerator {
            name: "subfinder".into(),
            command: ToolCommand::new(&t.subfinder).args(["-d", host, "-silent"]),
            output: ctx.result_path("subfinder"),
        },
        Enumerator {
            name: "assetfinder".into(),
            command: ToolCommand::new(&t.assetfinder).arg(host),
            output: ctx.result_path("assetfinder"),
        },
        Enumerator {
            name: "amass".into(),
            command: ToolCommand::new(&t.amass).args(["enum", "-d", host, "-silent"]),
            output: ctx.result_path("amass"),
        },
    ]
}

pub fn combined_path(ctx: &ReconContext) -> PathBuf {
    ctx.result_path("subdomains")
}

pub async fn enumerate(ctx: &ReconContext) -> EnumerationReport {
    run_enumerators(&default_enumerators(ctx), combined_path(ctx)).await
}

/// Launch every enumerator as its own task, wait for all of them regardless of
/// failures, then merge their files into `combined` in declared order.
pub async fn run_enumerators(enumerators: &[Enumerator], combined: PathBuf) -> EnumerationReport {
    info!("Running subdomain enumeration tools concurrently...");

    let mut handles = Vec::with_capacity(enumerators.len());
    for e in enumerators {
        let cmd = e.command.clone();
        let out = e.output.clone();
        handles.push(tokio::spawn(async move { execute(&cmd, &out).await }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for (e, h) in enumerators.iter().zip(handles) {
        let succeeded = match h.await {
            Ok(ok) => ok,
            Err(join_err) => {
                error!("{} task aborted: {}", e.name, join_err);
                false
            }
        };
        if succeeded {
            info!(target: OK_TARGET, "{} completed successfully.", capitalize(&e.name));
        } else {
            error!("{} failed.", capitalize(&e.name));
        }
        outcomes.push(ToolOutcome { name: e.name.clone(), succeeded });
    }

    let combined = match combine(enumerators, &combined) {
        Ok(()) => {
            info!("Combined subdomain results saved to {}", combined.display());
            Ok(combined)
        }
        Err(e) => {
            error!("Error combining subdomain results: {}", e);
            Err(e)
        }
    };
    EnumerationReport { outcomes, combined }
}

/// Concatenate each enumerator's output into `dest`. Stops at the first
/// unreadable input, leaving `dest` with whatever was appended so far.
pub fn combine(enumerators: &[Enumerator], dest: &std::path::Path) -> Result<(), CombineError> {
    let mut out = File::create(dest).map_err(|source| CombineError::Create { path: dest.to_path_buf(), source })?;
    for e in enumerators {
        let mut input = File::open(&e.output).map_err(|source| CombineError::Read { path: e.output.clone(), source })?;
        io::copy(&mut input, &mut out).map_err(|source| CombineError::Write { path: dest.to_path_buf(), source })?;
    }
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        Some(first) => first.to_uppercase().chain(c).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("subdomains-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn fake(dir: &std::path::Path, name: &str, script: &str) -> Enumerator {
        Enumerator {
            name: name.into(),
            command: ToolCommand::new("sh").arg("-c").arg(script),
            output: dir.join(format!("{}-results-example.com.txt", name)),
        }
    }

    #[test]
    fn declared_order_and_shapes() {
        let ctx = ReconContext::new("example.com");
        let e = default_enumerators(&ctx);
        let names: Vec<_> = e.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["subfinder", "assetfinder", "amass"]);
        assert_eq!(e[0].command.to_string(), "subfinder -d example.com -silent");
        assert_eq!(e[1].command.to_string(), "assetfinder example.com");
        assert_eq!(e[2].command.to_string(), "amass enum -d example.com -silent");
        assert_eq!(e[2].output, PathBuf::from("./amass-results-example.com.txt"));
        assert_eq!(combined_path(&ctx), PathBuf::from("./subdomains-results-example.com.txt"));
    }

    #[test]
    fn capitalize_names() {
        assert_eq!(capitalize("subfinder"), "Subfinder");
        assert_eq!(capitalize(""), "");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 3)]
    async fn combined_order_ignores_completion_order() {
        let dir = scratch("order");
        // subfinder finishes last, amass first.
        let enumerators = vec![
            fake(&dir, "subfinder", "sleep 0.6; echo a.example.com"),
            fake(&dir, "assetfinder", "sleep 0.3; echo b.example.com"),
            fake(&dir, "amass", "echo c.example.com"),
        ];
        let combined = dir.join("subdomains-results-example.com.txt");
        let started = Instant::now();
        let report = run_enumerators(&enumerators, combined.clone()).await;

        // Run concurrently: total time is close to the slowest tool, not the sum.
        assert!(started.elapsed().as_millis() < 1500);
        assert!(report.outcomes.iter().all(|o| o.succeeded));
        assert_eq!(report.combined.unwrap(), combined);
        assert_eq!(
            std::fs::read_to_string(&combined).unwrap(),
            "a.example.com\nb.example.com\nc.example.com\n"
        );
    }

    #[tokio::test]
    async fn one_failure_does_not_cancel_siblings() {
        let dir = scratch("sibling");
        let enumerators = vec![
            fake(&dir, "subfinder", "echo a.example.com"),
            fake(&dir, "assetfinder", "exit 1"),
            fake(&dir, "amass", "sleep 0.2; echo c.example.com"),
        ];
        let combined = dir.join("subdomains-results-example.com.txt");
        let report = run_enumerators(&enumerators, combined.clone()).await;

        let flags: Vec<_> = report.outcomes.iter().map(|o| o.succeeded).collect();
        assert_eq!(flags, [true, false, true]);
        // The failed tool still produced an (empty) file, so the merge succeeds.
        assert!(report.combined.is_ok());
        assert_eq!(std::fs::read_to_string(&combined).unwrap(), "a.example.com\nc.example.com\n");
    }

    #[test]
    fn missing_input_is_named_in_error() {
        let dir = scratch("missing");
        let enumerators = vec![
            fake(&dir, "subfinder", ""),
            fake(&dir, "assetfinder", ""),
            fake(&dir, "amass", ""),
        ];
        std::fs::write(&enumerators[0].output, "a.example.com\n").unwrap();
        let _ = std::fs::remove_file(&enumerators[1].output);
        std::fs::write(&enumerators[2].output, "c.example.com\n").unwrap();

        let dest = dir.join("subdomains-results-example.com.txt");
        let err = combine(&enumerators, &dest).unwrap_err();
        assert!(matches!(err, CombineError::Read { ref path, .. } if *path == enumerators[1].output));
        assert!(err.to_string().contains("assetfinder-results-example.com.txt"));
        // Left incomplete: only the sections before the missing file.
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "a.example.com\n");
    }

    #[tokio::test]
    async fn tool_that_never_creates_its_file_is_reported() {
        let dir = scratch("nofile");
        let mut enumerators = vec![
            fake(&dir, "subfinder", "echo a.example.com"),
            fake(&dir, "assetfinder", "echo b.example.com"),
            fake(&dir, "amass", "echo c.example.com"),
        ];
        // Output directory that does not exist: the wrapper cannot create the file.
        enumerators[2].output = dir.join("gone").join("amass-results-example.com.txt");
        let report = run_enumerators(&enumerators, dir.join("subdomains-results-example.com.txt")).await;
        assert!(!report.outcomes[2].succeeded);
        match report.combined {
            Err(CombineError::Read { path, .. }) => assert_eq!(path, enumerators[2].output),
            other => panic!("unexpected combine result: {:?}", other),
        }
    }
}
