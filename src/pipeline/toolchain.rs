//! Toolchain presence checks.
//!
//! Every required program is located with `which` and invoked once with no
//! arguments. All programs are probed even after one fails so the operator
//! sees every missing dependency in a single run.

use std::{path::PathBuf, process::Stdio};
use tokio::process::Command;

/// Captured result of an external process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternalToolResult {
    /// Exit code; `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Captured standard output
    pub stdout: Vec<u8>,
    /// Captured standard error
    pub stderr: Vec<u8>,
}

impl ExternalToolResult {
    /// Whether the process exited with code zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl From<std::process::Output> for ExternalToolResult {
    fn from(output: std::process::Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Outcome of probing one program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Program ran and exited with zero
    Available(PathBuf),
    /// Program is not on `PATH`
    NotFound(String),
    /// Program was found but could not be started
    NotExecutable(String),
    /// Program ran and exited unsuccessfully
    Failed(Option<i32>),
}

/// Probe result for one required program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolProbe {
    /// Program name as configured
    pub program: String,
    /// What happened
    pub status: ProbeStatus,
}

impl ToolProbe {
    /// Whether the program is usable.
    pub fn is_available(&self) -> bool {
        matches!(self.status, ProbeStatus::Available(_))
    }
}

/// Result of probing every required program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolchainReport {
    /// One probe per program, in configured order
    pub probes: Vec<ToolProbe>,
}

impl ToolchainReport {
    /// Names of programs that are not usable.
    pub fn missing(&self) -> Vec<&str> {
        self.probes
            .iter()
            .filter(|p| !p.is_available())
            .map(|p| p.program.as_str())
            .collect()
    }

    /// Whether every program is usable.
    pub fn all_available(&self) -> bool {
        self.probes.iter().all(ToolProbe::is_available)
    }
}

/// Probes a single program by running it without arguments.
pub async fn probe(program: &str) -> ToolProbe {
    let status = match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program, path.display());

            match Command::new(&path)
                .stdin(Stdio::null())
                .output()
                .await
                .map(ExternalToolResult::from)
            {
                Ok(result) if result.success() => ProbeStatus::Available(path),
                Ok(result) => {
                    log::warn!(
                        "{} found at {} but exited with code {:?}. Stderr: {}",
                        program,
                        path.display(),
                        result.exit_code,
                        String::from_utf8_lossy(&result.stderr)
                    );
                    ProbeStatus::Failed(result.exit_code)
                }
                Err(e) => {
                    log::warn!(
                        "{} found at {} but failed to execute: {}",
                        program,
                        path.display(),
                        e
                    );
                    ProbeStatus::NotExecutable(e.to_string())
                }
            }
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", program, e);
            ProbeStatus::NotFound(e.to_string())
        }
    };

    ToolProbe {
        program: program.to_string(),
        status,
    }
}

/// Probes every program in order, never stopping early.
pub async fn verify<S: AsRef<str>>(programs: &[S]) -> ToolchainReport {
    let mut probes = Vec::with_capacity(programs.len());
    for program in programs {
        probes.push(probe(program.as_ref()).await);
    }
    ToolchainReport { probes }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING: &str = "switch-selection-no-such-program-4f1c";

    #[tokio::test]
    async fn missing_program_is_reported_not_found() {
        let probe = probe(MISSING).await;
        assert!(!probe.is_available());
        assert!(matches!(probe.status, ProbeStatus::NotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn every_program_is_probed_after_a_failure() {
        let report = verify(&[MISSING, "true", "false"]).await;

        assert_eq!(report.probes.len(), 3);
        assert!(report.probes[1].is_available());
        assert_eq!(report.probes[2].status, ProbeStatus::Failed(Some(1)));
        assert_eq!(report.missing(), [MISSING, "false"]);
        assert!(!report.all_available());
    }

    #[test]
    fn signal_terminated_process_is_not_success() {
        let result = ExternalToolResult {
            exit_code: None,
            ..Default::default()
        };
        assert!(!result.success());
    }
}
