//! Pass/fail/warning state threaded through the pipeline.
//!
//! Every stage hands a [`StageOutcome`] back to the controller, which folds it
//! into the [`PipelineState`]. The state is consumed into a [`PipelineReport`]
//! once the run ends.

use std::{fmt, path::PathBuf};

/// Pipeline stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Required programs are probed
    Toolchain,
    /// The external build command runs
    Compilation,
    /// The output directory is populated
    Assembly,
}

impl Stage {
    /// Process exit code reported when this stage fails.
    pub fn exit_code(self) -> i32 {
        match self {
            Stage::Toolchain => 2,
            Stage::Compilation => 3,
            Stage::Assembly => 4,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Toolchain => "toolchain check",
            Stage::Compilation => "compilation",
            Stage::Assembly => "final arrangements",
        })
    }
}

/// A fatal condition raised by a stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageFailure {
    /// Stage that failed
    pub stage: Stage,
    /// Human-readable message
    pub message: String,
    /// Raw diagnostic output of the failing tool, forwarded untouched
    pub diagnostics: Option<Vec<u8>>,
}

impl StageFailure {
    /// Creates a failure without diagnostics.
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            diagnostics: None,
        }
    }

    /// Attaches the failing tool's captured output.
    pub fn with_diagnostics(mut self, diagnostics: Vec<u8>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }
}

/// Result of one stage or assembly step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageOutcome {
    /// Nothing to report
    Ok,
    /// Non-halting condition
    Warning(String),
    /// Halts every remaining side-effecting stage
    Fatal(StageFailure),
}

/// Mutable run state, owned by the controller.
#[derive(Debug, Default)]
pub struct PipelineState {
    fatal: Option<StageFailure>,
    warnings: Vec<String>,
}

impl PipelineState {
    /// Creates a clean state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a fatal error has been recorded.
    pub fn fatal_error(&self) -> bool {
        self.fatal.is_some()
    }

    /// Whether at least one warning has been recorded.
    pub fn warning(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Folds an outcome into the state.
    ///
    /// The first fatal failure wins; later ones are logged and dropped.
    pub fn absorb(&mut self, outcome: StageOutcome) {
        match outcome {
            StageOutcome::Ok => {}
            StageOutcome::Warning(reason) => self.warnings.push(reason),
            StageOutcome::Fatal(failure) => {
                if let Some(first) = &self.fatal {
                    log::debug!(
                        "ignoring {} failure after {} failure: {}",
                        failure.stage,
                        first.stage,
                        failure.message
                    );
                } else {
                    self.fatal = Some(failure);
                }
            }
        }
    }

    /// Consumes the state into the final report.
    pub fn into_report(self, staged: Vec<StagedArtifact>) -> PipelineReport {
        let status = match self.fatal {
            Some(failure) => PipelineStatus::Failed(failure),
            None => PipelineStatus::Success,
        };
        let staged = match status {
            PipelineStatus::Success => staged,
            PipelineStatus::Failed(_) => Vec::new(),
        };
        PipelineReport {
            status,
            warnings: self.warnings,
            staged,
        }
    }
}

/// A file placed into the output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedArtifact {
    /// Destination path
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Hex-encoded SHA-256 of the contents
    pub checksum: String,
}

/// Overall result of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipelineStatus {
    /// Every stage completed
    Success,
    /// A stage failed fatally
    Failed(StageFailure),
}

/// Final report handed back to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineReport {
    /// Overall status
    pub status: PipelineStatus,
    /// Non-fatal warnings, in the order they were raised
    pub warnings: Vec<String>,
    /// Files in the output directory; empty unless the run succeeded
    pub staged: Vec<StagedArtifact>,
}

impl PipelineReport {
    /// Whether the run succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.status, PipelineStatus::Success)
    }

    /// Exit code: 0 on success, stage-specific otherwise.
    pub fn exit_code(&self) -> i32 {
        match &self.status {
            PipelineStatus::Success => 0,
            PipelineStatus::Failed(failure) => failure.stage.exit_code(),
        }
    }

    /// The fatal failure, if any.
    pub fn failure(&self) -> Option<&StageFailure> {
        match &self.status {
            PipelineStatus::Success => None,
            PipelineStatus::Failed(failure) => Some(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_fail_the_run() {
        let mut state = PipelineState::new();
        state.absorb(StageOutcome::Ok);
        state.absorb(StageOutcome::Warning("library missing".into()));

        assert!(state.warning());
        assert!(!state.fatal_error());

        let report = state.into_report(Vec::new());
        assert!(report.is_success());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.warnings, ["library missing"]);
    }

    #[test]
    fn first_fatal_failure_is_kept() {
        let mut state = PipelineState::new();
        state.absorb(StageOutcome::Fatal(StageFailure::new(
            Stage::Compilation,
            "build failed",
        )));
        state.absorb(StageOutcome::Fatal(StageFailure::new(
            Stage::Assembly,
            "should be ignored",
        )));

        let report = state.into_report(Vec::new());
        let failure = report.failure().unwrap();
        assert_eq!(failure.stage, Stage::Compilation);
        assert_eq!(failure.message, "build failed");
        assert_eq!(report.exit_code(), 3);
    }

    #[test]
    fn failed_report_drops_staged_files() {
        let mut state = PipelineState::new();
        state.absorb(StageOutcome::Fatal(StageFailure::new(Stage::Assembly, "bad record")));
        let staged = vec![StagedArtifact {
            path: PathBuf::from("out/tool"),
            size: 1,
            checksum: String::new(),
        }];

        assert!(state.into_report(staged).staged.is_empty());
    }
}
