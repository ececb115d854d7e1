//! Pipeline controller.
//!
//! Runs toolchain verification, compilation and assembly in sequence, folding
//! each outcome into a [`PipelineState`]. Once a fatal failure is recorded no
//! further side-effecting work runs; only the final summary is emitted.

use super::{
    assembler::{ArtifactAssembler, AssemblyStep},
    checksum, compile,
    report::{ItemStatus, Reporter},
    settings::Settings,
    state::{PipelineReport, PipelineState, Stage, StageFailure, StageOutcome, StagedArtifact},
    toolchain::{self, ProbeStatus},
};
use std::ffi::OsString;

/// Header of the toolchain section.
pub const TOOLCHAIN_SECTION: &str = "1. Checking the availability of necessary programs";
/// Header of the compilation section.
pub const COMPILATION_SECTION: &str = "2. Building the tool (might take some time)";
/// Header of the assembly section.
pub const ASSEMBLY_SECTION: &str = "3. Final arrangements";

/// The release pipeline.
///
/// ```no_run
/// use switch_selection_release::pipeline::{Pipeline, PlainReporter, SettingsBuilder};
///
/// # async fn example() -> switch_selection_release::pipeline::Result<()> {
/// let settings = SettingsBuilder::new().project_dir(".").build()?;
/// let reporter = PlainReporter::stdout();
/// let report = Pipeline::new(settings, &reporter).run().await;
/// std::process::exit(report.exit_code());
/// # }
/// ```
pub struct Pipeline<'r> {
    settings: Settings,
    environment: Vec<(OsString, OsString)>,
    reporter: &'r dyn Reporter,
}

impl<'r> Pipeline<'r> {
    /// Creates a pipeline that scans the current process environment.
    pub fn new(settings: Settings, reporter: &'r dyn Reporter) -> Self {
        Self {
            settings,
            environment: std::env::vars_os().collect(),
            reporter,
        }
    }

    /// Replaces the environment scanned for library candidates.
    pub fn with_environment<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        self.environment = vars.into_iter().collect();
        self
    }

    /// Runs every stage and returns the final report.
    pub async fn run(self) -> PipelineReport {
        let mut state = PipelineState::new();

        if !self.settings.config().release_mode {
            self.reporter.notice(
                "You are about to make a DEBUG build! If this is not your intention, \
                 rerun without --debug.",
            );
        }

        self.reporter.section(TOOLCHAIN_SECTION);
        state.absorb(self.verify_toolchain().await);

        if !state.fatal_error() {
            self.reporter.section(COMPILATION_SECTION);
            state.absorb(self.compile().await);
        }

        let mut staged = Vec::new();
        if !state.fatal_error() {
            self.reporter.section(ASSEMBLY_SECTION);
            let mut assembler = ArtifactAssembler::new(&self.settings, self.environment.clone());
            for step in AssemblyStep::ALL {
                if state.fatal_error() {
                    log::debug!("Skipping {:?} after fatal failure", step);
                    break;
                }
                state.absorb(assembler.run_step(step, self.reporter).await);
            }

            if !state.fatal_error() {
                match manifest(assembler.staged()).await {
                    Ok(artifacts) => staged = artifacts,
                    Err(outcome) => state.absorb(outcome),
                }
            }
        }

        let report = state.into_report(staged);
        match report.failure() {
            Some(failure) => log::info!("Pipeline failed during {}", failure.stage),
            None => {
                for artifact in &report.staged {
                    log::info!(
                        "{} ({} bytes, sha256 {})",
                        artifact.path.display(),
                        artifact.size,
                        artifact.checksum
                    );
                }
            }
        }
        self.reporter.summary(&report, self.settings.output_dir());
        report
    }

    async fn verify_toolchain(&self) -> StageOutcome {
        let report = toolchain::verify(self.settings.required_programs()).await;

        for probe in &report.probes {
            let status = match &probe.status {
                ProbeStatus::Available(_) => ItemStatus::Ok,
                ProbeStatus::NotFound(_)
                | ProbeStatus::NotExecutable(_)
                | ProbeStatus::Failed(_) => ItemStatus::NotFound,
            };
            self.reporter.item(&probe.program, &status);
        }

        if report.all_available() {
            StageOutcome::Ok
        } else {
            StageOutcome::Fatal(StageFailure::new(
                Stage::Toolchain,
                format!(
                    "required program(s) not found: {}",
                    report.missing().join(", ")
                ),
            ))
        }
    }

    async fn compile(&self) -> StageOutcome {
        let config = self.settings.config();
        let command = self.settings.build_command();
        let label = command.display(config.release_mode);

        let result =
            match compile::compile(command, config.release_mode, self.settings.project_dir()).await
            {
                Ok(result) => result,
                Err(e) => {
                    self.reporter.item(&label, &ItemStatus::Error(e.to_string()));
                    return StageOutcome::Fatal(StageFailure::new(Stage::Compilation, e.to_string()));
                }
            };

        if result.success() {
            self.reporter.item(&label, &ItemStatus::Ok);
            return StageOutcome::Ok;
        }

        self.reporter
            .notice("Compilation failed. The raw output of the Rust compiler follows.");
        self.reporter.raw(&result.stderr);
        StageOutcome::Fatal(
            StageFailure::new(
                Stage::Compilation,
                format!("`{}` exited with {:?}", label, result.exit_code),
            )
            .with_diagnostics(result.stderr),
        )
    }
}

/// Describes every staged file; a failure is fatal for assembly.
async fn manifest(paths: &[std::path::PathBuf]) -> Result<Vec<StagedArtifact>, StageOutcome> {
    let mut artifacts = Vec::with_capacity(paths.len());
    for path in paths {
        let artifact = checksum::describe(path).await.map_err(|e| {
            StageOutcome::Fatal(StageFailure::new(Stage::Assembly, e.to_string()))
        })?;
        artifacts.push(artifact);
    }
    Ok(artifacts)
}
