//! Assembly of the distributable output directory.
//!
//! Assembly is split into ordered [`AssemblyStep`]s so the controller can
//! check its state between steps. Each step reports its own checklist line(s)
//! and returns a [`StageOutcome`]; errors never escape as `Err`.

use super::{
    error::{Context, Error, Result},
    fs,
    locator::{self, LibraryPattern},
    report::{ItemStatus, Reporter},
    resources,
    settings::{DEFAULT_LIBRARY_STEM, Settings},
    state::{Stage, StageFailure, StageOutcome},
};
use std::{ffi::OsString, path::PathBuf};

/// Assembly sub-steps, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssemblyStep {
    /// Create the output directory tree
    PrepareOutput,
    /// Copy the compiled binary
    StageBinary,
    /// Remove the intermediate directory after a release build
    CleanIntermediate,
    /// Decode the resource bundle
    DecodeResources,
    /// Find and copy the optional library
    StageLibrary,
}

impl AssemblyStep {
    /// Every step, in execution order.
    pub const ALL: [AssemblyStep; 5] = [
        AssemblyStep::PrepareOutput,
        AssemblyStep::StageBinary,
        AssemblyStep::CleanIntermediate,
        AssemblyStep::DecodeResources,
        AssemblyStep::StageLibrary,
    ];
}

fn fatal(error: impl std::fmt::Display) -> StageOutcome {
    StageOutcome::Fatal(StageFailure::new(Stage::Assembly, error.to_string()))
}

/// Populates the output directory.
pub struct ArtifactAssembler<'a> {
    settings: &'a Settings,
    environment: Vec<(OsString, OsString)>,
    staged: Vec<PathBuf>,
}

impl<'a> ArtifactAssembler<'a> {
    /// Creates an assembler. `environment` is scanned for library candidates.
    pub fn new(settings: &'a Settings, environment: Vec<(OsString, OsString)>) -> Self {
        Self {
            settings,
            environment,
            staged: Vec::new(),
        }
    }

    /// Files written to the output directory so far.
    pub fn staged(&self) -> &[PathBuf] {
        &self.staged
    }

    /// Runs one step and reports its checklist lines.
    pub async fn run_step(&mut self, step: AssemblyStep, reporter: &dyn Reporter) -> StageOutcome {
        match step {
            AssemblyStep::PrepareOutput => self.prepare_output(reporter).await,
            AssemblyStep::StageBinary => self.stage_binary(reporter).await,
            AssemblyStep::CleanIntermediate => self.clean_intermediate(reporter).await,
            AssemblyStep::DecodeResources => self.decode_resources(reporter).await,
            AssemblyStep::StageLibrary => self.stage_library(reporter).await,
        }
    }

    async fn prepare_output(&self, reporter: &dyn Reporter) -> StageOutcome {
        let output_dir = self.settings.output_dir();
        match fs::create_dir_all(output_dir).await {
            Ok(()) => {
                reporter.item("output directory", &ItemStatus::Ok);
                StageOutcome::Ok
            }
            Err(e) => {
                reporter.item("output directory", &ItemStatus::Error(e.to_string()));
                fatal(e)
            }
        }
    }

    async fn stage_binary(&mut self, reporter: &dyn Reporter) -> StageOutcome {
        let label = self.settings.binary_file_name();
        let from = self.settings.compiled_binary();
        let to = self.settings.output_dir().join(&label);

        match fs::copy_file(&from, &to).await {
            Ok(size) => {
                log::info!("Staged {} ({} bytes)", to.display(), size);
                reporter.item(&label, &ItemStatus::Ok);
                self.staged.push(to);
                StageOutcome::Ok
            }
            Err(e) => {
                reporter.item(&label, &ItemStatus::Error(e.to_string()));
                fatal(format!("compiled binary could not be staged: {e}"))
            }
        }
    }

    async fn clean_intermediate(&self, reporter: &dyn Reporter) -> StageOutcome {
        let target = self.settings.target_dir();
        let label = format!("remove {}", target.display());

        if !self.settings.config().should_clean() {
            log::debug!("Keeping {}", target.display());
            reporter.item(&label, &ItemStatus::Skipped);
            return StageOutcome::Ok;
        }

        match fs::remove_dir_all(&target).await {
            Ok(()) => reporter.item(&label, &ItemStatus::Ok),
            Err(e) => {
                log::warn!("Cleanup of {} incomplete: {}", target.display(), e);
                reporter.item(&label, &ItemStatus::Error(e.to_string()));
            }
        }
        StageOutcome::Ok
    }

    async fn decode_resources(&mut self, reporter: &dyn Reporter) -> StageOutcome {
        let settings = self.settings;
        let entries = settings.resources();
        let mut done = 0usize;

        let result = resources::decode_bundle(
            settings.bundle_file(),
            entries,
            settings.output_dir(),
            |entry| {
                reporter.item(&entry.relative_path.display().to_string(), &ItemStatus::Ok);
                done += 1;
            },
        )
        .await;

        match result {
            Ok(written) => {
                self.staged.extend(written);
                StageOutcome::Ok
            }
            Err(e) => {
                if let Some(entry) = entries.get(done) {
                    reporter.item(
                        &entry.relative_path.display().to_string(),
                        &ItemStatus::Error(e.to_string()),
                    );
                }
                fatal(e)
            }
        }
    }

    async fn stage_library(&mut self, reporter: &dyn Reporter) -> StageOutcome {
        let pattern = match LibraryPattern::for_host(DEFAULT_LIBRARY_STEM) {
            Ok(pattern) => pattern,
            Err(e) => return fatal(e),
        };
        let label = pattern.as_str().to_string();

        match self.find_and_copy_library(&pattern).await {
            Ok(Some(path)) => {
                reporter.item(&label, &ItemStatus::Ok);
                self.staged.push(path);
                StageOutcome::Ok
            }
            Ok(None) => {
                reporter.item(&label, &ItemStatus::NotFound);
                StageOutcome::Warning(format!(
                    "CPLEX dynamic library file ({}) couldn't be automatically located on your \
                     system. Please copy it manually into the '{}' folder. Otherwise, you won't \
                     be able to use CPLEXSolver.",
                    label,
                    self.settings.output_dir().display()
                ))
            }
            Err(e) => {
                reporter.item(&label, &ItemStatus::Error(e.to_string()));
                fatal(e)
            }
        }
    }

    async fn find_and_copy_library(&self, pattern: &LibraryPattern) -> Result<Option<PathBuf>> {
        let candidates = locator::collect_candidates(
            self.settings.library_prefix(),
            self.environment.iter().cloned(),
            self.settings.candidate_ordering(),
        )?;
        log::debug!(
            "{} library candidate(s): {:?}",
            candidates.len(),
            candidates.iter().map(|c| &c.name).collect::<Vec<_>>()
        );

        let search_pattern = pattern.clone();
        let discovered = tokio::task::spawn_blocking(move || {
            locator::locate(&candidates, &search_pattern)
        })
        .await
        .map_err(|e| {
            Error::GenericError(format!("Library search task panicked: {}", e))
        })?;

        let Some(library) = discovered else {
            return Ok(None);
        };
        let file_name = library
            .file_name()
            .context("discovered library has no file name")?;
        let to = self.settings.output_dir().join(file_name);

        fs::copy_file(&library.path, &to).await?;
        log::info!(
            "Staged {} from {} ({})",
            to.display(),
            library.path.display(),
            library.candidate
        );
        Ok(Some(to))
    }
}
