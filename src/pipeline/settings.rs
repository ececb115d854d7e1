//! Pipeline configuration.
//!
//! [`BuildConfiguration`] holds the two switches fixed at process start.
//! [`Settings`] carries everything else the stages need (paths, program names,
//! the resource list) and is constructed through [`SettingsBuilder`].

use super::error::{Context, Result};
use std::path::{Path, PathBuf};

/// Name of the packaged product's binary, without platform suffix.
pub const PRODUCT_BINARY: &str = "switch-selection";

/// Default name of the output directory, relative to the project directory.
pub const DEFAULT_OUTPUT_DIR: &str = "Switch selection";

/// Default name of the embedded resource bundle, relative to the project directory.
pub const DEFAULT_BUNDLE_FILE: &str = "build.b64";

/// Environment variable prefix of versioned CPLEX installations.
pub const DEFAULT_LIBRARY_PREFIX: &str = "CPLEX_STUDIO_DIR";

/// File name stem of the optional dynamic library.
pub const DEFAULT_LIBRARY_STEM: &str = "cplex";

/// Programs that must be invocable before anything is built.
pub const REQUIRED_PROGRAMS: [&str; 2] = ["rustc", "cargo"];

/// Example graphs shipped with the tool, in bundle order.
pub const EXAMPLE_GRAPHS: [&str; 3] = [
    "Graphs/example1.gnbs",
    "Graphs/example2.gnbs",
    "Graphs/example3.gnbs",
];

/// Switches fixed before the pipeline runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildConfiguration {
    /// Optimized build when true, debug build otherwise.
    pub release_mode: bool,
    /// Delete the compiler's intermediate directory after a release build.
    pub clean_intermediate_artifacts: bool,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        Self {
            release_mode: true,
            clean_intermediate_artifacts: true,
        }
    }
}

impl BuildConfiguration {
    /// Subfolder of the intermediate directory holding the compiled binary.
    pub fn profile_dir(&self) -> &'static str {
        if self.release_mode { "release" } else { "debug" }
    }

    /// Whether the intermediate directory is removed after staging the binary.
    pub fn should_clean(&self) -> bool {
        self.release_mode && self.clean_intermediate_artifacts
    }
}

/// The external build command and its mode-specific arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildCommand {
    /// Program to run
    pub program: String,
    /// Arguments for an optimized build
    pub release_args: Vec<String>,
    /// Arguments for a debug build
    pub debug_args: Vec<String>,
}

impl Default for BuildCommand {
    fn default() -> Self {
        Self {
            program: "cargo".into(),
            release_args: vec!["build".into(), "--release".into()],
            debug_args: vec!["build".into()],
        }
    }
}

impl BuildCommand {
    /// Arguments selected by `release_mode`.
    pub fn args(&self, release_mode: bool) -> &[String] {
        if release_mode {
            &self.release_args
        } else {
            &self.debug_args
        }
    }

    /// Human-readable command line, used in logs and error messages.
    pub fn display(&self, release_mode: bool) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args(release_mode).iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a decoded record is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeMode {
    /// Decoded bytes must be valid UTF-8
    Text,
    /// Decoded bytes are written as-is
    Binary,
}

/// One destination served by one bundle record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Path relative to the output directory
    pub relative_path: PathBuf,
    /// Write mode
    pub mode: DecodeMode,
}

impl ResourceEntry {
    /// Creates an entry.
    pub fn new(relative_path: impl Into<PathBuf>, mode: DecodeMode) -> Self {
        Self {
            relative_path: relative_path.into(),
            mode,
        }
    }

    /// The shipped example graphs, all text.
    pub fn example_graphs() -> Vec<Self> {
        EXAMPLE_GRAPHS
            .iter()
            .map(|&path| Self::new(path, DecodeMode::Text))
            .collect()
    }
}

/// Order in which library candidates are tried.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CandidateOrdering {
    /// Highest numeric suffix first
    #[default]
    Numeric,
    /// Descending string order of the variable name
    Lexicographic,
}

/// Settings for a pipeline run.
#[derive(Clone, Debug)]
pub struct Settings {
    config: BuildConfiguration,
    project_dir: PathBuf,
    output_dir: PathBuf,
    bundle_file: PathBuf,
    required_programs: Vec<String>,
    build_command: BuildCommand,
    resources: Vec<ResourceEntry>,
    library_prefix: String,
    candidate_ordering: CandidateOrdering,
}

impl Settings {
    /// Build switches.
    pub fn config(&self) -> BuildConfiguration {
        self.config
    }

    /// Project root, used as working directory for the build command.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Directory the distributable is assembled into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Encoded resource bundle.
    pub fn bundle_file(&self) -> &Path {
        &self.bundle_file
    }

    /// Compiler's intermediate-output directory.
    pub fn target_dir(&self) -> PathBuf {
        self.project_dir.join("target")
    }

    /// File name of the compiled binary, including the platform suffix.
    pub fn binary_file_name(&self) -> String {
        format!("{}{}", PRODUCT_BINARY, std::env::consts::EXE_SUFFIX)
    }

    /// Location of the compiled binary for the configured build mode.
    pub fn compiled_binary(&self) -> PathBuf {
        self.target_dir()
            .join(self.config.profile_dir())
            .join(self.binary_file_name())
    }

    /// Programs probed by the toolchain verifier.
    pub fn required_programs(&self) -> &[String] {
        &self.required_programs
    }

    /// External build command.
    pub fn build_command(&self) -> &BuildCommand {
        &self.build_command
    }

    /// Destinations of the bundle records, in bundle order.
    pub fn resources(&self) -> &[ResourceEntry] {
        &self.resources
    }

    /// Environment variable prefix of library installations.
    pub fn library_prefix(&self) -> &str {
        &self.library_prefix
    }

    /// Candidate ordering policy.
    pub fn candidate_ordering(&self) -> CandidateOrdering {
        self.candidate_ordering
    }
}

/// Builder for [`Settings`].
///
/// Only the project directory is required; everything else defaults to the
/// values used for the shipped product.
///
/// ```no_run
/// use switch_selection_release::pipeline::{BuildConfiguration, SettingsBuilder};
///
/// # fn example() -> switch_selection_release::pipeline::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_dir(".")
///     .config(BuildConfiguration { release_mode: false, clean_intermediate_artifacts: false })
///     .build()?;
/// assert!(settings.compiled_binary().starts_with("./target/debug"));
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    config: BuildConfiguration,
    project_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    bundle_file: Option<PathBuf>,
    required_programs: Option<Vec<String>>,
    build_command: Option<BuildCommand>,
    resources: Option<Vec<ResourceEntry>>,
    library_prefix: Option<String>,
    candidate_ordering: CandidateOrdering,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the build switches.
    pub fn config(mut self, config: BuildConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Sets the project root.
    ///
    /// # Required
    pub fn project_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output directory. Relative paths resolve against the project root.
    ///
    /// Default: `Switch selection`
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the resource bundle file. Relative paths resolve against the project root.
    ///
    /// Default: `build.b64`
    pub fn bundle_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.bundle_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the programs probed before building.
    pub fn required_programs<I, S>(mut self, programs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_programs = Some(programs.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the build command.
    pub fn build_command(mut self, command: BuildCommand) -> Self {
        self.build_command = Some(command);
        self
    }

    /// Sets the bundle destinations.
    pub fn resources(mut self, resources: Vec<ResourceEntry>) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Sets the environment variable prefix of library installations.
    pub fn library_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.library_prefix = Some(prefix.into());
        self
    }

    /// Sets the candidate ordering.
    pub fn candidate_ordering(mut self, ordering: CandidateOrdering) -> Self {
        self.candidate_ordering = ordering;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `project_dir` is missing.
    pub fn build(self) -> Result<Settings> {
        let project_dir = self.project_dir.context("project_dir is required")?;
        let output_dir = project_dir.join(
            self.output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        );
        let bundle_file = project_dir.join(
            self.bundle_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BUNDLE_FILE)),
        );

        Ok(Settings {
            config: self.config,
            project_dir,
            output_dir,
            bundle_file,
            required_programs: self
                .required_programs
                .unwrap_or_else(|| REQUIRED_PROGRAMS.iter().map(|p| p.to_string()).collect()),
            build_command: self.build_command.unwrap_or_default(),
            resources: self.resources.unwrap_or_else(ResourceEntry::example_graphs),
            library_prefix: self
                .library_prefix
                .unwrap_or_else(|| DEFAULT_LIBRARY_PREFIX.into()),
            candidate_ordering: self.candidate_ordering,
        })
    }
}
