//! Command line argument parsing and validation.

use crate::pipeline::{
    BuildConfiguration, CandidateOrdering, Settings, SettingsBuilder,
    settings::{DEFAULT_BUNDLE_FILE, DEFAULT_LIBRARY_PREFIX, DEFAULT_OUTPUT_DIR},
};
use clap::Parser;
use std::path::PathBuf;

/// Release packager for the switch-selection solver
#[derive(Parser, Debug)]
#[command(
    name = "switch_selection_release",
    version,
    about = "Builds the switch-selection solver and assembles its distributable folder",
    long_about = "Checks that rustc and cargo are available, builds the solver with cargo, and
assembles the output folder: the compiled binary, the example graphs decoded from the
resource bundle, and the CPLEX dynamic library if one can be found through the
CPLEX_STUDIO_DIR<version> environment variables.

Exit codes: 0 success, 1 usage error, 2 toolchain missing, 3 compilation failed,
4 assembly failed."
)]
pub struct Args {
    /// Make a debug build instead of a release build
    #[arg(long, env = "SWITCH_SELECTION_DEBUG")]
    pub debug: bool,

    /// Keep the intermediate `target` directory after a release build
    #[arg(long)]
    pub keep_target: bool,

    /// Project directory containing Cargo.toml and the resource bundle
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Output folder, relative to the project directory unless absolute
    #[arg(short = 'o', long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Resource bundle, relative to the project directory unless absolute
    #[arg(long, value_name = "FILE", default_value = DEFAULT_BUNDLE_FILE)]
    pub bundle: PathBuf,

    /// Environment variable prefix of versioned CPLEX installations
    #[arg(
        long,
        value_name = "PREFIX",
        env = "SWITCH_SELECTION_LIBRARY_PREFIX",
        default_value = DEFAULT_LIBRARY_PREFIX
    )]
    pub library_prefix: String,

    /// Try library candidates in descending string order of their names
    #[arg(long)]
    pub lexicographic_candidates: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Wait for <Enter> before exiting
    #[arg(long)]
    pub pause: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.library_prefix.is_empty() {
            return Err("Library prefix cannot be empty".to_string());
        }

        if !self
            .library_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(format!(
                "Invalid library prefix: {}. Only ASCII letters, digits and '_' are allowed",
                self.library_prefix
            ));
        }

        if !self.project_dir.is_dir() {
            return Err(format!(
                "Project directory does not exist: {}",
                self.project_dir.display()
            ));
        }

        Ok(())
    }

    /// Build switches selected by the flags.
    pub fn build_configuration(&self) -> BuildConfiguration {
        BuildConfiguration {
            release_mode: !self.debug,
            clean_intermediate_artifacts: !self.keep_target,
        }
    }

    /// Pipeline settings for these arguments.
    pub fn settings(&self) -> crate::pipeline::Result<Settings> {
        let ordering = if self.lexicographic_candidates {
            CandidateOrdering::Lexicographic
        } else {
            CandidateOrdering::Numeric
        };

        SettingsBuilder::new()
            .config(self.build_configuration())
            .project_dir(&self.project_dir)
            .output_dir(&self.output_dir)
            .bundle_file(&self.bundle)
            .library_prefix(&self.library_prefix)
            .candidate_ordering(ordering)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("switch_selection_release").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_are_release_with_cleanup() {
        let args = parse(&[]);
        assert_eq!(args.build_configuration(), BuildConfiguration::default());
        assert_eq!(args.output_dir, PathBuf::from("Switch selection"));
        assert_eq!(args.bundle, PathBuf::from("build.b64"));
    }

    #[test]
    fn flags_map_to_settings() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().to_str().unwrap();
        let args = parse(&[
            "--debug",
            "--keep-target",
            "-C",
            project,
            "--library-prefix",
            "MY_LIB",
            "--lexicographic-candidates",
        ]);

        assert!(args.validate().is_ok());
        let settings = args.settings().unwrap();
        assert!(!settings.config().release_mode);
        assert!(!settings.config().clean_intermediate_artifacts);
        assert_eq!(settings.library_prefix(), "MY_LIB");
        assert_eq!(settings.candidate_ordering(), CandidateOrdering::Lexicographic);
        assert_eq!(settings.output_dir(), dir.path().join("Switch selection"));
    }

    #[test]
    fn invalid_prefix_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().to_str().unwrap();

        assert!(parse(&["-C", project, "--library-prefix", ""]).validate().is_err());
        assert!(parse(&["-C", project, "--library-prefix", "A.B"]).validate().is_err());
    }

    #[test]
    fn missing_project_dir_is_rejected() {
        let args = parse(&["-C", "/definitely/not/a/project"]);
        assert!(args.validate().is_err());
    }
}
