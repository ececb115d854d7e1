//! Release pipeline for the switch-selection solver.
//!
//! The pipeline runs three gated stages:
//!
//! 1. [`toolchain`] - probe `rustc` and `cargo`
//! 2. [`compile`] - run `cargo build` in release or debug mode
//! 3. [`assembler`] - stage the binary, decode the example graphs from the
//!    resource bundle and locate the optional CPLEX library
//!
//! [`Pipeline`] sequences them and is the only place where a failure is turned
//! into early termination. Progress goes through a [`Reporter`].
//!
//! # Example
//!
//! ```no_run
//! use switch_selection_release::pipeline::{Pipeline, SettingsBuilder, SilentReporter};
//!
//! # async fn example() -> switch_selection_release::pipeline::Result<()> {
//! let settings = SettingsBuilder::new().project_dir(".").build()?;
//! let report = Pipeline::new(settings, &SilentReporter).run().await;
//! for warning in &report.warnings {
//!     println!("warning: {warning}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod checksum;
pub mod compile;
mod error;
pub mod fs;
pub mod locator;
pub mod orchestrator;
pub mod report;
pub mod resources;
pub mod settings;
pub mod state;
pub mod toolchain;

pub use error::{Context, Error, ErrorExt, Result};
pub use locator::{DiscoveredLibrary, EnvironmentCandidate, LibraryPattern};
pub use orchestrator::Pipeline;
pub use report::{ItemStatus, PlainReporter, Reporter, SilentReporter};
pub use settings::{
    BuildCommand, BuildConfiguration, CandidateOrdering, DecodeMode, ResourceEntry, Settings,
    SettingsBuilder,
};
pub use state::{
    PipelineReport, PipelineState, PipelineStatus, Stage, StageFailure, StageOutcome,
    StagedArtifact,
};
pub use toolchain::ExternalToolResult;
