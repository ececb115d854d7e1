//! Release packager for the switch-selection solver.
//!
//! This library drives a fixed three-stage pipeline:
//! - verify that `rustc` and `cargo` are available
//! - build the solver with `cargo build`
//! - assemble the output folder (binary, example graphs, optional CPLEX library)
//!
//! It backs the `switch_selection_release` binary and can be driven directly
//! through [`pipeline::Pipeline`].

pub mod cli;
pub mod error;
pub mod pipeline;

// Re-export commonly used types
pub use error::{CliError, PackagerError, Result};
