//! Command line interface for the release packager.

mod args;
mod output;

pub use args::Args;
pub use output::OutputManager;

use crate::{
    error::{CliError, Result},
    pipeline::Pipeline,
};

/// Main CLI entry point. Returns the process exit code.
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let settings = args.settings()?;
    let output = OutputManager::new(!args.no_color);
    output.banner()?;

    let report = Pipeline::new(settings, &output).run().await;

    if args.pause {
        output.pause("Press <Enter> to finish...")?;
    }

    Ok(report.exit_code())
}
