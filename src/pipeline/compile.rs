//! Invocation of the external build command.

use super::{
    error::{Error, Result},
    settings::BuildCommand,
    toolchain::ExternalToolResult,
};
use std::{path::Path, process::Stdio};
use tokio::process::Command;

/// Runs the build command in `project_dir` and captures its output.
///
/// Blocks until the command exits; there is no timeout. A non-zero exit is
/// not an error here: the caller inspects [`ExternalToolResult::success`].
///
/// # Errors
///
/// Returns [`Error::CommandFailed`] if the process cannot be started.
pub async fn compile(
    command: &BuildCommand,
    release_mode: bool,
    project_dir: &Path,
) -> Result<ExternalToolResult> {
    let display = command.display(release_mode);
    log::info!("Running `{}` in {}", display, project_dir.display());

    let output = Command::new(&command.program)
        .args(command.args(release_mode))
        .current_dir(project_dir)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::CommandFailed {
            command: display.clone(),
            reason: e.to_string(),
        })?;

    let result = ExternalToolResult::from(output);
    log::debug!("`{}` exited with {:?}", display, result.exit_code);
    Ok(result)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> BuildCommand {
        BuildCommand {
            program: "sh".into(),
            release_args: vec!["-c".into(), script.into()],
            debug_args: vec!["-c".into(), "exit 0".into()],
        }
    }

    #[tokio::test]
    async fn stderr_and_exit_code_are_captured() {
        let dir = tempfile::tempdir().unwrap();
        let command = shell("printf 'error: boom\\n' >&2; exit 101");

        let result = compile(&command, true, dir.path()).await.unwrap();

        assert_eq!(result.exit_code, Some(101));
        assert_eq!(result.stderr, b"error: boom\n");
        assert!(!result.success());
    }

    #[tokio::test]
    async fn mode_selects_argument_set() {
        let dir = tempfile::tempdir().unwrap();
        let command = shell("exit 7");

        assert!(compile(&command, false, dir.path()).await.unwrap().success());
        assert!(!compile(&command, true, dir.path()).await.unwrap().success());
    }

    #[tokio::test]
    async fn runs_inside_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        let command = shell("touch built-here");

        compile(&command, true, dir.path()).await.unwrap();

        assert!(dir.path().join("built-here").exists());
    }

    #[tokio::test]
    async fn unstartable_program_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let command = BuildCommand {
            program: "switch-selection-no-such-build-tool".into(),
            ..Default::default()
        };

        let err = compile(&command, true, dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
    }
}
