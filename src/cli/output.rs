//! Colored terminal output for the operator checklist.

use crate::pipeline::{ItemStatus, PipelineReport, PipelineStatus, Reporter, report};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, StandardStreamLock, WriteColor};
use std::{
    io::{self, Write},
    path::Path,
};

/// Writes the banner, checklist and summary to stdout.
pub struct OutputManager {
    stdout: StandardStream,
}

impl OutputManager {
    /// Creates an output manager; `color` false forces plain text.
    pub fn new(color: bool) -> Self {
        let choice = if color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            stdout: StandardStream::stdout(choice),
        }
    }

    /// Prints the framed product banner.
    pub fn banner(&self) -> io::Result<()> {
        let mut out = self.stdout.lock();
        let rule = "* ".repeat(32);
        writeln!(out, "{}", rule.trim_end())?;
        writeln!(out, "* {:<59} *", "SWITCH SELECTION BUILD SCRIPT")?;
        writeln!(out, "* {:>59} *", "by Andrew Eliseev (JointPoints)")?;
        writeln!(out, "{}", rule.trim_end())?;
        writeln!(out)
    }

    /// Prints `message` and waits for a line on stdin.
    pub fn pause(&self, message: &str) -> io::Result<()> {
        {
            let mut out = self.stdout.lock();
            write!(out, "{message}")?;
            out.flush()?;
        }
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(())
    }

    fn colored(out: &mut impl WriteColor, color: Color, text: &str) -> io::Result<()> {
        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(out, "{text}")?;
        out.reset()
    }

    fn emit(&self, f: impl FnOnce(&mut StandardStreamLock<'_>) -> io::Result<()>) {
        let mut out = self.stdout.lock();
        let written = f(&mut out);
        if let Err(e) = written.and_then(|_| out.flush()) {
            log::debug!("failed to write to stdout: {}", e);
        }
    }
}

fn status_color(status: &ItemStatus) -> Color {
    match status {
        ItemStatus::Ok => Color::Green,
        ItemStatus::Skipped => Color::Cyan,
        ItemStatus::NotFound | ItemStatus::Error(_) => Color::Red,
    }
}

impl Reporter for OutputManager {
    fn section(&self, title: &str) {
        self.emit(|out| {
            writeln!(out)?;
            writeln!(out, "{title}")
        });
    }

    fn item(&self, label: &str, status: &ItemStatus) {
        self.emit(|out| {
            write!(out, "\t{label:<30}: ")?;
            Self::colored(out, status_color(status), &status.to_string())?;
            writeln!(out)
        });
    }

    fn notice(&self, message: &str) {
        self.emit(|out| {
            Self::colored(out, Color::Red, message)?;
            writeln!(out)
        });
    }

    fn raw(&self, bytes: &[u8]) {
        self.emit(|out| out.write_all(bytes));
    }

    fn summary(&self, report: &PipelineReport, output_dir: &Path) {
        self.emit(|out| {
            writeln!(out)?;
            match &report.status {
                PipelineStatus::Success => {
                    Self::colored(out, Color::Green, "SUCCESS! ")?;
                    let message = report::success_message(output_dir);
                    writeln!(out, "{}", message.trim_start_matches("SUCCESS! "))?;
                    for artifact in &report.staged {
                        writeln!(
                            out,
                            "\t{} ({} bytes, sha256 {})",
                            artifact.path.display(),
                            artifact.size,
                            artifact.checksum
                        )?;
                    }
                }
                PipelineStatus::Failed(failure) => {
                    Self::colored(out, Color::Red, "ERROR! ")?;
                    writeln!(out, "{}: {}", failure.stage, failure.message)?;
                }
            }
            for warning in &report.warnings {
                writeln!(out)?;
                Self::colored(out, Color::Yellow, "WARNING! ")?;
                writeln!(out, "{warning}")?;
            }
            writeln!(out)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::Buffer;

    #[test]
    fn colored_text_is_written_plain_without_color_support() {
        let mut buffer = Buffer::no_color();
        OutputManager::colored(&mut buffer, Color::Green, "OK").unwrap();
        assert_eq!(buffer.as_slice(), b"OK");
    }

    #[test]
    fn failures_are_red_and_successes_green() {
        assert_eq!(status_color(&ItemStatus::Ok), Color::Green);
        assert_eq!(status_color(&ItemStatus::NotFound), Color::Red);
        assert_eq!(status_color(&ItemStatus::Error("x".into())), Color::Red);
        assert_eq!(status_color(&ItemStatus::Skipped), Color::Cyan);
    }
}
