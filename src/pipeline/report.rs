//! Operator-facing progress output.
//!
//! The pipeline never prints directly. It talks to a [`Reporter`], which the
//! CLI implements with colors and tests implement by recording lines.

use super::state::{PipelineReport, PipelineStatus};
use std::{
    fmt,
    io::{self, Write},
    path::Path,
    sync::Mutex,
};

/// Result of one checklist item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemStatus {
    /// Item completed
    Ok,
    /// Optional item could not be located
    NotFound,
    /// Item did not apply to this run
    Skipped,
    /// Item failed; carries a short reason
    Error(String),
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Ok => f.write_str("OK"),
            ItemStatus::NotFound => f.write_str("NOT FOUND"),
            ItemStatus::Skipped => f.write_str("SKIPPED"),
            ItemStatus::Error(reason) => write!(f, "ERROR ({reason})"),
        }
    }
}

/// Capability to emit progress for the operator.
pub trait Reporter {
    /// Numbered section header, e.g. `1. Checking ...`.
    fn section(&self, title: &str);

    /// One checklist line.
    fn item(&self, label: &str, status: &ItemStatus);

    /// Non-fatal notice shown before or during the run.
    fn notice(&self, message: &str);

    /// Bytes forwarded verbatim, e.g. a compiler's stderr.
    fn raw(&self, bytes: &[u8]);

    /// Final summary.
    fn summary(&self, report: &PipelineReport, output_dir: &Path);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn section(&self, _title: &str) {}
    fn item(&self, _label: &str, _status: &ItemStatus) {}
    fn notice(&self, _message: &str) {}
    fn raw(&self, _bytes: &[u8]) {}
    fn summary(&self, _report: &PipelineReport, _output_dir: &Path) {}
}

/// Uncolored reporter writing to any sink.
pub struct PlainReporter<W: Write> {
    out: Mutex<W>,
}

impl PlainReporter<io::Stdout> {
    /// Reporter on standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> PlainReporter<W> {
    /// Wraps a writer.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self, f: impl FnOnce(&mut W) -> io::Result<()>) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let written = f(&mut *out);
        if let Err(e) = written.and_then(|_| out.flush()) {
            log::debug!("failed to write progress output: {}", e);
        }
    }
}

impl<W: Write> Reporter for PlainReporter<W> {
    fn section(&self, title: &str) {
        self.write(|out| writeln!(out, "{title}"));
    }

    fn item(&self, label: &str, status: &ItemStatus) {
        self.write(|out| writeln!(out, "\t{label:<30}: {status}"));
    }

    fn notice(&self, message: &str) {
        self.write(|out| writeln!(out, "{message}"));
    }

    fn raw(&self, bytes: &[u8]) {
        self.write(|out| out.write_all(bytes));
    }

    fn summary(&self, report: &PipelineReport, output_dir: &Path) {
        self.write(|out| {
            writeln!(out)?;
            match &report.status {
                PipelineStatus::Success => {
                    writeln!(out, "{}", success_message(output_dir))?;
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
                    writeln!(out, "ERROR! {}: {}", failure.stage, failure.message)?;
                }
            }
            for warning in &report.warnings {
                writeln!(out, "WARNING! {warning}")?;
            }
            Ok(())
        });
    }
}

/// Text of the final success line.
pub fn success_message(output_dir: &Path) -> String {
    format!(
        "SUCCESS! Build finished. You can find your compiled tool in the '{}' folder.",
        output_dir.display()
    )
}
