//! Decoding of the embedded resource bundle.
//!
//! The bundle is a text file holding one standard base64 record per line.
//! Records are positional: line `i` belongs to destination `i`. Lines past the
//! last destination are ignored; a missing line is an error.

use super::{
    error::{Error, ErrorExt, Result},
    settings::{DecodeMode, ResourceEntry},
};
use base64::Engine;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Decodes one record for `entry`.
///
/// Surrounding whitespace (including a trailing `\r`) is ignored.
pub fn decode_record(index: usize, line: &str, entry: &ResourceEntry) -> Result<Vec<u8>> {
    let malformed = |reason: String| Error::MalformedRecord {
        index,
        destination: entry.relative_path.clone(),
        reason,
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(line.trim())
        .map_err(|e| malformed(e.to_string()))?;

    match entry.mode {
        DecodeMode::Binary => Ok(bytes),
        DecodeMode::Text => String::from_utf8(bytes)
            .map(String::into_bytes)
            .map_err(|e| malformed(format!("not valid UTF-8 text: {e}"))),
    }
}

/// Decodes `bundle_file` into `output_dir`, one record per entry.
///
/// `on_written` is called after each destination is written, in order, so the
/// caller can report progress per item. Returns the written paths.
///
/// Existing files are overwritten. Records already written stay on disk if a
/// later record is malformed.
pub async fn decode_bundle(
    bundle_file: &Path,
    entries: &[ResourceEntry],
    output_dir: &Path,
    mut on_written: impl FnMut(&ResourceEntry),
) -> Result<Vec<PathBuf>> {
    let contents = fs::read_to_string(bundle_file)
        .await
        .fs_context("reading resource bundle", bundle_file)?;
    let mut lines = contents.lines();
    let mut written = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let line = lines.next().ok_or_else(|| Error::ShortBundle {
            path: bundle_file.to_path_buf(),
            expected: entries.len(),
            found: index,
        })?;

        let bytes = decode_record(index, line, entry)?;
        let destination = output_dir.join(&entry.relative_path);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .fs_context("creating resource directory", parent)?;
        }
        fs::write(&destination, &bytes)
            .await
            .fs_context("writing resource", &destination)?;

        log::debug!("Decoded {} ({} bytes)", destination.display(), bytes.len());
        on_written(entry);
        written.push(destination);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    const GRAPH: &str = "nodes 3\nedges 2\n1 2\n2 3\n";

    fn text(path: &str) -> ResourceEntry {
        ResourceEntry::new(path, DecodeMode::Text)
    }

    #[test]
    fn text_record_reproduces_original_bytes() {
        let line = STANDARD.encode(GRAPH);
        let decoded = decode_record(0, &line, &text("g.gnbs")).unwrap();
        assert_eq!(decoded, GRAPH.as_bytes());
    }

    #[test]
    fn trailing_carriage_return_is_ignored() {
        let line = format!("{}\r", STANDARD.encode("x"));
        assert_eq!(decode_record(0, &line, &text("x")).unwrap(), b"x");
    }

    #[test]
    fn invalid_base64_is_malformed() {
        let err = decode_record(2, "@@not base64@@", &text("g3.gnbs")).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { index: 2, .. }));
        assert!(err.to_string().contains("g3.gnbs"));
    }

    #[test]
    fn binary_mode_accepts_non_utf8() {
        let raw = [0xffu8, 0x00, 0xfe];
        let line = STANDARD.encode(raw);

        let binary = ResourceEntry::new("blob", DecodeMode::Binary);
        assert_eq!(decode_record(0, &line, &binary).unwrap(), raw);
        assert!(decode_record(0, &line, &text("blob")).is_err());
    }

    #[tokio::test]
    async fn bundle_is_decoded_positionally() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("build.b64");
        let records = ["first", "second", "third", "ignored extra"];
        let body: Vec<_> = records.iter().map(|r| STANDARD.encode(r)).collect();
        std::fs::write(&bundle, body.join("\n")).unwrap();

        let entries = [text("Graphs/a"), text("Graphs/b"), text("c")];
        let out = dir.path().join("out");
        let mut seen = Vec::new();

        let written = decode_bundle(&bundle, &entries, &out, |e| {
            seen.push(e.relative_path.clone())
        })
        .await
        .unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(std::fs::read_to_string(out.join("Graphs/a")).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(out.join("Graphs/b")).unwrap(), "second");
        assert_eq!(std::fs::read_to_string(out.join("c")).unwrap(), "third");
        assert_eq!(seen, [PathBuf::from("Graphs/a"), "Graphs/b".into(), "c".into()]);
    }

    #[tokio::test]
    async fn short_bundle_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("build.b64");
        std::fs::write(&bundle, format!("{}\n", STANDARD.encode("only one"))).unwrap();

        let entries = [text("a"), text("b"), text("c")];
        let err = decode_bundle(&bundle, &entries, dir.path(), |_| {})
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::ShortBundle {
                expected: 3,
                found: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn missing_bundle_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode_bundle(&dir.path().join("absent.b64"), &[text("a")], dir.path(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fs { .. }));
    }
}
