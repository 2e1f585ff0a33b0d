//! In-place rewrite of marker lines through a temporary copy.

use nimlink_common::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// One marker whose value should be replaced.
pub(crate) struct LineUpdate<'a> {
    marker: &'a str,
    value: &'a str,
    applied: bool,
}

impl<'a> LineUpdate<'a> {
    pub(crate) fn new(marker: &'a str, value: &'a str) -> Self {
        Self {
            marker,
            value,
            applied: false,
        }
    }
}

/// Byte offset of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Lines of `reader` without their `\n` or `\r\n` terminator.
pub(crate) fn lines<R: BufRead>(reader: R) -> impl Iterator<Item = std::io::Result<Vec<u8>>> {
    reader.split(b'\n').map(|line| {
        line.map(|mut bytes| {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            bytes
        })
    })
}

/// Apply every not-yet-applied update whose marker occurs in `line`.
///
/// Everything up to and including the marker is kept; the rest of the line is
/// replaced by the new value. Each update applies to its first matching line
/// only.
fn apply(mut line: Vec<u8>, updates: &mut [LineUpdate<'_>]) -> Vec<u8> {
    for update in updates.iter_mut().filter(|u| !u.applied) {
        if let Some(pos) = find(&line, update.marker.as_bytes()) {
            line.truncate(pos + update.marker.len());
            line.extend_from_slice(update.value.as_bytes());
            update.applied = true;
        }
    }
    line
}

/// A copy of the preferences file that is removed when dropped.
struct TempCopy {
    original: PathBuf,
    path: PathBuf,
}

impl TempCopy {
    fn create(original: &Path, path: &Path) -> Result<Self> {
        if let Err(e) = std::fs::copy(original, path) {
            // A failed copy can leave a partial file behind.
            if std::fs::remove_file(path).is_ok() {
                tracing::debug!("Removed partial temporary copy {}", path.display());
            }
            return Err(Error::storage(
                path,
                format!("failed to create temporary copy: {e}"),
            ));
        }
        Ok(Self {
            original: original.to_path_buf(),
            path: path.to_path_buf(),
        })
    }

    /// Put the untouched copy back after a failed rewrite.
    fn restore(&self) {
        if let Err(e) = std::fs::copy(&self.path, &self.original) {
            tracing::warn!(
                "Failed to restore {:?} from temporary copy: {}",
                self.original,
                e
            );
        }
    }
}

impl Drop for TempCopy {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!("Failed to remove temporary copy {:?}: {}", self.path, e);
        }
    }
}

/// Rewrite `path` line by line with `\n` endings, applying `updates`.
///
/// With `append_missing`, updates whose marker never matched are appended as
/// new `marker + value` lines at the end of the file.
pub(crate) fn rewrite_file(
    path: &Path,
    temp_path: &Path,
    updates: &mut [LineUpdate<'_>],
    append_missing: bool,
) -> Result<()> {
    let copy = TempCopy::create(path, temp_path)?;

    let reader = File::open(&copy.path).map(BufReader::new).map_err(|e| {
        Error::storage(&copy.path, format!("failed to open temporary copy: {e}"))
    })?;

    let result = stream(reader, path, updates, append_missing);
    if result.is_err() {
        copy.restore();
    }
    result
}

fn stream<R: BufRead>(
    reader: R,
    path: &Path,
    updates: &mut [LineUpdate<'_>],
    append_missing: bool,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    for line in lines(reader) {
        let line = apply(line?, updates);
        writer.write_all(&line)?;
        writer.write_all(b"\n")?;
    }

    if append_missing {
        for update in updates.iter().filter(|u| !u.applied) {
            writer.write_all(update.marker.as_bytes())?;
            writer.write_all(update.value.as_bytes())?;
            writer.write_all(b"\n")?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find() {
        assert_eq!(find(b"  NIM_URL=x", b"NIM_URL="), Some(2));
        assert_eq!(find(b"NIM_UR", b"NIM_URL="), None);
        assert_eq!(find(b"abc", b""), None);
    }

    #[test]
    fn test_apply_keeps_prefix() {
        let mut updates = [LineUpdate::new("NIM_URL=", "http://new")];
        let line = apply(b"  # keep NIM_URL=http://old".to_vec(), &mut updates);
        assert_eq!(line, b"  # keep NIM_URL=http://new");
        assert!(updates[0].applied);
    }

    #[test]
    fn test_apply_only_first_match() {
        let mut updates = [LineUpdate::new("NIM_URL=", "new")];
        let first = apply(b"NIM_URL=a".to_vec(), &mut updates);
        let second = apply(b"NIM_URL=b".to_vec(), &mut updates);
        assert_eq!(first, b"NIM_URL=new");
        assert_eq!(second, b"NIM_URL=b");
    }

    #[test]
    fn test_failed_temp_copy_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("prefs.nim");
        let temp = dir.path().join("prefs.nimtemp");
        std::fs::write(&temp, "NIM_URL=partial").unwrap();

        assert!(TempCopy::create(&missing, &temp).is_err());
        assert!(!temp.exists());
    }

    #[test]
    fn test_lines_strip_crlf() {
        let input: &[u8] = b"a\r\nb\nc";
        let collected: Vec<Vec<u8>> = lines(input).map(|l| l.unwrap()).collect();
        assert_eq!(collected, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn test_rewrite_removes_temp_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.nim");
        let temp = dir.path().join("prefs.nimtemp");
        std::fs::write(&path, "NIM_URL=old\r\nOTHER=1\r\n").unwrap();

        let mut updates = [LineUpdate::new("NIM_URL=", "new")];
        rewrite_file(&path, &temp, &mut updates, false).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "NIM_URL=new\nOTHER=1\n");
        assert!(!temp.exists());
    }

    #[test]
    fn test_rewrite_appends_missing_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.nim");
        let temp = dir.path().join("prefs.nimtemp");
        std::fs::write(&path, "NIM_URL=old\n").unwrap();

        let mut updates = [LineUpdate::new("Photoshop_jobID=", "42")];
        rewrite_file(&path, &temp, &mut updates, true).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "NIM_URL=old\nPhotoshop_jobID=42\n"
        );
    }

    #[test]
    fn test_rewrite_missing_source_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.nim");
        let temp = dir.path().join("absent.nimtemp");

        let mut updates = [LineUpdate::new("NIM_URL=", "new")];
        let err = rewrite_file(&path, &temp, &mut updates, false).unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
        assert!(!temp.exists());
    }
}
