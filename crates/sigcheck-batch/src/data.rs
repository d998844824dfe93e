use std::path::{Component, Path, PathBuf};

use sigcheck_codec::Compression;
use sigcheck_verify::VerificationError;

use crate::error::CheckError;

/// How manifest identifiers map to files on disk: `root/<name><suffix>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageLayout {
    pub root:        PathBuf,
    pub suffix:      String,
    pub compression: Compression,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root:        root.into(),
            suffix:      String::new(),
            compression: Compression::None,
        }
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Path of `name` under the root. The name is cleaned lexically first, so
    /// absolute names and `..` components never lead outside the root.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let mut file = confine(Path::new(name)).into_os_string();
        file.push(&self.suffix);
        self.root.join(file)
    }
}

fn confine(name: &Path) -> PathBuf {
    let mut relative = PathBuf::new();
    for component in name.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::ParentDir => {
                relative.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    relative
}

/// One file to verify.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkItem {
    pub name:     String,
    pub path:     PathBuf,
    pub expected: String,
}

impl WorkItem {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, expected: impl Into<String>) -> Self {
        Self {
            name:     name.into(),
            path:     path.into(),
            expected: expected.into(),
        }
    }
}

/// Outcome of checking one [`WorkItem`].
#[derive(Debug)]
pub struct FileResult {
    pub name:    String,
    pub path:    PathBuf,
    pub matched: bool,
    /// Hex digest actually computed, when the file could be read to the end.
    pub actual:  Option<String>,
    pub error:   Option<CheckError>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Matched,
    Mismatch,
    Error,
    Skipped,
}

impl FileResult {
    pub fn digested(item: WorkItem, actual: String) -> Self {
        Self {
            matched: actual == item.expected,
            name:    item.name,
            path:    item.path,
            actual:  Some(actual),
            error:   None,
        }
    }

    /// Result from a digest verdict, as returned by `HashingReader::finish`.
    pub fn verified(item: WorkItem, verdict: sigcheck_verify::Result<String>) -> Self {
        match verdict {
            Ok(actual) | Err(VerificationError::Mismatch { actual, .. }) => Self::digested(item, actual),
            Err(err) => Self::failed(item, CheckError::Digest(err)),
        }
    }

    pub fn failed(item: WorkItem, error: CheckError) -> Self {
        Self {
            name:    item.name,
            path:    item.path,
            matched: false,
            actual:  None,
            error:   Some(error),
        }
    }

    pub fn skipped(item: WorkItem) -> Self { Self::failed(item, CheckError::Skipped) }

    pub fn outcome(&self) -> Outcome {
        match (&self.error, self.matched) {
            (Some(CheckError::Skipped), _) => Outcome::Skipped,
            (Some(_), _) => Outcome::Error,
            (None, true) => Outcome::Matched,
            (None, false) => Outcome::Mismatch,
        }
    }
}

/// Knobs for one verification run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum number of files hashed at the same time.
    pub jobs:        usize,
    /// Stop admitting new files after the first failure.
    pub fail_fast:   bool,
    /// Read buffer per worker, in bytes.
    pub buffer_size: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            jobs:        5,
            fail_fast:   false,
            buffer_size: 64 * 1024,
        }
    }
}

impl BatchOptions {
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> WorkItem { WorkItem::new("a.dat", "/data/a.dat.bz2", "abc") }

    #[test]
    fn layout_appends_suffix() {
        let layout = StorageLayout::new("/data").suffix(".bz2");
        assert_eq!(layout.resolve("taxi-01.csv"), PathBuf::from("/data/taxi-01.csv.bz2"));
    }

    #[test]
    fn layout_without_suffix() {
        let layout = StorageLayout::new("data");
        assert_eq!(layout.resolve("a.dat"), PathBuf::from("data/a.dat"));
    }

    #[test]
    fn absolute_names_stay_under_root() {
        let layout = StorageLayout::new("/data").suffix(".bz2");
        let path = layout.resolve("/etc/passwd");

        assert_eq!(path, PathBuf::from("/data/etc/passwd.bz2"));
        assert!(path.starts_with("/data"));
    }

    #[test]
    fn parent_components_cannot_escape_root() {
        let layout = StorageLayout::new("/data").suffix(".bz2");

        assert_eq!(layout.resolve("../../etc/passwd"), PathBuf::from("/data/etc/passwd.bz2"));
        assert_eq!(layout.resolve("2024/../01/./trips.csv"), PathBuf::from("/data/01/trips.csv.bz2"));
        assert_eq!(layout.resolve("2024/01/trips.csv"), PathBuf::from("/data/2024/01/trips.csv.bz2"));
    }

    #[test]
    fn outcome_classification() {
        assert_eq!(FileResult::digested(item(), "abc".into()).outcome(), Outcome::Matched);
        assert_eq!(FileResult::digested(item(), "ABC".into()).outcome(), Outcome::Mismatch);
        assert_eq!(FileResult::skipped(item()).outcome(), Outcome::Skipped);

        let err = CheckError::Read {
            path:   PathBuf::from("/data/a.dat.bz2"),
            source: std::io::Error::other("boom"),
        };
        let failed = FileResult::failed(item(), err);
        assert_eq!(failed.outcome(), Outcome::Error);
        assert!(!failed.matched);
        assert!(failed.actual.is_none());
    }

    #[test]
    fn verdicts_map_to_outcomes() {
        let matched = FileResult::verified(item(), Ok("abc".into()));
        assert_eq!(matched.outcome(), Outcome::Matched);

        let mismatch = FileResult::verified(
            item(),
            Err(VerificationError::Mismatch {
                expected: "abc".into(),
                actual:   "def".into(),
            }),
        );
        assert_eq!(mismatch.outcome(), Outcome::Mismatch);
        assert_eq!(mismatch.actual.as_deref(), Some("def"));

        let broken = FileResult::verified(item(), Err(VerificationError::Unsupported("blake3")));
        assert!(matches!(broken.error, Some(CheckError::Digest(_))));
        assert_eq!(broken.outcome(), Outcome::Error);
    }

    #[test]
    fn batch_options_default() {
        let options = BatchOptions::default();
        assert_eq!(options.jobs, 5);
        assert!(!options.fail_fast);
        assert_eq!(options.buffer_size, 64 * 1024);
    }
}
