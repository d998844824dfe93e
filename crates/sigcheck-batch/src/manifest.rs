//! Checksum manifest parsing.
//!
//! The format is the one produced by `sha256sum` and friends: one entry per
//! line, `<hex-digest> <file-name>`, separated by any whitespace. Parsing is
//! all-or-nothing; a single bad line rejects the whole manifest.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use sigcheck_verify::DigestAlgorithm;
use tracing::warn;

use crate::data::{StorageLayout, WorkItem};
use crate::error::ManifestError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManifestOptions {
    /// Reject duplicate file names instead of keeping the last digest.
    pub strict: bool,
}

impl ManifestOptions {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Expected digest per file name. Read-only once parsed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    pub fn open(path: impl AsRef<Path>, options: ManifestOptions) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ManifestError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(BufReader::new(file), options)
    }

    pub fn parse<R: BufRead>(reader: R, options: ManifestOptions) -> Result<Self, ManifestError> {
        let mut entries = BTreeMap::new();

        for (index, bytes) in reader.split(b'\n').enumerate() {
            let mut bytes = bytes.map_err(ManifestError::Read)?;
            let line_number = index + 1;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            // Names are kept as text; a line that is not UTF-8 cannot name a file.
            let line = String::from_utf8(bytes).map_err(|err| ManifestError::MalformedLine {
                line_number,
                line: String::from_utf8_lossy(err.as_bytes()).into_owned(),
            })?;

            let fields: Vec<&str> = line.split_whitespace().collect();
            let [digest, name] = fields[..] else {
                return Err(ManifestError::MalformedLine {
                    line_number,
                    line: line.clone(),
                });
            };

            match entries.entry(name.to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(digest.to_string());
                }
                Entry::Occupied(_) if options.strict => {
                    return Err(ManifestError::DuplicateEntry {
                        name: name.to_string(),
                        line_number,
                    });
                }
                Entry::Occupied(mut slot) => {
                    warn!(file = name, line_number, "duplicate manifest entry, keeping the later digest");
                    slot.insert(digest.to_string());
                }
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, name: &str) -> Option<&str> { self.entries.get(name).map(String::as_str) }

    /// Entries in file-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, digest)| (name.as_str(), digest.as_str()))
    }

    /// Names whose digest does not have the hex length `algorithm` produces.
    /// Usually a sign the manifest was written with another algorithm.
    pub fn wrong_length(&self, algorithm: DigestAlgorithm) -> Vec<&str> {
        let hex_len = algorithm.output_len() * 2;
        self.iter()
            .filter(|(_, digest)| digest.len() != hex_len)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn work_items(&self, layout: &StorageLayout) -> Vec<WorkItem> {
        self.iter()
            .map(|(name, digest)| WorkItem::new(name, layout.resolve(name), digest))
            .collect()
    }
}

impl FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s.as_bytes(), ManifestOptions::default()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Read};
    use std::path::PathBuf;

    const SAMPLE: &str = "\
0c4ccc63a912bbd6d45174251415c089522e5c0e75286794ab1f86cb8e2561fd  taxi-01.csv
f427b5880e9164ec1e6cda53aa4b2d1f1e470da973e5b51748c806ea5c57cbdf  taxi-02.csv
";

    #[test]
    fn parses_two_column_lines() {
        let manifest: Manifest = SAMPLE.parse().unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(
            manifest.get("taxi-02.csv"),
            Some("f427b5880e9164ec1e6cda53aa4b2d1f1e470da973e5b51748c806ea5c57cbdf")
        );
    }

    #[test]
    fn non_utf8_line_is_malformed() {
        let input: &[u8] = b"abc  one.txt\ndef  caf\xe9.csv\n";
        let err = Manifest::parse(input, ManifestOptions::default()).unwrap_err();

        match err {
            ManifestError::MalformedLine { line_number, line } => {
                assert_eq!(line_number, 2);
                assert!(line.starts_with("def  caf"));
            }
            other => panic!("expected MalformedLine, got {other:?}"),
        }
    }

    #[test]
    fn crlf_is_not_part_of_the_reported_line() {
        let err = "abc one.txt extra\r\n".parse::<Manifest>().unwrap_err();
        assert!(matches!(
            err,
            ManifestError::MalformedLine { line_number: 1, ref line } if line == "abc one.txt extra"
        ));
    }

    #[test]
    fn digest_length_checked_against_algorithm() {
        let manifest: Manifest = SAMPLE.parse().unwrap();
        assert!(manifest.wrong_length(DigestAlgorithm::Sha256).is_empty());
        assert_eq!(manifest.wrong_length(DigestAlgorithm::Sha1), vec!["taxi-01.csv", "taxi-02.csv"]);

        let short: Manifest = "abc one.txt\n".parse().unwrap();
        assert_eq!(short.wrong_length(DigestAlgorithm::Sha256), vec!["one.txt"]);
    }

    #[test]
    fn accepts_crlf_and_tabs() {
        let manifest: Manifest = "abc\tone.txt\r\ndef   two.txt\r\n".parse().unwrap();
        assert_eq!(manifest.get("one.txt"), Some("abc"));
        assert_eq!(manifest.get("two.txt"), Some("def"));
    }

    #[test]
    fn empty_input_is_empty_manifest() {
        let manifest: Manifest = "".parse().unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn single_token_line_rejects_everything() {
        let err = "abc one.txt\nlonely\ndef two.txt\n".parse::<Manifest>().unwrap_err();
        assert!(matches!(
            err,
            ManifestError::MalformedLine { line_number: 2, ref line } if line == "lonely"
        ));
    }

    #[test]
    fn three_token_line_is_malformed() {
        let err = "abc one.txt extra\n".parse::<Manifest>().unwrap_err();
        assert!(matches!(err, ManifestError::MalformedLine { line_number: 1, .. }));
    }

    #[test]
    fn blank_line_in_the_middle_is_malformed() {
        let err = "abc one.txt\n\ndef two.txt\n".parse::<Manifest>().unwrap_err();
        assert!(matches!(err, ManifestError::MalformedLine { line_number: 2, .. }));
    }

    #[test]
    fn duplicate_keeps_last_by_default() {
        let manifest: Manifest = "old a.dat\nnew a.dat\n".parse().unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.get("a.dat"), Some("new"));
    }

    #[test]
    fn duplicate_rejected_in_strict_mode() {
        let options = ManifestOptions::default().strict(true);
        let err = Manifest::parse("old a.dat\nnew a.dat\n".as_bytes(), options).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::DuplicateEntry { ref name, line_number: 2 } if name == "a.dat"
        ));
    }

    #[test]
    fn read_failure_is_not_a_parse_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("device gone"))
            }
        }

        let err = Manifest::parse(io::BufReader::new(Broken), ManifestOptions::default()).unwrap_err();
        assert!(matches!(err, ManifestError::Read(_)));
    }

    #[test]
    fn missing_manifest_file() {
        let err = Manifest::open("/definitely/not/here/sha256sum.txt", ManifestOptions::default())
            .unwrap_err();
        assert!(matches!(err, ManifestError::Open { .. }));
    }

    #[test]
    fn work_items_follow_layout() {
        let manifest: Manifest = SAMPLE.parse().unwrap();
        let layout = StorageLayout::new("/data").suffix(".bz2");

        let items = manifest.work_items(&layout);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "taxi-01.csv");
        assert_eq!(items[0].path, PathBuf::from("/data/taxi-01.csv.bz2"));
        assert_eq!(
            items[0].expected,
            "0c4ccc63a912bbd6d45174251415c089522e5c0e75286794ab1f86cb8e2561fd"
        );
    }
}
