//! In-memory snapshot of the TLD registry
//!
//! A snapshot is the literal registry content: the raw header line, its
//! parsed version, and the entry lines in file order with comments removed.
//! Membership tests are case-insensitive; persistence reproduces the
//! header-then-entries layout byte for byte.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::registry::version::parse_version;
use crate::registry::{RegistryError, Result};

#[derive(Clone, Debug)]
pub struct TldSnapshot {
    version: u64,
    header: String,
    entries: Vec<String>,
}

impl TldSnapshot {
    pub fn new(version: u64, header: String) -> TldSnapshot {
        TldSnapshot {
            version,
            header,
            entries: Vec::new(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn add_tld(&mut self, tld: String) {
        self.entries.push(tld);
    }

    /// True if the TLD is present in the snapshot, compared
    /// case-insensitively. Entries keep their original case.
    pub fn contains(&self, tld: &str) -> bool {
        self.entries.iter().any(|e| e.eq_ignore_ascii_case(tld))
    }

    pub fn load(path: &Path) -> Result<TldSnapshot> {
        let file = File::open(path)?;
        TldSnapshot::from_reader(BufReader::new(file))
    }

    /// Parse the registry layout: line one is the header carrying the
    /// version; remaining lines are one TLD each, `#` lines are comments.
    pub fn from_reader<R: Read>(reader: BufReader<R>) -> Result<TldSnapshot> {
        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => line?,
            None => return Err(RegistryError::MissingHeader),
        };
        let version = parse_version(&header)?;

        let mut snapshot = TldSnapshot::new(version, header);
        for line in lines {
            let line = line?;
            if line.starts_with('#') {
                continue;
            }

            let entry = line.trim();
            if !entry.is_empty() {
                snapshot.add_tld(entry.to_string());
            }
        }

        Ok(snapshot)
    }

    /// Write the snapshot out as header line plus one entry per line, in
    /// original order. The content goes to a sibling temp file first and is
    /// renamed over the destination, so readers never observe a partially
    /// written file.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let tmp_path = tmp_sibling(path);

        let write_res = (|| -> Result<()> {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            writeln!(writer, "{}", self.header)?;
            for entry in &self.entries {
                writeln!(writer, "{}", entry)?;
            }
            writer.flush()?;
            Ok(())
        })();

        if let Err(e) = write_res {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(RegistryError::Io(e));
        }

        Ok(())
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {

    use super::*;

    const SAMPLE: &str = "Version 2023090100\n# comment line\nAERO\nORG\n";

    fn sample_snapshot() -> TldSnapshot {
        TldSnapshot::from_reader(BufReader::new(SAMPLE.as_bytes())).unwrap()
    }

    #[test]
    fn test_parse_sample_registry() {
        let snapshot = sample_snapshot();

        assert_eq!(snapshot.version(), 2023090100);
        assert_eq!(snapshot.header(), "Version 2023090100");
        assert_eq!(snapshot.entries(), &["AERO".to_string(), "ORG".to_string()]);
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let snapshot = sample_snapshot();

        assert!(snapshot.contains("aero"));
        assert!(snapshot.contains("AERO"));
        assert!(snapshot.contains("Aero"));
        assert!(snapshot.contains("org"));
        assert!(!snapshot.contains("com"));
    }

    #[test]
    fn test_empty_file_has_no_header() {
        let res = TldSnapshot::from_reader(BufReader::new("".as_bytes()));
        assert!(matches!(res, Err(RegistryError::MissingHeader)));
    }

    #[test]
    fn test_bad_version_line() {
        let res = TldSnapshot::from_reader(BufReader::new("not a header\nAERO\n".as_bytes()));
        assert!(matches!(res, Err(RegistryError::Version(_))));
    }

    #[test]
    fn test_persist_load_roundtrip() {
        let path = std::env::temp_dir().join("tld-verify-snapshot-roundtrip.txt");
        let snapshot = sample_snapshot();

        snapshot.persist(&path).unwrap();

        // comment lines are dropped, header and entries come back verbatim
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Version 2023090100\nAERO\nORG\n");

        let reloaded = TldSnapshot::load(&path).unwrap();
        assert_eq!(reloaded.version(), snapshot.version());
        assert_eq!(reloaded.header(), snapshot.header());
        assert_eq!(reloaded.entries(), snapshot.entries());

        // persisting what was loaded reproduces the same bytes
        reloaded.persist(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), written);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_persist_replaces_whole_file() {
        let path = std::env::temp_dir().join("tld-verify-snapshot-replace.txt");
        fs::write(&path, "Version 1\nOLDENTRYWITHLONGTAIL\nANOTHER\nMORE\n").unwrap();

        sample_snapshot().persist(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Version 2023090100\nAERO\nORG\n");
        assert!(!tmp_sibling(&path).exists());

        let _ = fs::remove_file(&path);
    }
}
