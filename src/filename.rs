//! Filename disambiguation for CSV artifacts.
//!
//! Both the per-kernel report and the host-transfer log write a CSV whose
//! name carries the smallest non-negative integer that does not already
//! exist on disk. Spec.md §9 calls the probe-then-open loop below a known
//! race under concurrent kernel ends; it is accepted because kernel ends
//! are serialized at the host.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::AiwcError;

/// Attempts to create the first `<dir>/<prefix>_<n>.csv` for `n` in
/// `0..max_attempts` that does not already exist, opening it for writing.
pub fn create_sequenced(
    dir: &Path,
    prefix: &str,
    max_attempts: u32,
) -> Result<(PathBuf, File), AiwcError> {
    for n in 0..max_attempts {
        let path = dir.join(format!("{prefix}_{n}.csv"));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(source) => return Err(AiwcError::CsvCreate { path, source }),
        }
    }
    Err(AiwcError::FilenameExhausted {
        dir: dir.to_path_buf(),
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn finds_smallest_unused_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("aiwc_k_0.csv"), "").unwrap();
        std::fs::write(dir.path().join("aiwc_k_1.csv"), "").unwrap();

        let (path, _file) = create_sequenced(dir.path(), "aiwc_k", 1000).unwrap();
        assert_eq!(path, dir.path().join("aiwc_k_2.csv"));
    }

    #[test]
    fn starts_at_zero_in_an_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _file) = create_sequenced(dir.path(), "aiwc_k", 1000).unwrap();
        assert_eq!(path, dir.path().join("aiwc_k_0.csv"));
    }
}
