//! Checksum Manifest
//!
//! SHA-512 digests over the output files produced by a run, written as a
//! plain-text manifest with one `<digest> <basename>` line per file.

use crate::error::{Result, TapeDumpError};
use sha2::{Digest, Sha512};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const READ_CHUNK: usize = 1024 * 1024;

/// Hex SHA-512 digest of one file, read in chunks so very large
/// extractions are hashed in constant memory.
pub fn file_sha512(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha512::new();
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Write the manifest covering every file in `dir` whose extension
/// matches `extension`, sorted by name so repeated runs over the same
/// directory produce identical manifests.
pub fn write_manifest(dir: &Path, extension: &str, manifest_path: &Path) -> Result<()> {
    let files = matching_files(dir, extension)?;
    let mut out = BufWriter::new(File::create(manifest_path)?);

    for path in &files {
        let digest = file_sha512(path).map_err(|e| {
            TapeDumpError::checksum(format!("cannot hash {}: {}", path.display(), e))
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        writeln!(out, "{} {}", digest, name)?;
    }

    out.flush()?;
    Ok(())
}

fn matching_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    // NIST test vector for SHA-512("abc").
    const SHA512_ABC: &str = "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
                              2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f";

    #[test]
    fn digest_matches_known_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vector.dd");
        fs::write(&path, b"abc").unwrap();

        assert_eq!(file_sha512(&path).unwrap(), SHA512_ABC);
    }

    #[test]
    fn manifest_covers_only_matching_extension_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("session000002.dd"), b"two").unwrap();
        fs::write(dir.path().join("session000001.dd"), b"one").unwrap();
        fs::write(dir.path().join("notes.txt"), b"skip me").unwrap();

        let manifest = dir.path().join("checksums.sha512");
        write_manifest(dir.path(), "dd", &manifest).unwrap();

        let text = fs::read_to_string(&manifest).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" session000001.dd"));
        assert!(lines[1].ends_with(" session000002.dd"));
        assert!(!text.contains("notes.txt"));
    }

    #[test]
    fn manifest_lines_verify_against_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session000001.dd");
        fs::write(&path, b"abc").unwrap();

        let manifest = dir.path().join("checksums.sha512");
        write_manifest(dir.path(), "dd", &manifest).unwrap();

        let text = fs::read_to_string(&manifest).unwrap();
        assert_eq!(text, format!("{} session000001.dd\n", SHA512_ABC));
    }

    #[test]
    fn empty_directory_writes_empty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("checksums.sha512");
        write_manifest(dir.path(), "dd", &manifest).unwrap();

        assert_eq!(fs::read_to_string(&manifest).unwrap(), "");
    }
}
