//! Access to zip archives of submission files.

use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use zip::ZipArchive;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid zip archive {}: {source}", path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

fn open(path: &Path) -> Result<ZipArchive<File>, ArchiveError> {
    let file = File::open(path).map_err(|source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ZipArchive::new(file).map_err(|source| ArchiveError::Zip {
        path: path.to_path_buf(),
        source,
    })
}

/// Final path component of an archive entry name
pub fn entry_basename(name: &str) -> &str {
    name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name)
}

/// Entries that carry no submission: blanks, dotfiles, and macOS resource forks
pub fn is_hidden_entry(name: &str) -> bool {
    let base = entry_basename(name);
    base.is_empty() || base.starts_with('.') || name.contains("__MACOSX")
}

/// Basenames of the file entries in an archive, in archive order.
///
/// Directories and hidden entries are skipped.
///
/// # Errors
///
/// Returns `ArchiveError` if the archive cannot be opened or an entry cannot
/// be read.
pub fn entry_names(path: &Path) -> Result<Vec<String>, ArchiveError> {
    let mut archive = open(path)?;
    let mut names = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|source| ArchiveError::Zip {
            path: path.to_path_buf(),
            source,
        })?;
        if entry.is_dir() || is_hidden_entry(entry.name()) {
            continue;
        }
        names.push(entry_basename(entry.name()).to_string());
    }

    debug!("{} submission entries in {}", names.len(), path.display());
    Ok(names)
}

/// Whether `dest` is missing or older than `archive`
///
/// # Errors
///
/// Returns `ArchiveError::Io` if the archive's metadata cannot be read.
pub fn needs_extraction(archive: &Path, dest: &Path) -> Result<bool, ArchiveError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ArchiveError::Io { path, source }
    };

    if !dest.exists() {
        return Ok(true);
    }
    let archive_time = archive
        .metadata()
        .and_then(|m| m.modified())
        .map_err(io_err(archive))?;
    let dest_time = dest
        .metadata()
        .and_then(|m| m.modified())
        .map_err(io_err(dest))?;
    Ok(dest_time < archive_time)
}

/// Extract every entry of `archive` into a fresh `dest` directory
///
/// # Errors
///
/// Returns `ArchiveError` if `dest` cannot be replaced or extraction fails.
pub fn extract(archive: &Path, dest: &Path) -> Result<(), ArchiveError> {
    let io_err = |source| ArchiveError::Io {
        path: dest.to_path_buf(),
        source,
    };

    if dest.exists() {
        std::fs::remove_dir_all(dest).map_err(io_err)?;
    }
    std::fs::create_dir_all(dest).map_err(io_err)?;

    open(archive)?
        .extract(dest)
        .map_err(|source| ArchiveError::Zip {
            path: archive.to_path_buf(),
            source,
        })?;

    info!("extracted {} into {}", archive.display(), dest.display());
    Ok(())
}

/// Extract `archive` into `dest` unless `dest` is already up to date.
///
/// Returns whether extraction happened.
///
/// # Errors
///
/// See [`needs_extraction`] and [`extract`].
pub fn ensure_extracted(archive: &Path, dest: &Path) -> Result<bool, ArchiveError> {
    if needs_extraction(archive, dest)? {
        extract(archive, dest)?;
        Ok(true)
    } else {
        info!("{} is up to date; not extracting", dest.display());
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[&str]) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        for name in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, FileOptions::default()).unwrap();
            } else {
                zip.start_file(*name, FileOptions::default()).unwrap();
                zip.write_all(b"content").unwrap();
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_entry_basename() {
        assert_eq!(entry_basename("a/b/c.txt"), "c.txt");
        assert_eq!(entry_basename("c.txt"), "c.txt");
        assert_eq!(entry_basename("dir/"), "");
    }

    #[test]
    fn test_hidden_entries() {
        assert!(is_hidden_entry(".DS_Store"));
        assert!(is_hidden_entry("__MACOSX/._smithann_1_2_a.py"));
        assert!(is_hidden_entry(""));
        assert!(!is_hidden_entry("smithann_1_2_a.py"));
    }

    #[test]
    fn test_entry_names_skips_dirs_and_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("submissions.zip");
        write_zip(
            &zip_path,
            &[
                "smithann_1_2_lab.py",
                ".DS_Store",
                "nested/",
                "nested/leeloo_1_2_lab.py",
            ],
        );

        let names = entry_names(&zip_path).unwrap();
        assert_eq!(names, vec!["smithann_1_2_lab.py", "leeloo_1_2_lab.py"]);
    }

    #[test]
    fn test_entry_names_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.zip");
        std::fs::write(&path, b"not a zip").unwrap();
        assert!(matches!(
            entry_names(&path),
            Err(ArchiveError::Zip { .. })
        ));
        assert!(matches!(
            entry_names(&dir.path().join("missing.zip")),
            Err(ArchiveError::Io { .. })
        ));
    }

    #[test]
    fn test_ensure_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("submissions.zip");
        let dest = dir.path().join("submissions");
        write_zip(&zip_path, &["smithann_1_2_lab.py"]);

        assert!(ensure_extracted(&zip_path, &dest).unwrap());
        assert!(dest.join("smithann_1_2_lab.py").is_file());
        assert!(!ensure_extracted(&zip_path, &dest).unwrap());
    }
}
