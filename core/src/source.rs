//! Line source for a todo directory.
//!
//! The todo folder is flat: only regular files directly inside it are read,
//! in file-name order. Each file is opened, drained and closed before the
//! next one is touched.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{CoreError, Result};

/// The lines of one todo file, or the error that prevented reading it.
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub lines: Result<Vec<String>>,
}

/// Lists the regular files directly inside `dir`, sorted by file name.
///
/// Subdirectories are skipped. Entries that vanish while the directory is
/// being listed are ignored.
///
/// # Errors
///
/// Returns [`CoreError::ListDir`] if `dir` cannot be enumerated.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| CoreError::ListDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            if path.is_dir() {
                trace!(path = %path.display(), "Skipping subdirectory");
                return false;
            }
            true
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!(dir = %dir.display(), count = files.len(), "Listed todo files");
    Ok(files)
}

/// Reads every line of the file at `path`.
///
/// Line terminators (`\n` or `\r\n`) are removed; blank lines are kept.
///
/// # Errors
///
/// Returns [`CoreError::ReadFile`] if the file cannot be opened or is not
/// valid UTF-8.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let read_error = |source| CoreError::ReadFile {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<String>>>()
        .map_err(read_error)
}

/// Iterator over the files of a todo directory.
///
/// The listing happens up front; each file is read only when the iterator
/// reaches it.
#[derive(Debug)]
pub struct DirSource {
    files: std::vec::IntoIter<PathBuf>,
}

impl DirSource {
    /// Lists `dir` and prepares to read its files.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ListDir`] if `dir` cannot be enumerated.
    pub fn open(dir: &Path) -> Result<Self> {
        Ok(Self {
            files: list_files(dir)?.into_iter(),
        })
    }
}

impl Iterator for DirSource {
    type Item = SourceFile;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        let lines = read_lines(&path);
        Some(SourceFile { path, lines })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.files.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .filter_map(|p| p.file_name()?.to_str().map(str::to_string))
            .collect()
    }

    #[test]
    fn list_files_sorts_by_name_and_skips_directories() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("240101-a.txt"), "a").unwrap();
        fs::write(dir.path().join("c"), "c").unwrap();
        fs::create_dir(dir.path().join("archive")).unwrap();

        let files = list_files(dir.path()).unwrap();
        assert_eq!(names(&files), ["240101-a.txt", "b.txt", "c"]);
    }

    #[test]
    fn list_files_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(list_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn list_files_missing_directory_is_list_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = list_files(&missing).unwrap_err();
        assert!(matches!(err, CoreError::ListDir { .. }));
        assert_eq!(err.path(), missing);
    }

    #[test]
    fn read_lines_strips_terminators_and_keeps_blanks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.txt");
        fs::write(&path, "one\r\n\ntwo\n\tthree").unwrap();

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines, ["one", "", "two", "\tthree"]);
    }

    #[test]
    fn read_lines_rejects_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.txt");
        fs::write(&path, [0x66, 0x6f, 0xff, 0xfe, b'\n']).unwrap();

        let err = read_lines(&path).unwrap_err();
        assert!(matches!(err, CoreError::ReadFile { .. }));
    }

    #[test]
    fn read_lines_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_lines(&dir.path().join("gone.txt")).unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn dir_source_yields_each_file_in_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "first").unwrap();
        fs::write(dir.path().join("b.txt"), "second\nthird").unwrap();

        let source = DirSource::open(dir.path()).unwrap();
        assert_eq!(source.size_hint(), (2, Some(2)));

        let files: Vec<SourceFile> = source.collect();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, dir.path().join("a.txt"));
        assert_eq!(files[0].lines.as_ref().unwrap(), &["first"]);
        assert_eq!(files[1].lines.as_ref().unwrap(), &["second", "third"]);
    }
}
