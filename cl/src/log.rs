//! Generic typed JSONL log file
//!
//! One record per line, serialized with serde_json. Appends take an exclusive
//! file lock so concurrent CLI invocations interleave at line granularity.
//! Reads are tolerant: lines that fail to parse are skipped with a warning,
//! never surfaced as errors.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while appending to a log
#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A typed append-only JSON-lines file
///
/// The type parameter fixes the record shape for both appends and reads.
pub struct JsonlLog<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> JsonlLog<T> {
    /// Create a handle for the given file path (the file need not exist yet)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!(?path, "JsonlLog::new: called");
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the underlying file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn io_err(&self, source: std::io::Error) -> LogError {
        LogError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl<T: Serialize> JsonlLog<T> {
    /// Append one record as a single JSON line
    ///
    /// Creates parent directories on first use. The file is locked
    /// exclusively for the duration of the write so two processes never
    /// interleave within a line.
    pub fn append(&self, record: &T) -> Result<(), LogError> {
        debug!(path = ?self.path, "JsonlLog::append: called");

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;

        file.lock_exclusive().map_err(|e| self.io_err(e))?;

        let line = serde_json::to_string(record)?;
        let result = writeln!(file, "{}", line).map_err(|e| self.io_err(e));

        let _ = fs2::FileExt::unlock(&file);
        result
    }
}

impl<T: DeserializeOwned> JsonlLog<T> {
    /// Read every parseable record in file order
    ///
    /// A missing file yields an empty vec. Unparseable lines are skipped
    /// with a warning so a torn write or hand edit never poisons the log.
    pub fn read_all(&self) -> Result<Vec<T>, LogError> {
        debug!(path = ?self.path, "JsonlLog::read_all: called");

        if !self.path.exists() {
            debug!("JsonlLog::read_all: file does not exist, returning empty");
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).map_err(|e| self.io_err(e))?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| self.io_err(e))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(path = ?self.path, lineno, error = %e, "JsonlLog::read_all: skipping unparseable line");
                }
            }
        }

        debug!(count = records.len(), "JsonlLog::read_all: loaded records");
        Ok(records)
    }

    /// Read the last `n` parseable records in file order
    pub fn tail(&self, n: usize) -> Result<Vec<T>, LogError> {
        debug!(path = ?self.path, n, "JsonlLog::tail: called");
        let mut records = self.read_all()?;
        if records.len() > n {
            records.drain(..records.len() - n);
        }
        Ok(records)
    }

    /// Number of parseable records in the file
    pub fn count(&self) -> Result<usize, LogError> {
        Ok(self.read_all()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entry {
        n: u32,
        text: String,
    }

    fn entry(n: u32) -> Entry {
        Entry {
            n,
            text: format!("entry {}", n),
        }
    }

    #[test]
    fn test_append_creates_parent_dirs() {
        let temp = tempdir().unwrap();
        let log: JsonlLog<Entry> = JsonlLog::new(temp.path().join("nested").join("log.jsonl"));

        log.append(&entry(1)).unwrap();

        assert!(log.exists());
        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_append_then_read_all() {
        let temp = tempdir().unwrap();
        let log: JsonlLog<Entry> = JsonlLog::new(temp.path().join("log.jsonl"));

        log.append(&entry(1)).unwrap();
        log.append(&entry(2)).unwrap();
        log.append(&entry(3)).unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records, vec![entry(1), entry(2), entry(3)]);
    }

    #[test]
    fn test_read_all_missing_file() {
        let temp = tempdir().unwrap();
        let log: JsonlLog<Entry> = JsonlLog::new(temp.path().join("absent.jsonl"));

        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_read_all_skips_bad_lines() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("log.jsonl");
        let log: JsonlLog<Entry> = JsonlLog::new(&path);

        log.append(&entry(1)).unwrap();
        fs::write(
            &path,
            format!(
                "{}\nnot json at all\n{{\"n\": \"wrong type\"}}\n{}\n",
                serde_json::to_string(&entry(1)).unwrap(),
                serde_json::to_string(&entry(2)).unwrap()
            ),
        )
        .unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records, vec![entry(1), entry(2)]);
    }

    #[test]
    fn test_tail() {
        let temp = tempdir().unwrap();
        let log: JsonlLog<Entry> = JsonlLog::new(temp.path().join("log.jsonl"));

        for n in 1..=5 {
            log.append(&entry(n)).unwrap();
        }

        let last_two = log.tail(2).unwrap();
        assert_eq!(last_two, vec![entry(4), entry(5)]);

        // Tail larger than file returns everything
        assert_eq!(log.tail(100).unwrap().len(), 5);
    }

    #[test]
    fn test_count() {
        let temp = tempdir().unwrap();
        let log: JsonlLog<Entry> = JsonlLog::new(temp.path().join("log.jsonl"));
        assert_eq!(log.count().unwrap(), 0);

        log.append(&entry(1)).unwrap();
        log.append(&entry(2)).unwrap();
        assert_eq!(log.count().unwrap(), 2);
    }
}
