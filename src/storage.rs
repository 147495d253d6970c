//! Storage layout for td
//!
//! All state lives in one data directory (default: the platform data
//! dir for "td", overridable with `--data-dir` / `TD_DATA_DIR`):
//!
//! ```text
//! <data_dir>/
//!   config.toml     # optional configuration
//!   owner           # persisted default owner identity
//!   tasks.json      # snapshot of all task records
//!   tasks.json.lock # writer lock for snapshot mutations
//!   events.jsonl    # append-only change log
//! ```
//!
//! Snapshot writes are atomic (temp file + rename) so concurrent readers
//! never see a partial file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

const CONFIG_FILE: &str = "config.toml";
const OWNER_FILE: &str = "owner";
const TASKS_FILE: &str = "tasks.json";
const EVENTS_FILE: &str = "events.jsonl";

/// Storage manager for the td data directory
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Resolve the data directory: explicit path if given, otherwise the
    /// platform default (e.g. `~/.local/share/td` on Linux).
    pub fn resolve(data_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = data_dir {
            return Ok(Self::new(dir));
        }
        let dirs = directories::ProjectDirs::from("", "", "td").ok_or_else(|| {
            Error::InvalidConfig("cannot determine a data directory; pass --data-dir".to_string())
        })?;
        Ok(Self::new(dirs.data_dir().to_path_buf()))
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    pub fn owner_file(&self) -> PathBuf {
        self.data_dir.join(OWNER_FILE)
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.data_dir.join(TASKS_FILE)
    }

    pub fn tasks_lock_file(&self) -> PathBuf {
        self.data_dir.join(format!("{TASKS_FILE}.lock"))
    }

    pub fn events_file(&self) -> PathBuf {
        self.data_dir.join(EVENTS_FILE)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Create the data directory and touch the event log.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let events = self.events_file();
        if !events.exists() {
            File::create(&events)?;
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.data_dir.exists()
    }

    // =========================================================================
    // File I/O helpers
    // =========================================================================

    /// Write JSON data atomically (write to temp, then rename).
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        self.write_atomic(path, json.as_bytes())
    }

    /// Read JSON data from a file.
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(data)
    }

    /// Write data atomically using temp file + rename.
    pub fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Temp file in the same directory, so the rename stays atomic.
        let temp_path = path.with_extension(format!("tmp.{}", std::process::id()));

        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Append one record as a JSON line.
    pub fn append_jsonl<T: Serialize>(&self, path: &Path, record: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let line = serde_json::to_string(record)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Read every record from a JSONL file, skipping blank lines.
    /// A missing file reads as empty.
    pub fn read_jsonl<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            records.push(serde_json::from_str(trimmed)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        count: u32,
    }

    fn storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().join("td"));
        storage.init().expect("init");
        (dir, storage)
    }

    #[test]
    fn init_creates_dir_and_event_log() {
        let (_guard, storage) = storage();
        assert!(storage.is_initialized());
        assert!(storage.events_file().exists());
    }

    #[test]
    fn json_round_trip_is_atomic_to_final_path() {
        let (_guard, storage) = storage();
        let path = storage.tasks_file();
        let value = Sample { name: "report".to_string(), count: 3 };

        storage.write_json(&path, &value).expect("write");
        let loaded: Sample = storage.read_json(&path).expect("read");
        assert_eq!(loaded, value);

        // No temp file left behind.
        let leftovers: Vec<_> = fs::read_dir(storage.data_dir())
            .expect("read_dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains("tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn jsonl_append_and_read_skip_blank_lines() {
        let (_guard, storage) = storage();
        let path = storage.events_file();
        storage
            .append_jsonl(&path, &Sample { name: "a".to_string(), count: 1 })
            .expect("append");
        storage
            .append_jsonl(&path, &Sample { name: "b".to_string(), count: 2 })
            .expect("append");

        let mut raw = fs::read_to_string(&path).expect("read");
        raw.push('\n');
        fs::write(&path, raw).expect("write");

        let records: Vec<Sample> = storage.read_jsonl(&path).expect("read jsonl");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "b");
    }

    #[test]
    fn missing_jsonl_reads_as_empty() {
        let (_guard, storage) = storage();
        let records: Vec<Sample> = storage
            .read_jsonl(&storage.data_dir().join("absent.jsonl"))
            .expect("read");
        assert!(records.is_empty());
    }
}
