use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

/// Best-ever results, persisted across runs.
///
/// Field names in the serialized form match the original record file layout,
/// so an existing records file keeps working.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSet {
    #[serde(rename = "bestCPS")]
    pub best_cps: f64,
    #[serde(rename = "best5s")]
    pub best_5s: u64,
    #[serde(rename = "best10s")]
    pub best_10s: u64,
    #[serde(rename = "best30s")]
    pub best_30s: u64,
}

impl Default for RecordSet {
    fn default() -> Self {
        Self {
            best_cps: 0.0,
            best_5s: 0,
            best_10s: 0,
            best_30s: 0,
        }
    }
}

impl RecordSet {
    /// Fold a finished timed session into the records.
    ///
    /// Each field updates independently; returns true when anything changed
    /// so the caller can raise a "new record" notice. Ties never update.
    pub fn apply_result(&mut self, final_cps: f64, duration_secs: u64, count: u64) -> bool {
        let mut updated = false;

        if final_cps > self.best_cps {
            self.best_cps = final_cps;
            updated = true;
        }

        match duration_secs {
            5 if count > self.best_5s => {
                self.best_5s = count;
                updated = true;
            }
            10 if count > self.best_10s => {
                self.best_10s = count;
                updated = true;
            }
            30 if count > self.best_30s => {
                self.best_30s = count;
                updated = true;
            }
            _ => {}
        }

        updated
    }

    /// Stored best count for one of the fixed durations, if any.
    pub fn best_count_for(&self, duration_secs: u64) -> Option<u64> {
        match duration_secs {
            5 => Some(self.best_5s),
            10 => Some(self.best_10s),
            30 => Some(self.best_30s),
            _ => None,
        }
    }
}

/// Which path `load` actually took; tests assert on this instead of
/// guessing from the returned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Missing,
    Malformed,
}

pub trait RecordStore {
    fn load(&self) -> (RecordSet, LoadOutcome);
    fn save(&self, records: &RecordSet) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new() -> Self {
        let path = AppDirs::records_path().unwrap_or_else(|| PathBuf::from("tapr_records.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self) -> (RecordSet, LoadOutcome) {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<RecordSet>(&bytes) {
                Ok(records) => (records, LoadOutcome::Loaded),
                Err(_) => (RecordSet::default(), LoadOutcome::Malformed),
            },
            Err(_) => (RecordSet::default(), LoadOutcome::Missing),
        }
    }

    fn save(&self, records: &RecordSet) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(records).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
