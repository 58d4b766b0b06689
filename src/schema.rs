//! Persisted result types.
//!
//! Each backend writes one JSON object mapping an operation label to a flat
//! record. Operations benchmarked under two different queries (the two
//! `select` variants) carry a second set of fields suffixed with `_2`:
//!
//! ```json
//! {
//!   "select": {
//!     "iterations": 100,
//!     "total_execution_time": 1.2,
//!     "mean_time": 0.012,
//!     "variance_time": 0.00001,
//!     "iterations_2": 100,
//!     "total_execution_time_2": 0.8,
//!     "mean_time_2": 0.008,
//!     "variance_time_2": 0.0
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::PersistError;

/// Aggregated statistics over repeated timings of one operation.
///
/// Times are in seconds, rounded to five decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub iterations: usize,
    pub total_execution_time: f64,
    pub mean_time: f64,
    pub variance_time: f64,
}

/// Which set of fields of an [`OperationRecord`] a summary lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Primary,
    /// The `_2`-suffixed fields.
    Secondary,
}

/// One label's entry in a results file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    #[serde(default)]
    pub iterations: usize,
    #[serde(default)]
    pub total_execution_time: f64,
    #[serde(default)]
    pub mean_time: f64,
    #[serde(default)]
    pub variance_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations_2: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_execution_time_2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_time_2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance_time_2: Option<f64>,
}

impl OperationRecord {
    pub fn primary(&self) -> ResultSummary {
        ResultSummary {
            iterations: self.iterations,
            total_execution_time: self.total_execution_time,
            mean_time: self.mean_time,
            variance_time: self.variance_time,
        }
    }

    /// The `_2` summary, present only when every suffixed field is.
    pub fn secondary(&self) -> Option<ResultSummary> {
        Some(ResultSummary {
            iterations: self.iterations_2?,
            total_execution_time: self.total_execution_time_2?,
            mean_time: self.mean_time_2?,
            variance_time: self.variance_time_2?,
        })
    }

    pub fn set(&mut self, slot: Slot, s: ResultSummary) {
        match slot {
            Slot::Primary => {
                self.iterations = s.iterations;
                self.total_execution_time = s.total_execution_time;
                self.mean_time = s.mean_time;
                self.variance_time = s.variance_time;
            }
            Slot::Secondary => {
                self.iterations_2 = Some(s.iterations);
                self.total_execution_time_2 = Some(s.total_execution_time);
                self.mean_time_2 = Some(s.mean_time);
                self.variance_time_2 = Some(s.variance_time);
            }
        }
    }

    /// Look up a metric by its persisted field name. Unknown or absent
    /// fields read as `None`.
    pub fn metric(&self, key: &str) -> Option<f64> {
        match key {
            "iterations" => Some(self.iterations as f64),
            "total_execution_time" => Some(self.total_execution_time),
            "mean_time" => Some(self.mean_time),
            "variance_time" => Some(self.variance_time),
            "iterations_2" => self.iterations_2.map(|n| n as f64),
            "total_execution_time_2" => self.total_execution_time_2,
            "mean_time_2" => self.mean_time_2,
            "variance_time_2" => self.variance_time_2,
            _ => None,
        }
    }
}

/// Label → record mapping for one backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultsCollection {
    pub operations: BTreeMap<String, OperationRecord>,
}

impl ResultsCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `summary` under `label`, creating the record if needed.
    pub fn insert(&mut self, label: &str, slot: Slot, summary: ResultSummary) {
        self.operations
            .entry(label.to_string())
            .or_default()
            .set(slot, summary);
    }

    pub fn get(&self, label: &str) -> Option<&OperationRecord> {
        self.operations.get(label)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Read a results file written by [`ResultsCollection::save`].
    pub fn load(path: &Path) -> Result<Self, PersistError> {
        let contents = std::fs::read_to_string(path).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the collection as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| PersistError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Metadata captured at the start of a benchmark run, written next to the
/// results file so runs on different machines can be told apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Backend under test (e.g. "clickhouse", "redis").
    pub backend: String,
    /// ISO 8601 timestamp of the run start.
    pub timestamp: String,
    /// Short git commit hash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    /// Whether the working tree had uncommitted changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_dirty: Option<bool>,
    /// Crate version that produced the results.
    pub version: String,
    pub hardware: HardwareInfo,
}

/// Hardware information for reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareInfo {
    /// CPU model string.
    pub cpu: String,
    /// Number of logical cores.
    pub cores: usize,
    /// Total RAM in GB.
    pub ram_gb: u64,
    pub os: String,
    pub arch: String,
}
