//! Result recorder for one backend's benchmark session.
//!
//! Accumulates summaries by operation label and writes them once, at the end
//! of the run, to a fixed file name (e.g. `clickhouse_dict.json`). Run
//! metadata goes to a `<stem>.meta.json` sidecar so the results file keeps the
//! flat shape the comparison report reads.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::PersistError;
use crate::schema::{HardwareInfo, ResultSummary, ResultsCollection, RunMetadata, Slot};

/// Accumulates benchmark results and writes them to a JSON file.
pub struct ResultRecorder {
    metadata: RunMetadata,
    results: ResultsCollection,
}

impl ResultRecorder {
    /// Create a recorder for `backend`.
    ///
    /// Captures metadata (hardware, git, timestamp) at construction time.
    pub fn new(backend: &str) -> Self {
        let metadata = RunMetadata {
            backend: backend.to_string(),
            timestamp: iso8601_now(),
            git_commit: git_short_commit(),
            git_branch: git_branch(),
            git_dirty: git_is_dirty(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            hardware: capture_hardware(),
        };
        tracing::info!(
            backend,
            cpu = %metadata.hardware.cpu,
            cores = metadata.hardware.cores,
            ram_gb = metadata.hardware.ram_gb,
            commit = metadata.git_commit.as_deref().unwrap_or("unknown"),
            "benchmark session started"
        );
        Self {
            metadata,
            results: ResultsCollection::new(),
        }
    }

    pub fn metadata(&self) -> &RunMetadata {
        &self.metadata
    }

    pub fn results(&self) -> &ResultsCollection {
        &self.results
    }

    /// Record a summary under `label`.
    pub fn record(&mut self, label: &str, slot: Slot, summary: ResultSummary) {
        tracing::info!(
            backend = %self.metadata.backend,
            operation = label,
            slot = ?slot,
            iterations = summary.iterations,
            mean_time = summary.mean_time,
            variance_time = summary.variance_time,
            total_execution_time = summary.total_execution_time,
            "recorded"
        );
        self.results.insert(label, slot, summary);
    }

    /// Write the results to `path` and the metadata sidecar next to it.
    /// Returns the collection that was written.
    pub fn save(self, path: &Path) -> Result<ResultsCollection, PersistError> {
        self.results.save(path)?;

        let meta_path = sidecar_path(path);
        let json = serde_json::to_string_pretty(&self.metadata)?;
        std::fs::write(&meta_path, json).map_err(|source| PersistError::Io {
            path: meta_path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), meta = %meta_path.display(), "results saved");
        Ok(self.results)
    }
}

/// `results/redis_dict.json` -> `results/redis_dict.meta.json`
pub fn sidecar_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    path.with_file_name(format!("{stem}.meta.json"))
}

// ---------------------------------------------------------------------------
// Metadata capture helpers
// ---------------------------------------------------------------------------

fn iso8601_now() -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs();

    let days = secs / 86400;
    let time_of_day = secs % 86400;
    let (year, month, day) = days_to_ymd(days);

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        time_of_day / 3600,
        (time_of_day % 3600) / 60,
        time_of_day % 60
    )
}

/// Civil date from days since the Unix epoch (Howard Hinnant's algorithm).
fn days_to_ymd(days: u64) -> (u64, u64, u64) {
    let days = days + 719468;
    let era = days / 146097;
    let doe = days - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = yoe + era * 400 + u64::from(m <= 2);
    (y, m, d)
}

fn git(args: &[&str]) -> Option<std::process::Output> {
    std::process::Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
}

fn git_short_commit() -> Option<String> {
    git(&["rev-parse", "--short", "HEAD"])
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

fn git_branch() -> Option<String> {
    git(&["rev-parse", "--abbrev-ref", "HEAD"])
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

fn git_is_dirty() -> Option<bool> {
    git(&["status", "--porcelain"]).map(|o| !o.stdout.is_empty())
}

fn capture_hardware() -> HardwareInfo {
    HardwareInfo {
        cpu: read_cpu_model(),
        cores: std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(0),
        ram_gb: read_total_ram_gb(),
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
    }
}

fn read_cpu_model() -> String {
    std::fs::read_to_string("/proc/cpuinfo")
        .ok()
        .and_then(|info| {
            info.lines()
                .find(|l| l.starts_with("model name"))
                .and_then(|l| l.split(':').nth(1))
                .map(|s| s.trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn read_total_ram_gb() -> u64 {
    std::fs::read_to_string("/proc/meminfo")
        .ok()
        .and_then(|info| {
            info.lines()
                .find(|l| l.starts_with("MemTotal:"))
                .and_then(|l| l.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<u64>().ok())
        })
        .map(|kb| kb / (1024 * 1024))
        .unwrap_or(0)
}
