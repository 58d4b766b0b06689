//! Run configuration.
//!
//! Each binary parses its arguments once at startup into an explicit config
//! and hands it down. Connection parameters come from the environment
//! (`HOST`, `PORT`, ... for ClickHouse; `HOST_REDIS`, `PORT_REDIS`, ... for
//! Redis) and may be overridden with flags.

use std::path::PathBuf;

use clap::Args;

use crate::dataset::{DEFAULT_DATASET, DEFAULT_ROW_LIMIT};
use crate::plan::PlanIterations;

/// ClickHouse HTTP connection settings.
#[derive(Debug, Clone, Args)]
pub struct ClickHouseConfig {
    #[arg(long, env = "HOST", default_value = "localhost")]
    pub host: String,

    /// HTTP interface port.
    #[arg(long, env = "PORT", default_value_t = 8123)]
    pub port: u16,

    #[arg(long, env = "USER", default_value = "default")]
    pub user: String,

    #[arg(long, env = "PASSWORD")]
    pub password: Option<String>,

    #[arg(long, env = "DATABASE", default_value = "default")]
    pub database: String,

    /// Per-request timeout, in seconds.
    #[arg(long, default_value_t = 300)]
    pub timeout_secs: u64,
}

/// Redis connection settings.
#[derive(Debug, Clone, Args)]
pub struct RedisConfig {
    #[arg(long = "redis-host", env = "HOST_REDIS", default_value = "localhost")]
    pub host: String,

    #[arg(long = "redis-port", env = "PORT_REDIS", default_value_t = 6379)]
    pub port: u16,

    #[arg(long = "redis-user", env = "USER_REDIS")]
    pub user: Option<String>,

    #[arg(long = "redis-password", env = "PASSWORD_REDIS")]
    pub password: Option<String>,

    /// Logical database number.
    #[arg(long = "redis-db", env = "DATABASE_REDIS", default_value_t = 0)]
    pub db: i64,
}

impl RedisConfig {
    /// Connection URL in the form the `redis` crate accepts.
    pub fn url(&self) -> String {
        let auth = match (&self.user, &self.password) {
            (Some(user), Some(password)) => format!("{user}:{password}@"),
            (None, Some(password)) => format!(":{password}@"),
            _ => String::new(),
        };
        format!("redis://{auth}{}:{}/{}", self.host, self.port, self.db)
    }
}

/// Dataset, output and plan settings shared by both benchmark binaries.
#[derive(Debug, Clone, Args)]
pub struct RunConfig {
    #[arg(long, default_value = DEFAULT_DATASET)]
    pub dataset: PathBuf,

    /// Rows read from the dataset.
    #[arg(long, default_value_t = DEFAULT_ROW_LIMIT)]
    pub limit: usize,

    /// Directory the results file is written to.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Iterations for the insert benchmark (backend default when omitted).
    #[arg(long)]
    pub insert_iterations: Option<usize>,

    /// Iterations for each select, delete and update benchmark.
    #[arg(long)]
    pub query_iterations: Option<usize>,
}

impl RunConfig {
    /// Apply overrides on top of a backend's default iteration counts.
    pub fn iterations(&self, defaults: PlanIterations) -> PlanIterations {
        let query = self.query_iterations;
        PlanIterations {
            insert: self.insert_iterations.unwrap_or(defaults.insert),
            select_most_common: query.unwrap_or(defaults.select_most_common),
            select_by_title: query.unwrap_or(defaults.select_by_title),
            delete: query.unwrap_or(defaults.delete),
            update: query.unwrap_or(defaults.update),
        }
    }
}

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
