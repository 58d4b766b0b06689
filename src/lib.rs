//! CRUD latency benchmarks for ClickHouse and Redis over a shared recipe
//! dataset.
//!
//! The `clickhouse-bench` and `redis-bench` binaries run the same
//! [`plan`] against their backend and write a results file each;
//! `bench-compare` merges the two and renders the comparison charts.

pub mod backend;
pub mod config;
pub mod dataset;
pub mod error;
pub mod harness;
pub mod plan;
pub mod recorder;
pub mod report;
pub mod schema;
