//! ClickHouse CRUD benchmark.
//!
//! Creates the `recipes` table, runs the benchmark plan and writes
//! `clickhouse_dict.json`.
//!
//! Usage: `cargo run --release --bin clickhouse-bench -- [--limit 10000]`

use anyhow::{Context, Result};
use clap::Parser;

use recipe_crud_bench::backend::{Backend, ClickHouseBackend};
use recipe_crud_bench::config::{init_tracing, ClickHouseConfig, RunConfig};
use recipe_crud_bench::dataset::load_recipes;
use recipe_crud_bench::plan::{run_plan, PlanIterations};
use recipe_crud_bench::recorder::ResultRecorder;

const RESULTS_FILE: &str = "clickhouse_dict.json";

#[derive(Parser, Debug)]
#[command(name = "clickhouse-bench")]
#[command(about = "Benchmark CRUD latencies against ClickHouse", long_about = None)]
struct Cli {
    #[command(flatten)]
    clickhouse: ClickHouseConfig,

    #[command(flatten)]
    run: RunConfig,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut backend = ClickHouseBackend::connect(cli.clickhouse.clone())
        .context("failed to build ClickHouse client")?;
    if let Err(e) = backend.setup() {
        tracing::error!(error = %e, "table setup failed, continuing");
    }

    let recipes = load_recipes(&cli.run.dataset, backend.list_encoding(), Some(cli.run.limit))
        .with_context(|| format!("failed to load {}", cli.run.dataset.display()))?;

    let mut recorder = ResultRecorder::new(backend.name());
    let iterations = cli.run.iterations(PlanIterations::CLICKHOUSE);
    run_plan(&mut backend, &recipes, iterations, &mut recorder)
        .context("benchmark aborted")?;

    let path = cli.run.output_dir.join(RESULTS_FILE);
    recorder
        .save(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
