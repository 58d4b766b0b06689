//! Redis (RedisJSON) CRUD benchmark.
//!
//! Loads the dataset, runs the benchmark plan and writes `redis_dict.json`.
//!
//! Usage: `cargo run --release --bin redis-bench -- [--limit 10000]`

use anyhow::{Context, Result};
use clap::Parser;

use recipe_crud_bench::backend::{Backend, RedisBackend};
use recipe_crud_bench::config::{init_tracing, RedisConfig, RunConfig};
use recipe_crud_bench::dataset::load_recipes;
use recipe_crud_bench::plan::{run_plan, PlanIterations};
use recipe_crud_bench::recorder::ResultRecorder;

const RESULTS_FILE: &str = "redis_dict.json";

#[derive(Parser, Debug)]
#[command(name = "redis-bench")]
#[command(about = "Benchmark CRUD latencies against Redis with RedisJSON", long_about = None)]
struct Cli {
    #[command(flatten)]
    redis: RedisConfig,

    #[command(flatten)]
    run: RunConfig,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut backend = RedisBackend::connect(&cli.redis).context("failed to connect to Redis")?;
    if let Err(e) = backend.setup() {
        tracing::error!(error = %e, "setup failed, continuing");
    }

    let recipes = load_recipes(&cli.run.dataset, backend.list_encoding(), Some(cli.run.limit))
        .with_context(|| format!("failed to load {}", cli.run.dataset.display()))?;

    let mut recorder = ResultRecorder::new(backend.name());
    let iterations = cli.run.iterations(PlanIterations::REDIS);
    run_plan(&mut backend, &recipes, iterations, &mut recorder)
        .context("benchmark aborted")?;

    let path = cli.run.output_dir.join(RESULTS_FILE);
    recorder
        .save(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
