//! Benchmark comparison tool.
//!
//! Merges the ClickHouse and Redis results files by operation label, prints a
//! table per metric and renders one grouped bar chart per metric.
//!
//! Usage: `cargo run --bin bench-compare -- [clickhouse_dict.json] [redis_dict.json]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use recipe_crud_bench::config::init_tracing;
use recipe_crud_bench::report::{Comparison, ComparisonRow, Metric};

#[derive(Parser, Debug)]
#[command(name = "bench-compare")]
#[command(about = "Compare ClickHouse and Redis benchmark results", long_about = None)]
struct Cli {
    #[arg(default_value = "clickhouse_dict.json")]
    clickhouse: PathBuf,

    #[arg(default_value = "redis_dict.json")]
    redis: PathBuf,

    /// Directory the SVG charts are written to.
    #[arg(long, default_value = "charts")]
    charts_dir: PathBuf,

    /// Print the tables only.
    #[arg(long)]
    no_charts: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let cmp = Comparison::load(&cli.clickhouse, &cli.redis).context("failed to load results")?;

    eprintln!("{}: {}", cmp.left_name, cli.clickhouse.display());
    eprintln!("{}: {}", cmp.right_name, cli.redis.display());
    eprintln!();

    for metric in Metric::ALL {
        print_table(&cmp, metric);
    }

    if !cli.no_charts {
        let written = cmp
            .render_all(&cli.charts_dir)
            .context("failed to render charts")?;
        eprintln!("Charts written: {}", written.len());
    }
    Ok(())
}

fn print_table(cmp: &Comparison, metric: Metric) {
    println!("{}", cmp.chart_title(metric));
    println!(
        "{:<10} | {:>14} | {:>14} | {:>10}",
        "Operation", cmp.left_name, cmp.right_name, "Delta"
    );
    println!("{}", "-".repeat(58));
    for row in cmp.rows(metric) {
        print_row(&row);
    }
    println!();
}

fn print_row(row: &ComparisonRow) {
    let delta = row.delta_pct();
    let hint = if row.left == 0.0 {
        "n/a"
    } else if delta < -1.0 {
        "lower"
    } else if delta > 1.0 {
        "higher"
    } else {
        "~same"
    };
    println!(
        "{:<10} | {:>14.5} | {:>14.5} | {:>+9.1}% ({})",
        row.operation, row.left, row.right, delta, hint
    );
}
