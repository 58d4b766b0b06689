//! ClickHouse vs Redis comparison report.
//!
//! Reads both backends' results, lines them up by operation label and
//! renders one grouped bar chart per metric.

use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::error::ReportError;
use crate::plan::labels;
use crate::schema::ResultsCollection;

/// CRUD operations shown in the report, in chart order.
pub const OPERATIONS: [&str; 4] = [labels::INSERT, labels::SELECT, labels::UPDATE, labels::DELETE];

/// Suffix the right-hand backend's labels carry.
pub const REDIS_SUFFIX: &str = "_redis";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Iterations,
    TotalExecutionTime,
    MeanTime,
    VarianceTime,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Iterations,
        Metric::TotalExecutionTime,
        Metric::MeanTime,
        Metric::VarianceTime,
    ];

    /// Field name in the results file.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Iterations => "iterations",
            Metric::TotalExecutionTime => "total_execution_time",
            Metric::MeanTime => "mean_time",
            Metric::VarianceTime => "variance_time",
        }
    }

    /// Human-readable name: `total_execution_time` -> `Total execution time`.
    pub fn title(self) -> String {
        let spaced = self.key().replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// One operation's values for both backends.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub operation: &'static str,
    pub left: f64,
    pub right: f64,
}

impl ComparisonRow {
    /// Relative change from left to right, in percent.
    pub fn delta_pct(&self) -> f64 {
        if self.left > 0.0 {
            (self.right - self.left) / self.left * 100.0
        } else {
            0.0
        }
    }
}

/// Two backends' results merged by operation label.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub left_name: String,
    pub right_name: String,
    left: ResultsCollection,
    right: ResultsCollection,
    right_suffix: String,
}

impl Comparison {
    pub fn new(
        left_name: &str,
        left: ResultsCollection,
        right_name: &str,
        right: ResultsCollection,
        right_suffix: &str,
    ) -> Self {
        Self {
            left_name: left_name.to_string(),
            right_name: right_name.to_string(),
            left,
            right,
            right_suffix: right_suffix.to_string(),
        }
    }

    /// ClickHouse vs Redis, from the two results files.
    pub fn load(clickhouse: &Path, redis: &Path) -> Result<Self, ReportError> {
        Ok(Self::new(
            "ClickHouse",
            ResultsCollection::load(clickhouse)?,
            "Redis",
            ResultsCollection::load(redis)?,
            REDIS_SUFFIX,
        ))
    }

    /// Values of `metric` for every operation. Missing records or fields
    /// read as 0.
    pub fn rows(&self, metric: Metric) -> Vec<ComparisonRow> {
        OPERATIONS
            .iter()
            .map(|&op| {
                let right_label = format!("{op}{}", self.right_suffix);
                ComparisonRow {
                    operation: op,
                    left: lookup(&self.left, op, metric),
                    right: lookup(&self.right, &right_label, metric),
                }
            })
            .collect()
    }

    pub fn chart_title(&self, metric: Metric) -> String {
        format!(
            "Comparison of {} ({} vs {})",
            metric.title(),
            self.left_name,
            self.right_name
        )
    }

    /// Render one SVG per metric into `dir`; returns the written paths.
    pub fn render_all(&self, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
        std::fs::create_dir_all(dir).map_err(|source| crate::error::PersistError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Metric::ALL
            .iter()
            .map(|&metric| {
                let path = dir.join(format!("{}.svg", metric.key()));
                self.render(metric, &path)?;
                tracing::info!(metric = metric.key(), path = %path.display(), "chart written");
                Ok(path)
            })
            .collect()
    }

    /// Grouped bar chart of `metric`, each bar labelled with its value.
    pub fn render(&self, metric: Metric, path: &Path) -> Result<(), ReportError> {
        draw_grouped_bars(self, metric, path).map_err(|e| ReportError::Chart(e.to_string()))
    }
}

fn lookup(results: &ResultsCollection, label: &str, metric: Metric) -> f64 {
    results
        .get(label)
        .and_then(|r| r.metric(metric.key()))
        .unwrap_or(0.0)
}

const BAR_WIDTH: f64 = 0.35;

fn draw_grouped_bars(
    cmp: &Comparison,
    metric: Metric,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = cmp.rows(metric);
    let max = rows
        .iter()
        .flat_map(|r| [r.left, r.right])
        .fold(0.0_f64, f64::max);
    let y_top = if max > 0.0 { max * 1.15 } else { 1.0 };

    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(cmp.chart_title(metric), ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(rows.len() as f64 - 0.5), 0f64..y_top)?;

    let x_label = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() < 1e-6 && idx >= 0.0 {
            OPERATIONS.get(idx as usize).map(|s| s.to_string()).unwrap_or_default()
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(rows.len())
        .x_label_formatter(&x_label)
        .x_desc("CRUD Operations")
        .y_desc(metric.title())
        .draw()?;

    let groups = [
        (cmp.left_name.as_str(), -BAR_WIDTH, BLUE, rows.iter().map(|r| r.left).collect::<Vec<_>>()),
        (cmp.right_name.as_str(), 0.0, RED, rows.iter().map(|r| r.right).collect::<Vec<_>>()),
    ];

    for (name, offset, color, values) in groups {
        chart
            .draw_series(values.iter().enumerate().map(|(i, &v)| {
                let x0 = i as f64 + offset;
                Rectangle::new([(x0, 0.0), (x0 + BAR_WIDTH, v)], color.filled())
            }))?
            .label(name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

        chart.draw_series(values.iter().enumerate().map(|(i, &v)| {
            Text::new(
                format!("{:.2}", v),
                (i as f64 + offset, v),
                ("sans-serif", 14).into_font(),
            )
        }))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
