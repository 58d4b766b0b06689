//! The fixed CRUD benchmark plan.
//!
//! One run executes, in order: insert, select most common NER, select a
//! recipe's directions by title, delete, update. Each step is timed by the
//! harness and summarized into the recorder. Reset steps (truncate before
//! insert, restore after delete/update) are untimed.

use crate::backend::Backend;
use crate::dataset::Recipe;
use crate::error::StatsError;
use crate::harness::{run_benchmark, run_with_reset, summarize, ResetPhase};
use crate::recorder::ResultRecorder;
use crate::schema::Slot;

pub const MOST_COMMON_LIMIT: usize = 50;
pub const TITLE_QUERY: &str = "Baked Chicken Parmesan";
pub const DELETE_NEEDLE: &str = "pie";
pub const UPDATE_FROM: &str = "water";
pub const UPDATE_TO: &str = "TEST";

/// Iteration count per benchmark step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanIterations {
    pub insert: usize,
    pub select_most_common: usize,
    pub select_by_title: usize,
    pub delete: usize,
    pub update: usize,
}

impl PlanIterations {
    pub const CLICKHOUSE: Self = Self {
        insert: 10,
        select_most_common: 100,
        select_by_title: 100,
        delete: 100,
        update: 100,
    };

    pub const REDIS: Self = Self {
        insert: 5,
        select_most_common: 100,
        select_by_title: 100,
        delete: 100,
        update: 100,
    };

    /// The same count for every step.
    pub const fn uniform(n: usize) -> Self {
        Self {
            insert: n,
            select_most_common: n,
            select_by_title: n,
            delete: n,
            update: n,
        }
    }
}

/// Operation labels as they appear in the results file (before the
/// backend's suffix).
pub mod labels {
    pub const INSERT: &str = "insert";
    pub const SELECT: &str = "select";
    pub const DELETE: &str = "delete";
    pub const UPDATE: &str = "update";
}

/// Run the whole plan against `backend`, recording into `recorder`.
///
/// Operation and reset failures are logged and the plan continues; a step
/// whose samples cannot be summarized aborts the run.
pub fn run_plan<B: Backend>(
    backend: &mut B,
    recipes: &[Recipe],
    iterations: PlanIterations,
    recorder: &mut ResultRecorder,
) -> Result<(), StatsError> {
    let suffix = backend.label_suffix();
    let label = |base: &str| format!("{base}{suffix}");

    tracing::info!(backend = backend.name(), ?iterations, rows = recipes.len(), "running plan");

    let insert = label(labels::INSERT);
    let samples = run_with_reset(
        &insert,
        iterations.insert,
        &mut *backend,
        ResetPhase::Before,
        |b: &mut B| b.truncate(),
        |b: &mut B| b.insert(recipes),
    );
    recorder.record(&insert, Slot::Primary, summarize(&samples)?);

    let select = label(labels::SELECT);
    let samples = run_benchmark(&select, iterations.select_most_common, || {
        backend.select_most_common_ner(MOST_COMMON_LIMIT)
    });
    recorder.record(&select, Slot::Primary, summarize(&samples)?);

    let samples = run_benchmark(&select, iterations.select_by_title, || {
        backend.select_directions_by_title(TITLE_QUERY)
    });
    recorder.record(&select, Slot::Secondary, summarize(&samples)?);

    let delete = label(labels::DELETE);
    snapshot(backend);
    let samples = run_with_reset(
        &delete,
        iterations.delete,
        &mut *backend,
        ResetPhase::After,
        |b: &mut B| b.restore(recipes),
        |b: &mut B| b.delete_titles_containing(DELETE_NEEDLE),
    );
    recorder.record(&delete, Slot::Primary, summarize(&samples)?);

    let update = label(labels::UPDATE);
    snapshot(backend);
    let samples = run_with_reset(
        &update,
        iterations.update,
        &mut *backend,
        ResetPhase::After,
        |b: &mut B| b.restore(recipes),
        |b: &mut B| b.update_ner(UPDATE_FROM, UPDATE_TO),
    );
    recorder.record(&update, Slot::Primary, summarize(&samples)?);

    Ok(())
}

fn snapshot<B: Backend>(backend: &mut B) {
    if let Err(e) = backend.snapshot() {
        tracing::error!(backend = backend.name(), error = %e, "snapshot failed");
    }
}
