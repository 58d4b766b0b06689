//! Shared test utilities: an in-memory backend and dataset fixtures.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use recipe_crud_bench::backend::redis::{rewrite_ner, title_contains, top_counts};
use recipe_crud_bench::backend::{Backend, NerCount};
use recipe_crud_bench::dataset::{ListEncoding, Recipe};
use recipe_crud_bench::error::BackendError;

// =============================================================================
// In-memory backend
// =============================================================================

/// Document-store stand-in: recipes kept as serialized JSON, like the Redis
/// backend, so inserts cost something measurable.
#[derive(Default)]
pub struct MemoryBackend {
    pub docs: Vec<String>,
    backup: Vec<String>,
    pub suffix: &'static str,
    /// Every benchmarked operation returns an error when set.
    pub fail_ops: bool,
    /// Time spent in each `restore` / `truncate`.
    pub reset_delay: Duration,
    pub truncates: usize,
    pub snapshots: usize,
    pub restores: usize,
    /// Recipes removed by each `delete_titles_containing` call.
    pub deleted_per_call: Vec<usize>,
    /// Recipes rewritten by each `update_ner` call.
    pub updated_per_call: Vec<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suffix(suffix: &'static str) -> Self {
        Self {
            suffix,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_ops: true,
            ..Self::default()
        }
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.docs
            .iter()
            .map(|d| serde_json::from_str(d).expect("stored doc is valid"))
            .collect()
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.fail_ops {
            Err(BackendError::Protocol("injected failure".into()))
        } else {
            Ok(())
        }
    }

    fn pause(&self) {
        if !self.reset_delay.is_zero() {
            std::thread::sleep(self.reset_delay);
        }
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn label_suffix(&self) -> &'static str {
        self.suffix
    }

    fn list_encoding(&self) -> ListEncoding {
        ListEncoding::Json
    }

    fn setup(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    fn truncate(&mut self) -> Result<(), BackendError> {
        self.pause();
        self.truncates += 1;
        self.docs.clear();
        Ok(())
    }

    fn insert(&mut self, recipes: &[Recipe]) -> Result<usize, BackendError> {
        self.check()?;
        for recipe in recipes {
            self.docs.push(serde_json::to_string(recipe)?);
        }
        Ok(recipes.len())
    }

    fn select_most_common_ner(&mut self, limit: usize) -> Result<Vec<NerCount>, BackendError> {
        self.check()?;
        let mut counts: HashMap<String, u64> = HashMap::new();
        for recipe in self.recipes() {
            for entity in recipe.ner {
                *counts.entry(entity).or_insert(0) += 1;
            }
        }
        Ok(top_counts(counts, limit))
    }

    fn select_directions_by_title(&mut self, title: &str) -> Result<Vec<String>, BackendError> {
        self.check()?;
        Ok(self
            .recipes()
            .into_iter()
            .filter(|r| r.title == title)
            .flat_map(|r| r.directions)
            .collect())
    }

    fn delete_titles_containing(&mut self, needle: &str) -> Result<(), BackendError> {
        self.check()?;
        let before = self.docs.len();
        let kept: Vec<String> = self
            .recipes()
            .into_iter()
            .filter(|r| !title_contains(r, needle))
            .map(|r| serde_json::to_string(&r))
            .collect::<Result<_, _>>()?;
        self.deleted_per_call.push(before - kept.len());
        self.docs = kept;
        Ok(())
    }

    fn update_ner(&mut self, from: &str, to: &str) -> Result<(), BackendError> {
        self.check()?;
        let mut updated = 0;
        let mut docs = Vec::with_capacity(self.docs.len());
        for mut recipe in self.recipes() {
            if let Some(rewritten) = rewrite_ner(&recipe.ner, from, to) {
                recipe.ner = rewritten;
                updated += 1;
            }
            docs.push(serde_json::to_string(&recipe)?);
        }
        self.updated_per_call.push(updated);
        self.docs = docs;
        Ok(())
    }

    fn snapshot(&mut self) -> Result<(), BackendError> {
        self.snapshots += 1;
        self.backup = self.docs.clone();
        Ok(())
    }

    fn restore(&mut self, _recipes: &[Recipe]) -> Result<(), BackendError> {
        self.pause();
        self.restores += 1;
        self.docs = self.backup.clone();
        Ok(())
    }
}

// =============================================================================
// Dataset fixtures
// =============================================================================

/// Deterministic recipe `i`. Every 10th title contains "Pie", every 3rd
/// recipe lists "water", and recipe 7 is "Baked Chicken Parmesan".
pub fn recipe(i: usize) -> Recipe {
    let title = if i == 7 {
        "Baked Chicken Parmesan".to_string()
    } else if i % 10 == 0 {
        format!("Apple Pie No. {i}")
    } else {
        format!("Recipe {i}")
    };
    let mut ner = vec!["salt".to_string(), format!("spice {}", i % 5)];
    if i % 3 == 0 {
        ner.push("water".to_string());
    }
    Recipe {
        title,
        ingredients: vec![format!("{} c. flour", i % 4 + 1), "1 tsp. salt".to_string()],
        directions: vec![format!("Step one for {i}."), "Bake.".to_string()],
        link: format!("www.example.com/recipe/{i}"),
        source: "Gathered".to_string(),
        ner,
    }
}

pub fn recipes(n: usize) -> Vec<Recipe> {
    (0..n).map(recipe).collect()
}

/// Render `recipes` as the dataset CSV, list fields encoded per `encoding`.
/// The leading unnamed column mirrors the index column of the real file.
pub fn dataset_csv(recipes: &[Recipe], encoding: ListEncoding) -> String {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(["", "title", "ingredients", "directions", "link", "source", "NER"])
        .unwrap();
    for (i, r) in recipes.iter().enumerate() {
        w.write_record([
            i.to_string(),
            r.title.clone(),
            encode_list(&r.ingredients, encoding),
            encode_list(&r.directions, encoding),
            r.link.clone(),
            r.source.clone(),
            encode_list(&r.ner, encoding),
        ])
        .unwrap();
    }
    String::from_utf8(w.into_inner().unwrap()).unwrap()
}

fn encode_list(items: &[String], encoding: ListEncoding) -> String {
    match encoding {
        ListEncoding::Json => serde_json::to_string(items).unwrap(),
        ListEncoding::Bracketed => format!("[{}]", items.join(",")),
    }
}

pub fn write_dataset(dir: &tempfile::TempDir, recipes: &[Recipe], encoding: ListEncoding) -> PathBuf {
    let path = dir.path().join("full_dataset.csv");
    std::fs::write(&path, dataset_csv(recipes, encoding)).unwrap();
    path
}
