//! Redis with the RedisJSON module.
//!
//! Each recipe is a JSON document at `recipe:{idx}`. Redis has no query
//! language over documents, so selects, deletes and updates walk every
//! `recipe:*` key and filter client-side.

use std::collections::HashMap;

use ::redis::{Commands, Connection};

use super::{Backend, NerCount};
use crate::config::RedisConfig;
use crate::dataset::{ListEncoding, Recipe};
use crate::error::BackendError;

pub const KEY_PATTERN: &str = "recipe:*";

pub fn recipe_key(idx: usize) -> String {
    format!("recipe:{idx}")
}

pub struct RedisBackend {
    conn: Connection,
}

impl RedisBackend {
    pub fn connect(config: &RedisConfig) -> Result<Self, BackendError> {
        tracing::info!(
            host = %config.host,
            port = config.port,
            db = config.db,
            "connecting to Redis"
        );
        let client = ::redis::Client::open(config.url())?;
        let conn = client.get_connection()?;
        Ok(Self { conn })
    }

    fn keys(&mut self) -> Result<Vec<String>, BackendError> {
        Ok(self.conn.keys(KEY_PATTERN)?)
    }

    fn get_recipe(&mut self, key: &str) -> Result<Option<Recipe>, BackendError> {
        let raw: Option<String> = ::redis::cmd("JSON.GET").arg(key).query(&mut self.conn)?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Every stored recipe with its key. Keys that vanish between `KEYS` and
    /// `JSON.GET` are skipped.
    fn scan_recipes(&mut self) -> Result<Vec<(String, Recipe)>, BackendError> {
        let keys = self.keys()?;
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(recipe) = self.get_recipe(&key)? {
                out.push((key, recipe));
            }
        }
        Ok(out)
    }
}

impl Backend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn label_suffix(&self) -> &'static str {
        "_redis"
    }

    fn list_encoding(&self) -> ListEncoding {
        ListEncoding::Json
    }

    fn setup(&mut self) -> Result<(), BackendError> {
        let pong: String = ::redis::cmd("PING").query(&mut self.conn)?;
        tracing::info!(reply = %pong, "redis reachable");
        Ok(())
    }

    fn truncate(&mut self) -> Result<(), BackendError> {
        let keys = self.keys()?;
        if !keys.is_empty() {
            let _: () = self.conn.del(&keys)?;
            tracing::debug!(deleted = keys.len(), "cleared recipe keys");
        }
        Ok(())
    }

    fn insert(&mut self, recipes: &[Recipe]) -> Result<usize, BackendError> {
        for (idx, recipe) in recipes.iter().enumerate() {
            let doc = serde_json::to_string(recipe)?;
            let _: () = ::redis::cmd("JSON.SET")
                .arg(recipe_key(idx))
                .arg(".")
                .arg(doc)
                .query(&mut self.conn)?;
        }
        Ok(recipes.len())
    }

    fn select_most_common_ner(&mut self, limit: usize) -> Result<Vec<NerCount>, BackendError> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for (_, recipe) in self.scan_recipes()? {
            for entity in recipe.ner {
                *counts.entry(entity).or_insert(0) += 1;
            }
        }
        Ok(top_counts(counts, limit))
    }

    fn select_directions_by_title(&mut self, title: &str) -> Result<Vec<String>, BackendError> {
        Ok(self
            .scan_recipes()?
            .into_iter()
            .filter(|(_, r)| r.title == title)
            .flat_map(|(_, r)| r.directions)
            .collect())
    }

    fn delete_titles_containing(&mut self, needle: &str) -> Result<(), BackendError> {
        let mut deleted = 0usize;
        for (key, recipe) in self.scan_recipes()? {
            if title_contains(&recipe, needle) {
                let _: () = self.conn.del(&key)?;
                deleted += 1;
            }
        }
        tracing::debug!(deleted, "deleted matching recipes");
        Ok(())
    }

    fn update_ner(&mut self, from: &str, to: &str) -> Result<(), BackendError> {
        let mut updated = 0usize;
        for (key, recipe) in self.scan_recipes()? {
            if let Some(rewritten) = rewrite_ner(&recipe.ner, from, to) {
                let _: () = ::redis::cmd("JSON.SET")
                    .arg(&key)
                    .arg(".NER")
                    .arg(serde_json::to_string(&rewritten)?)
                    .query(&mut self.conn)?;
                updated += 1;
            }
        }
        tracing::debug!(updated, "updated matching recipes");
        Ok(())
    }

    /// The loaded dataset is the snapshot; nothing to capture server-side.
    fn snapshot(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    /// Reinserting overwrites updated documents and recreates deleted ones.
    fn restore(&mut self, recipes: &[Recipe]) -> Result<(), BackendError> {
        self.insert(recipes).map(|_| ())
    }
}

/// The `limit` highest counts, most frequent first. Ties break by entity
/// name so results are stable across runs.
pub fn top_counts(counts: HashMap<String, u64>, limit: usize) -> Vec<NerCount> {
    let mut sorted: Vec<NerCount> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(limit);
    sorted
}

/// Case-insensitive substring match on the recipe title.
pub fn title_contains(recipe: &Recipe, needle: &str) -> bool {
    recipe.title.to_lowercase().contains(&needle.to_lowercase())
}

/// The rewritten NER list, or `None` when no entity equals `from`.
///
/// Once a recipe matches, `from` is replaced inside every entity, so
/// `watermelon` becomes `TESTmelon` alongside `water`.
pub fn rewrite_ner(ner: &[String], from: &str, to: &str) -> Option<Vec<String>> {
    if !ner.iter().any(|e| e == from) {
        return None;
    }
    Some(ner.iter().map(|e| e.replace(from, to)).collect())
}
