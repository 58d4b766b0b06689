//! ClickHouse over its HTTP interface.
//!
//! Queries are POSTed as the request body; inserts send the rows as
//! `JSONEachRow` with the `INSERT` statement in the `query` parameter.
//! Mutations (`ALTER TABLE ... DELETE/UPDATE`) run synchronously
//! (`mutations_sync=1`) so the timed call covers the whole mutation.

use std::time::Duration;

use reqwest::blocking::Client;

use super::{Backend, NerCount};
use crate::config::ClickHouseConfig;
use crate::dataset::{ListEncoding, Recipe};
use crate::error::BackendError;

pub const TABLE: &str = "recipes";
pub const BACKUP_TABLE: &str = "recipes_backup";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS recipes
(
    title String,
    ingredients Array(String),
    directions Array(String),
    link String,
    source LowCardinality(String),
    NER Array(String)
) ENGINE = MergeTree ORDER BY title";

pub struct ClickHouseBackend {
    client: Client,
    url: String,
    config: ClickHouseConfig,
}

impl ClickHouseBackend {
    pub fn connect(config: ClickHouseConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let url = format!("http://{}:{}/", config.host, config.port);
        tracing::info!(
            host = %config.host,
            port = config.port,
            user = %config.user,
            database = %config.database,
            "connecting to ClickHouse"
        );
        Ok(Self { client, url, config })
    }

    /// Run `sql`, returning the response body.
    fn execute(&self, sql: &str) -> Result<String, BackendError> {
        self.send(&[], sql.to_string())
    }

    fn send(&self, params: &[(&str, &str)], body: String) -> Result<String, BackendError> {
        let mut request = self
            .client
            .post(&self.url)
            .query(&[("database", self.config.database.as_str())])
            .query(&[("mutations_sync", "1")])
            .query(params)
            .header("X-ClickHouse-User", &self.config.user)
            .body(body);
        if let Some(password) = &self.config.password {
            request = request.header("X-ClickHouse-Key", password);
        }

        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(BackendError::ClickHouse {
                status: status.as_u16(),
                body: text.trim().to_string(),
            });
        }
        Ok(text)
    }
}

impl Backend for ClickHouseBackend {
    fn name(&self) -> &'static str {
        "clickhouse"
    }

    fn list_encoding(&self) -> ListEncoding {
        ListEncoding::Bracketed
    }

    fn setup(&mut self) -> Result<(), BackendError> {
        self.execute(CREATE_TABLE)?;
        tracing::info!(table = TABLE, "table created or already exists");
        Ok(())
    }

    fn truncate(&mut self) -> Result<(), BackendError> {
        self.execute(&format!("TRUNCATE TABLE {TABLE}"))?;
        tracing::debug!(table = TABLE, "all records deleted");
        Ok(())
    }

    fn insert(&mut self, recipes: &[Recipe]) -> Result<usize, BackendError> {
        let mut body = String::new();
        for recipe in recipes {
            body.push_str(&serde_json::to_string(recipe)?);
            body.push('\n');
        }
        let query = format!("INSERT INTO {TABLE} FORMAT JSONEachRow");
        self.send(&[("query", query.as_str())], body)?;
        Ok(recipes.len())
    }

    fn select_most_common_ner(&mut self, limit: usize) -> Result<Vec<NerCount>, BackendError> {
        let body = self.execute(&most_common_ner_query(limit))?;
        parse_ner_counts(&body)
    }

    fn select_directions_by_title(&mut self, title: &str) -> Result<Vec<String>, BackendError> {
        let sql = format!(
            "SELECT arrayJoin(directions) FROM {TABLE} WHERE title = {} FORMAT TabSeparated",
            quote(title)
        );
        let body = self.execute(&sql)?;
        Ok(body.lines().map(str::to_string).collect())
    }

    fn delete_titles_containing(&mut self, needle: &str) -> Result<(), BackendError> {
        let sql = format!(
            "ALTER TABLE {TABLE} DELETE WHERE match(title, {})",
            quote(needle)
        );
        self.execute(&sql)?;
        Ok(())
    }

    fn update_ner(&mut self, from: &str, to: &str) -> Result<(), BackendError> {
        self.execute(&update_ner_query(from, to))?;
        Ok(())
    }

    fn snapshot(&mut self) -> Result<(), BackendError> {
        self.execute(&format!("DROP TABLE IF EXISTS {BACKUP_TABLE}"))?;
        self.execute(&format!("CREATE TABLE {BACKUP_TABLE} AS {TABLE}"))?;
        self.execute(&format!("INSERT INTO {BACKUP_TABLE} SELECT * FROM {TABLE}"))?;
        tracing::info!(table = BACKUP_TABLE, "backup table created");
        Ok(())
    }

    fn restore(&mut self, _recipes: &[Recipe]) -> Result<(), BackendError> {
        self.execute(&format!("DROP TABLE IF EXISTS {TABLE}"))?;
        self.execute(&format!("CREATE TABLE {TABLE} AS {BACKUP_TABLE}"))?;
        self.execute(&format!("INSERT INTO {TABLE} SELECT * FROM {BACKUP_TABLE}"))?;
        tracing::debug!(table = TABLE, "table restored from backup");
        Ok(())
    }
}

/// Quote `s` as a ClickHouse string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn most_common_ner_query(limit: usize) -> String {
    format!(
        "SELECT arrayJoin(NER) AS k, count() AS c FROM {TABLE} \
         GROUP BY k ORDER BY c DESC LIMIT {limit} FORMAT TabSeparated"
    )
}

/// NER elements are stored verbatim from the bracketed encoding, so they keep
/// their double quotes and a leading space. Matching strips both; the rewrite
/// replaces the quoted form only, leaving e.g. `"watermelon"` alone.
fn update_ner_query(from: &str, to: &str) -> String {
    format!(
        "ALTER TABLE {TABLE} \
         UPDATE NER = arrayMap(x -> replaceAll(x, {quoted_from}, {quoted_to}), NER) \
         WHERE arrayExists(x -> trimBoth(replaceAll(x, '\"', '')) = {plain_from}, NER)",
        quoted_from = quote(&format!("\"{from}\"")),
        quoted_to = quote(&format!("\"{to}\"")),
        plain_from = quote(from),
    )
}

fn parse_ner_counts(body: &str) -> Result<Vec<NerCount>, BackendError> {
    body.lines()
        .filter(|l| !l.is_empty())
        .map(|line| {
            let (key, count) = line
                .rsplit_once('\t')
                .ok_or_else(|| BackendError::Protocol(format!("expected two columns: {line}")))?;
            let count = count
                .parse::<u64>()
                .map_err(|e| BackendError::Protocol(format!("bad count `{count}`: {e}")))?;
            Ok((key.to_string(), count))
        })
        .collect()
}
