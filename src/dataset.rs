//! Recipe dataset loading.
//!
//! The dataset is a CSV file with a header row. List-valued columns
//! (`ingredients`, `directions`, `NER`) are stored as text and decoded
//! according to a [`ListEncoding`].

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Default dataset location, relative to the working directory.
pub const DEFAULT_DATASET: &str = "dataset/full_dataset.csv";

/// Default number of rows loaded per run.
pub const DEFAULT_ROW_LIMIT: usize = 10_000;

/// One recipe row, with list fields decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub directions: Vec<String>,
    pub link: String,
    pub source: String,
    #[serde(rename = "NER")]
    pub ner: Vec<String>,
}

/// How list-valued columns are encoded in the CSV text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEncoding {
    /// `[a,b,c]`: brackets stripped, split on commas, elements kept verbatim
    /// (quotes and leading spaces included).
    Bracketed,
    /// A JSON array of strings.
    Json,
}

impl ListEncoding {
    pub fn decode(self, field: &'static str, value: &str) -> Result<Vec<String>, DatasetError> {
        match self {
            ListEncoding::Bracketed => Ok(parse_bracketed(value)),
            ListEncoding::Json => {
                serde_json::from_str(value).map_err(|e| DatasetError::ListField {
                    field,
                    reason: e.to_string(),
                })
            }
        }
    }
}

fn parse_bracketed(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let mut inner = trimmed.chars();
    inner.next();
    inner.next_back();
    inner.as_str().split(',').map(str::to_string).collect()
}

#[derive(Debug, Deserialize)]
struct RawRecipe {
    title: String,
    ingredients: String,
    directions: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    source: String,
    #[serde(rename = "NER")]
    ner: String,
}

impl RawRecipe {
    fn decode(self, encoding: ListEncoding) -> Result<Recipe, DatasetError> {
        Ok(Recipe {
            title: self.title,
            ingredients: encoding.decode("ingredients", &self.ingredients)?,
            directions: encoding.decode("directions", &self.directions)?,
            link: self.link,
            source: self.source.trim().to_string(),
            ner: encoding.decode("NER", &self.ner)?,
        })
    }
}

/// Load up to `limit` rows from the CSV file at `path`.
pub fn load_recipes(
    path: &Path,
    encoding: ListEncoding,
    limit: Option<usize>,
) -> Result<Vec<Recipe>, DatasetError> {
    let file = std::fs::File::open(path).map_err(|e| DatasetError::Open {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    let recipes = read_recipes(file, encoding, limit)?;
    tracing::info!(
        path = %path.display(),
        rows = recipes.len(),
        encoding = ?encoding,
        "dataset loaded"
    );
    Ok(recipes)
}

/// Read up to `limit` rows from `reader`.
///
/// The limit counts rows read, not rows kept: a row whose list fields fail to
/// decode is logged and skipped but still uses up its place.
pub fn read_recipes<R: Read>(
    reader: R,
    encoding: ListEncoding,
    limit: Option<usize>,
) -> Result<Vec<Recipe>, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let limit = limit.unwrap_or(usize::MAX);

    let mut recipes = Vec::new();
    for (idx, row) in rdr.deserialize::<RawRecipe>().take(limit).enumerate() {
        match row?.decode(encoding) {
            Ok(recipe) => recipes.push(recipe),
            Err(e) => tracing::warn!(row = idx, error = %e, "skipping row"),
        }
    }
    Ok(recipes)
}
