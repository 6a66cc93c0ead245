//! Static fallback dataset used to bootstrap an empty backend.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::{error::DataError, models::Article};

const BUNDLED_SEED: &str = include_str!("../data/seed.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Seed file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Seed file must contain a JSON array of articles")]
    NotAnArray,

    #[error("Invalid seed record: {0}")]
    Data(#[from] DataError),
}

/// A parsed, validated list of seed articles.
#[derive(Debug, Clone)]
pub struct SeedData {
    articles: Vec<Article>,
}

impl SeedData {
    /// The dataset compiled into the crate (`data/seed.json`).
    pub fn bundled() -> Self {
        // Validated by the bundled_seed_parses test.
        Self::from_str(BUNDLED_SEED).expect("bundled seed data is valid")
    }

    pub fn from_str(source: &str) -> Result<Self, SeedError> {
        let value: Value = serde_json::from_str(source)?;
        let rows = value.as_array().ok_or(SeedError::NotAnArray)?;
        let articles = rows
            .iter()
            .map(Article::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { articles })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_str(&source)
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_seed_parses() {
        let seed = SeedData::bundled();
        assert!(!seed.is_empty());
        for article in seed.articles() {
            assert!(!article.title.is_empty());
            assert!(!article.body.is_empty());
        }
    }

    #[test]
    fn rejects_non_array_documents() {
        let err = SeedData::from_str("{\"title\": \"x\"}").unwrap_err();
        assert!(matches!(err, SeedError::NotAnArray));
    }

    #[test]
    fn rejects_invalid_records() {
        let err = SeedData::from_str("[{\"title\": \"x\"}]").unwrap_err();
        assert!(matches!(err, SeedError::Data(_)));
    }
}
