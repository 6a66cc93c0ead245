use bon::Builder;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DataError;

/// A single blog article as persisted by the backend.
///
/// `article_id` is assigned by the backend and absent on rows that have not
/// been inserted yet. `published_on` of `None` marks a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct Article {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<i64>,
    #[builder(into)]
    pub title: String,
    #[builder(into)]
    pub author: String,
    #[serde(rename = "authorUrl", default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub author_url: Option<String>,
    #[builder(into)]
    pub category: String,
    #[builder(into)]
    pub body: String,
    #[serde(rename = "publishedOn", default)]
    pub published_on: Option<NaiveDate>,
}

const DATE_FORMAT: &str = "%Y-%m-%d";

impl Article {
    /// Builds an article from a raw backend row, validating the schema.
    ///
    /// Required fields must be present and non-null strings; a malformed
    /// `publishedOn` is rejected instead of being admitted as an invalid date.
    pub fn from_record(record: &Value) -> Result<Self, DataError> {
        let obj = record
            .as_object()
            .ok_or_else(|| DataError::parse_error("article", "row is not a JSON object"))?;

        let required = |field: &'static str| -> Result<String, DataError> {
            match obj.get(field) {
                None | Some(Value::Null) => Err(DataError::missing_field(field)),
                Some(Value::String(s)) => Ok(s.clone()),
                Some(_) => Err(DataError::invalid_type(field, "string")),
            }
        };

        let article_id = match obj.get("article_id") {
            None | Some(Value::Null) => None,
            Some(v) => Some(
                v.as_i64()
                    .ok_or_else(|| DataError::invalid_type("article_id", "integer"))?,
            ),
        };

        let author_url = match obj.get("authorUrl") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(DataError::invalid_type("authorUrl", "string")),
        };

        let published_on = match obj.get("publishedOn") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(
                NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .map_err(|_| DataError::invalid_value("publishedOn", s.clone()))?,
            ),
            Some(_) => return Err(DataError::invalid_type("publishedOn", "string")),
        };

        Ok(Self {
            article_id,
            title: required("title")?,
            author: required("author")?,
            author_url,
            category: required("category")?,
            body: required("body")?,
            published_on,
        })
    }

    pub fn is_draft(&self) -> bool {
        self.published_on.is_none()
    }
}
