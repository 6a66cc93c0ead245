use std::collections::HashMap;

use chrono::{DateTime, Utc};
use comrak::{markdown_to_html, Options};
use serde::Serialize;
use tera::{Context, Tera, Value};
use thiserror::Error;

use crate::models::Article;

pub const DEFAULT_TEMPLATE: &str = "article.html";

const DEFAULT_TEMPLATE_SOURCE: &str = include_str!("../templates/article.html");

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

fn comrak_options() -> Options {
    let mut options = Options::default();
    // Existing HTML in article bodies passes through unchanged.
    options.render.unsafe_ = true;
    options
}

/// Converts Markdown to HTML, leaving pre-existing HTML untouched.
pub fn markdown(text: &str) -> String {
    markdown_to_html(text, &comrak_options())
}

struct MarkdownFilter;

impl tera::Filter for MarkdownFilter {
    fn filter(&self, value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        let text = value
            .as_str()
            .ok_or_else(|| tera::Error::msg("Value passed to markdown filter needs to be a string"))?;
        Ok(Value::String(markdown(text)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// Derived presentation of an article, computed at render time.
///
/// The source [`Article`] is never mutated; rendering twice yields the same
/// markup instead of re-converting already-converted HTML.
#[derive(Debug, Serialize)]
pub struct ArticleView<'a> {
    pub article_id: Option<i64>,
    pub title: &'a str,
    pub author: &'a str,
    pub author_url: Option<&'a str>,
    pub category: &'a str,
    pub body: &'a str,
    pub body_html: String,
    pub days_ago: Option<i64>,
    pub publish_status: String,
}

impl<'a> ArticleView<'a> {
    pub fn new(article: &'a Article, now: DateTime<Utc>) -> Self {
        let days_ago = article
            .published_on
            .map(|published| (now.date_naive() - published).num_days());
        let publish_status = match days_ago {
            Some(days) => format!("published {days} days ago"),
            None => "(draft)".to_string(),
        };

        Self {
            article_id: article.article_id,
            title: &article.title,
            author: &article.author,
            author_url: article.author_url.as_deref(),
            category: &article.category,
            body: &article.body,
            body_html: markdown(&article.body),
            days_ago,
            publish_status,
        }
    }
}

/// Compiled template set for turning articles into HTML.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.register_filter("markdown", MarkdownFilter);
        tera.add_raw_template(DEFAULT_TEMPLATE, DEFAULT_TEMPLATE_SOURCE)?;
        Ok(Self { tera })
    }

    /// Registers an additional named template. Names ending in `.html` are
    /// auto-escaped; the `markdown` filter is available.
    pub fn add_template(&mut self, name: &str, source: &str) -> Result<(), RenderError> {
        self.tera.add_raw_template(name, source)?;
        Ok(())
    }

    pub fn render(&self, article: &Article) -> Result<String, RenderError> {
        self.render_with(DEFAULT_TEMPLATE, article)
    }

    pub fn render_with(&self, template: &str, article: &Article) -> Result<String, RenderError> {
        self.render_at(template, article, Utc::now())
    }

    pub fn render_at(
        &self,
        template: &str,
        article: &Article,
        now: DateTime<Utc>,
    ) -> Result<String, RenderError> {
        let view = ArticleView::new(article, now);
        let context = Context::from_serialize(&view)?;
        Ok(self.tera.render(template, &context)?)
    }
}
