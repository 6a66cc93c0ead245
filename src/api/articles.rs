use futures_concurrency::prelude::*;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    client::Pressroom,
    error::{ClientError, ResponseError},
    http::{HttpClient, HttpRequest},
    models::Article,
    paths::{article_path, ARTICLES_PATH},
    seed::SeedData,
    store::ArticleStore,
};

fn form_fields(article: &Article) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("author", article.author.clone()),
        ("body", article.body.clone()),
        ("category", article.category.clone()),
        ("title", article.title.clone()),
    ];
    if let Some(url) = &article.author_url {
        fields.push(("authorUrl", url.clone()));
    }
    if let Some(date) = article.published_on {
        fields.push(("publishedOn", date.to_string()));
    }
    fields
}

// Backends may echo the persisted row back; fall back to what was submitted.
fn confirmed_row(ack: &str, submitted: Article) -> Article {
    serde_json::from_str::<Value>(ack)
        .ok()
        .and_then(|value| Article::from_record(&value).ok())
        .unwrap_or(submitted)
}

impl Pressroom {
    async fn get_articles(&self) -> Result<Vec<Article>, ClientError> {
        let url = self.build_url(ARTICLES_PATH)?;
        let body = self.request_json(HttpRequest::get(url)).await?;
        let rows = body.as_array().ok_or_else(|| {
            ResponseError::unexpected_structure("expected a JSON array of article rows")
        })?;
        rows.iter()
            .map(|row| Article::from_record(row).map_err(ClientError::from))
            .collect()
    }

    async fn post_article(&self, article: &Article) -> Result<String, ClientError> {
        let url = self.build_url(ARTICLES_PATH)?;
        let ack = self
            .request_text(HttpRequest::post(url).form(form_fields(article)))
            .await?;
        debug!("Insert acknowledged: {}", ack);
        Ok(ack)
    }

    /// Loads every article from the backend into the store, replacing its
    /// previous contents. Returns the number of articles loaded.
    #[instrument(skip(self, store))]
    pub async fn fetch_all(&self, store: &mut ArticleStore) -> Result<usize, ClientError> {
        let articles = self.get_articles().await?;
        let count = articles.len();
        store.replace(articles);
        info!("Loaded {} articles", count);
        Ok(count)
    }

    /// Like [`fetch_all`](Self::fetch_all), but bootstraps an empty backend
    /// from `seed` first.
    ///
    /// When the backend reports zero rows, one insert per seed item is issued
    /// concurrently (no ordering guarantee), and the articles are fetched
    /// again once all inserts have been confirmed. Every failure path is
    /// reported to the caller; a backend that stays empty after seeding is a
    /// [`ResponseError::EmptyResponse`].
    #[instrument(skip(self, store, seed), fields(seed_len = seed.len()))]
    pub async fn fetch_or_seed(
        &self,
        store: &mut ArticleStore,
        seed: &SeedData,
    ) -> Result<usize, ClientError> {
        let articles = self.get_articles().await?;
        if !articles.is_empty() {
            let count = articles.len();
            store.replace(articles);
            info!("Loaded {} articles", count);
            return Ok(count);
        }

        info!("Backend is empty, seeding {} articles", seed.len());
        let inserts: Vec<_> = seed
            .articles()
            .iter()
            .map(|article| self.post_article(article))
            .collect();
        inserts.try_join().await?;

        let articles = self.get_articles().await?;
        if articles.is_empty() {
            warn!("Backend still empty after seeding");
            return Err(ResponseError::EmptyResponse.into());
        }
        let count = articles.len();
        store.replace(articles);
        info!("Loaded {} articles after seeding", count);
        Ok(count)
    }

    /// Creates the article on the backend, then adds the confirmed row to the
    /// store.
    #[instrument(skip(self, store, article), fields(title = %article.title))]
    pub async fn insert_record(
        &self,
        store: &mut ArticleStore,
        article: Article,
    ) -> Result<(), ClientError> {
        let ack = self.post_article(&article).await?;
        store.add(confirmed_row(&ack, article));
        Ok(())
    }

    /// Overwrites the backend row identified by the article's id, then
    /// reconciles the store with the confirmed state.
    #[instrument(skip(self, store, article), fields(article_id = ?article.article_id))]
    pub async fn update_record(
        &self,
        store: &mut ArticleStore,
        article: Article,
    ) -> Result<(), ClientError> {
        let id = article.article_id.ok_or_else(|| {
            ClientError::InvalidRequest("cannot update an article without an article_id".to_string())
        })?;
        let url = self.build_url(&article_path(id))?;
        let ack = self
            .request_text(HttpRequest::put(url).form(form_fields(&article)))
            .await?;
        debug!("Update acknowledged: {}", ack);

        if !store.update(confirmed_row(&ack, article)) {
            warn!("Updated article {} was not loaded in the store", id);
        }
        Ok(())
    }

    /// Deletes one article by id, then removes it from the store.
    #[instrument(skip(self, store))]
    pub async fn delete_record(
        &self,
        store: &mut ArticleStore,
        article_id: i64,
    ) -> Result<(), ClientError> {
        let url = self.build_url(&article_path(article_id))?;
        let ack = self.request_text(HttpRequest::delete(url)).await?;
        debug!("Delete acknowledged: {}", ack);

        if store.remove(article_id).is_none() {
            warn!("Deleted article {} was not loaded in the store", article_id);
        }
        Ok(())
    }

    /// Removes every article from the backend, then clears the store.
    #[instrument(skip(self, store))]
    pub async fn truncate_table(&self, store: &mut ArticleStore) -> Result<(), ClientError> {
        let url = self.build_url(ARTICLES_PATH)?;
        let ack = self.request_text(HttpRequest::delete(url)).await?;
        debug!("Truncate acknowledged: {}", ack);

        store.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn form_fields_match_the_wire_contract() {
        let article = Article::builder()
            .title("t")
            .author("a")
            .author_url("https://example.com")
            .category("c")
            .body("b")
            .published_on(NaiveDate::from_ymd_opt(2024, 5, 7).unwrap())
            .build();

        let fields = form_fields(&article);
        let keys: Vec<_> = fields.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["author", "body", "category", "title", "authorUrl", "publishedOn"]
        );
        assert!(fields.contains(&("publishedOn", "2024-05-07".to_string())));
    }

    #[test]
    fn optional_fields_are_omitted_from_forms() {
        let article = Article::builder()
            .title("t")
            .author("a")
            .category("c")
            .body("b")
            .build();

        let fields = form_fields(&article);
        assert!(!fields.iter().any(|(k, _)| *k == "authorUrl"));
        assert!(!fields.iter().any(|(k, _)| *k == "publishedOn"));
    }

    #[test]
    fn confirmed_row_prefers_the_backend_echo() {
        let submitted = Article::builder()
            .title("local")
            .author("a")
            .category("c")
            .body("b")
            .build();

        let echoed = confirmed_row(
            "{\"article_id\": 9, \"title\": \"local\", \"author\": \"a\", \
             \"category\": \"c\", \"body\": \"b\"}",
            submitted.clone(),
        );
        assert_eq!(echoed.article_id, Some(9));

        let fallback = confirmed_row("row inserted", submitted.clone());
        assert_eq!(fallback, submitted);
    }
}
