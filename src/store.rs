use crate::models::Article;

/// In-memory collection of loaded articles.
///
/// Owned by the caller and passed by `&mut` to the network operations, which
/// only touch it after the backend has confirmed the corresponding change.
/// Reloading replaces the contents instead of appending, so repeated loads
/// never accumulate duplicates.
#[derive(Debug, Default)]
pub struct ArticleStore {
    articles: Vec<Article>,
}

impl ArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents with `rows`, most recently published first.
    /// Drafts (no publication date) sort after every published article.
    pub fn replace(&mut self, mut rows: Vec<Article>) {
        rows.sort_by(|a, b| b.published_on.cmp(&a.published_on));
        self.articles = rows;
    }

    pub fn add(&mut self, article: Article) {
        self.articles.push(article);
    }

    /// Replaces the stored article with the same id. Returns `false` when no
    /// such article is loaded.
    pub fn update(&mut self, article: Article) -> bool {
        let Some(id) = article.article_id else {
            return false;
        };
        match self.articles.iter_mut().find(|a| a.article_id == Some(id)) {
            Some(slot) => {
                *slot = article;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, article_id: i64) -> Option<Article> {
        let idx = self
            .articles
            .iter()
            .position(|a| a.article_id == Some(article_id))?;
        Some(self.articles.remove(idx))
    }

    pub fn get(&self, article_id: i64) -> Option<&Article> {
        self.articles.iter().find(|a| a.article_id == Some(article_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Article> {
        self.articles.iter()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn clear(&mut self) {
        self.articles.clear();
    }
}
