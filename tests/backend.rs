//! End-to-end tests against an in-process HTTP backend implementing the
//! article endpoints over an in-memory table.

use std::sync::{
    atomic::{AtomicI64, AtomicU64, Ordering},
    Arc, Mutex,
};

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use pressroom::prelude::*;

#[derive(Clone, Default)]
struct Backend {
    rows: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<AtomicI64>,
    insert_count: Arc<AtomicU64>,
    delete_count: Arc<AtomicU64>,
}

impl Backend {
    fn rows(&self) -> Vec<Value> {
        self.rows.lock().unwrap().clone()
    }

    fn inserts(&self) -> u64 {
        self.insert_count.load(Ordering::SeqCst)
    }

    fn deletes(&self) -> u64 {
        self.delete_count.load(Ordering::SeqCst)
    }
}

#[derive(Deserialize)]
struct ArticleForm {
    author: String,
    #[serde(rename = "authorUrl")]
    author_url: Option<String>,
    body: String,
    category: String,
    #[serde(rename = "publishedOn")]
    published_on: Option<String>,
    title: String,
}

impl ArticleForm {
    fn into_row(self, id: i64) -> Value {
        json!({
            "article_id": id,
            "title": self.title,
            "author": self.author,
            "authorUrl": self.author_url,
            "category": self.category,
            "body": self.body,
            "publishedOn": self.published_on,
        })
    }
}

async fn list_articles(State(backend): State<Backend>) -> Json<Vec<Value>> {
    Json(backend.rows())
}

async fn create_article(
    State(backend): State<Backend>,
    Form(form): Form<ArticleForm>,
) -> Json<Value> {
    backend.insert_count.fetch_add(1, Ordering::SeqCst);
    let id = backend.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let row = form.into_row(id);
    backend.rows.lock().unwrap().push(row.clone());
    Json(row)
}

async fn update_article(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    Form(form): Form<ArticleForm>,
) -> Json<Value> {
    let row = form.into_row(id);
    let mut rows = backend.rows.lock().unwrap();
    if let Some(slot) = rows.iter_mut().find(|r| r["article_id"] == json!(id)) {
        *slot = row.clone();
    }
    Json(row)
}

async fn delete_article(State(backend): State<Backend>, Path(id): Path<i64>) -> String {
    backend.delete_count.fetch_add(1, Ordering::SeqCst);
    backend
        .rows
        .lock()
        .unwrap()
        .retain(|r| r["article_id"] != json!(id));
    "row deleted".to_string()
}

async fn truncate_articles(State(backend): State<Backend>) -> String {
    backend.rows.lock().unwrap().clear();
    "table truncated".to_string()
}

async fn spawn_backend() -> (Backend, Pressroom) {
    let backend = Backend::default();
    let app = Router::new()
        .route(
            "/articles",
            get(list_articles)
                .post(create_article)
                .delete(truncate_articles),
        )
        .route("/articles/{id}", put(update_article).delete(delete_article))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = Pressroom::builder()
        .base_url(format!("http://{addr}"))
        .build();
    (backend, client)
}

#[tokio::test]
async fn fetch_or_seed_bootstraps_an_empty_backend() {
    let (backend, client) = spawn_backend().await;
    let seed = SeedData::bundled();
    let mut store = ArticleStore::new();

    let count = client.fetch_or_seed(&mut store, &seed).await.unwrap();
    assert_eq!(count, seed.len());
    assert_eq!(store.len(), seed.len());
    assert_eq!(backend.rows().len(), seed.len());
    assert_eq!(backend.inserts(), seed.len() as u64);

    // A second call finds a populated backend and performs zero inserts.
    let mut second_store = ArticleStore::new();
    let count = client.fetch_or_seed(&mut second_store, &seed).await.unwrap();
    assert_eq!(count, seed.len());
    assert_eq!(backend.inserts(), seed.len() as u64);
}

#[tokio::test]
async fn fetch_all_orders_most_recent_first() {
    let (_backend, client) = spawn_backend().await;
    let seed = SeedData::bundled();
    let mut store = ArticleStore::new();

    client.fetch_or_seed(&mut store, &seed).await.unwrap();

    let dates: Vec<_> = store.iter().map(|a| a.published_on).collect();
    let mut published = dates.clone();
    published.sort_by(|a, b| b.cmp(a));
    assert_eq!(dates, published);
    // Drafts come last.
    assert!(store.iter().last().unwrap().is_draft());
}

#[tokio::test]
async fn insert_record_adds_the_confirmed_row() {
    let (backend, client) = spawn_backend().await;
    let mut store = ArticleStore::new();

    let article = Article::builder()
        .title("Fresh")
        .author("Iris Ko")
        .category("operations")
        .body("brand new")
        .build();
    client.insert_record(&mut store, article).await.unwrap();

    assert_eq!(store.len(), 1);
    // The backend echo carries the assigned id.
    let stored = store.iter().next().unwrap();
    assert_eq!(stored.article_id, Some(1));
    assert_eq!(backend.rows().len(), 1);
}

#[tokio::test]
async fn update_record_reconciles_store_and_backend() {
    let (backend, client) = spawn_backend().await;
    let seed = SeedData::bundled();
    let mut store = ArticleStore::new();
    client.fetch_or_seed(&mut store, &seed).await.unwrap();

    let mut article = store.iter().next().unwrap().clone();
    let id = article.article_id.unwrap();
    article.title = "Retitled".to_string();
    client.update_record(&mut store, article).await.unwrap();

    assert_eq!(store.get(id).unwrap().title, "Retitled");
    let row = backend
        .rows()
        .into_iter()
        .find(|r| r["article_id"] == serde_json::json!(id))
        .unwrap();
    assert_eq!(row["title"], "Retitled");
}

#[tokio::test]
async fn delete_record_targets_exactly_one_row() {
    let (backend, client) = spawn_backend().await;
    let seed = SeedData::bundled();
    let mut store = ArticleStore::new();
    client.fetch_or_seed(&mut store, &seed).await.unwrap();

    let id = store.iter().next().unwrap().article_id.unwrap();
    client.delete_record(&mut store, id).await.unwrap();

    assert_eq!(backend.deletes(), 1);
    assert_eq!(store.len(), seed.len() - 1);
    assert_eq!(backend.rows().len(), seed.len() - 1);
    assert!(store.get(id).is_none());
    assert!(!backend
        .rows()
        .iter()
        .any(|r| r["article_id"] == serde_json::json!(id)));
}

#[tokio::test]
async fn truncate_table_empties_store_and_backend() {
    let (backend, client) = spawn_backend().await;
    let seed = SeedData::bundled();
    let mut store = ArticleStore::new();
    client.fetch_or_seed(&mut store, &seed).await.unwrap();

    client.truncate_table(&mut store).await.unwrap();
    assert!(store.is_empty());
    assert!(backend.rows().is_empty());

    // Seeding starts over against the truncated backend.
    let count = client.fetch_or_seed(&mut store, &seed).await.unwrap();
    assert_eq!(count, seed.len());
}

#[tokio::test]
async fn backend_failures_are_reported_to_the_caller() {
    let client = Pressroom::builder()
        .base_url("http://127.0.0.1:9") // discard port, nothing listens here
        .build();
    let mut store = ArticleStore::new();

    let err = client.fetch_all(&mut store).await;
    assert!(err.is_err());
    assert!(store.is_empty());

    let health = client.health_status();
    assert_eq!(health.failed_requests, 1);
    assert!(health.last_error.is_some());
}
