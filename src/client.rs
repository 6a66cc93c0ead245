use std::{
    sync::atomic::{AtomicU64, Ordering},
    sync::Arc,
    time::Instant,
};

use bon::Builder;
use tracing::debug;

use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub last_successful_request: Option<Instant>,
    pub total_requests: u64,
    pub failed_requests: u64,
    pub last_error: Option<(Instant, String)>,
}

/// Client for a blog-article REST backend.
#[derive(Clone, Builder)]
pub struct Pressroom {
    #[builder(into)]
    pub(crate) base_url: String,
    #[builder(default = reqwest::Client::new())]
    pub(crate) http_client: reqwest::Client,
    #[builder(skip = Arc::new(AtomicU64::new(0)))]
    total_requests: Arc<AtomicU64>,
    #[builder(skip = Arc::new(AtomicU64::new(0)))]
    failed_requests: Arc<AtomicU64>,
    #[builder(skip = Arc::new(parking_lot::RwLock::new(None)))]
    last_successful_request: Arc<parking_lot::RwLock<Option<Instant>>>,
    #[builder(skip = Arc::new(parking_lot::RwLock::new(None)))]
    last_error: Arc<parking_lot::RwLock<Option<(Instant, String)>>>,
}

impl Pressroom {
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("PRESSROOM_BASE_URL").map_err(|_| {
            ClientError::MissingConfig("PRESSROOM_BASE_URL environment variable not set".to_string())
        })?;
        Ok(Self::builder().base_url(base_url).build())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn build_url(&self, path: &str) -> Result<String, ClientError> {
        use reqwest::Url;

        let url = Url::parse(&self.base_url)
            .map_err(|e| {
                crate::error::ResponseError::invalid(format!("Invalid base URL: {e}"))
            })?
            .join(path.trim_start_matches('/'))
            .map_err(|e| {
                crate::error::ResponseError::invalid(format!("Invalid path '{path}': {e}"))
            })?;

        Ok(url.to_string())
    }

    pub(crate) fn record_success(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        *self.last_successful_request.write() = Some(Instant::now());
    }

    pub(crate) fn record_failure(&self, error: &str) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
        *self.last_error.write() = Some((Instant::now(), error.to_string()));
    }

    pub fn health_status(&self) -> HealthStatus {
        HealthStatus {
            last_successful_request: *self.last_successful_request.read(),
            total_requests: self.total_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            last_error: self.last_error.read().clone(),
        }
    }

    pub fn reset_health_metrics(&self) {
        debug!("Resetting health metrics");
        self.total_requests.store(0, Ordering::Relaxed);
        self.failed_requests.store(0, Ordering::Relaxed);
        *self.last_successful_request.write() = None;
        *self.last_error.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_url_and_path() {
        let client = Pressroom::builder().base_url("http://localhost:3000").build();
        assert_eq!(
            client.build_url("/articles").unwrap(),
            "http://localhost:3000/articles"
        );
        assert_eq!(
            client.build_url("/articles/7").unwrap(),
            "http://localhost:3000/articles/7"
        );
    }

    #[test]
    fn rejects_unparsable_base_url() {
        let client = Pressroom::builder().base_url("not a url").build();
        assert!(client.build_url("/articles").is_err());
    }
}
