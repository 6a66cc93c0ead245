use reqwest::{Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, instrument, warn};

use crate::{
    client::Pressroom,
    error::{ClientError, ResponseError},
};

enum Body {
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

pub struct HttpRequest {
    method: Method,
    path: String,
    query_params: Vec<(String, String)>,
    body: Option<Body>,
    custom_headers: HashMap<String, String>,
}

impl HttpRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query_params: Vec::new(),
            body: None,
            custom_headers: HashMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(Body::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Sends the body as `application/x-www-form-urlencoded` fields.
    #[must_use]
    pub fn form<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Some(Body::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ));
        self
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(key.into(), value.into());
        self
    }
}

// Extension trait adding typed HTTP methods to Pressroom
#[async_trait::async_trait]
pub trait HttpClient {
    async fn request<T: DeserializeOwned>(&self, req: HttpRequest) -> Result<T, ClientError>;
    async fn request_json(&self, req: HttpRequest) -> Result<serde_json::Value, ClientError>;
    async fn request_empty(&self, req: HttpRequest) -> Result<(), ClientError>;
    async fn request_text(&self, req: HttpRequest) -> Result<String, ClientError>;
}

#[async_trait::async_trait]
impl HttpClient for Pressroom {
    async fn request<T: DeserializeOwned>(&self, req: HttpRequest) -> Result<T, ClientError> {
        let res = self.execute_request(req).await?;
        Ok(res.json::<T>().await?)
    }

    async fn request_json(&self, req: HttpRequest) -> Result<serde_json::Value, ClientError> {
        let res = self.execute_request(req).await?;
        Ok(res.json::<serde_json::Value>().await?)
    }

    async fn request_empty(&self, req: HttpRequest) -> Result<(), ClientError> {
        self.execute_request(req).await?;
        Ok(())
    }

    async fn request_text(&self, req: HttpRequest) -> Result<String, ClientError> {
        let res = self.execute_request(req).await?;
        Ok(res.text().await?)
    }
}

impl Pressroom {
    #[instrument(skip(self, req), fields(method = %req.method, path = %req.path))]
    async fn execute_request(&self, req: HttpRequest) -> Result<Response, ClientError> {
        match self.execute_single_request(&req).await {
            Ok(response) => {
                debug!("HTTP request completed successfully");
                self.record_success();
                Ok(response)
            }
            Err(e) => {
                error!("HTTP request failed: {}", e);
                self.record_failure(&e.to_string());
                Err(e)
            }
        }
    }

    async fn execute_single_request(&self, req: &HttpRequest) -> Result<Response, ClientError> {
        let url = if req.query_params.is_empty() {
            req.path.clone()
        } else {
            let params: Vec<String> = req
                .query_params
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            format!("{}?{}", req.path, params.join("&"))
        };

        debug!("Built request URL: {}", url);

        let mut request_builder = match req.method {
            Method::GET => self.http_client.get(&url),
            Method::POST => self.http_client.post(&url),
            Method::PUT => self.http_client.put(&url),
            Method::DELETE => self.http_client.delete(&url),
            _ => {
                return Err(ClientError::InvalidRequest(format!(
                    "Unsupported HTTP method: {:?}",
                    req.method
                )))
            }
        };

        for (key, value) in &req.custom_headers {
            request_builder = request_builder.header(key, value);
        }

        match &req.body {
            Some(Body::Json(body)) => {
                debug!("Adding JSON body to request");
                request_builder = request_builder.json(body);
            }
            Some(Body::Form(fields)) => {
                debug!("Adding form body to request");
                request_builder = request_builder.form(fields);
            }
            None => {}
        }

        debug!("Sending HTTP request");
        let res = request_builder.send().await.map_err(|e| {
            warn!("Network error occurred: {}", e);
            ClientError::RequestError(e)
        })?;

        if let Err(err) = res.error_for_status_ref() {
            let Some(status) = err.status() else {
                error!("HTTP error without status code: {}", err);
                return Err(ResponseError::invalid(err.to_string()).into());
            };

            let body_text = res.text().await.unwrap_or_default();
            error!(
                "Received HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            );
            return Err(ResponseError::http_status(status, body_text).into());
        }

        debug!("HTTP request completed with status: {}", res.status());

        Ok(res)
    }
}
