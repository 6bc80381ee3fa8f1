//! HTTP client for the Chronicle API.

use reqwest::{Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::models::{Blog, LoginResponse, UserProfile};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("URL cannot be used as an API base: {0}")]
    UnsupportedBaseUrl(String),
    #[error("invalid path segment: {0:?}")]
    InvalidPathSegment(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server returned an empty response")]
    EmptyResponse,
    #[error("not logged in")]
    NotLoggedIn,
}

impl ClientError {
    /// HTTP status for errors the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Thin JSON client. Holds no session state; callers pass the token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url)?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::UnsupportedBaseUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `segments` to the base path. Each segment is percent-encoded,
    /// so ids cannot escape their position in the path.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| matches!(**s, "" | "." | ".."))
        {
            return Err(ClientError::InvalidPathSegment(bad.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::UnsupportedBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and decode the JSON response.
    /// Returns `None` for responses without a body (e.g. 204).
    pub async fn request<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<Option<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        let path = url.path().to_string();
        let mut builder = self.http.request(method.clone(), url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(%method, %path, status = status.as_u16(), "API request");

        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                message: error_message(status, &bytes),
            });
        }

        if status == StatusCode::NO_CONTENT || bytes.is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn call<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(method, segments, token, body)
            .await?
            .ok_or(ClientError::EmptyResponse)
    }

    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ClientError> {
        let body = json!({ "username": username, "email": email, "password": password });
        self.call(Method::POST, &["auth", "signup"], None, Some(&body))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = json!({ "email": email, "password": password });
        self.call(Method::POST, &["auth", "login"], None, Some(&body))
            .await
    }

    pub async fn me(&self, token: &str) -> Result<UserProfile, ClientError> {
        self.call::<_, ()>(Method::GET, &["auth", "me"], Some(token), None)
            .await
    }

    pub async fn list_blogs(&self) -> Result<Vec<Blog>, ClientError> {
        self.call::<_, ()>(Method::GET, &["blogs"], None, None).await
    }

    pub async fn get_blog(&self, id: &str) -> Result<Blog, ClientError> {
        self.call::<_, ()>(Method::GET, &["blogs", id], None, None)
            .await
    }

    pub async fn create_blog(
        &self,
        token: &str,
        title: &str,
        content: &str,
    ) -> Result<Blog, ClientError> {
        let body = json!({ "title": title, "content": content });
        self.call(Method::POST, &["blogs"], Some(token), Some(&body))
            .await
    }

    pub async fn update_blog(
        &self,
        token: &str,
        id: &str,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Blog, ClientError> {
        let mut body = serde_json::Map::new();
        if let Some(title) = title {
            body.insert("title".into(), title.into());
        }
        if let Some(content) = content {
            body.insert("content".into(), content.into());
        }
        self.call(Method::PUT, &["blogs", id], Some(token), Some(&body))
            .await
    }

    pub async fn delete_blog(&self, token: &str, id: &str) -> Result<(), ClientError> {
        self.request::<serde_json::Value, ()>(Method::DELETE, &["blogs", id], Some(token), None)
            .await?;
        Ok(())
    }
}

/// Pull `error` out of a JSON error body, falling back to the status reason.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.as_str().map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}
