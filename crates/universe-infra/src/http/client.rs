//! ReqwestTransport -- concrete [`HttpTransport`] over reqwest.
//!
//! Resolves request paths against the configured API base URL and attaches
//! the bearer credential chosen by the request gate. Any HTTP response,
//! including 4xx and 5xx, is returned as an [`ApiResponse`]; only failures
//! where no response exists become a [`TransportError`].
//!
//! Credentials are exposed only when building the `Authorization` header and
//! never appear in tracing output.

use std::time::Duration;

use secrecy::ExposeSecret;
use universe_core::transport::{ApiRequest, ApiResponse, HttpTransport, Method};
use universe_types::error::TransportError;
use url::Url;

pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Create a transport for `base_url` with a per-request `timeout`.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("uni/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Other(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::Other(format!("invalid request path '{path}': {e}")))
    }
}

/// `Url::join` replaces the last segment unless the base ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn map_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request.path)?;
        tracing::debug!(method = %request.method, path = %request.path, "sending request");

        let mut builder = self.client.request(method(request.method), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_error)?;

        tracing::debug!(method = %request.method, path = %request.path, status, "response received");
        Ok(ApiResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> ReqwestTransport {
        ReqwestTransport::new(Url::parse(base).unwrap(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn joins_paths_onto_root_base() {
        let t = transport("http://localhost:8000");
        assert_eq!(
            t.url_for("/api/posts/3/").unwrap().as_str(),
            "http://localhost:8000/api/posts/3/"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let t = transport("https://universe.app/backend");
        assert_eq!(t.base_url().as_str(), "https://universe.app/backend/");
        assert_eq!(
            t.url_for("/api/token/").unwrap().as_str(),
            "https://universe.app/backend/api/token/"
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        // Port 9 (discard) is closed on test machines.
        let t = transport("http://127.0.0.1:9");
        let err = t.send(ApiRequest::get("/api/posts/")).await.unwrap_err();
        assert!(matches!(err, TransportError::Connect(_) | TransportError::Other(_)));
    }
}
