//! Image relay: fetch a caller-supplied URL and hand the bytes back.
//!
//! `GET <proxy path>?url=<absolute URL>` performs exactly one outbound `GET`
//! and answers with exactly one response:
//!
//! | Outcome | Status | Body |
//! |---|---|---|
//! | `url` absent or empty | `400` | `Missing URL parameter` |
//! | host outside a non-empty allowlist | `403` | `Host not allowed: <host>` |
//! | origin answers non-2xx `S` | `S` | `Failed to fetch image: <reason>` |
//! | origin answers 2xx | `200` | origin bytes, origin or `image/jpeg` type |
//! | fetch itself fails | `500` | `Error fetching image: <message>` |
//!
//! Nothing is cached: two identical requests are two fetches.

use std::sync::Arc;
use std::time::Duration;

use http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::error::{self, Error};
use crate::request::Request;
use crate::response::{ContentType, IntoResponse, Response};

/// Query parameter carrying the target URL.
pub const URL_PARAM: &str = "url";

/// Why a relay produced no image. `Display` is the response body.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Missing URL parameter")]
    MissingParameter,

    #[error("Host not allowed: {0}")]
    HostNotAllowed(String),

    #[error("Failed to fetch image: {reason}")]
    OriginFailure { status: StatusCode, reason: String },

    #[error("Error fetching image: {0}")]
    Transport(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter => StatusCode::BAD_REQUEST,
            Self::HostNotAllowed(_) => StatusCode::FORBIDDEN,
            Self::OriginFailure { status, .. } => *status,
            Self::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        Response::builder().status(self.status()).text(self.to_string())
    }
}

/// Options for [`ResourceProxy::new`].
#[derive(Debug, Clone, Default)]
pub struct ProxyOptions {
    /// Upper bound on the whole fetch, body included. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Hosts the relay may contact. Empty allows any host.
    pub allowed_hosts: Vec<String>,
}

/// The image relay. Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ResourceProxy {
    client: reqwest::Client,
    allowed_hosts: Arc<[String]>,
}

impl ResourceProxy {
    pub fn new(options: ProxyOptions) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let allowed_hosts = options.allowed_hosts.iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Ok(Self { client: builder.build()?, allowed_hosts })
    }

    /// Route handler: relays the image named by the `url` query parameter.
    pub async fn relay(&self, req: Request) -> Response {
        let target = req.query(URL_PARAM);
        match self.fetch(target.as_deref()).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    url = target.as_deref().unwrap_or_default(),
                    status = e.status().as_u16(),
                    "image relay failed: {e}"
                );
                e.into_response()
            }
        }
    }

    async fn fetch(&self, target: Option<&str>) -> Result<Response, RelayError> {
        let target = target
            .filter(|t| !t.is_empty())
            .ok_or(RelayError::MissingParameter)?;
        let url = Url::parse(target).map_err(|e| RelayError::Transport(e.to_string()))?;
        self.check_host(&url)?;

        let origin = self.client.get(url).send().await
            .map_err(|e| RelayError::Transport(error::chain(&e)))?;

        let status = origin.status();
        if !status.is_success() {
            return Err(RelayError::OriginFailure {
                status,
                reason: status.canonical_reason().unwrap_or_default().to_owned(),
            });
        }

        let content_type = origin.headers().get(CONTENT_TYPE).cloned();
        let body = origin.bytes().await
            .map_err(|e| RelayError::Transport(error::chain(&e)))?;
        debug!(url = target, bytes = body.len(), "image relayed");

        let builder = Response::builder()
            .header(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        Ok(match content_type {
            Some(content_type) => builder.body(content_type, body),
            None => builder.bytes(ContentType::Jpeg, body),
        })
    }

    fn check_host(&self, url: &Url) -> Result<(), RelayError> {
        if self.allowed_hosts.is_empty() {
            return Ok(());
        }
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if self.allowed_hosts.iter().any(|allowed| *allowed == host) {
            Ok(())
        } else {
            Err(RelayError::HostNotAllowed(host))
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::Method;

    use super::*;
    use crate::request::test_request;

    fn proxy(allowed_hosts: &[&str]) -> ResourceProxy {
        ResourceProxy::new(ProxyOptions {
            timeout: Some(Duration::from_secs(5)),
            allowed_hosts: allowed_hosts.iter().map(|h| (*h).to_owned()).collect(),
        })
        .expect("client builds")
    }

    #[tokio::test]
    async fn missing_parameter_is_400() {
        let res = proxy(&[]).relay(test_request(Method::GET, "/proxy-image", Bytes::new())).await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(res.body().as_ref(), b"Missing URL parameter");
    }

    #[tokio::test]
    async fn empty_parameter_is_missing() {
        let res = proxy(&[]).relay(test_request(Method::GET, "/proxy-image?url=", Bytes::new())).await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_url_is_500() {
        let res = proxy(&[]).relay(test_request(Method::GET, "/proxy-image?url=not-a-url", Bytes::new())).await;
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(res.body().starts_with(b"Error fetching image: "));
    }

    #[tokio::test]
    async fn host_outside_allowlist_is_403() {
        let res = proxy(&["CDN.example.com"])
            .relay(test_request(Method::GET, "/proxy-image?url=https://evil.example.net/a.png", Bytes::new()))
            .await;
        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(res.body().as_ref(), b"Host not allowed: evil.example.net");
    }

    #[test]
    fn allowlist_match_ignores_case() {
        let proxy = proxy(&["CDN.example.com"]);
        let url = Url::parse("https://cdn.EXAMPLE.com/a.png").expect("valid url");
        assert!(proxy.check_host(&url).is_ok());
    }

    #[test]
    fn origin_failure_keeps_origin_status() {
        let res = RelayError::OriginFailure {
            status: StatusCode::NOT_FOUND,
            reason: "Not Found".to_owned(),
        }
        .into_response();
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(res.body().as_ref(), b"Failed to fetch image: Not Found");
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    }
}
