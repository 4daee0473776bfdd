//! Path-prefix forwarding to a remote API.
//!
//! With prefix `/api` and base `https://api.example.com/v1`, a request for
//! `/api/products/3?page=2` is sent to `https://api.example.com/v1/products/3?page=2`
//! with its method, body and end-to-end headers intact. The upstream answer is
//! relayed the same way.

use http::header::{CONNECTION, CONTENT_LENGTH, HOST};
use http::{HeaderMap, HeaderName, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::error::{self, Error};
use crate::request::Request;
use crate::response::Response;

/// Name of the catch-all path parameter holding the remainder after the prefix.
pub const REST_PARAM: &str = "rest";

/// Connection-scoped headers that never cross the forwarder, on top of any
/// the message names in its own `Connection` header.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Why a request path could not be mapped under the base URL.
#[derive(Debug, Error)]
enum TargetError {
    #[error("path escapes the api base")]
    OutsideBase,

    #[error(transparent)]
    Parse(#[from] url::ParseError),
}

/// Forwards requests under a prefix to a fixed base URL.
#[derive(Clone)]
pub struct ApiForward {
    client: reqwest::Client,
    base: Url,
}

impl ApiForward {
    pub fn new(base: Url) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, base })
    }

    /// Route handler. Expects the route to capture the remainder as
    /// [`REST_PARAM`].
    pub async fn forward(&self, req: Request) -> Response {
        let target = self.target(req.param(REST_PARAM).unwrap_or_default(), req.uri().query());
        let target = match target {
            Ok(target) => target,
            Err(e) => {
                warn!(path = req.path(), "api forward rejected: {e}");
                return Response::builder()
                    .status(StatusCode::BAD_REQUEST)
                    .text(format!("Invalid API path: {e}"));
            }
        };

        let upstream = self.client
            .request(req.method().clone(), target.clone())
            .headers(end_to_end(req.headers(), &[HOST, CONTENT_LENGTH]))
            .body(req.body().clone())
            .send()
            .await;
        let upstream = match upstream {
            Ok(upstream) => upstream,
            Err(e) => {
                warn!(url = %target, "api forward failed: {e}");
                return bad_gateway(&error::chain(&e));
            }
        };

        let status = upstream.status();
        let headers = end_to_end(upstream.headers(), &[CONTENT_LENGTH]);
        match upstream.bytes().await {
            Ok(body) => {
                debug!(url = %target, status = status.as_u16(), bytes = body.len(), "api forwarded");
                Response::builder().status(status).headers(headers).raw(body)
            }
            Err(e) => {
                warn!(url = %target, "api forward body read failed: {e}");
                bad_gateway(&error::chain(&e))
            }
        }
    }

    /// Joins the captured remainder and the original query onto the base.
    ///
    /// `.` and `..` segments are refused however they are spelled, and the
    /// parsed result must still sit under the base path.
    fn target(&self, rest: &str, query: Option<&str>) -> Result<Url, TargetError> {
        if rest.split(['/', '\\']).any(is_dot_segment) {
            return Err(TargetError::OutsideBase);
        }

        let base = self.base.as_str().trim_end_matches('/');
        let mut target = Url::parse(&format!("{base}/{rest}"))?;

        let base_path = self.base.path().trim_end_matches('/');
        let under_base = target.path()
            .strip_prefix(base_path)
            .is_some_and(|tail| tail.starts_with('/'));
        if !under_base {
            return Err(TargetError::OutsideBase);
        }

        target.set_query(query);
        Ok(target)
    }
}

fn is_dot_segment(segment: &str) -> bool {
    let segment = segment.to_ascii_lowercase().replace("%2e", ".");
    segment == "." || segment == ".."
}

/// Copies `headers` without hop-by-hop headers, the names listed in
/// `Connection`, or `also_drop`.
fn end_to_end(headers: &HeaderMap, also_drop: &[HeaderName]) -> HeaderMap {
    let listed: Vec<String> = headers.get_all(CONNECTION).iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect();

    let mut out = headers.clone();
    for name in listed.iter().map(String::as_str).chain(HOP_BY_HOP) {
        out.remove(name);
    }
    for name in also_drop {
        out.remove(name);
    }
    out
}

fn bad_gateway(message: &str) -> Response {
    Response::builder()
        .status(StatusCode::BAD_GATEWAY)
        .text(format!("Error forwarding request: {message}"))
}
