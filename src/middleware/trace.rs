//! Per-request span with method, path, peer, status and latency.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Instant;

use http::Method;
use tracing::{Instrument, info, info_span};

use crate::response::Response;

/// Runs `fut` inside a `request` span and logs one completion event.
pub(crate) async fn trace<F>(method: &Method, path: &str, peer: SocketAddr, fut: F) -> Response
where
    F: Future<Output = Response>,
{
    let span = info_span!("request", %method, path, %peer);
    let start = Instant::now();
    let response = fut.instrument(span.clone()).await;

    span.in_scope(|| {
        info!(
            status = response.status_code().as_u16(),
            latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "request completed"
        );
    });
    response
}
