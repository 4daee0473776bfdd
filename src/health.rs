//! Liveness and readiness check handlers.
//!
//! | Check | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can it take traffic? |
//!
//! Readiness does not contact image origins or the API upstream. Their
//! outages surface per request as `500`/`502`.

use crate::{Request, Response};

/// Always `200 OK` with body `"ok"`.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"` once the router is serving.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
