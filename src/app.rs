//! Route table for the storefront companion server.

use http::Method;
use tracing::info;

use crate::config::Config;
use crate::error::Error;
use crate::forward::{ApiForward, REST_PARAM};
use crate::health;
use crate::proxy::{ProxyOptions, ResourceProxy};
use crate::request::Request;
use crate::router::Router;

/// Methods forwarded under the API prefix.
const FORWARDED_METHODS: [Method; 6] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Builds the router: health checks, the image relay, and (when an API base
/// URL is configured) the API forwarder.
pub fn router(config: &Config) -> Result<Router, Error> {
    config.validate()?;

    let proxy = ResourceProxy::new(ProxyOptions {
        timeout: config.fetch_timeout(),
        allowed_hosts: config.allowed_hosts.clone(),
    })?;

    let mut router = Router::new()
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
        .try_on(Method::GET, &config.proxy_path, move |req: Request| {
            let proxy = proxy.clone();
            async move { proxy.relay(req).await }
        })?;
    info!(path = %config.proxy_path, "image relay mounted");

    if let Some(base) = &config.api_base_url {
        let forward = ApiForward::new(base.clone())?;
        let path = format!("{}/{{*{REST_PARAM}}}", config.api_prefix.trim_end_matches('/'));
        for method in FORWARDED_METHODS {
            let forward = forward.clone();
            router = router.try_on(method, &path, move |req: Request| {
                let forward = forward.clone();
                async move { forward.forward(req).await }
            })?;
        }
        info!(prefix = %config.api_prefix, %base, "api forwarding mounted");
    }

    Ok(router)
}
