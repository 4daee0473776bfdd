//! Unified error type.

use thiserror::Error;

/// The error type returned by bobbin's fallible setup and serving operations.
///
/// Per-request failures (missing parameters, origin errors, unreachable
/// upstreams) are expressed as HTTP [`Response`](crate::Response) values, not
/// as `Error`s. This type surfaces infrastructure failures: binding a port,
/// building the outbound client, registering a route, validating config.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid route `{path}`: {source}")]
    Route {
        path: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Renders `err` followed by each of its sources, joined with `": "`.
///
/// Client errors keep the useful part (`connection refused`, `dns error`)
/// several sources down; the top-level message alone only names the URL.
pub(crate) fn chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        let msg = e.to_string();
        if !msg.is_empty() && !out.contains(&msg) {
            out.push_str(": ");
            out.push_str(&msg);
        }
        source = e.source();
    }
    out
}
