//! Command-line and environment configuration.
//!
//! Every flag has a `BOBBIN_*` environment fallback, so the same binary runs
//! from a shell or from a container spec without a config file.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::error::Error;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "BOBBIN_LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Path of the image relay endpoint.
    #[arg(long, env = "BOBBIN_PROXY_PATH", default_value = "/proxy-image")]
    pub proxy_path: String,

    /// Seconds to wait for an origin before giving up. 0 waits forever.
    #[arg(long, env = "BOBBIN_FETCH_TIMEOUT", default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// Hosts the image relay may fetch from. Empty allows any host.
    #[arg(long = "allow-host", env = "BOBBIN_ALLOWED_HOSTS", value_delimiter = ',')]
    pub allowed_hosts: Vec<String>,

    /// Remote API that requests under `--api-prefix` are forwarded to.
    #[arg(long, env = "BOBBIN_API_BASE_URL")]
    pub api_base_url: Option<Url>,

    /// Path prefix forwarded to `--api-base-url`.
    #[arg(long, env = "BOBBIN_API_PREFIX", default_value = "/api")]
    pub api_prefix: String,
}

impl Config {
    /// Checks the values clap cannot check on its own.
    pub fn validate(&self) -> Result<(), Error> {
        for (name, path) in [("proxy path", &self.proxy_path), ("api prefix", &self.api_prefix)] {
            if !path.starts_with('/') {
                return Err(Error::Config(format!("{name} `{path}` must start with `/`")));
            }
        }
        if self.api_prefix.len() > 1 && self.api_prefix.ends_with('/') {
            return Err(Error::Config(format!(
                "api prefix `{}` must not end with `/`",
                self.api_prefix
            )));
        }
        if let Some(base) = &self.api_base_url {
            if !matches!(base.scheme(), "http" | "https") {
                return Err(Error::Config(format!("api base url `{base}` must be http or https")));
            }
        }
        Ok(())
    }

    /// `None` when the timeout is disabled.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_secs > 0).then(|| Duration::from_secs(self.fetch_timeout_secs))
    }
}
