//! # bobbin
//!
//! Server-side companion for the studio storefront: an image relay that lets
//! pages show pictures from hosts that do not send CORS headers, and a
//! path-prefix forwarder to the shop's remote API.
//!
//! ## Endpoints
//!
//! - `GET /proxy-image?url=<absolute URL>` fetches the URL once and returns
//!   its bytes with `Access-Control-Allow-Origin: *` (see [`proxy`]).
//! - `<prefix>/*` is forwarded to `--api-base-url` when set (see [`forward`]).
//! - `GET /healthz`, `GET /readyz` (see [`health`]).
//!
//! ## Embedding
//!
//! The router and server are usable on their own:
//!
//! ```rust,no_run
//! use bobbin::{Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), bobbin::Error> {
//!     let app = Router::new().get("/hello/{name}", hello);
//!     Server::bind(([127, 0, 0, 1], 3000).into()).serve(app).await
//! }
//!
//! async fn hello(req: Request) -> Response {
//!     Response::text(format!("hello {}", req.param("name").unwrap_or("there")))
//! }
//! ```

mod error;
mod handler;
mod middleware;
mod request;
mod response;
mod router;
mod server;

pub mod app;
pub mod config;
pub mod forward;
pub mod health;
pub mod proxy;

pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
