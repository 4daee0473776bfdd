#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bobbin::{Config, Server, app};
use bytes::Bytes;
use clap::Parser;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const CAT_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff, 0x10];
pub const RAW_BYTES: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];

/// A mock origin counting every request it receives.
pub struct Origin {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl Origin {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub async fn spawn_origin() -> Origin {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                continue;
            };
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let svc = service_fn(move |req| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    origin(req)
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), svc)
                    .await;
            });
        }
    });

    Origin { addr, hits }
}

async fn origin(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path().to_owned();
    let builder = Response::builder();

    let response = match path.as_str() {
        "/cat.png" => builder
            .header("Content-Type", "image/png")
            .body(Full::new(Bytes::from_static(CAT_PNG))),
        "/raw" => builder.body(Full::new(Bytes::from_static(RAW_BYTES))),
        "/redirect" => builder
            .status(StatusCode::FOUND)
            .header("Location", "/cat.png")
            .body(Full::new(Bytes::new())),
        "/teapot" => builder
            .status(StatusCode::IM_A_TEAPOT)
            .body(Full::new(Bytes::new())),
        "/slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            builder.body(Full::new(Bytes::from_static(CAT_PNG)))
        }
        p if p.starts_with("/echo/") => {
            let method = req.method().clone();
            let target = req.uri().path_and_query().map(ToString::to_string).unwrap_or_default();
            let auth = req
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_owned();
            let body = req.into_body().collect().await.unwrap().to_bytes();
            builder
                .status(StatusCode::CREATED)
                .header("Content-Type", "text/plain")
                .header("X-Upstream", "echo")
                .header("Connection", "keep-alive, X-Hop-Note")
                .header("Keep-Alive", "timeout=5")
                .header("X-Hop-Note", "origin-only")
                .body(Full::new(Bytes::from(format!(
                    "{method} {target} {auth} {}",
                    String::from_utf8_lossy(&body)
                ))))
        }
        _ => builder
            .status(StatusCode::NOT_FOUND)
            .body(Full::new(Bytes::from_static(b"nope"))),
    };

    Ok(response.unwrap())
}

/// A running bobbin instance on an ephemeral port.
pub struct App {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), bobbin::Error>>,
}

impl App {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// URL of the image relay with `target` as the encoded `url` parameter.
    pub fn proxy_url(&self, target: &str) -> String {
        url::Url::parse_with_params(&self.url("/proxy-image"), &[("url", target)])
            .unwrap()
            .to_string()
    }

    pub async fn stop(mut self) -> Result<(), bobbin::Error> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap()
    }
}

pub async fn spawn_app(args: &[&str]) -> App {
    let config = Config::parse_from(std::iter::once("bobbin").chain(args.iter().copied()));
    let router = app::router(&config).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(Server::from_listener(listener).serve_with_shutdown(router, async move {
        let _ = rx.await;
    }));

    App { addr, shutdown: Some(tx), handle }
}

/// An address nothing listens on.
pub async fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
