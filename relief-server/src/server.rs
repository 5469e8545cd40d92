//! HTTP server loop using hyper 1.x.
//!
//! `start` binds the listener and returns a [`ServerHandle`] once the server
//! is accepting connections; the accept loop runs on its own task. Sending
//! shutdown stops accepting and asks open connections to finish their
//! in-flight request and close.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use hyper::body::Incoming;
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use relief_core::error::{ReliefError, ReliefResult};
use relief_services::registry::ServiceRegistry;

use crate::handlers;
use crate::response::{self, BoxBody};
use crate::router::{self, RouteError};

/// Shared context passed to every request handler.
pub(crate) struct ServerContext {
    pub(crate) registry: Arc<ServiceRegistry>,
    pub(crate) cors_origin: HeaderValue,
    pub(crate) max_body_bytes: u64,
    started_at: Instant,
}

impl ServerContext {
    pub(crate) fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// A running server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address actually bound, useful when the configured port was 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Stop accepting connections and wait for the accept loop to exit.
    pub async fn shutdown(self) -> ReliefResult<()> {
        let _ = self.shutdown_tx.send(true);
        self.task
            .await
            .map_err(|e| ReliefError::Internal(format!("server task failed: {e}")))
    }
}

/// Bind `addr` and start serving the REST API over `registry`.
pub async fn start(registry: Arc<ServiceRegistry>, addr: &str) -> ReliefResult<ServerHandle> {
    let server_config = registry.config.read().await.server.clone();
    let cors_origin = HeaderValue::from_str(&server_config.cors_origin).map_err(|_| {
        ReliefError::Config(format!("invalid cors origin: {}", server_config.cors_origin))
    })?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ReliefError::ServiceInit(format!("failed to bind {addr}: {e}")))?;
    let local_addr = listener.local_addr()?;
    info!("relief server listening on http://{local_addr}");

    let ctx = Arc::new(ServerContext {
        registry,
        cors_origin,
        max_body_bytes: server_config.max_body_bytes,
        started_at: Instant::now(),
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(accept_loop(listener, ctx, shutdown_rx));

    Ok(ServerHandle {
        local_addr,
        shutdown_tx,
        task,
    })
}

async fn accept_loop(listener: TcpListener, ctx: Arc<ServerContext>, mut shutdown_rx: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, remote)) => {
                        debug!("connection from {remote}");
                        let ctx = ctx.clone();
                        let mut conn_shutdown = shutdown_rx.clone();
                        tokio::task::spawn(async move {
                            let svc = service_fn(move |req| {
                                let ctx = ctx.clone();
                                async move { handle_request(req, ctx).await }
                            });
                            let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), svc);
                            tokio::pin!(conn);
                            tokio::select! {
                                result = conn.as_mut() => {
                                    if let Err(e) = result {
                                        debug!("connection error from {remote}: {e}");
                                    }
                                }
                                _ = conn_shutdown.changed() => {
                                    conn.as_mut().graceful_shutdown();
                                    if let Err(e) = conn.as_mut().await {
                                        debug!("connection error during shutdown from {remote}: {e}");
                                    }
                                }
                            }
                        });
                    }
                    Err(e) => {
                        warn!("accept error: {e}");
                    }
                }
            }
            changed = shutdown_rx.changed() => {
                // A dropped sender also means nobody can stop us any more.
                if changed.is_err() || *shutdown_rx.borrow() {
                    info!("relief server shutting down");
                    break;
                }
            }
        }
    }
}

/// Route an incoming HTTP request.
async fn handle_request(req: Request<Incoming>, ctx: Arc<ServerContext>) -> Result<Response<BoxBody>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let resp = if method == Method::OPTIONS {
        response::no_content()
    } else {
        match router::resolve(&method, &path) {
            Ok(route) => handlers::dispatch(route, req, &ctx).await,
            Err(RouteError::NotFound) => response::not_found(),
            Err(RouteError::MethodNotAllowed(allow)) => response::method_not_allowed(&allow),
            Err(RouteError::BadId(id)) => response::from_error(&ReliefError::InvalidInput(format!("invalid id: {id}"))),
        }
    };

    debug!(
        "{method} {path} -> {} ({} ms)",
        resp.status().as_u16(),
        started.elapsed().as_millis()
    );
    Ok(response::cors_response(resp, &ctx.cors_origin))
}
