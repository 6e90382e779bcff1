//! HTTP/1.1 server implementation

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::handlers::handle_request;
use crate::state::AppState;

pub struct DoorgateServer {
    state: Arc<AppState>,
}

impl DoorgateServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Bind and serve until Ctrl-C
    pub async fn serve(self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("doorgate server listening on {}", listener.local_addr()?);

        self.serve_listener(listener, shutdown_signal()).await
    }

    /// Accept connections on `listener` until `shutdown` resolves, then let
    /// open connections finish their current request and close.
    pub async fn serve_listener(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> std::io::Result<()> {
        tokio::pin!(shutdown);
        let (closing_tx, closing_rx) = watch::channel(false);
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, remote_addr) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };
                    debug!("New connection from {}", remote_addr);

                    let state = self.state.clone();
                    let closing = closing_rx.clone();
                    connections.spawn(async move {
                        if let Err(err) = Self::handle_connection(stream, state, closing).await {
                            error!("Connection error from {}: {}", remote_addr, err);
                        }
                    });
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                _ = &mut shutdown => {
                    info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        drop(listener);
        let _ = closing_tx.send(true);

        if !connections.is_empty() {
            info!("Waiting for {} open connection(s) to finish", connections.len());
        }
        while connections.join_next().await.is_some() {}

        Ok(())
    }

    async fn handle_connection(
        stream: TcpStream,
        state: Arc<AppState>,
        mut closing: watch::Receiver<bool>,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);

        let service = service_fn(move |req| {
            let state = state.clone();
            async move { Ok::<_, Infallible>(handle_request(req, state).await) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            _ = async { let _ = closing.wait_for(|closing| *closing).await; } => {
                // finish the request in flight, then close instead of keeping alive
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        // without a signal handler, run until killed
        std::future::pending::<()>().await;
    }
}
