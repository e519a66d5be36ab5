// src/proxy/config_server.rs

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::Result;

/// Serves one fixed body on every path until shut down.
#[derive(Debug)]
pub struct ConfigServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ConfigServer {
    /// Bind to `0.0.0.0` on a free port so containers can reach it.
    pub async fn bind(body: String) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", 0)).await?;
        let addr = listener.local_addr()?;

        let app = Router::new().fallback(move || {
            let body = body.clone();
            async move { body }
        });

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!(%addr, "proxy config server listening");
        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            task,
        })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        match (&mut self.task).await {
            Ok(result) => result?,
            Err(e) => warn!(error = %e, "proxy config server task failed"),
        }
        debug!(addr = %self.addr, "proxy config server stopped");
        Ok(())
    }
}
