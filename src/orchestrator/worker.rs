use crate::features::wiki::{AppState, wiki_router};
use std::net::SocketAddr;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// One HTTP server instance.
///
/// Instances share nothing but the listening socket they accept from and the
/// page store behind `AppState`.
pub struct HttpWorker {
    instance: usize,
    handle: JoinHandle<std::io::Result<()>>,
}

impl HttpWorker {
    /// Starts serving on a duplicate of `listener`. Fails if the socket cannot
    /// be handed to the runtime.
    pub fn start(
        instance: usize,
        listener: std::net::TcpListener,
        state: AppState,
        mut shutdown: watch::Receiver<bool>,
    ) -> std::io::Result<Self> {
        let listener = tokio::net::TcpListener::from_std(listener)?;
        let local_addr: SocketAddr = listener.local_addr()?;
        let app = wiki_router().with_state(state);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown.wait_for(|stop| *stop).await;
                })
                .await
        });

        tracing::info!(instance, %local_addr, "HTTP server instance running");
        Ok(Self { instance, handle })
    }

    pub fn instance(&self) -> usize {
        self.instance
    }

    pub fn abort(&self) {
        self.handle.abort();
    }

    pub async fn join(self) {
        match self.handle.await {
            Ok(Ok(())) => tracing::debug!(instance = self.instance, "HTTP server instance stopped"),
            Ok(Err(e)) => {
                tracing::error!(instance = self.instance, error = %e, "HTTP server instance failed")
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => tracing::error!(instance = self.instance, error = %e, "HTTP server instance panicked"),
        }
    }
}
