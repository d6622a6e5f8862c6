//! Startup sequencing.
//!
//! The page store is prepared and published first; HTTP workers are started
//! only once it is ready, so a failed store never lets traffic in.

pub mod worker;

use crate::config::WikiConfig;
use crate::database::PageStore;
use crate::database::pool::ConnectionPool;
use crate::database::sqlite::SqlPageStore;
use crate::error::Result as WikiResult;
use crate::features::wiki::AppState;
use crate::services::endpoint::{self, EndpointHandle, PageStoreProxy, ServiceBus};
use anyhow::{Context, Result, anyhow};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use worker::HttpWorker;

/// A running system: a published page store plus its HTTP workers.
pub struct Deployment {
    local_addr: SocketAddr,
    pool: ConnectionPool,
    endpoint: EndpointHandle,
    workers: Vec<HttpWorker>,
    shutdown: watch::Sender<bool>,
}

impl Deployment {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn instances(&self) -> usize {
        self.workers.len()
    }

    pub fn endpoint_address(&self) -> &str {
        self.endpoint.address()
    }

    /// Stops accepting connections, lets in-flight requests finish, then
    /// retires the page store.
    pub async fn shutdown(self) {
        if self.shutdown.send(true).is_err() {
            tracing::debug!("no HTTP server instance left to signal");
        }
        for worker in self.workers {
            worker.join().await;
        }
        self.endpoint.unpublish().await;
        self.pool.close().await;
        tracing::info!("deployment stopped");
    }
}

/// Brings the whole system up, or nothing of it.
pub async fn deploy(config: &WikiConfig) -> Result<Deployment> {
    let bus = ServiceBus::new();

    let (pool, endpoint) = prepare_page_store(config, bus.clone())
        .await
        .context("page store deployment failed")?;

    let (shutdown, shutdown_rx) = watch::channel(false);
    let proxy = PageStoreProxy::new(bus, config.wikidb_queue.clone());

    match start_http_workers(config, proxy, shutdown_rx).await {
        Ok((local_addr, workers)) => {
            tracing::info!(%local_addr, instances = workers.len(), "deployment complete");
            Ok(Deployment {
                local_addr,
                pool,
                endpoint,
                workers,
                shutdown,
            })
        }
        Err(e) => {
            endpoint.unpublish().await;
            pool.close().await;
            Err(e.context("HTTP server deployment failed"))
        }
    }
}

/// Step one: pool, catalog, schema, then publication at the well-known address.
pub async fn prepare_page_store(
    config: &WikiConfig,
    bus: Arc<ServiceBus>,
) -> WikiResult<(ConnectionPool, EndpointHandle)> {
    config.validate()?;
    let queries = config.sql_queries()?;
    let pool = ConnectionPool::connect(&config.pool_settings()).await?;

    let store = match SqlPageStore::new(pool.clone(), queries).await {
        Ok(store) => store,
        Err(e) => {
            pool.close().await;
            return Err(e);
        }
    };

    let store: Arc<dyn PageStore> = Arc::new(store);
    match endpoint::publish(bus, &config.wikidb_queue, store).await {
        Ok(handle) => Ok((pool, handle)),
        Err(e) => {
            pool.close().await;
            Err(e)
        }
    }
}

/// Step two: bind once, then start every instance concurrently on that socket.
async fn start_http_workers(
    config: &WikiConfig,
    proxy: PageStoreProxy,
    shutdown: watch::Receiver<bool>,
) -> Result<(SocketAddr, Vec<HttpWorker>)> {
    let bind_addr = format!("{}:{}", config.http_host, config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("could not start an HTTP server on {}", bind_addr))?;
    let local_addr = listener.local_addr()?;
    let listener = listener.into_std()?;

    let state = AppState {
        store: Arc::new(proxy),
    };

    let workers = launch_workers(
        listener,
        config.http_instances,
        state,
        shutdown,
        HttpWorker::start,
    )
    .await?;
    Ok((local_addr, workers))
}

/// Runs `start` once per instance, each on its own clone of `listener`.
///
/// If any instance fails, the ones that came up are stopped and awaited
/// before the error is returned, so nothing is left accepting on the socket.
pub(crate) async fn launch_workers<F>(
    listener: std::net::TcpListener,
    instances: usize,
    state: AppState,
    shutdown: watch::Receiver<bool>,
    start: F,
) -> Result<Vec<HttpWorker>>
where
    F: Fn(usize, std::net::TcpListener, AppState, watch::Receiver<bool>) -> std::io::Result<HttpWorker>
        + Clone
        + Send
        + 'static,
{
    let mut starting = JoinSet::new();
    for instance in 0..instances {
        let socket = listener.try_clone();
        let state = state.clone();
        let shutdown = shutdown.clone();
        let start = start.clone();
        starting.spawn(async move {
            socket
                .and_then(|socket| start(instance, socket, state, shutdown))
                .with_context(|| format!("HTTP server instance {} failed to start", instance))
        });
    }

    let mut workers = Vec::with_capacity(instances);
    let mut failure = None;
    while let Some(joined) = starting.join_next().await {
        match joined {
            Ok(Ok(worker)) => workers.push(worker),
            Ok(Err(e)) => {
                failure.get_or_insert(e);
            }
            Err(e) => {
                failure.get_or_insert(anyhow!("HTTP server start task failed: {}", e));
            }
        }
    }

    if let Some(e) = failure {
        // all or nothing: instances that did come up are taken down again
        for worker in workers {
            worker.abort();
            worker.join().await;
        }
        return Err(e);
    }

    workers.sort_by_key(HttpWorker::instance);
    Ok(workers)
}
