use crate::error::{Result, WikiError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc, oneshot};
use uuid::Uuid;

/// One request travelling to an address.
pub struct Envelope {
    pub correlation_id: Uuid,
    pub body: String,
    pub reply_to: oneshot::Sender<Reply>,
}

#[derive(Debug)]
pub struct Reply {
    pub correlation_id: Uuid,
    pub body: String,
}

/// Maps well-known addresses to the request queue of whoever published there.
///
/// Bodies are opaque text; the bus only routes them and pairs each reply with
/// its request through the correlation id.
#[derive(Default)]
pub struct ServiceBus {
    routes: RwLock<HashMap<String, mpsc::Sender<Envelope>>>,
}

impl ServiceBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn register(&self, address: &str, capacity: usize) -> Result<mpsc::Receiver<Envelope>> {
        let mut routes = self.routes.write().await;
        if routes.contains_key(address) {
            return Err(WikiError::Endpoint(format!(
                "address '{}' is already in use",
                address
            )));
        }

        let (tx, rx) = mpsc::channel(capacity);
        routes.insert(address.to_string(), tx);
        Ok(rx)
    }

    pub async fn unregister(&self, address: &str) -> bool {
        self.routes.write().await.remove(address).is_some()
    }

    /// Sends `body` to `address` and waits for the matching reply.
    pub async fn request(&self, address: &str, body: String) -> Result<String> {
        // clone the sender so the routing table is not held while we wait
        let sender = {
            let routes = self.routes.read().await;
            routes.get(address).cloned()
        }
        .ok_or_else(|| WikiError::Endpoint(format!("no service at address '{}'", address)))?;

        let correlation_id = Uuid::new_v4();
        let (reply_tx, reply_rx) = oneshot::channel();

        sender
            .send(Envelope {
                correlation_id,
                body,
                reply_to: reply_tx,
            })
            .await
            .map_err(|_| WikiError::Endpoint(format!("service at '{}' has stopped", address)))?;

        let reply = reply_rx.await.map_err(|_| {
            WikiError::Endpoint(format!(
                "service at '{}' dropped request {}",
                address, correlation_id
            ))
        })?;

        if reply.correlation_id != correlation_id {
            return Err(WikiError::Endpoint(format!(
                "reply {} does not match request {}",
                reply.correlation_id, correlation_id
            )));
        }

        Ok(reply.body)
    }
}
