//! Makes a [`PageStore`] callable through a [`ServiceBus`] address.
//!
//! Each call is one JSON message naming the action and its arguments; the
//! reply is one JSON message carrying the payload or an error descriptor.
//! Calls are dispatched independently, so there is no ordering between them.

use crate::database::PageStore;
use crate::error::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub mod bus;
pub mod protocol;
pub mod proxy;

pub use bus::ServiceBus;
pub use protocol::{FetchReply, PageReply, PageRequest};
pub use proxy::PageStoreProxy;

use bus::{Envelope, Reply};

const REQUEST_QUEUE_CAPACITY: usize = 256;

pub struct EndpointHandle {
    address: String,
    bus: Arc<ServiceBus>,
    dispatcher: JoinHandle<()>,
}

impl EndpointHandle {
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Stops accepting calls at the address. Calls already dispatched still
    /// run to completion.
    pub async fn unpublish(self) {
        self.bus.unregister(&self.address).await;
        // the route held the last long-lived sender, so the loop drains and exits
        if let Err(e) = self.dispatcher.await {
            tracing::error!(address = %self.address, error = %e, "page store dispatcher failed");
        }
        tracing::info!(address = %self.address, "page store endpoint unpublished");
    }
}

/// Publishes `store` at `address` on `bus`.
pub async fn publish(
    bus: Arc<ServiceBus>,
    address: &str,
    store: Arc<dyn PageStore>,
) -> Result<EndpointHandle> {
    let mut rx = bus.register(address, REQUEST_QUEUE_CAPACITY).await?;

    let dispatcher = tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            let store = store.clone();
            tokio::spawn(handle_envelope(store, envelope));
        }
    });

    tracing::info!(address, "page store endpoint published");

    Ok(EndpointHandle {
        address: address.to_string(),
        bus,
        dispatcher,
    })
}

async fn handle_envelope(store: Arc<dyn PageStore>, envelope: Envelope) {
    let Envelope {
        correlation_id,
        body,
        reply_to,
    } = envelope;

    let reply = match protocol::decode_request(&body) {
        Ok(request) => dispatch(store.as_ref(), request).await,
        Err(e) => {
            tracing::warn!(%correlation_id, error = %e, "rejecting malformed request");
            PageReply::Failed { error: e }
        }
    };

    // the caller may have gone away; nothing left to do then
    let _ = reply_to.send(Reply {
        correlation_id,
        body: protocol::encode_reply(&reply),
    });
}

pub async fn dispatch(store: &dyn PageStore, request: PageRequest) -> PageReply {
    let outcome = match request {
        PageRequest::AllPages => store
            .list_pages()
            .await
            .map(|names| PageReply::Pages { names }),
        PageRequest::GetPage { name } => store
            .fetch_page(&name)
            .await
            .map(|page| PageReply::Page(FetchReply::from_page(page))),
        PageRequest::CreatePage { title, markdown } => store
            .create_page(&title, &markdown)
            .await
            .map(|_| PageReply::Done),
        PageRequest::SavePage { id, markdown } => store
            .save_page(id, &markdown)
            .await
            .map(|_| PageReply::Done),
        PageRequest::DeletePage { id } => {
            store.delete_page(id).await.map(|_| PageReply::Done)
        }
    };

    outcome.unwrap_or_else(|error| PageReply::Failed { error })
}
