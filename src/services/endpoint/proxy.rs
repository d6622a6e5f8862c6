use crate::database::PageStore;
use crate::domain::{Page, PageId};
use crate::error::{Result, WikiError};
use crate::services::endpoint::bus::ServiceBus;
use crate::services::endpoint::protocol::{self, PageReply, PageRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Client side of the page store endpoint.
///
/// Cheap to clone; every HTTP worker holds one and none of them owns a
/// connection pool.
#[derive(Clone)]
pub struct PageStoreProxy {
    bus: Arc<ServiceBus>,
    address: String,
}

impl PageStoreProxy {
    pub fn new(bus: Arc<ServiceBus>, address: impl Into<String>) -> Self {
        Self {
            bus,
            address: address.into(),
        }
    }

    async fn call(&self, request: PageRequest) -> Result<PageReply> {
        let body = protocol::encode_request(&request)?;
        let reply = self.bus.request(&self.address, body).await?;

        match protocol::decode_reply(&reply)? {
            PageReply::Failed { error } => Err(error),
            other => Ok(other),
        }
    }
}

fn unexpected(reply: PageReply, action: &str) -> WikiError {
    WikiError::Endpoint(format!("unexpected reply to {}: {:?}", action, reply))
}

#[async_trait]
impl PageStore for PageStoreProxy {
    async fn list_pages(&self) -> Result<Vec<String>> {
        match self.call(PageRequest::AllPages).await? {
            PageReply::Pages { names } => Ok(names),
            other => Err(unexpected(other, "all-pages")),
        }
    }

    async fn fetch_page(&self, name: &str) -> Result<Option<Page>> {
        let request = PageRequest::GetPage {
            name: name.to_string(),
        };
        match self.call(request).await? {
            PageReply::Page(fetched) => fetched.into_page(name),
            other => Err(unexpected(other, "get-page")),
        }
    }

    async fn create_page(&self, title: &str, markdown: &str) -> Result<()> {
        let request = PageRequest::CreatePage {
            title: title.to_string(),
            markdown: markdown.to_string(),
        };
        match self.call(request).await? {
            PageReply::Done => Ok(()),
            other => Err(unexpected(other, "create-page")),
        }
    }

    async fn save_page(&self, id: PageId, markdown: &str) -> Result<()> {
        let request = PageRequest::SavePage {
            id,
            markdown: markdown.to_string(),
        };
        match self.call(request).await? {
            PageReply::Done => Ok(()),
            other => Err(unexpected(other, "save-page")),
        }
    }

    async fn delete_page(&self, id: PageId) -> Result<()> {
        match self.call(PageRequest::DeletePage { id }).await? {
            PageReply::Done => Ok(()),
            other => Err(unexpected(other, "delete-page")),
        }
    }
}
