use crate::domain::{Page, PageId};
use crate::error::Result;
use async_trait::async_trait;

pub mod pool;
pub mod queries;
pub mod sqlite;

// a page store can be shared between tasks and workers
// implementations: the sqlite-backed store in "sqlite.rs" and the message-passing proxy in
// services::endpoint, so handlers never care where the store actually lives
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Names of all pages, ascending.
    async fn list_pages(&self) -> Result<Vec<String>>;
    async fn fetch_page(&self, name: &str) -> Result<Option<Page>>;

    // write operations
    async fn create_page(&self, title: &str, markdown: &str) -> Result<()>;
    async fn save_page(&self, id: PageId, markdown: &str) -> Result<()>;
    async fn delete_page(&self, id: PageId) -> Result<()>;
}
