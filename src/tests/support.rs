use crate::database::PageStore;
use crate::database::pool::{ConnectionPool, PoolSettings};
use crate::database::queries::{SqlQueries, SqlQuery};
use crate::database::sqlite::SqlPageStore;
use crate::domain::{Page, PageId};
use crate::error::{Result, WikiError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// every test gets its own database file, so pooled connections all see the same data
// (an in-memory sqlite database is private to a single connection)
pub fn temp_database() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("wiki.db").display());
    (dir, url)
}

pub async fn open_pool(url: &str, max_connections: u32, acquire_timeout: Duration) -> ConnectionPool {
    let settings = PoolSettings {
        database_url: url.to_string(),
        max_connections,
        acquire_timeout,
    };
    ConnectionPool::connect(&settings)
        .await
        .expect("Failed to open pool")
}

// a ready store on a fresh database with the built-in catalog
pub async fn setup_store(max_connections: u32) -> (TempDir, SqlPageStore) {
    let (dir, url) = temp_database();
    let pool = open_pool(&url, max_connections, Duration::from_secs(5)).await;
    let queries = SqlQueries::builtin().expect("Built-in catalog should load");
    let store = SqlPageStore::new(pool, queries)
        .await
        .expect("Schema preparation should succeed");
    (dir, store)
}

// the built-in catalog with one statement swapped out
pub fn queries_with(query: SqlQuery, sql: &str) -> SqlQueries {
    let builtin = SqlQueries::builtin().unwrap();
    let mut map: HashMap<SqlQuery, String> = SqlQuery::ALL
        .iter()
        .map(|q| (*q, builtin.get(*q).to_string()))
        .collect();
    map.insert(query, sql.to_string());
    SqlQueries::from_map(map).unwrap()
}

// --- Manual Mock: PageStore ---
// keeps pages in a HashMap so handler and endpoint logic can be tested without sqlite
#[derive(Clone, Default)]
pub struct MockPageStore {
    pub pages: Arc<Mutex<HashMap<String, (PageId, String)>>>,
    pub next_id: Arc<Mutex<PageId>>,
    // when set, every call fails with this error
    pub failure: Arc<Mutex<Option<WikiError>>>,
}

impl MockPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_with(err: WikiError) -> Self {
        let store = Self::new();
        *store.failure.lock().unwrap() = Some(err);
        store
    }

    pub fn add_page(&self, name: &str, content: &str) -> PageId {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let id = *next_id;
        self.pages
            .lock()
            .unwrap()
            .insert(name.to_string(), (id, content.to_string()));
        id
    }

    pub fn content_of(&self, name: &str) -> Option<String> {
        self.pages.lock().unwrap().get(name).map(|(_, c)| c.clone())
    }

    fn check(&self) -> Result<()> {
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PageStore for MockPageStore {
    async fn list_pages(&self) -> Result<Vec<String>> {
        self.check()?;
        let mut names: Vec<String> = self.pages.lock().unwrap().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn fetch_page(&self, name: &str) -> Result<Option<Page>> {
        self.check()?;
        let pages = self.pages.lock().unwrap();
        Ok(pages.get(name).map(|(id, content)| Page {
            id: *id,
            name: name.to_string(),
            raw_content: content.clone(),
        }))
    }

    async fn create_page(&self, title: &str, markdown: &str) -> Result<()> {
        self.check()?;
        if self.pages.lock().unwrap().contains_key(title) {
            return Err(WikiError::DuplicateName(title.to_string()));
        }
        self.add_page(title, markdown);
        Ok(())
    }

    async fn save_page(&self, id: PageId, markdown: &str) -> Result<()> {
        self.check()?;
        let mut pages = self.pages.lock().unwrap();
        if let Some((_, content)) = pages.values_mut().find(|(page_id, _)| *page_id == id) {
            *content = markdown.to_string();
        }
        Ok(())
    }

    async fn delete_page(&self, id: PageId) -> Result<()> {
        self.check()?;
        self.pages.lock().unwrap().retain(|_, (page_id, _)| *page_id != id);
        Ok(())
    }
}
