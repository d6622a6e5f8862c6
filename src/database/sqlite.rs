use crate::database::PageStore;
use crate::database::pool::ConnectionPool;
use crate::database::queries::{SqlQueries, SqlQuery};
use crate::domain::{Page, PageId};
use crate::error::{Result, WikiError};
use async_trait::async_trait;

/// Page store backed by the connection pool and the query catalog.
///
/// A value of this type only exists once the schema has been prepared.
pub struct SqlPageStore {
    pool: ConnectionPool,
    queries: SqlQueries,
}

impl SqlPageStore {
    /// Prepares the schema and returns a ready store.
    ///
    /// Any failure here is fatal for this store; the caller decides whether to
    /// try constructing another one.
    pub async fn new(pool: ConnectionPool, queries: SqlQueries) -> Result<Self> {
        let mut conn = pool.acquire().await.map_err(|e| {
            tracing::error!(error = %e, "could not open a database connection");
            e
        })?;

        sqlx::query(queries.get(SqlQuery::CreatePagesTable))
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "database preparation error");
                WikiError::Schema(e.to_string())
            })?;

        drop(conn);
        tracing::info!("page store ready");

        Ok(Self { pool, queries })
    }

    fn fail(&self, operation: SqlQuery, err: sqlx::Error) -> WikiError {
        let err = WikiError::from_sqlx(operation, err);
        tracing::error!(%operation, error = %err, "page store operation failed");
        err
    }

    fn fail_acquire(&self, operation: SqlQuery, err: WikiError) -> WikiError {
        tracing::error!(%operation, error = %err, "could not acquire a connection");
        err
    }
}

#[async_trait]
impl PageStore for SqlPageStore {
    async fn list_pages(&self) -> Result<Vec<String>> {
        let op = SqlQuery::AllPages;
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| self.fail_acquire(op, e))?;

        let mut names: Vec<String> = sqlx::query_scalar(self.queries.get(op))
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| self.fail(op, e))?;

        // the catalog sql is dialect specific, so ordering is not left to it
        names.sort();
        Ok(names)
    }

    async fn fetch_page(&self, name: &str) -> Result<Option<Page>> {
        let op = SqlQuery::GetPage;
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| self.fail_acquire(op, e))?;

        let rows: Vec<(PageId, Option<String>)> = sqlx::query_as(self.queries.get(op))
            .bind(name)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| self.fail(op, e))?;

        if rows.len() > 1 {
            let err = WikiError::Integrity(format!(
                "{} rows share the page name '{}'",
                rows.len(),
                name
            ));
            tracing::error!(%op, error = %err, "page store operation failed");
            return Err(err);
        }

        Ok(rows.into_iter().next().map(|(id, content)| Page {
            id,
            name: name.to_string(),
            raw_content: content.unwrap_or_default(),
        }))
    }

    async fn create_page(&self, title: &str, markdown: &str) -> Result<()> {
        let op = SqlQuery::CreatePage;
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| self.fail_acquire(op, e))?;

        let outcome = sqlx::query(self.queries.get(op))
            .bind(title)
            .bind(markdown)
            .execute(&mut *conn)
            .await;

        match outcome {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tracing::error!(%op, title, error = %db_err, "page name already taken");
                Err(WikiError::DuplicateName(title.to_string()))
            }
            Err(e) => Err(self.fail(op, e)),
        }
    }

    async fn save_page(&self, id: PageId, markdown: &str) -> Result<()> {
        let op = SqlQuery::SavePage;
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| self.fail_acquire(op, e))?;

        // zero affected rows is not an error
        sqlx::query(self.queries.get(op))
            .bind(markdown)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| self.fail(op, e))?;

        Ok(())
    }

    async fn delete_page(&self, id: PageId) -> Result<()> {
        let op = SqlQuery::DeletePage;
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| self.fail_acquire(op, e))?;

        sqlx::query(self.queries.get(op))
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| self.fail(op, e))?;

        Ok(())
    }
}
