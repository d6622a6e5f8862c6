use crate::database::PageStore;
use crate::database::queries::{SqlQueries, SqlQuery};
use crate::database::sqlite::SqlPageStore;
use crate::error::{ConnectionFailure, WikiError};
use crate::tests::support::{open_pool, queries_with, setup_store, temp_database};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

// the walkthrough every wiki page goes through: create, read, edit, read, delete, read
#[tokio::test]
async fn test_page_lifecycle_scenario() {
    let (_dir, store) = setup_store(4).await;

    store.create_page("Home", "# Hi").await.expect("Should create page");

    let page = store
        .fetch_page("Home")
        .await
        .expect("Should query")
        .expect("Should find page");
    assert_eq!(page.raw_content, "# Hi");
    assert_eq!(page.name, "Home");

    store
        .save_page(page.id, "# Hi there")
        .await
        .expect("Should save page");
    let saved = store.fetch_page("Home").await.unwrap().unwrap();
    assert_eq!(saved.raw_content, "# Hi there");
    assert_eq!(saved.id, page.id);

    store.delete_page(page.id).await.expect("Should delete page");
    assert!(store.fetch_page("Home").await.unwrap().is_none());
}

// a page with no content is still a page
#[tokio::test]
async fn test_empty_content_is_allowed() {
    let (_dir, store) = setup_store(1).await;

    store.create_page("Blank", "").await.unwrap();

    let page = store.fetch_page("Blank").await.unwrap().unwrap();
    assert_eq!(page.raw_content, "");
}

#[tokio::test]
async fn test_fetch_unknown_page_is_not_found() {
    let (_dir, store) = setup_store(1).await;
    assert!(store.fetch_page("nope").await.unwrap().is_none());
}

// the name is unique; the second create must fail and leave the first row alone
#[tokio::test]
async fn test_duplicate_name_is_rejected() {
    let (_dir, store) = setup_store(2).await;

    store.create_page("Home", "original").await.unwrap();
    let result = store.create_page("Home", "impostor").await;

    assert_eq!(result, Err(WikiError::DuplicateName("Home".to_string())));
    let page = store.fetch_page("Home").await.unwrap().unwrap();
    assert_eq!(page.raw_content, "original");
}

#[tokio::test]
async fn test_list_pages_is_sorted_regardless_of_insertion_order() {
    let (_dir, store) = setup_store(2).await;

    assert!(store.list_pages().await.unwrap().is_empty());

    for name in ["zebra", "Apple", "mango", "apple", "Banana"] {
        store.create_page(name, "x").await.unwrap();
    }

    let names = store.list_pages().await.unwrap();
    assert_eq!(names, vec!["Apple", "Banana", "apple", "mango", "zebra"]);
}

// saving or deleting an id that doesn't exist is a quiet no-op
#[tokio::test]
async fn test_save_and_delete_missing_id_are_noops() {
    let (_dir, store) = setup_store(2).await;
    store.create_page("Keep", "kept").await.unwrap();

    store.save_page(9_999, "ghost").await.expect("Save of a missing id succeeds");
    store.delete_page(9_999).await.expect("Delete of a missing id succeeds");

    assert_eq!(store.list_pages().await.unwrap(), vec!["Keep"]);
    assert_eq!(store.fetch_page("Keep").await.unwrap().unwrap().raw_content, "kept");
}

#[tokio::test]
async fn test_delete_removes_only_that_page() {
    let (_dir, store) = setup_store(2).await;
    store.create_page("a", "1").await.unwrap();
    store.create_page("b", "2").await.unwrap();

    let a = store.fetch_page("a").await.unwrap().unwrap();
    store.delete_page(a.id).await.unwrap();

    assert_eq!(store.list_pages().await.unwrap(), vec!["b"]);
}

// ids come from autoincrement, so a deleted id is never handed out again
#[tokio::test]
async fn test_ids_are_not_reused_after_delete() {
    let (_dir, store) = setup_store(1).await;

    store.create_page("first", "").await.unwrap();
    let first = store.fetch_page("first").await.unwrap().unwrap();
    store.delete_page(first.id).await.unwrap();

    store.create_page("second", "").await.unwrap();
    let second = store.fetch_page("second").await.unwrap().unwrap();
    assert!(second.id > first.id);
}

// schema preparation is idempotent, a second store on the same file keeps the data
#[tokio::test]
async fn test_schema_preparation_is_idempotent() {
    let (_dir, url) = temp_database();

    let pool = open_pool(&url, 2, Duration::from_secs(5)).await;
    let store = SqlPageStore::new(pool.clone(), SqlQueries::builtin().unwrap())
        .await
        .unwrap();
    store.create_page("Persisted", "still here").await.unwrap();
    pool.close().await;

    let pool = open_pool(&url, 2, Duration::from_secs(5)).await;
    let reopened = SqlPageStore::new(pool, SqlQueries::builtin().unwrap())
        .await
        .expect("Preparing an existing schema should succeed");
    assert_eq!(reopened.list_pages().await.unwrap(), vec!["Persisted"]);
}

#[tokio::test]
async fn test_broken_schema_sql_is_a_schema_error() {
    let (_dir, url) = temp_database();
    let pool = open_pool(&url, 1, Duration::from_secs(5)).await;
    let queries = queries_with(SqlQuery::CreatePagesTable, "create tabel Pages (oops)");

    let result = SqlPageStore::new(pool.clone(), queries).await;

    assert!(matches!(result, Err(WikiError::Schema(_))));
    // the connection used for preparation went back to the pool
    pool.acquire().await.expect("Connection should have been released");
}

// a failing statement is reported as a query error and still releases its connection
#[tokio::test]
async fn test_failed_query_releases_connection() {
    let (_dir, url) = temp_database();
    let pool = open_pool(&url, 1, Duration::from_millis(500)).await;
    let queries = queries_with(SqlQuery::GetPage, "select Id, Content from NoSuchTable where Name = ?");
    let store = SqlPageStore::new(pool, queries).await.unwrap();

    let result = store.fetch_page("Home").await;
    assert!(matches!(
        result,
        Err(WikiError::Query {
            operation: SqlQuery::GetPage,
            ..
        })
    ));

    // with a single connection, this only works if the failed call gave it back
    store.create_page("Home", "ok").await.expect("Pool should not leak");
}

#[tokio::test]
async fn test_exhausted_pool_times_out() {
    let (_dir, url) = temp_database();
    let pool = open_pool(&url, 1, Duration::from_millis(200)).await;
    let store = SqlPageStore::new(pool.clone(), SqlQueries::builtin().unwrap())
        .await
        .unwrap();

    let held = pool.acquire().await.unwrap();
    let result = store.list_pages().await;
    assert_eq!(result, Err(WikiError::Connection(ConnectionFailure::Exhausted)));

    drop(held);
    assert!(store.list_pages().await.unwrap().is_empty());
}

// more than one row for a name breaks the uniqueness invariant; the store refuses to pick one
#[tokio::test]
async fn test_multiple_rows_for_a_name_fail_loudly() {
    let (_dir, url) = temp_database();
    let pool = open_pool(&url, 1, Duration::from_secs(5)).await;
    let queries = queries_with(
        SqlQuery::GetPage,
        "select Id, Content from Pages where Name = ? or 1 = 1",
    );
    let store = SqlPageStore::new(pool, queries).await.unwrap();
    store.create_page("one", "1").await.unwrap();
    store.create_page("two", "2").await.unwrap();

    let result = store.fetch_page("one").await;
    assert!(matches!(result, Err(WikiError::Integrity(_))));
}

#[tokio::test]
async fn test_concurrent_creates_with_distinct_titles_all_succeed() {
    let (_dir, store) = setup_store(8).await;
    let store = Arc::new(store);

    let mut set = JoinSet::new();
    for i in 0..32 {
        let store = store.clone();
        set.spawn(async move { store.create_page(&format!("page-{:02}", i), "body").await });
    }
    while let Some(joined) = set.join_next().await {
        joined.unwrap().expect("Every distinct create should succeed");
    }

    let names = store.list_pages().await.unwrap();
    let expected: Vec<String> = (0..32).map(|i| format!("page-{:02}", i)).collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn test_concurrent_creates_with_same_title_exactly_one_wins() {
    let (_dir, store) = setup_store(4).await;
    let store = Arc::new(store);

    let first = {
        let store = store.clone();
        tokio::spawn(async move { store.create_page("Race", "first").await })
    };
    let second = {
        let store = store.clone();
        tokio::spawn(async move { store.create_page("Race", "second").await })
    };

    let outcomes = [first.await.unwrap(), second.await.unwrap()];
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    let duplicates = outcomes
        .iter()
        .filter(|r| matches!(r, Err(WikiError::DuplicateName(name)) if name == "Race"))
        .count();

    assert_eq!(wins, 1);
    assert_eq!(duplicates, 1);
    assert_eq!(store.list_pages().await.unwrap(), vec!["Race"]);
}
