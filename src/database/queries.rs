use crate::error::{Result, WikiError};
use derive_more::derive::Display;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_QUERIES: &str = include_str!("../../db-queries.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlQuery {
    #[display("CREATE_PAGES_TABLE")]
    CreatePagesTable,
    #[display("ALL_PAGES")]
    AllPages,
    #[display("GET_PAGE")]
    GetPage,
    #[display("CREATE_PAGE")]
    CreatePage,
    #[display("SAVE_PAGE")]
    SavePage,
    #[display("DELETE_PAGE")]
    DeletePage,
}

impl SqlQuery {
    pub const ALL: [SqlQuery; 6] = [
        SqlQuery::CreatePagesTable,
        SqlQuery::AllPages,
        SqlQuery::GetPage,
        SqlQuery::CreatePage,
        SqlQuery::SavePage,
        SqlQuery::DeletePage,
    ];
}

/// Fixed lookup table from operation to dialect-specific SQL.
///
/// Built once at startup; every operation is guaranteed present, so lookups
/// never fail afterwards.
#[derive(Debug, Clone)]
pub struct SqlQueries {
    queries: HashMap<SqlQuery, String>,
}

impl SqlQueries {
    /// The catalog shipped with the binary (SQLite dialect).
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_QUERIES)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            WikiError::Config(format!(
                "unable to read query catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        // unknown keys are ignored, so parse loosely and pick out what we know
        let entries: HashMap<String, String> = serde_json::from_str(raw)
            .map_err(|e| WikiError::Config(format!("malformed query catalog: {}", e)))?;

        let mut queries = HashMap::new();
        for (key, sql) in entries {
            let parsed = serde_json::from_value::<SqlQuery>(serde_json::Value::String(key));
            if let Ok(query) = parsed {
                queries.insert(query, sql);
            }
        }

        Self::from_map(queries)
    }

    pub fn from_map(queries: HashMap<SqlQuery, String>) -> Result<Self> {
        let missing: Vec<String> = SqlQuery::ALL
            .iter()
            .filter(|q| !queries.contains_key(q))
            .map(|q| q.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(WikiError::Config(format!(
                "query catalog is missing {}",
                missing.join(", ")
            )));
        }

        Ok(Self { queries })
    }

    pub fn get(&self, query: SqlQuery) -> &str {
        // presence of every key is checked in from_map
        self.queries.get(&query).map(String::as_str).unwrap_or_default()
    }
}
