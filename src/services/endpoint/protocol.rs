use crate::domain::{Page, PageId};
use crate::error::WikiError;
use serde::{Deserialize, Serialize};

/// A page store call, tagged by the operation it invokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum PageRequest {
    AllPages,
    GetPage { name: String },
    CreatePage { title: String, markdown: String },
    SavePage { id: PageId, markdown: String },
    DeletePage { id: PageId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum PageReply {
    Pages { names: Vec<String> },
    Page(FetchReply),
    Done,
    Failed { error: WikiError },
}

/// Result of a lookup by name; `id` and `rawContent` are present only when found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchReply {
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

impl FetchReply {
    pub fn from_page(page: Option<Page>) -> Self {
        match page {
            Some(page) => Self {
                found: true,
                id: Some(page.id),
                raw_content: Some(page.raw_content),
            },
            None => Self {
                found: false,
                id: None,
                raw_content: None,
            },
        }
    }

    pub fn into_page(self, name: &str) -> Result<Option<Page>, WikiError> {
        if !self.found {
            return Ok(None);
        }

        let id = self
            .id
            .ok_or_else(|| WikiError::Endpoint("found page reply is missing its id".to_string()))?;

        Ok(Some(Page {
            id,
            name: name.to_string(),
            raw_content: self.raw_content.unwrap_or_default(),
        }))
    }
}

// serializing these types cannot fail (string keys, no custom impls), but a reply must always
// be produced, so fall back to a hand-written failure body
const UNENCODABLE_REPLY: &str =
    r#"{"status":"failed","error":{"kind":"endpoint","detail":"reply could not be encoded"}}"#;

pub fn encode_reply(reply: &PageReply) -> String {
    serde_json::to_string(reply).unwrap_or_else(|_| UNENCODABLE_REPLY.to_string())
}

pub fn encode_request(request: &PageRequest) -> Result<String, WikiError> {
    serde_json::to_string(request)
        .map_err(|e| WikiError::Endpoint(format!("request could not be encoded: {}", e)))
}

pub fn decode_request(body: &str) -> Result<PageRequest, WikiError> {
    serde_json::from_str(body).map_err(|e| WikiError::Endpoint(format!("malformed request: {}", e)))
}

pub fn decode_reply(body: &str) -> Result<PageReply, WikiError> {
    serde_json::from_str(body).map_err(|e| WikiError::Endpoint(format!("malformed reply: {}", e)))
}
