pub type PageId = i64;

/// A stored page as returned by a lookup by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub id: PageId,
    pub name: String,
    pub raw_content: String,
}
